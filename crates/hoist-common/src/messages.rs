//! Message templates for refactoring status entries.
//!
//! Each template carries a stable numeric code and a default severity.
//! Placeholders `{0}`, `{1}`, ... are filled by [`format_message`].

use crate::status::Severity;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub severity: Severity,
    pub message: &'static str,
}

/// Replace `{N}` placeholders in `template` with `args[N]`.
///
/// Placeholders without a matching argument are left untouched.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        let placeholder = format!("{{{i}}}");
        result = result.replace(&placeholder, arg);
    }
    result
}

pub mod diagnostic_codes {
    pub const MOVE_TARGET_IS_TOP_LEVEL: u32 = 1001;
    pub const MOVE_TARGET_IS_LOCAL: u32 = 1002;
    pub const MOVE_TARGET_IS_BINARY: u32 = 1003;
    pub const TYPE_NAME_COLLISION: u32 = 1004;
    pub const UNIT_ALREADY_EXISTS: u32 = 1005;
    pub const MOVE_TARGET_NOT_A_TYPE: u32 = 1006;
    pub const CANCELLED: u32 = 1007;
    pub const APPLY_FAILED: u32 = 1008;
    pub const STALE_PLAN: u32 = 1009;
    pub const INVALID_FIELD_NAME: u32 = 2001;
    pub const FIELD_NAME_NOT_LOWERCASE: u32 = 2002;
    pub const FIELD_NAME_COLLISION: u32 = 2003;
    pub const PARAMETER_NAME_COLLISION: u32 = 2004;
    pub const IMPLICIT_SUPER_CALL: u32 = 2005;
    pub const NO_ENCLOSING_INSTANCE: u32 = 2006;
    pub const UNREACHABLE_OUTER_INSTANCE: u32 = 2007;
    pub const ENCLOSING_FIELD_MANDATORY: u32 = 2008;
    pub const VISIBILITY_CHANGED: u32 = 3001;
    pub const VISIBILITY_IMPLICIT: u32 = 3002;
    pub const UNRESOLVED_REFERENCE: u32 = 3003;
    pub const AMBIGUOUS_REFERENCE: u32 = 3004;
    pub const ACCESSOR_SUBSTITUTED: u32 = 3005;
    pub const BINARY_MEMBER: u32 = 3006;
}

pub mod diagnostic_messages {
    use super::DiagnosticMessage;
    use super::diagnostic_codes as codes;
    use crate::status::Severity;

    pub const MOVE_TARGET_IS_TOP_LEVEL: DiagnosticMessage = DiagnosticMessage {
        code: codes::MOVE_TARGET_IS_TOP_LEVEL,
        severity: Severity::Fatal,
        message: "Type '{0}' is already a top-level type.",
    };
    pub const MOVE_TARGET_IS_LOCAL: DiagnosticMessage = DiagnosticMessage {
        code: codes::MOVE_TARGET_IS_LOCAL,
        severity: Severity::Fatal,
        message: "Local or anonymous type '{0}' cannot be moved to top level.",
    };
    pub const MOVE_TARGET_IS_BINARY: DiagnosticMessage = DiagnosticMessage {
        code: codes::MOVE_TARGET_IS_BINARY,
        severity: Severity::Fatal,
        message: "Type '{0}' has no source and cannot be moved.",
    };
    pub const TYPE_NAME_COLLISION: DiagnosticMessage = DiagnosticMessage {
        code: codes::TYPE_NAME_COLLISION,
        severity: Severity::Fatal,
        message: "A type named '{0}' already exists in package '{1}'.",
    };
    pub const UNIT_ALREADY_EXISTS: DiagnosticMessage = DiagnosticMessage {
        code: codes::UNIT_ALREADY_EXISTS,
        severity: Severity::Fatal,
        message: "Compilation unit '{0}' already exists.",
    };
    pub const MOVE_TARGET_NOT_A_TYPE: DiagnosticMessage = DiagnosticMessage {
        code: codes::MOVE_TARGET_NOT_A_TYPE,
        severity: Severity::Fatal,
        message: "'{0}' is not a type declaration.",
    };
    pub const CANCELLED: DiagnosticMessage = DiagnosticMessage {
        code: codes::CANCELLED,
        severity: Severity::Fatal,
        message: "The refactoring was cancelled.",
    };
    pub const APPLY_FAILED: DiagnosticMessage = DiagnosticMessage {
        code: codes::APPLY_FAILED,
        severity: Severity::Fatal,
        message: "The edits could not be applied: {0}",
    };
    pub const STALE_PLAN: DiagnosticMessage = DiagnosticMessage {
        code: codes::STALE_PLAN,
        severity: Severity::Fatal,
        message: "The plan for '{0}' no longer matches the workspace.",
    };
    pub const INVALID_FIELD_NAME: DiagnosticMessage = DiagnosticMessage {
        code: codes::INVALID_FIELD_NAME,
        severity: Severity::Fatal,
        message: "'{0}' is not a valid field name.",
    };
    pub const FIELD_NAME_NOT_LOWERCASE: DiagnosticMessage = DiagnosticMessage {
        code: codes::FIELD_NAME_NOT_LOWERCASE,
        severity: Severity::Warning,
        message: "Field name '{0}' should start with a lowercase letter.",
    };
    pub const FIELD_NAME_COLLISION: DiagnosticMessage = DiagnosticMessage {
        code: codes::FIELD_NAME_COLLISION,
        severity: Severity::Warning,
        message: "A field named '{0}' already exists in '{1}'; using '{2}' instead.",
    };
    pub const PARAMETER_NAME_COLLISION: DiagnosticMessage = DiagnosticMessage {
        code: codes::PARAMETER_NAME_COLLISION,
        severity: Severity::Warning,
        message: "The name '{0}' is already used in a constructor of '{1}'; using '{2}' instead.",
    };
    pub const IMPLICIT_SUPER_CALL: DiagnosticMessage = DiagnosticMessage {
        code: codes::IMPLICIT_SUPER_CALL,
        severity: Severity::Warning,
        message: "A constructor of '{0}' relies on an implicit super() call; it must pass an instance of '{1}'.",
    };
    pub const NO_ENCLOSING_INSTANCE: DiagnosticMessage = DiagnosticMessage {
        code: codes::NO_ENCLOSING_INSTANCE,
        severity: Severity::Warning,
        message: "No instance of '{0}' is available to create '{1}' here.",
    };
    pub const UNREACHABLE_OUTER_INSTANCE: DiagnosticMessage = DiagnosticMessage {
        code: codes::UNREACHABLE_OUTER_INSTANCE,
        severity: Severity::Error,
        message: "The instance of '{0}' cannot be reached from '{1}' after the move.",
    };
    pub const ENCLOSING_FIELD_MANDATORY: DiagnosticMessage = DiagnosticMessage {
        code: codes::ENCLOSING_FIELD_MANDATORY,
        severity: Severity::Info,
        message: "'{0}' uses instance members of '{1}'; a field for the enclosing instance is required.",
    };
    pub const VISIBILITY_CHANGED: DiagnosticMessage = DiagnosticMessage {
        code: codes::VISIBILITY_CHANGED,
        severity: Severity::Warning,
        message: "The visibility of '{0}' will be changed from {1} to {2}.",
    };
    pub const VISIBILITY_IMPLICIT: DiagnosticMessage = DiagnosticMessage {
        code: codes::VISIBILITY_IMPLICIT,
        severity: Severity::Info,
        message: "'{0}' is a member of '{1}' and is implicitly public.",
    };
    pub const UNRESOLVED_REFERENCE: DiagnosticMessage = DiagnosticMessage {
        code: codes::UNRESOLVED_REFERENCE,
        severity: Severity::Info,
        message: "The reference '{0}' could not be resolved; its visibility was not checked.",
    };
    pub const AMBIGUOUS_REFERENCE: DiagnosticMessage = DiagnosticMessage {
        code: codes::AMBIGUOUS_REFERENCE,
        severity: Severity::Info,
        message: "The reference '{0}' matches {1} declarations; all of them are treated as public.",
    };
    pub const ACCESSOR_SUBSTITUTED: DiagnosticMessage = DiagnosticMessage {
        code: codes::ACCESSOR_SUBSTITUTED,
        severity: Severity::Info,
        message: "The access to field '{0}' will use '{1}' instead.",
    };
    pub const BINARY_MEMBER: DiagnosticMessage = DiagnosticMessage {
        code: codes::BINARY_MEMBER,
        severity: Severity::Warning,
        message: "'{0}' has no source; its visibility cannot be changed to {1}.",
    };
}

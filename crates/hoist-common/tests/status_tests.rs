use super::*;
use crate::messages::{diagnostic_codes, diagnostic_messages};
use crate::span::{Span, UnitId};

#[test]
fn test_severity_ordering() {
    assert!(Severity::Info < Severity::Warning);
    assert!(Severity::Warning < Severity::Error);
    assert!(Severity::Error < Severity::Fatal);
}

#[test]
fn test_empty_status_has_no_severity() {
    let status = RefactoringStatus::new();
    assert!(status.is_empty());
    assert_eq!(status.max_severity(), None);
    assert!(!status.has_fatal());
    assert!(!status.has_error());
}

#[test]
fn test_add_message_formats_arguments() {
    let mut status = RefactoringStatus::new();
    let location = Location::new(UnitId(3), Span::new(10, 15));
    status.add_message(
        &diagnostic_messages::TYPE_NAME_COLLISION,
        &["Inner", "p"],
        Some(location),
    );

    let entry = &status.entries()[0];
    assert_eq!(entry.severity, Severity::Fatal);
    assert_eq!(
        entry.message,
        "A type named 'Inner' already exists in package 'p'."
    );
    assert_eq!(entry.location, Some(location));
    assert!(status.has_fatal());
}

#[test]
fn test_severity_override_and_merge_keep_order() {
    let mut first = RefactoringStatus::new();
    first.add_with_severity(
        Severity::Error,
        &diagnostic_messages::VISIBILITY_CHANGED,
        &["x", "private", "package"],
        None,
    );
    let mut second = RefactoringStatus::new();
    second.add_message(&diagnostic_messages::UNRESOLVED_REFERENCE, &["y"], None);

    first.merge(second);
    let codes: Vec<u32> = first.entries().iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        vec![
            diagnostic_codes::VISIBILITY_CHANGED,
            diagnostic_codes::UNRESOLVED_REFERENCE
        ]
    );
    assert_eq!(first.max_severity(), Some(Severity::Error));
    assert!(first.has_error());
    assert!(!first.has_fatal());
}

#[test]
fn test_status_serializes_lowercase_severity() {
    let status = RefactoringStatus::from_message(&diagnostic_messages::CANCELLED, &[], None);
    let json = serde_json::to_string(&status).unwrap();
    assert!(json.contains("\"severity\":\"fatal\""), "json: {json}");
    assert!(!json.contains("location"), "json: {json}");
}

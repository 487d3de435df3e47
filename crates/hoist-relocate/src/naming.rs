//! Names synthesized for the enclosing-instance link.

/// Reserved words and literals that can never name a field or parameter.
const RESERVED: &[&str] = &[
    "_",
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
];

/// Whether `name` can be used as a variable name.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !RESERVED.contains(&name)
}

#[must_use]
pub fn starts_lowercase(name: &str) -> bool {
    name.chars().next().is_some_and(|c| !c.is_uppercase())
}

/// Variable-style base name for an instance of `type_name`.
///
/// The leading run of capitals is lowered, keeping the last one when it
/// starts the next word: `Outer` gives `outer`, `URLParser` gives
/// `urlParser`, `IO` gives `io`.
#[must_use]
pub fn base_name(type_name: &str) -> String {
    let chars: Vec<char> = type_name.chars().collect();
    let upper = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lowered = match upper {
        0 => return type_name.to_string(),
        1 => 1,
        n if n == chars.len() => n,
        n => n - 1,
    };
    chars
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            let lower = i < lowered;
            let mapped: Vec<char> = if lower {
                c.to_lowercase().collect()
            } else {
                vec![*c]
            };
            mapped
        })
        .collect()
}

/// `base`, or `base` with the smallest numeric suffix that is a valid
/// identifier and not `taken`.
#[must_use]
pub fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if is_identifier(base) && !taken(base) {
        return base.to_string();
    }
    (1u32..)
        .map(|i| format!("{base}{i}"))
        .find(|candidate| is_identifier(candidate) && !taken(candidate))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../tests/naming_tests.rs"]
mod naming_tests;

//! The fixed set of automatic variables usable in recipes.

use crate::error::{Error, Result};

/// Recognized tokens and their meanings.
pub const AUTO_VARS: &[(&str, &str)] = &[
    ("$@", "file name of the target of the rule"),
    ("$<", "name of the first prerequisite"),
    ("$^", "names of all prerequisites, without duplicates"),
    ("$?", "names of all prerequisites newer than the target"),
    ("$*", "stem with which an implicit rule matches"),
    ("$+", "names of all prerequisites, with duplicates"),
    ("$|", "names of the order-only prerequisites"),
    ("$%", "target member name, when the target is an archive member"),
];

/// Validate `token` against the fixed set; returns its canonical form.
pub fn lookup(token: &str) -> Result<&'static str> {
    AUTO_VARS
        .iter()
        .find(|(t, _)| *t == token)
        .map(|(t, _)| *t)
        .ok_or_else(|| Error::UnknownAutoVar(token.to_string()))
}

/// Description of a recognized token.
pub fn describe(token: &str) -> Result<&'static str> {
    AUTO_VARS
        .iter()
        .find(|(t, _)| *t == token)
        .map(|(_, d)| *d)
        .ok_or_else(|| Error::UnknownAutoVar(token.to_string()))
}

/// With no token, a catalog of every automatic variable; with a token, a
/// single validated entry.
pub fn help_text(token: Option<&str>) -> Result<String> {
    match token {
        Some(token) => {
            let token = lookup(token)?;
            let desc = describe(token)?;
            Ok(format!("{token}  {desc}"))
        }
        None => Ok(AUTO_VARS
            .iter()
            .map(|(t, d)| format!("{t}  {d}"))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

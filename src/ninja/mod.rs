//! Everything related to writing the `build.ninja` file format.
//!
//! Ninja's grammar is line oriented with a single metacharacter, `$`.
//! Literal text is escaped by doubling `$`; in paths, spaces and colons are
//! structural and are protected as `$ ` and `$:`. A line break can never be
//! represented, so text containing one is rejected.

mod writer;

pub use writer::{BuildEdge, RuleOptions, Writer, DEFAULT_WIDTH};

use crate::builder::errors::GenerationError;

/// Escape text so Ninja reads it back unchanged.
pub fn escape(text: &str) -> Result<String, GenerationError> {
    check_line_breaks(text)?;
    Ok(text.replace('$', "$$"))
}

/// Escape a path for use in a `build` line.
///
/// `$` is doubled first, so an existing `$ ` sequence in the input becomes
/// `$$$ ` (a literal dollar followed by a protected space) and nothing is
/// escaped twice.
pub fn escape_path(path: &str) -> Result<String, GenerationError> {
    check_line_breaks(path)?;
    let mut escaped = String::with_capacity(path.len() + 4);
    for c in path.chars() {
        match c {
            '$' => escaped.push_str("$$"),
            ' ' => escaped.push_str("$ "),
            ':' => escaped.push_str("$:"),
            c => escaped.push(c),
        }
    }
    Ok(escaped)
}

fn check_line_breaks(text: &str) -> Result<(), GenerationError> {
    if text.contains(['\n', '\r']) {
        return Err(GenerationError::InvalidText {
            text: text.to_string(),
        });
    }
    Ok(())
}

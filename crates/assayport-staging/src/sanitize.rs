//! Safe-filename sanitization.
//!
//! Session tokens are caller-supplied and uploaded filenames come straight
//! from the browser; both are used as path segments under the upload root.
//! Every character outside the safe alphabet (letters, digits, underscore,
//! dot, hyphen, space) is replaced with an underscore before the value
//! touches the filesystem.

/// Rewrite `name` into the safe-filename alphabet.
///
/// Two different unsafe inputs may sanitize to the same string; callers
/// treat that as an ordinary overwrite, not an error. A result that would
/// be empty or consist only of dots (`.`, `..`) is replaced with `"_"` so
/// it can never alias a directory traversal segment.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

//! Tag substitution inside string settings.
//!
//! String values may embed references to other settings as bracketed
//! identifiers, e.g. `"s3://[BUCKET]/v/[ANALYZER_VERSION]/config/"`. A tag
//! is `[` followed by letters, digits, and underscores, closed by `]`.
//!
//! Resolution scans left to right. Each match is tried against the
//! identity-scoped dynamic overrides first, then the layered store. A
//! successful substitution restarts the scan from the beginning of the
//! string, because the substituted text may itself contain tags. An
//! unresolvable tag is left verbatim and the scan advances past it, so
//! unknown tags never loop.
//!
//! Mutually referential settings (`A = "[B]"`, `B = "[A]"`) would restart
//! forever; the total number of substitutions is capped at
//! [`MAX_RESOLVE_STEPS`] and resolution returns the partially substituted
//! string once the cap is hit.

/// Maximum number of substitutions performed for one input string.
pub const MAX_RESOLVE_STEPS: usize = 64;

/// Resolve bracketed tags in `value`.
///
/// `overrides` supplies identity-scoped dynamic values (the current
/// identity's name, its saved parent-folder reference) and wins over
/// `lookup`, which supplies values from the layered configuration.
/// Tags matching neither are left unchanged in the output.
pub fn resolve_tags<L, O>(value: &str, lookup: L, overrides: O) -> String
where
    L: Fn(&str) -> Option<String>,
    O: Fn(&str) -> Option<String>,
{
    let mut out = value.to_string();
    let mut offset = 0usize;
    let mut steps = 0usize;

    while let Some((start, end)) = find_tag(&out, offset) {
        let name = &out[start + 1..end];
        match overrides(name).or_else(|| lookup(name)) {
            Some(replacement) => {
                if steps >= MAX_RESOLVE_STEPS {
                    break;
                }
                steps += 1;
                out.replace_range(start..=end, &replacement);
                // Restart: the replacement may contain tags of its own.
                offset = 0;
            }
            None => {
                // Leave the bracketed text unchanged and move past it.
                offset = start + 1;
            }
        }
    }

    out
}

/// Find the next well-formed tag at or after `from`.
///
/// Returns the byte offsets of the opening `[` and closing `]`.
fn find_tag(s: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'[' {
            let mut j = i + 1;
            while j < bytes.len() && is_tag_char(bytes[j]) {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == b']' {
                return Some((i, j));
            }
        }
        i += 1;
    }
    None
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

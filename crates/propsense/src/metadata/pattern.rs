//! Placeholder patterns: names containing `{*}` (any map key) or `[*]` (any
//! array index).
//!
//! Matching walks the pattern and the name in lock-step. A placeholder
//! consumes one segment of the name: either a quoted segment `"..."`, which
//! may contain dots, or everything up to the next dot that is not escaped
//! with a backslash.

/// `true` if `name` contains a placeholder.
#[must_use]
pub fn is_pattern(name: &str) -> bool {
    name.contains("{*}") || name.contains("[*]")
}

/// `true` if `name` is matched by `pattern`. A pattern without placeholders
/// only matches itself.
#[must_use]
pub fn matches(name: &str, pattern: &str) -> bool {
    let (name, pattern) = (name.as_bytes(), pattern.as_bytes());
    let (mut n, mut p) = (0, 0);
    while p < pattern.len() {
        if is_placeholder(&pattern[p..]) {
            if n >= name.len() {
                return false;
            }
            n = segment_end(name, n);
            p += 3;
        } else {
            if name.get(n) != Some(&pattern[p]) {
                return false;
            }
            n += 1;
            p += 1;
        }
    }
    n == name.len()
}

fn is_placeholder(rest: &[u8]) -> bool {
    rest.starts_with(b"{*}") || rest.starts_with(b"[*]")
}

/// End of the segment starting at `start`, which must be in bounds.
fn segment_end(name: &[u8], start: usize) -> usize {
    if name[start] == b'"' {
        return name[start + 1..]
            .iter()
            .position(|&b| b == b'"')
            .map_or(name.len(), |close| start + 1 + close + 1);
    }
    (start + 1..name.len())
        .find(|&i| name[i] == b'.' && name[i - 1] != b'\\')
        .unwrap_or(name.len())
}

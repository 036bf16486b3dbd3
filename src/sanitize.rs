//! Turn arbitrary label text into a filename fragment that is legal on
//! every supported filesystem (Windows being the most restrictive).
//!
//! The mapping is deterministic but not injective: labels that differ only
//! in illegal characters end up with the same name and share an output file.

/// Default upper bound on the length of a sanitized name, in characters.
pub const DEFAULT_MAX_NAME_LEN: usize = 120;

/// Name used when nothing usable is left after cleaning.
const FALLBACK_NAME: &str = "Archive";

/// Windows device names that cannot be used as a file stem.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Sanitize `raw` into a non-empty name of at most `max_len` characters.
///
/// 1. Trim surrounding whitespace.
/// 2. Replace `< > : " / \ | ? *` and ASCII control characters with `.`.
/// 3. Collapse runs of periods into one.
/// 4. Trim surrounding periods and whitespace.
/// 5. Fall back to `"Archive"` when empty.
/// 6. Prefix reserved device names (`CON`, `COM1`, ...) with `_`.
/// 7. Truncate to `max_len` characters and re-trim the tail.
///
/// Applying it twice gives the same result as applying it once.
pub fn sanitize(raw: &str, max_len: usize) -> String {
    let replaced: String = raw.trim().chars().map(replace_illegal).collect();
    let collapsed = collapse_periods(&replaced);

    let mut name = trim_edges(&collapsed).to_string();
    if name.is_empty() {
        name = FALLBACK_NAME.to_string();
    }
    if is_reserved_device_name(&name) {
        name.insert(0, '_');
    }

    if name.chars().count() > max_len {
        let truncated: String = name.chars().take(max_len).collect();
        name = trim_tail(&truncated).to_string();
        // Truncation can expose a device name ("CON   x" -> "CON").
        if is_reserved_device_name(&name) {
            name = format!("_{name}").chars().take(max_len.max(1)).collect();
        }
    }
    name
}

/// Whether `name` is a reserved device name (case-insensitive, exact match).
pub fn is_reserved_device_name(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn replace_illegal(c: char) -> char {
    match c {
        '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '.',
        c if c.is_ascii_control() && c != '\x7f' => '.',
        c => c,
    }
}

fn collapse_periods(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '.' && out.ends_with('.') {
            continue;
        }
        out.push(c);
    }
    out
}

fn is_edge_char(c: char) -> bool {
    c == '.' || c.is_whitespace()
}

fn trim_edges(s: &str) -> &str {
    s.trim_matches(is_edge_char)
}

fn trim_tail(s: &str) -> &str {
    s.trim_end_matches(is_edge_char)
}

// src/core/sanitize.rs

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Filesystem-safe stem. Keeps letters (including č/š/ž), digits, `-`, `.`;
/// runs of whitespace become one `_`.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_us = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() || ch == '-' || ch == '.' { out.push(ch); last_us = false; }
        else if ch.is_whitespace() || ch == '_' { if !last_us { out.push('_'); last_us = true; } }
    }
    let out = out.trim_matches(|c| c == '_' || c == '.').to_string();
    if out.is_empty() { s!(fallback) } else { out }
}

pub fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Integer right after `marker` (ASCII case-insensitive), skipping spaces.
/// `"Skupina 2"` with marker `"skupina"` → `Some(2)`.
pub fn number_after(text: &str, marker: &str) -> Option<u32> {
    let lower = text.to_ascii_lowercase();
    let at = lower.find(&marker.to_ascii_lowercase())? + marker.len();
    let rest = text[at..].trim_start();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() { None } else { digits.parse().ok() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_collapses() {
        assert_eq!(normalize_ws("  Kralj\u{a0}B.\n\t "), "Kralj B.");
    }

    #[test]
    fn filenames_keep_slovene_letters() {
        assert_eq!(sanitize_filename("RSR lv_Četrtek 9.10.", "x"), "RSR_lv_Četrtek_9.10");
        assert_eq!(sanitize_filename("a/b\\c:d", "x"), "abcd");
        assert_eq!(sanitize_filename(" / ", "class"), "class");
    }

    #[test]
    fn digits_only() {
        assert!(is_all_digits("504"));
        assert!(!is_all_digits("50a"));
        assert!(!is_all_digits(""));
    }

    #[test]
    fn number_follows_marker() {
        assert_eq!(number_after("Skupina 2", "Skupina"), Some(2));
        assert_eq!(number_after("SKUPINA   13 (lab)", "Skupina"), Some(13));
        assert_eq!(number_after("Skupina A", "Skupina"), None);
        assert_eq!(number_after("Uhan", "Skupina"), None);
    }
}

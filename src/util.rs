//! Shared utility functions used across the codebase.

/// Find the largest valid UTF-8 char boundary at or before `pos`.
///
/// Polyfill for `str::floor_char_boundary` (nightly-only). Use when
/// truncating strings by byte position to avoid panicking on multi-byte
/// characters.
pub fn floor_char_boundary(s: &str, pos: usize) -> usize {
    if pos >= s.len() {
        return s.len();
    }
    let mut i = pos;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// First `max_chars` characters of `s`.
///
/// Counts characters rather than bytes so context excerpts keep the same
/// length regardless of script.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..floor_char_boundary(s, idx)],
        None => s,
    }
}

/// Title-case a snake_case identifier: `skills_assessment` -> `Skills Assessment`.
pub fn title_case(ident: &str) -> String {
    ident
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_char_boundary_ascii() {
        assert_eq!(floor_char_boundary("hello", 3), 3);
        assert_eq!(floor_char_boundary("hello", 10), 5);
    }

    #[test]
    fn test_floor_char_boundary_multibyte() {
        // 'é' is two bytes; position 2 lands inside it.
        let s = "héllo";
        assert_eq!(floor_char_boundary(s, 2), 1);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("naïve café", 4), "naïv");
        assert_eq!(truncate_chars("", 4), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("skills_assessment"), "Skills Assessment");
        assert_eq!(title_case("people_focus"), "People Focus");
        assert_eq!(title_case("teaching"), "Teaching");
    }
}

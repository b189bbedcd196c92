//! Display formatting helpers for observation fields.

/// Truncate a string to at most `max` bytes, appending "..." if truncated.
/// The cut never splits a multibyte character: the boundary backs up to the
/// nearest char boundary, so any UTF-8 input stays valid.
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max.saturating_sub(3);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("abcdefghij", 7), "abcd...");
    }

    #[test]
    fn test_truncate_backs_off_multibyte_boundary() {
        // Two-byte chars throughout; max=8 puts the raw cut at byte 5,
        // inside the third 'é'.
        let s = "é".repeat(10);
        assert_eq!(truncate(&s, 8), "éé...");
    }

    #[test]
    fn test_truncate_multibyte_never_panics_across_cut_points() {
        let s = "日本語のテキスト";
        for max in 0..=s.len() + 3 {
            let out = truncate(&s, max);
            assert!(out.len() <= s.len() + 3);
        }
    }
}

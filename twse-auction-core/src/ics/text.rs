//! RFC 5545 text escaping and line folding.

/// Maximum octets per physical line, excluding the CRLF.
pub const FOLD_LIMIT: usize = 75;

/// Escape a TEXT value: backslash, semicolon, comma and line breaks.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                // CRLF and lone CR both become one line break
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }

    out
}

/// Reverse of `escape_text`. Unknown escapes keep their backslash.
pub fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some(',') | Some(';') | Some('\\') => {
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            }
            Some('n') | Some('N') => {
                result.push('\n');
                chars.next();
            }
            _ => result.push(c),
        }
    }

    result
}

/// Fold one content line into physical lines of at most `FOLD_LIMIT` octets.
///
/// Continuation lines begin with a single space, which counts toward the limit.
/// Splits happen only between characters, never inside a UTF-8 sequence.
pub fn fold_line(line: &str) -> Vec<String> {
    if line.len() <= FOLD_LIMIT {
        return vec![line.to_string()];
    }

    let mut parts = Vec::new();
    let mut current = String::with_capacity(FOLD_LIMIT);

    for ch in line.chars() {
        if !current.is_empty() && current.len() + ch.len_utf8() > FOLD_LIMIT {
            parts.push(std::mem::take(&mut current));
            current.push(' ');
        }
        current.push(ch);
    }
    parts.push(current);

    debug_assert!(parts.iter().all(|p| p.len() <= FOLD_LIMIT));
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unfold(parts: &[String]) -> String {
        let mut out = parts[0].clone();
        for part in &parts[1..] {
            out.push_str(part.strip_prefix(' ').expect("continuation starts with a space"));
        }
        out
    }

    #[test]
    fn test_escape_specials_once_each() {
        let escaped = escape_text("a,b;c\nd\\e");
        assert_eq!(escaped, "a\\,b\\;c\\nd\\\\e");
    }

    #[test]
    fn test_escape_normalizes_crlf() {
        assert_eq!(escape_text("a\r\nb\rc"), "a\\nb\\nc");
    }

    #[test]
    fn test_unescape_reverses_escape() {
        let original = "證券名稱：A,B;C\n第二行\\結尾";
        assert_eq!(unescape_text(&escape_text(original)), original);
    }

    #[test]
    fn test_unescape_keeps_unknown_escape() {
        assert_eq!(unescape_text("a\\tb"), "a\\tb");
    }

    #[test]
    fn test_short_line_not_folded() {
        let line = "SUMMARY:Short";
        assert_eq!(fold_line(line), vec![line.to_string()]);
    }

    #[test]
    fn test_exactly_limit_not_folded() {
        let line = "X".repeat(FOLD_LIMIT);
        assert_eq!(fold_line(&line).len(), 1);
    }

    #[test]
    fn test_ascii_fold_respects_budget() {
        let line = format!("DESCRIPTION:{}", "a".repeat(200));
        let parts = fold_line(&line);

        assert!(parts.len() > 1);
        assert_eq!(parts[0].len(), FOLD_LIMIT);
        for part in &parts[1..] {
            assert!(part.starts_with(' '));
            assert!(part.len() <= FOLD_LIMIT, "Line too long: {} octets", part.len());
        }
        assert_eq!(unfold(&parts), line);
    }

    #[test]
    fn test_multibyte_fold_splits_on_char_boundaries() {
        // 3 octets per character, 100 characters
        let line = format!("SUMMARY:{}", "競".repeat(100));
        let parts = fold_line(&line);

        for part in &parts {
            assert!(part.len() <= FOLD_LIMIT, "Line too long: {} octets", part.len());
            // Every part is a valid &str by construction; check no part is split mid-char
            let body = part.strip_prefix(' ').unwrap_or(part);
            assert!(body.chars().all(|c| c == '競' || c.is_ascii()));
        }
        assert_eq!(unfold(&parts), line);
    }

    #[test]
    fn test_mixed_width_fold_roundtrip() {
        let line = format!("DESCRIPTION:{}", "a競🎯,".repeat(40));
        let parts = fold_line(&line);
        assert!(parts.iter().all(|p| p.len() <= FOLD_LIMIT));
        assert_eq!(unfold(&parts), line);
    }
}

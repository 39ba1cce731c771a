// ============================================================
// Layer 4 - Text Preprocessor
// ============================================================
// Normalises raw file text before it reaches the Segmenter.
//
// Line breaks are sentence separators, so they are kept;
// everything else that Word or scanned judgments tend to
// carry is flattened:
//   - tabs, non-breaking / zero-width / ideographic spaces → ' '
//   - \r\n and \r → \n
//   - other control characters → ' '
//   - runs of spaces collapse to one, lines are trimmed
//   - blank lines are dropped
//
// Reference: Rust Book §8 (Strings in Rust)

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn clean(&self, text: &str) -> String {
        let normalised: String = text
            .replace("\r\n", "\n")
            .chars()
            .map(|c| match c {
                '\t' | '\u{00A0}' | '\u{200B}' | '\u{FEFF}' | '\u{3000}' => ' ',
                '\r' => '\n',
                c if c.is_control() && c != '\n' => ' ',
                c => c,
            })
            .collect();

        normalised
            .lines()
            .map(collapse_spaces)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Single-space runs and trim one line
fn collapse_spaces(line: &str) -> String {
    line.split(' ')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("本院   认为"), "本院 认为");
    }

    #[test]
    fn test_ideographic_space_and_tabs() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("\u{3000}\u{3000}原告\t诉称"), "原告 诉称");
    }

    #[test]
    fn test_keeps_line_breaks_drops_blank_lines() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("第一段\r\n\r\n\r\n第二段\r第三段"), "第一段\n第二段\n第三段");
    }

    #[test]
    fn test_removes_control_chars() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello\x01world"), "hello world");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(Preprocessor::new().clean(""), "");
    }
}

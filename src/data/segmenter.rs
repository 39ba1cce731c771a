// ============================================================
// Layer 4 - Sentence Segmenter
// ============================================================
// Reference Segmenter: recursive separator splitting.
//
// Algorithm (for one level, separator s = seps[0]):
//   1. Strip surrounding whitespace.
//   2. If the text is no longer than max_len characters,
//      it is one sentence.
//   3. Otherwise split on s and rebuild chunks greedily: a
//      chunk is flushed (and re-split on seps[1..]) as soon as
//      adding the next piece would reach max_len. Each piece
//      keeps its trailing separator.
//
// With the default max_len = 1 every separator ends a sentence:
//   "原告诉称，被告欠款。\n本院认为：" →
//   ["原告诉称，", "被告欠款。", "本院认为："]
//
// Only the last `max_sentences` sentences are kept.

use anyhow::Result;

use crate::domain::traits::Segmenter;

/// Default sentence separators, tried in order
pub const DEFAULT_SEPARATORS: &str = "\n。；：，";

/// Default cap on sentences kept per document
pub const DEFAULT_MAX_SENTENCES: usize = 256;

#[derive(Debug, Clone)]
pub struct SeparatorSegmenter {
    separators:    Vec<char>,
    max_len:       usize,
    max_sentences: Option<usize>,
}

impl SeparatorSegmenter {
    pub fn new(separators: &str, max_len: usize, max_sentences: Option<usize>) -> Self {
        Self {
            separators: separators.chars().collect(),
            max_len,
            max_sentences,
        }
    }
}

impl Default for SeparatorSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATORS, 1, Some(DEFAULT_MAX_SENTENCES))
    }
}

impl Segmenter for SeparatorSegmenter {
    fn split(&self, text: &str) -> Result<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut sentences = segment(text, self.max_len, &self.separators);
        sentences.retain(|s| !s.is_empty());

        if let Some(cap) = self.max_sentences {
            if sentences.len() > cap {
                let drop = sentences.len() - cap;
                sentences.drain(..drop);
            }
        }
        Ok(sentences)
    }
}

fn segment(text: &str, max_len: usize, seps: &[char]) -> Vec<String> {
    let text = text.trim();

    let Some((&sep, rest)) = seps.split_first() else {
        return vec![text.to_string()];
    };
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let pieces: Vec<&str> = text.split(sep).collect();
    let last = pieces.len() - 1;

    let mut out   = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0usize;

    for (i, piece) in pieces.iter().enumerate() {
        let piece_len = piece.chars().count();
        if chunk_len > 0 && piece_len > 0 && chunk_len + piece_len + 1 > max_len {
            out.extend(segment(&chunk, max_len, rest));
            chunk.clear();
            chunk_len = 0;
        }
        chunk.push_str(piece);
        chunk_len += piece_len;
        if i != last {
            chunk.push(sep);
            chunk_len += 1;
        }
    }
    if !chunk.is_empty() {
        out.extend(segment(&chunk, max_len, rest));
    }
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_separator_ends_a_sentence() {
        let s = SeparatorSegmenter::default();
        let out = s.split("原告诉称，被告欠款。\n本院认为：应予支持").unwrap();
        assert_eq!(out, vec!["原告诉称，", "被告欠款。", "本院认为：", "应予支持"]);
    }

    #[test]
    fn test_newlines_are_stripped() {
        let s = SeparatorSegmenter::default();
        let out = s.split("第一句。\n\n第二句。\n").unwrap();
        assert_eq!(out, vec!["第一句。", "第二句。"]);
    }

    #[test]
    fn test_order_follows_text() {
        let s = SeparatorSegmenter::default();
        let out = s.split("c；b；a").unwrap();
        assert_eq!(out, vec!["c；", "b；", "a"]);
    }

    #[test]
    fn test_keeps_last_sentences_only() {
        let s = SeparatorSegmenter::new(DEFAULT_SEPARATORS, 1, Some(2));
        let out = s.split("一。二。三。").unwrap();
        assert_eq!(out, vec!["二。", "三。"]);
    }

    #[test]
    fn test_larger_max_len_groups_pieces() {
        let s = SeparatorSegmenter::new("。", 6, None);
        let out = s.split("甲乙。丙丁。戊己。").unwrap();
        assert_eq!(out, vec!["甲乙。丙丁。", "戊己。"]);
    }

    #[test]
    fn test_blank_text_has_no_sentences() {
        let s = SeparatorSegmenter::default();
        assert!(s.split("  \n ").unwrap().is_empty());
    }
}

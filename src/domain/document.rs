// ============================================================
// Layer 3 - Document Domain Type
// ============================================================
// A single source document handed to the summarizer.
// Plain data: where it came from and its raw text.
//
// The text is newline- and punctuation-delimited internally;
// splitting it into sentences is the Segmenter's job.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A raw document to summarize.
/// Immutable once created; the pipeline only borrows its text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// File name, record id, or "<stdin>"
    pub source: String,

    /// Full text before segmentation
    pub text: String,
}

impl Document {
    /// Create a new Document with a source label and text content.
    ///
    /// Example:
    ///   let doc = Document::new("judgment.docx", "原告诉称……");
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text:   text.into(),
        }
    }

    /// True when the text holds nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_document() {
        assert!(Document::new("a", " \n\t").is_blank());
        assert!(!Document::new("a", "本院认为。").is_blank());
    }
}

// ============================================================
// Layer 3 - LabeledExample Domain Type
// ============================================================
// One labelled record of the evaluation dataset:
//   - the source document as an ordered list of sentences
//   - the indices of sentences marked as salient (may be empty)
//   - the gold (reference) summary written by a human
//
// Example:
//   sentences: ["原告张某诉称，", "被告未按期还款。", "本院认为，"]
//   labels:    [1]
//   summary:   "被告未按期还款，应予偿还。"

use serde::{Deserialize, Serialize};

/// A labelled summarization example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    /// Record id when the dataset carries one
    pub id: Option<String>,

    /// Source sentences in original document order
    pub sentences: Vec<String>,

    /// Indices into `sentences` of the extractive labels
    pub labels: Vec<usize>,

    /// Gold summary used as the metric reference
    pub summary: String,
}

impl LabeledExample {
    pub fn new(
        id:        Option<String>,
        sentences: Vec<String>,
        labels:    Vec<usize>,
        summary:   impl Into<String>,
    ) -> Self {
        Self {
            id,
            sentences,
            labels,
            summary: summary.into(),
        }
    }

    /// Source text as seen by the evaluation harness:
    /// sentences joined by a single line break.
    pub fn source_text(&self) -> String {
        self.sentences.join("\n")
    }

    /// Source text as fed to batch prediction:
    /// every sentence followed by a line break.
    pub fn batch_text(&self) -> String {
        let mut text = String::new();
        for sentence in &self.sentences {
            text.push_str(sentence);
            text.push('\n');
        }
        text
    }
}

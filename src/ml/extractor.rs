// ============================================================
// Layer 5 - Extractor
// ============================================================
// First stage of the summarizer: keep the sentences whose
// relevance score is strictly above the threshold, in their
// original order, and concatenate them as they are.
//
//   sentences: ["甲。", "乙。", "丙。"]
//   scores:    [0.9,    0.1,    0.8  ]   threshold 0.5
//   draft:     "甲。丙。"
//
// No sentence above the threshold gives an empty draft; that is
// a normal outcome and is passed on to the Generator unchanged.

use crate::domain::error::PipelineError;

/// Threshold-based sentence selector.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    threshold: f32,
}

impl Extractor {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Ascending indices of the scores strictly above the threshold
    pub fn selected_indices(&self, scores: &[f32]) -> Vec<usize> {
        scores
            .iter()
            .enumerate()
            .filter(|(_, &s)| s > self.threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Build the extracted draft.
    ///
    /// Fails only when the two sequences are not aligned.
    pub fn extract(&self, sentences: &[String], scores: &[f32]) -> Result<String, PipelineError> {
        if sentences.len() != scores.len() {
            return Err(PipelineError::Scoring(anyhow::anyhow!(
                "{} scores for {} sentences",
                scores.len(),
                sentences.len()
            )));
        }

        let draft: String = self
            .selected_indices(scores)
            .into_iter()
            .map(|i| sentences[i].as_str())
            .collect();

        Ok(draft)
    }
}

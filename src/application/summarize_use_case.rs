// ============================================================
// Layer 2 - Summarize Use Case (predict)
// ============================================================
// Runs one document through both stages:
//
//   Step 1: Segment the text into sentences     (Segmenter)
//   Step 2: Encode every sentence               (Encoder)
//   Step 3: Score every sentence                (RelevanceScorer)
//   Step 4: Keep sentences above the threshold  (Extractor)
//   Step 5: Rewrite the draft with top-k decode (Generator)
//
// Every collaborator failure aborts the call with the
// PipelineError variant naming its stage. Lengths and ranges
// returned by collaborators are checked, never repaired:
//   - zero sentences for non-blank text       → Segmentation
//   - vector count or dimension mismatch      → Encoding
//   - score count mismatch, NaN, outside [0,1] → Scoring
//   - topk == 0 or generator failure          → Generation
//
// An empty draft is handed to the Generator as is.
//
// Reference: Rust Book §17 (Trait Objects)

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::data::segmenter::{SeparatorSegmenter, DEFAULT_MAX_SENTENCES, DEFAULT_SEPARATORS};
use crate::domain::document::Document;
use crate::domain::error::PipelineError;
use crate::domain::traits::{Encoder, Generator, RelevanceScorer, Segmenter};
use crate::infra::checkpoint::ModelStore;
use crate::ml::{
    encoder::{HashingEncoder, DEFAULT_DIM},
    extractor::Extractor,
    generator::{DecodingPolicy, TopKDecoder, DEFAULT_MAX_OUTPUT_CHARS},
    scorer::{CentroidScorer, LinearScorer},
};

// ─── Pipeline Configuration ──────────────────────────────────────────────────
// Read-only for the lifetime of a pipeline. Loaded from
// pipeline_config.json when the model directory has one;
// CLI flags override individual fields.

/// Which RelevanceScorer the pipeline is built with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerKind {
    #[default]
    Centroid,
    Linear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sentences scoring strictly above this are extracted
    pub threshold:        f32,
    /// topk used when the caller gives none
    pub default_topk:     usize,
    pub separators:       String,
    pub max_sentences:    usize,
    pub encoder_dim:      usize,
    pub scorer:           ScorerKind,
    pub decoding:         DecodingPolicy,
    pub max_output_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold:        0.2,
            default_topk:     3,
            separators:       DEFAULT_SEPARATORS.to_string(),
            max_sentences:    DEFAULT_MAX_SENTENCES,
            encoder_dim:      DEFAULT_DIM,
            scorer:           ScorerKind::Centroid,
            decoding:         DecodingPolicy::Greedy,
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
        }
    }
}

/// Intermediate result of stages 1-4, kept for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub sentences: Vec<String>,
    pub scores:    Vec<f32>,
    pub selected:  Vec<usize>,
    pub draft:     String,
}

// ─── SummarizePipeline ───────────────────────────────────────────────────────

pub struct SummarizePipeline {
    segmenter:    Box<dyn Segmenter>,
    encoder:      Box<dyn Encoder>,
    scorer:       Box<dyn RelevanceScorer>,
    generator:    Box<dyn Generator>,
    extractor:    Extractor,
    default_topk: usize,
}

impl SummarizePipeline {
    pub fn new(
        threshold:    f32,
        default_topk: usize,
        segmenter:    Box<dyn Segmenter>,
        encoder:      Box<dyn Encoder>,
        scorer:       Box<dyn RelevanceScorer>,
        generator:    Box<dyn Generator>,
    ) -> Self {
        Self {
            segmenter,
            encoder,
            scorer,
            generator,
            extractor: Extractor::new(threshold),
            default_topk,
        }
    }

    /// Build the pipeline with the reference collaborators.
    /// `store` is only read when the linear scorer is selected.
    pub fn from_config(cfg: &PipelineConfig, store: &ModelStore) -> Result<Self> {
        let encoder = HashingEncoder::new(cfg.encoder_dim)?;
        let scorer: Box<dyn RelevanceScorer> = match cfg.scorer {
            ScorerKind::Centroid => Box::new(CentroidScorer),
            ScorerKind::Linear   => Box::new(LinearScorer::from_store(store, cfg.encoder_dim)?),
        };

        tracing::info!(
            "Pipeline ready: threshold={}, topk={}, scorer={:?}, decoding={:?}",
            cfg.threshold,
            cfg.default_topk,
            cfg.scorer,
            cfg.decoding,
        );

        Ok(Self::new(
            cfg.threshold,
            cfg.default_topk,
            Box::new(SeparatorSegmenter::new(&cfg.separators, 1, Some(cfg.max_sentences))),
            Box::new(encoder),
            scorer,
            Box::new(TopKDecoder::new(cfg.decoding, cfg.max_output_chars)),
        ))
    }

    pub fn default_topk(&self) -> usize {
        self.default_topk
    }

    /// Stages 1-4: segment, encode, score, extract.
    pub fn extract(&self, text: &str) -> Result<Extraction, PipelineError> {
        // ── Step 1: Segment ──────────────────────────────────────────────────
        let sentences = self.segmenter.split(text).map_err(PipelineError::Segmentation)?;
        if sentences.is_empty() && !text.trim().is_empty() {
            return Err(PipelineError::Segmentation(anyhow!(
                "no sentences produced for {} chars of text",
                text.chars().count()
            )));
        }

        // ── Step 2: Encode ───────────────────────────────────────────────────
        let vectors = self.encoder.encode(&sentences).map_err(PipelineError::Encoding)?;
        if vectors.len() != sentences.len() {
            return Err(PipelineError::Encoding(anyhow!(
                "{} vectors for {} sentences",
                vectors.len(),
                sentences.len()
            )));
        }
        let dim = self.encoder.dim();
        if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
            return Err(PipelineError::Encoding(anyhow!(
                "vector {} has dimension {}, expected {}",
                i,
                v.len(),
                dim
            )));
        }

        // ── Step 3: Score ────────────────────────────────────────────────────
        let scores = self.scorer.score(&vectors).map_err(PipelineError::Scoring)?;
        if scores.len() != sentences.len() {
            return Err(PipelineError::Scoring(anyhow!(
                "{} scores for {} sentences",
                scores.len(),
                sentences.len()
            )));
        }
        if let Some((i, s)) = scores.iter().enumerate().find(|(_, s)| !(0.0..=1.0).contains(*s)) {
            return Err(PipelineError::Scoring(anyhow!(
                "score {} of sentence {} is outside [0, 1]",
                s,
                i
            )));
        }

        // ── Step 4: Extract ──────────────────────────────────────────────────
        let selected = self.extractor.selected_indices(&scores);
        let draft = self.extractor.extract(&sentences, &scores)?;
        if draft.is_empty() {
            tracing::debug!(
                "No sentence above threshold {} ({} sentences)",
                self.extractor.threshold(),
                sentences.len()
            );
        } else {
            tracing::debug!(
                "Extracted {}/{} sentences ({} chars)",
                selected.len(),
                sentences.len(),
                draft.chars().count()
            );
        }

        Ok(Extraction { sentences, scores, selected, draft })
    }

    /// Full two-stage summary of `text` with breadth `topk`.
    pub fn predict(&self, text: &str, topk: usize) -> Result<String, PipelineError> {
        let extraction = self.extract(text)?;

        // ── Step 5: Generate ─────────────────────────────────────────────────
        if topk == 0 {
            return Err(PipelineError::Generation(anyhow!("topk must be at least 1")));
        }
        self.generator
            .generate(&extraction.draft, topk)
            .map_err(PipelineError::Generation)
    }

    /// `predict` with the configured default topk.
    pub fn predict_default(&self, text: &str) -> Result<String, PipelineError> {
        self.predict(text, self.default_topk)
    }

    pub fn summarize(&self, doc: &Document, topk: usize) -> Result<String, PipelineError> {
        tracing::info!("Summarizing '{}'", doc.source);
        self.predict(&doc.text, topk)
    }
}


// ─── Unit Tests ──────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::stubs::*;
    use super::*;

    #[test]
    fn test_end_to_end_three_sentences() {
        let p = pipeline(
            0.5,
            Box::new(FixedScorer(vec![0.9, 0.1, 0.8])),
            Box::new(TopKDecoder::greedy()),
        );
        let text = "被告应还款。|原告称：|本院支持。";

        let extraction = p.extract(text).unwrap();
        assert_eq!(extraction.selected, vec![0, 2]);
        assert_eq!(extraction.draft, "被告应还款。本院支持。");

        let first = p.predict(text, 1).unwrap();
        for _ in 0..3 {
            assert_eq!(p.predict(text, 1).unwrap(), first);
        }
    }

    #[test]
    fn test_selection_preserves_document_order() {
        let p = pipeline(0.5, Box::new(FixedScorer(vec![0.6, 0.99, 0.7])), Box::new(EchoGenerator));
        assert_eq!(p.predict("c|a|b", 1).unwrap(), "cab");
    }

    #[test]
    fn test_empty_draft_reaches_generator() {
        let p = pipeline(0.5, Box::new(FixedScorer(vec![0.1, 0.2])), Box::new(TopKDecoder::greedy()));
        assert_eq!(p.predict("a|b", 3).unwrap(), "");
    }

    #[test]
    fn test_generator_may_reject_empty_draft() {
        let p = pipeline(0.5, Box::new(FixedScorer(vec![0.1])), Box::new(StrictGenerator));
        let err = p.predict("a", 1).unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
    }

    #[test]
    fn test_segmenter_failure_propagates() {
        let p = SummarizePipeline::new(
            0.5, 3,
            Box::new(FailingSegmenter),
            Box::new(LenEncoder),
            Box::new(FixedScorer(vec![])),
            Box::new(EchoGenerator),
        );
        assert!(matches!(p.predict("text", 1), Err(PipelineError::Segmentation(_))));
    }

    #[test]
    fn test_no_sentences_for_nonblank_text() {
        let p = SummarizePipeline::new(
            0.5, 3,
            Box::new(NothingSegmenter),
            Box::new(LenEncoder),
            Box::new(FixedScorer(vec![])),
            Box::new(EchoGenerator),
        );
        assert!(matches!(p.predict("text", 1), Err(PipelineError::Segmentation(_))));
        assert_eq!(p.predict("   ", 1).unwrap(), "");
    }

    #[test]
    fn test_encoder_length_mismatch() {
        let p = SummarizePipeline::new(
            0.5, 3,
            Box::new(PipeSegmenter),
            Box::new(ShortEncoder),
            Box::new(FixedScorer(vec![0.9])),
            Box::new(EchoGenerator),
        );
        assert!(matches!(p.predict("a|b", 1), Err(PipelineError::Encoding(_))));
    }

    #[test]
    fn test_encoder_dimension_mismatch() {
        let p = SummarizePipeline::new(
            0.5, 3,
            Box::new(PipeSegmenter),
            Box::new(WrongDimEncoder),
            Box::new(FixedScorer(vec![0.9])),
            Box::new(EchoGenerator),
        );
        assert!(matches!(p.predict("a", 1), Err(PipelineError::Encoding(_))));
    }

    #[test]
    fn test_scorer_length_mismatch() {
        let p = pipeline(0.5, Box::new(FixedScorer(vec![0.9])), Box::new(EchoGenerator));
        assert!(matches!(p.predict("a|b", 1), Err(PipelineError::Scoring(_))));
    }

    #[test]
    fn test_out_of_range_scores_not_clamped() {
        for bad in [1.5, -0.1, f32::NAN] {
            let p = pipeline(0.5, Box::new(FixedScorer(vec![0.9, bad])), Box::new(EchoGenerator));
            assert!(matches!(p.predict("a|b", 1), Err(PipelineError::Scoring(_))), "{bad}");
        }
    }

    #[test]
    fn test_zero_topk_is_a_generation_error() {
        let p = pipeline(0.5, Box::new(FixedScorer(vec![0.9])), Box::new(EchoGenerator));
        assert!(matches!(p.predict("a", 0), Err(PipelineError::Generation(_))));
    }

    #[test]
    fn test_reference_pipeline_from_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig { threshold: 0.0, ..PipelineConfig::default() };
        let p = SummarizePipeline::from_config(&cfg, &ModelStore::new(dir.path())).unwrap();
        assert_eq!(p.default_topk(), 3);

        let doc = Document::new("t", "原告诉称，被告借款未还。\n本院认为，被告应当偿还借款。");
        let summary = p.summarize(&doc, 1).unwrap();
        assert!(!summary.is_empty());
        assert!(summary.chars().all(|c| doc.text.contains(c)));
    }

    #[test]
    fn test_default_config_extracts_a_strict_subset() {
        let dir = tempfile::tempdir().unwrap();
        let p = SummarizePipeline::from_config(&PipelineConfig::default(), &ModelStore::new(dir.path()))
            .unwrap();

        let extraction = p
            .extract("原告诉称，被告借款未还。\n本院认为，被告应当偿还借款本金及利息。")
            .unwrap();
        assert_eq!(extraction.sentences.len(), 4);
        assert!(!extraction.selected.is_empty());
        assert!(extraction.selected.len() < extraction.sentences.len());
    }

    #[test]
    fn test_linear_scorer_needs_weights() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PipelineConfig { scorer: ScorerKind::Linear, ..PipelineConfig::default() };
        assert!(SummarizePipeline::from_config(&cfg, &ModelStore::new(dir.path())).is_err());
    }
}

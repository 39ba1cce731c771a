// ============================================================
// Layer 3 - Core Traits (Collaborator Contracts)
// ============================================================
// Every external collaborator of the summarizer is reached
// through one of these traits, each with a single operation:
//
//   Segmenter        split           text      -> sentences
//   Encoder          encode          sentences -> vectors
//   RelevanceScorer  score           vectors   -> scores in [0,1]
//   Generator        generate        draft, k  -> summary
//   MetricScorer     compute_metrics candidate, reference -> metrics
//
// The application layer only sees these traits, so tests run
// the whole pipeline against deterministic stubs and the CLI
// plugs in the reference implementations from `data` and `ml`.
//
// All collaborators are Send + Sync so the evaluation harness
// may share them across rayon worker threads.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Trait Objects)

use anyhow::Result;

use crate::domain::document::Document;
use crate::infra::metrics::MetricsRecord;

// ─── DocumentSource ───────────────────────────────────────────────────────────
/// Any component that can produce the document to summarize.
///
/// Implementations:
///   - FileDocumentSource → .docx or plain-text file
pub trait DocumentSource {
    fn load(&self) -> Result<Document>;
}

// ─── Segmenter ────────────────────────────────────────────────────────────────
/// Splits raw document text into an ordered sequence of sentences.
/// Output order must follow the order of the text.
pub trait Segmenter: Send + Sync {
    fn split(&self, text: &str) -> Result<Vec<String>>;
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
/// Maps every sentence to a vector of exactly `dim()` values.
/// Output length must equal input length.
pub trait Encoder: Send + Sync {
    /// Dimension of every produced vector
    fn dim(&self) -> usize;

    fn encode(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>>;
}

// ─── RelevanceScorer ──────────────────────────────────────────────────────────
/// Maps the sentence vectors of one document to per-sentence
/// relevance probabilities in [0,1], positionally aligned.
pub trait RelevanceScorer: Send + Sync {
    fn score(&self, vectors: &[Vec<f32>]) -> Result<Vec<f32>>;
}

// ─── Generator ────────────────────────────────────────────────────────────────
/// Opaque autoregressive decoder.
///
/// At each step the candidate set is restricted to the `topk`
/// best next tokens; which one is taken is the generator's own
/// decoding policy. Decoding stops on an end marker or an
/// internal length bound. `draft` may be empty.
pub trait Generator: Send + Sync {
    fn generate(&self, draft: &str, topk: usize) -> Result<String>;
}

// ─── MetricScorer ─────────────────────────────────────────────────────────────
/// Compares a produced summary against a gold reference.
pub trait MetricScorer: Send + Sync {
    /// The fixed set of metric names every record is reported under
    fn metric_keys(&self) -> &[&'static str];

    fn compute_metrics(&self, candidate: &str, reference: &str) -> Result<MetricsRecord>;
}

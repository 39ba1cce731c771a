// ============================================================
// Layer 5 - ML Layer
// ============================================================
// The two summarization stages and the reference models that
// stand in for the external collaborators:
//
//   extractor.rs - threshold selection of salient sentences
//                  (stage 1, part of the core)
//   encoder.rs   - HashingEncoder: sentence → fixed-size vector
//   model.rs     - RelevanceHead: burn module, linear + sigmoid
//   scorer.rs    - CentroidScorer / LinearScorer
//   generator.rs - TopKDecoder: top-k constrained decoding
//                  (stage 2)
//
// Only model.rs and scorer.rs import burn.
//
// Reference: Burn Book §3 (Building Blocks)

/// Threshold-based, order-preserving sentence selection
pub mod extractor;

/// Hashed character n-gram sentence vectors
pub mod encoder;

/// Relevance head architecture (burn)
pub mod model;

/// Relevance scorers
pub mod scorer;

/// Top-k autoregressive decoder
pub mod generator;

// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what the
// summarizer works with:
//
//   document.rs  - a raw document to summarize
//   example.rs   - a labelled example of the evaluation dataset
//   error.rs     - typed pipeline / evaluation failures
//   traits.rs    - collaborator contracts (segment, encode,
//                  score, generate, compute metrics)
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A raw document to summarize
pub mod document;

// A labelled summarization example
pub mod example;

// PipelineError / EvaluationError
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;

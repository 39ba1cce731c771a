// ============================================================
// Layer 4 - Data Layer
// ============================================================
// Everything between files on disk and the pipeline's input:
//
//   document file ─▶ FileDocumentSource ─▶ Preprocessor ─▶ text
//   text          ─▶ SeparatorSegmenter ─▶ sentences
//
//   dataset.jsonl ─▶ load_examples ─▶ Vec<LabeledExample>
//                 ─▶ split_folds   ─▶ held-out fold
//
// Reference: Rust Book §13 (Iterators and Closures)

/// JSON-lines dataset loader and .docx / text document source
pub mod loader;

/// Cleans and normalises raw document text
pub mod preprocessor;

/// Splits text into ordered sentences
pub mod segmenter;

/// Deterministic k-fold partitioning
pub mod folds;

// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Wires the collaborators together into the two workflows:
//
//   summarize_use_case.rs - predict(text, topk): extract, then
//                           rewrite the draft (SummarizePipeline)
//   evaluate_use_case.rs  - k-fold evaluation: predict every
//                           held-out example and average metrics
//
// Rules for this layer:
//   - No model math here (Layer 5)
//   - No printing here (Layer 1)
//   - Only workflow coordination and result validation
//
// Reference: Rust Book §7 (Module System)

// Two-stage summarization pipeline
pub mod summarize_use_case;

// Held-out fold evaluation harness
pub mod evaluate_use_case;

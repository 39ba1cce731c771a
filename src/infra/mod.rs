// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Concerns shared by several layers:
//
//   checkpoint.rs - ModelStore: pipeline_config.json and the
//                   relevance head weights (Burn CompactRecorder)
//
//   metrics.rs    - MetricsRecord, the ROUGE MetricScorer and
//                   the CSV report logger for evaluation runs
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model directory persistence
pub mod checkpoint;

/// Metric records, ROUGE scoring and report CSV
pub mod metrics;

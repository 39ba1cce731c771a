// ============================================================
// Layer 3 - Error Taxonomy
// ============================================================
// Typed failures of the summarization pipeline and of the
// evaluation harness. Collaborators report failures through
// anyhow; the pipeline wraps them in the variant naming the
// stage that failed, keeping the original error as the source.
//
// An empty extracted draft is NOT an error and has no variant.

use thiserror::Error;

/// Failure of a single `predict` call.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("segmentation failed: {0}")]
    Segmentation(#[source] anyhow::Error),

    #[error("encoding failed: {0}")]
    Encoding(#[source] anyhow::Error),

    #[error("scoring failed: {0}")]
    Scoring(#[source] anyhow::Error),

    #[error("generation failed: {0}")]
    Generation(#[source] anyhow::Error),
}

/// A held-out fold index outside [0, num_folds).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("fold {fold} is outside [0, {num_folds})")]
pub struct FoldAssignmentError {
    pub fold:      usize,
    pub num_folds: usize,
}

/// Failure of an evaluation run.
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error(transparent)]
    FoldAssignment(#[from] FoldAssignmentError),

    #[error("example at position {position} failed: {source}")]
    Example {
        position: usize,
        #[source]
        source:   PipelineError,
    },

    #[error("metric computation failed for example at position {position}: {source}")]
    Metrics {
        position: usize,
        #[source]
        source:   anyhow::Error,
    },

    #[error("no held-out example was evaluated ({failed} failed)")]
    NothingEvaluated { failed: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_is_named_in_message() {
        let e = PipelineError::Encoding(anyhow::anyhow!("3 vectors for 4 sentences"));
        assert_eq!(e.to_string(), "encoding failed: 3 vectors for 4 sentences");
    }

    #[test]
    fn test_fold_error_converts_without_position() {
        let e: EvaluationError = FoldAssignmentError { fold: 15, num_folds: 15 }.into();
        assert_eq!(e.to_string(), "fold 15 is outside [0, 15)");
    }
}

// ============================================================
// Layer 4 - K-Fold Splitter
// ============================================================
// Deterministic k-fold partitioning of a labelled dataset.
//
// The example at position i belongs to fold (i mod num_folds).
// For a chosen fold index:
//   - Valid: the examples of that fold (held out)
//   - Train: the examples of every other fold
//
// Assignment depends only on position, so the same dataset
// file always yields the same held-out set. Every example lands
// in exactly one fold.
//
// Example with num_folds = 3:
//   positions: 0 1 2 3 4 5 6
//   folds:     0 1 2 0 1 2 0
//   fold 0 valid = {0, 3, 6}, train = {1, 2, 4, 5}
//
// Reference: Rust Book §13 (Iterators)

use serde::{Deserialize, Serialize};

use crate::domain::error::FoldAssignmentError;

/// Which side of the split to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldMode {
    /// Every fold except the chosen one
    Train,
    /// Only the chosen (held-out) fold
    Valid,
}

/// Fold that the example at `position` belongs to.
pub fn fold_of(position: usize, num_folds: usize) -> usize {
    position % num_folds
}

/// Reject a fold index outside [0, num_folds).
pub fn check_fold(fold: usize, num_folds: usize) -> Result<(), FoldAssignmentError> {
    if num_folds == 0 || fold >= num_folds {
        return Err(FoldAssignmentError { fold, num_folds });
    }
    Ok(())
}

/// Select one side of the k-fold split.
///
/// Returns `(position, item)` pairs in dataset order so callers
/// can report failures by their original position.
///
/// # Example
/// ```ignore
/// let held_out = split_folds(&examples, 0, 15, FoldMode::Valid)?;
/// ```
pub fn split_folds<T>(
    items:     &[T],
    fold:      usize,
    num_folds: usize,
    mode:      FoldMode,
) -> Result<Vec<(usize, &T)>, FoldAssignmentError> {
    check_fold(fold, num_folds)?;

    let selected: Vec<(usize, &T)> = items
        .iter()
        .enumerate()
        .filter(|(i, _)| match mode {
            FoldMode::Valid => fold_of(*i, num_folds) == fold,
            FoldMode::Train => fold_of(*i, num_folds) != fold,
        })
        .collect();

    tracing::debug!(
        "Fold {}/{} ({:?}): {} of {} examples",
        fold,
        num_folds,
        mode,
        selected.len(),
        items.len(),
    );

    Ok(selected)
}

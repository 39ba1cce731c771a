// ============================================================
// Layer 5 - Relevance Scorers
// ============================================================
// Two reference RelevanceScorer implementations:
//
//   CentroidScorer - no weights; a sentence's cosine similarity
//                    to the document centroid (floored at 0),
//                    min-max rescaled within the document so the
//                    least central sentence scores 0 and the most
//                    central 1. Default for the CLI.
//
//                    Raw cosines of one judgment sit close together
//                    (typically 0.5-0.7), so any fixed threshold
//                    would keep all or nothing. After rescaling,
//                    threshold t drops the sentences in the bottom
//                    t of the document's centrality range.
//
//   LinearScorer   - a RelevanceHead (linear + sigmoid) run on
//                    the NdArray CPU backend with weights loaded
//                    from the model directory.
//
// Both return one score in [0,1] per input vector.

use anyhow::{anyhow, ensure, Result};
use burn::prelude::*;
use burn::tensor::TensorData;
use std::sync::Mutex;

use crate::domain::traits::RelevanceScorer;
use crate::infra::checkpoint::ModelStore;
use crate::ml::model::{RelevanceHead, RelevanceHeadConfig};

pub type ScoreBackend = burn::backend::NdArray;

// ─── CentroidScorer ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct CentroidScorer;

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

/// Min-max rescale into [0,1]. Scores that are all equal stay
/// as they are.
fn rescale(mut scores: Vec<f32>) -> Vec<f32> {
    let lo = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let hi = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = hi - lo;
    if span > f32::EPSILON {
        scores.iter_mut().for_each(|s| *s = (*s - lo) / span);
    }
    scores
}

impl RelevanceScorer for CentroidScorer {
    fn score(&self, vectors: &[Vec<f32>]) -> Result<Vec<f32>> {
        let Some(first) = vectors.first() else {
            return Ok(Vec::new());
        };

        let dim = first.len();
        let mut centroid = vec![0.0f32; dim];
        for v in vectors {
            ensure!(v.len() == dim, "vector of length {} in a batch of length {}", v.len(), dim);
            centroid.iter_mut().zip(v).for_each(|(c, x)| *c += x);
        }
        let n = vectors.len() as f32;
        centroid.iter_mut().for_each(|c| *c /= n);

        let raw: Vec<f32> = vectors
            .iter()
            .map(|v| cosine(v, &centroid).clamp(0.0, 1.0))
            .collect();
        Ok(rescale(raw))
    }
}

// ─── LinearScorer ─────────────────────────────────────────────────────────────

pub struct LinearScorer {
    model:     Mutex<RelevanceHead<ScoreBackend>>,
    input_dim: usize,
    device:    <ScoreBackend as Backend>::Device,
}

impl LinearScorer {
    pub fn new(model: RelevanceHead<ScoreBackend>, input_dim: usize) -> Self {
        Self {
            model: Mutex::new(model),
            input_dim,
            device: Default::default(),
        }
    }

    /// Build the head and load its weights from `store`.
    pub fn from_store(store: &ModelStore, input_dim: usize) -> Result<Self> {
        let device = Default::default();
        let model = RelevanceHeadConfig::new(input_dim).init::<ScoreBackend>(&device);
        let model = store.load_relevance_head(model, &device)?;
        Ok(Self::new(model, input_dim))
    }
}

impl RelevanceScorer for LinearScorer {
    fn score(&self, vectors: &[Vec<f32>]) -> Result<Vec<f32>> {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }
        for v in vectors {
            ensure!(
                v.len() == self.input_dim,
                "vector of length {} for a head of input dimension {}",
                v.len(),
                self.input_dim
            );
        }

        let n = vectors.len();
        let flat: Vec<f32> = vectors.iter().flatten().copied().collect();
        let input = Tensor::<ScoreBackend, 2>::from_data(
            TensorData::new(flat, [n, self.input_dim]),
            &self.device,
        );

        let model = self.model.lock().map_err(|_| anyhow!("relevance head lock poisoned"))?;
        let probs = model.forward(input);

        probs
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("cannot read relevance scores: {e:?}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid_scores_in_range_and_aligned() {
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0], vec![0.0, 0.0]];
        let scores = CentroidScorer.score(&vectors).unwrap();
        assert_eq!(scores.len(), 4);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
        // the diagonal vector points at the centroid
        assert!(scores[2] > scores[0]);
        assert_eq!(scores[3], 0.0);
    }

    #[test]
    fn test_centroid_spreads_scores_over_unit_range() {
        let vectors = vec![vec![1.0, 0.2, 0.0], vec![0.9, 0.3, 0.1], vec![0.2, 1.0, 0.4]];
        let scores = CentroidScorer.score(&vectors).unwrap();
        let lo = scores.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(lo.abs() < 1e-6);
        assert!((hi - 1.0).abs() < 1e-6);
        // the outlier is the least central
        assert!(scores[2] < scores[0] && scores[2] < scores[1]);
    }

    #[test]
    fn test_centroid_single_sentence_is_fully_relevant() {
        let scores = CentroidScorer.score(&[vec![0.3, 0.4]]).unwrap();
        assert!((scores[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_centroid_rejects_ragged_batch() {
        assert!(CentroidScorer.score(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_centroid_empty() {
        assert!(CentroidScorer.score(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_linear_scores_are_probabilities() {
        let device = Default::default();
        let model = RelevanceHeadConfig::new(4).init::<ScoreBackend>(&device);
        let scorer = LinearScorer::new(model, 4);

        let vectors = vec![vec![0.5, -1.0, 2.0, 0.0], vec![0.0; 4], vec![3.0, 3.0, -3.0, 1.0]];
        let scores = scorer.score(&vectors).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn test_linear_rejects_wrong_dimension() {
        let device = Default::default();
        let model = RelevanceHeadConfig::new(4).init::<ScoreBackend>(&device);
        let scorer = LinearScorer::new(model, 4);
        assert!(scorer.score(&[vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_linear_weights_survive_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let device = Default::default();
        let model = RelevanceHeadConfig::new(4).init::<ScoreBackend>(&device);
        store.save_relevance_head(&model).unwrap();

        let vectors = vec![vec![1.0, 0.5, -0.5, 2.0]];
        let before = LinearScorer::new(model, 4).score(&vectors).unwrap();
        let after = LinearScorer::from_store(&store, 4).unwrap().score(&vectors).unwrap();
        // CompactRecorder stores half precision
        assert!((before[0] - after[0]).abs() < 1e-2);
    }
}

// ============================================================
// Layer 5 - Hashing Encoder
// ============================================================
// Reference Encoder: character unigram + bigram counts hashed
// into a fixed number of buckets, then L2-normalised.
//
//   "借款合同" → {借, 款, 合, 同, 借款, 款合, 合同} → dim buckets
//
// FxHasher has no random seed, so a sentence maps to the same
// vector in every run. An empty sentence is the zero vector.

use anyhow::{ensure, Result};
use rustc_hash::FxHasher;
use std::hash::Hasher;

use crate::domain::traits::Encoder;

pub const DEFAULT_DIM: usize = 256;

#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dim: usize,
}

impl HashingEncoder {
    pub fn new(dim: usize) -> Result<Self> {
        ensure!(dim > 0, "encoder dimension must be positive");
        Ok(Self { dim })
    }

    fn bucket(&self, feature: &str) -> usize {
        let mut h = FxHasher::default();
        h.write(feature.as_bytes());
        (h.finish() % self.dim as u64) as usize
    }

    fn encode_one(&self, sentence: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        let chars: Vec<char> = sentence.chars().filter(|c| !c.is_whitespace()).collect();

        let mut buf = [0u8; 8];
        for c in &chars {
            v[self.bucket(c.encode_utf8(&mut buf))] += 1.0;
        }
        for pair in chars.windows(2) {
            let bigram: String = pair.iter().collect();
            v[self.bucket(&bigram)] += 1.0;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

impl Default for HashingEncoder {
    fn default() -> Self {
        Self { dim: DEFAULT_DIM }
    }
}

impl Encoder for HashingEncoder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn encode(&self, sentences: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(sentences.iter().map(|s| self.encode_one(s)).collect())
    }
}

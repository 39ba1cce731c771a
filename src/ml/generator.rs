// ============================================================
// Layer 5 - Top-k Decoder
// ============================================================
// Reference Generator. It decodes character by character from
// a successor table built over the draft itself:
//
//   draft "被告还款，被告违约"
//   <bos> → 被 (1)
//   被    → 告 (2)
//   告    → 还 (1), 违 (1)
//   ...
//   约    → <eos> (1)
//
// Each step:
//   1. rank the successors of the current token by count
//      (ties: earlier first occurrence in the draft; <eos> last)
//   2. keep only the top-k (top_k_candidates)
//   3. pick one according to the DecodingPolicy
//   4. stop on <eos> or after max_output_chars characters
//
// Greedy decoding is deterministic. Sampled decoding draws from
// a seeded StdRng that advances across calls, so repeated calls
// may differ. An empty draft decodes to an empty summary.

use anyhow::{anyhow, bail, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::domain::traits::Generator;

pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 512;

/// How one token is chosen among the top-k candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum DecodingPolicy {
    /// Always the best-ranked candidate
    Greedy,
    /// Count-weighted draw among the candidates
    Sample { seed: u64 },
}

/// Rank `(token, count)` candidates and keep the best `k`.
/// Higher count first, lower token id on ties.
pub fn top_k_candidates(candidates: &[(u32, usize)], k: usize) -> Vec<(u32, usize)> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
}

/// Successor counts over a draft's characters.
struct Transitions {
    vocab: Vec<char>,
    /// index = previous token id; vocab.len() is <bos>
    next:  Vec<FxHashMap<u32, usize>>,
}

impl Transitions {
    fn build(draft: &str) -> Self {
        let mut vocab: Vec<char> = Vec::new();
        let mut ids: FxHashMap<char, u32> = FxHashMap::default();
        let tokens: Vec<u32> = draft
            .chars()
            .map(|c| {
                *ids.entry(c).or_insert_with(|| {
                    vocab.push(c);
                    (vocab.len() - 1) as u32
                })
            })
            .collect();

        let bos = vocab.len();
        let eos = vocab.len() as u32;
        let mut next = vec![FxHashMap::default(); vocab.len() + 1];

        let mut prev = bos;
        for &t in &tokens {
            *next[prev].entry(t).or_insert(0) += 1;
            prev = t as usize;
        }
        *next[prev].entry(eos).or_insert(0) += 1;

        Self { vocab, next }
    }

    fn bos(&self) -> usize {
        self.vocab.len()
    }

    fn eos(&self) -> u32 {
        self.vocab.len() as u32
    }

    fn successors(&self, state: usize) -> Vec<(u32, usize)> {
        self.next[state].iter().map(|(&t, &c)| (t, c)).collect()
    }
}

pub struct TopKDecoder {
    policy:           DecodingPolicy,
    max_output_chars: usize,
    rng:              Mutex<StdRng>,
}

impl TopKDecoder {
    pub fn new(policy: DecodingPolicy, max_output_chars: usize) -> Self {
        let seed = match policy {
            DecodingPolicy::Sample { seed } => seed,
            DecodingPolicy::Greedy => 0,
        };
        Self {
            policy,
            max_output_chars,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    #[cfg(test)]
    pub fn greedy() -> Self {
        Self::new(DecodingPolicy::Greedy, DEFAULT_MAX_OUTPUT_CHARS)
    }

    fn select(&self, ranked: &[(u32, usize)]) -> Result<u32> {
        match self.policy {
            DecodingPolicy::Greedy => Ok(ranked[0].0),
            DecodingPolicy::Sample { .. } => {
                let total: usize = ranked.iter().map(|(_, c)| c).sum();
                let mut rng = self.rng.lock().map_err(|_| anyhow!("decoder rng lock poisoned"))?;
                let mut draw = rng.gen_range(0..total);
                for &(token, count) in ranked {
                    if draw < count {
                        return Ok(token);
                    }
                    draw -= count;
                }
                Ok(ranked[ranked.len() - 1].0)
            }
        }
    }
}

impl Generator for TopKDecoder {
    fn generate(&self, draft: &str, topk: usize) -> Result<String> {
        if topk == 0 {
            bail!("topk must be at least 1");
        }
        if draft.is_empty() {
            return Ok(String::new());
        }

        let table = Transitions::build(draft);
        let mut state = table.bos();
        let mut out = String::new();

        for _ in 0..self.max_output_chars {
            let ranked = top_k_candidates(&table.successors(state), topk);
            if ranked.is_empty() {
                break;
            }
            let token = self.select(&ranked)?;
            if token == table.eos() {
                break;
            }
            out.push(table.vocab[token as usize]);
            state = token as usize;
        }

        tracing::debug!(
            "Decoded {} chars from a {}-char draft (topk={})",
            out.chars().count(),
            draft.chars().count(),
            topk
        );
        Ok(out)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_ranking_and_truncation() {
        let ranked = top_k_candidates(&[(5, 1), (2, 3), (9, 3), (1, 1)], 3);
        assert_eq!(ranked, vec![(2, 3), (9, 3), (1, 1)]);
        assert!(top_k_candidates(&[(1, 1)], 0).is_empty());
    }

    #[test]
    fn test_greedy_copies_draft_without_repeats() {
        let d = TopKDecoder::greedy();
        assert_eq!(d.generate("被告应偿还借款。", 1).unwrap(), "被告应偿还借款。");
    }

    #[test]
    fn test_greedy_is_reproducible() {
        let d = TopKDecoder::greedy();
        let draft = "原告诉称，被告欠款。被告辩称，已还款。";
        let first = d.generate(draft, 1).unwrap();
        for _ in 0..5 {
            assert_eq!(d.generate(draft, 1).unwrap(), first);
        }
    }

    #[test]
    fn test_output_length_is_bounded() {
        let d = TopKDecoder::new(DecodingPolicy::Greedy, 10);
        // 甲 → 乙 → 甲 → ... never reaches <eos> greedily
        let out = d.generate("甲乙甲乙甲乙甲", 1).unwrap();
        assert_eq!(out.chars().count(), 10);
    }

    #[test]
    fn test_sampled_output_only_uses_draft_chars() {
        let d = TopKDecoder::new(DecodingPolicy::Sample { seed: 7 }, 64);
        let draft = "本院认为，被告应当偿还借款本金及利息。";
        for _ in 0..10 {
            let out = d.generate(draft, 3).unwrap();
            assert!(out.chars().all(|c| draft.contains(c)));
            assert!(out.chars().count() <= 64);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let draft = "甲乙丙甲丙乙甲甲乙";
        let a = TopKDecoder::new(DecodingPolicy::Sample { seed: 42 }, 32);
        let b = TopKDecoder::new(DecodingPolicy::Sample { seed: 42 }, 32);
        for _ in 0..3 {
            assert_eq!(a.generate(draft, 3).unwrap(), b.generate(draft, 3).unwrap());
        }
    }

    #[test]
    fn test_empty_draft_gives_empty_summary() {
        assert_eq!(TopKDecoder::greedy().generate("", 3).unwrap(), "");
    }

    #[test]
    fn test_zero_topk_rejected() {
        assert!(TopKDecoder::greedy().generate("甲", 0).is_err());
    }
}

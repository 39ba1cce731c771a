// ============================================================
// Layer 6 - Summary Metrics
// ============================================================
// Three pieces live here:
//
//   MetricsRecord - metric name → score, one per evaluated
//                   example, also used for running sums and
//                   for the final averaged report
//
//   RougeScorer   - the reference `compute_metrics`:
//                   ROUGE-1 / ROUGE-2 / ROUGE-L F1 plus the
//                   weighted "main" score
//                     main = 0.2·R1 + 0.4·R2 + 0.4·RL
//
//   ReportLogger  - appends one CSV row per evaluation run
//
// Example CSV output (reports/eval_metrics.csv):
//   fold,num_folds,evaluated,failed,main,rouge-1,rouge-2,rouge-l
//   0,15,268,0,0.512300,0.601200,0.431000,0.549800
//
// Tokens are lower-cased characters by default, which suits
// Chinese legal text; RougeUnit::Word splits on whitespace.
//
// Reference: Lin (2004) ROUGE: A Package for Automatic
//            Evaluation of Summaries

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::application::evaluate_use_case::EvaluationReport;
use crate::domain::traits::MetricScorer;

pub const MAIN: &str    = "main";
pub const ROUGE_1: &str = "rouge-1";
pub const ROUGE_2: &str = "rouge-2";
pub const ROUGE_L: &str = "rouge-l";

/// Metric names reported by RougeScorer, in report order
pub const METRIC_KEYS: [&str; 4] = [MAIN, ROUGE_1, ROUGE_2, ROUGE_L];

// ─── MetricsRecord ────────────────────────────────────────────────────────────

/// Mapping from metric name to score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsRecord(BTreeMap<String, f64>);

impl MetricsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record holding 0.0 under every key
    pub fn zeroed(keys: &[&str]) -> Self {
        Self(keys.iter().map(|k| (k.to_string(), 0.0)).collect())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Add one example's record into this running sum.
    /// Only `keys` are summed; a key the example lacks adds 0.0.
    pub fn accumulate(&mut self, example: &MetricsRecord, keys: &[&str]) {
        for key in keys {
            let value = example.get(key).unwrap_or(0.0);
            *self.0.entry(key.to_string()).or_insert(0.0) += value;
        }
    }

    /// Key-wise sum of two running sums. Commutative.
    pub fn merge(mut self, other: &MetricsRecord) -> Self {
        for (key, value) in other.iter() {
            *self.0.entry(key.to_string()).or_insert(0.0) += value;
        }
        self
    }

    /// Divide every entry by `count`.
    /// Callers must not pass 0.
    pub fn averaged(&self, count: usize) -> MetricsRecord {
        let n = count as f64;
        Self(self.0.iter().map(|(k, v)| (k.clone(), v / n)).collect())
    }
}

// ─── RougeScorer ──────────────────────────────────────────────────────────────

/// Token granularity used by RougeScorer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RougeUnit {
    /// Every non-whitespace character is a token
    #[default]
    Char,
    /// Whitespace-separated words
    Word,
}

/// Reference metric collaborator: ROUGE-1/2/L F1 and "main".
#[derive(Debug, Clone, Default)]
pub struct RougeScorer {
    unit: RougeUnit,
}

impl RougeScorer {
    pub fn new(unit: RougeUnit) -> Self {
        Self { unit }
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        match self.unit {
            RougeUnit::Char => lower
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(String::from)
                .collect(),
            RougeUnit::Word => lower.split_whitespace().map(str::to_string).collect(),
        }
    }
}

impl MetricScorer for RougeScorer {
    fn metric_keys(&self) -> &[&'static str] {
        &METRIC_KEYS
    }

    fn compute_metrics(&self, candidate: &str, reference: &str) -> Result<MetricsRecord> {
        let cand = self.tokens(candidate);
        let refs = self.tokens(reference);

        let (r1, r2, rl) = if cand.is_empty() || refs.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                ngram_f1(&cand, &refs, 1),
                ngram_f1(&cand, &refs, 2),
                lcs_f1(&cand, &refs),
            )
        };

        let mut record = MetricsRecord::new();
        record.insert(ROUGE_1, r1);
        record.insert(ROUGE_2, r2);
        record.insert(ROUGE_L, rl);
        record.insert(MAIN, 0.2 * r1 + 0.4 * r2 + 0.4 * rl);
        Ok(record)
    }
}

fn f1(overlap: usize, cand_total: usize, ref_total: usize) -> f64 {
    if overlap == 0 || cand_total == 0 || ref_total == 0 {
        return 0.0;
    }
    let p = overlap as f64 / cand_total as f64;
    let r = overlap as f64 / ref_total as f64;
    2.0 * p * r / (p + r)
}

fn ngram_counts(tokens: &[String], n: usize) -> FxHashMap<&[String], usize> {
    let mut counts = FxHashMap::default();
    if tokens.len() >= n {
        for gram in tokens.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

fn ngram_f1(cand: &[String], refs: &[String], n: usize) -> f64 {
    let cand_counts = ngram_counts(cand, n);
    let ref_counts  = ngram_counts(refs, n);

    let overlap: usize = cand_counts
        .iter()
        .map(|(gram, c)| (*c).min(ref_counts.get(gram).copied().unwrap_or(0)))
        .sum();

    f1(
        overlap,
        cand.len().saturating_sub(n - 1),
        refs.len().saturating_sub(n - 1),
    )
}

/// Longest common subsequence length, two-row DP.
fn lcs_len(a: &[String], b: &[String]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn lcs_f1(cand: &[String], refs: &[String]) -> f64 {
    f1(lcs_len(cand, refs), cand.len(), refs.len())
}

// ─── ReportLogger ─────────────────────────────────────────────────────────────

/// Appends averaged evaluation reports to a CSV file.
pub struct ReportLogger {
    csv_path: PathBuf,
    keys:     Vec<String>,
}

impl ReportLogger {
    /// Create a ReportLogger writing to `{dir}/eval_metrics.csv`.
    /// Writes the header only if the file doesn't exist yet.
    pub fn new(dir: impl Into<String>, keys: &[&str]) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create report directory '{}'", dir.display()))?;

        let csv_path = dir.join("eval_metrics.csv");
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "fold,num_folds,evaluated,failed,{}", keys.join(","))?;
            tracing::debug!("Created report CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path, keys })
    }

    /// Append one report as a CSV row, 6 decimals per metric.
    pub fn log(&self, report: &EvaluationReport) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let values: Vec<String> = self
            .keys
            .iter()
            .map(|k| format!("{:.6}", report.metrics.get(k).unwrap_or(0.0)))
            .collect();

        writeln!(
            f,
            "{},{},{},{},{}",
            report.fold,
            report.num_folds,
            report.evaluated,
            report.failed,
            values.join(","),
        )?;

        tracing::debug!(
            "Logged fold {} report to '{}'",
            report.fold,
            self.csv_path.display()
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_text_scores_one() {
        let m = RougeScorer::default()
            .compute_metrics("被告应偿还借款", "被告应偿还借款")
            .unwrap();
        for key in METRIC_KEYS {
            assert!(close(m.get(key).unwrap(), 1.0), "{key}");
        }
    }

    #[test]
    fn test_empty_candidate_scores_zero() {
        let m = RougeScorer::default().compute_metrics("", "被告应偿还借款").unwrap();
        assert_eq!(m.iter().count(), 4);
        assert!(m.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn test_partial_overlap() {
        // cand = a b c, ref = a b d
        // R1: overlap 2 → p = r = 2/3 → f = 2/3
        // R2: cand {ab, bc}, ref {ab, bd} → overlap 1 → f = 1/2
        // RL: lcs "ab" = 2 → f = 2/3
        let m = RougeScorer::new(RougeUnit::Word)
            .compute_metrics("A b c", "a b d")
            .unwrap();
        assert!(close(m.get(ROUGE_1).unwrap(), 2.0 / 3.0));
        assert!(close(m.get(ROUGE_2).unwrap(), 0.5));
        assert!(close(m.get(ROUGE_L).unwrap(), 2.0 / 3.0));
        let main = 0.2 * (2.0 / 3.0) + 0.4 * 0.5 + 0.4 * (2.0 / 3.0);
        assert!(close(m.get(MAIN).unwrap(), main));
    }

    #[test]
    fn test_char_unit_ignores_whitespace() {
        let m = RougeScorer::default().compute_metrics("甲 乙", "甲乙").unwrap();
        assert!(close(m.get(ROUGE_L).unwrap(), 1.0));
    }

    #[test]
    fn test_accumulate_fills_missing_keys_with_zero() {
        let mut sum = MetricsRecord::zeroed(&METRIC_KEYS);
        let mut partial = MetricsRecord::new();
        partial.insert(ROUGE_1, 0.5);
        sum.accumulate(&partial, &METRIC_KEYS);
        sum.accumulate(&partial, &METRIC_KEYS);
        assert_eq!(sum.get(ROUGE_1), Some(1.0));
        assert_eq!(sum.get(ROUGE_2), Some(0.0));
        assert_eq!(sum.iter().count(), 4);
    }

    #[test]
    fn test_merge_is_commutative() {
        let mut a = MetricsRecord::new();
        a.insert(MAIN, 0.25);
        let mut b = MetricsRecord::new();
        b.insert(MAIN, 0.5);
        b.insert(ROUGE_L, 1.0);
        assert_eq!(a.clone().merge(&b), b.clone().merge(&a));
    }

    #[test]
    fn test_averaged_divides_every_key() {
        let mut sum = MetricsRecord::new();
        sum.insert(MAIN, 3.0);
        sum.insert(ROUGE_1, 1.5);
        let avg = sum.averaged(3);
        assert_eq!(avg.get(MAIN), Some(1.0));
        assert_eq!(avg.get(ROUGE_1), Some(0.5));
    }

    #[test]
    fn test_report_logger_writes_header_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let logger = ReportLogger::new(dir.path().to_string_lossy(), &METRIC_KEYS).unwrap();

        let mut metrics = MetricsRecord::zeroed(&METRIC_KEYS);
        metrics.insert(MAIN, 0.5);
        let report = EvaluationReport {
            fold:      2,
            num_folds: 15,
            evaluated: 10,
            failed:    1,
            failed_positions: vec![32],
            metrics,
        };
        logger.log(&report).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "fold,num_folds,evaluated,failed,main,rouge-1,rouge-2,rouge-l");
        assert_eq!(lines[1], "2,15,10,1,0.500000,0.000000,0.000000,0.000000");
    }
}

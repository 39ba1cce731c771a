// ============================================================
// Layer 2 - Evaluate Use Case (k-fold harness)
// ============================================================
// Measures the summarizer on one held-out fold:
//
//   Step 1: Check the fold index and select the held-out fold
//   Step 2: For each held-out example
//             text    = sentences joined by "\n"
//             summary = predict(text, default topk)
//             record  = compute_metrics(summary, gold summary)
//             sums   += record (every metric key, missing → 0.0)
//   Step 3: Divide every sum by the number of evaluated examples
//
// Failure policy (EvalConfig::failure_policy):
//   Abort        - the first failing example ends the run with
//                  EvaluationError::Example (the default)
//   SkipAndCount - failing examples are left out of the sums AND
//                  of the divisor; their positions are reported
//
// A metric collaborator failure always aborts the run.
// Zero evaluated examples is EvaluationError::NothingEvaluated.
//
// With `parallel` the held-out examples are spread over rayon
// workers and per-example totals are merged by key-wise sum.
//
// With `progress` a bar on stderr advances once per held-out
// example, failed or not, from either path.
//
// Reference: Rust Book §13 (Iterators), rayon documentation

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::application::summarize_use_case::SummarizePipeline;
use crate::data::folds::{split_folds, FoldMode};
use crate::domain::error::EvaluationError;
use crate::domain::example::LabeledExample;
use crate::domain::traits::MetricScorer;
use crate::infra::metrics::MetricsRecord;

// ─── Evaluation Configuration ────────────────────────────────────────────────

/// What to do when one held-out example fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Abort,
    SkipAndCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Index of the held-out fold, in [0, num_folds)
    pub fold:           usize,
    pub num_folds:      usize,
    pub failure_policy: FailurePolicy,
    pub parallel:       bool,
    /// Draw a progress bar while evaluating
    pub progress:       bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            fold:           0,
            num_folds:      15,
            failure_policy: FailurePolicy::Abort,
            parallel:       false,
            progress:       false,
        }
    }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Averaged metrics of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub fold:             usize,
    pub num_folds:        usize,
    /// Examples that contributed to the averages
    pub evaluated:        usize,
    /// Examples excluded under SkipAndCount
    pub failed:           usize,
    /// Dataset positions of the excluded examples, ascending
    pub failed_positions: Vec<usize>,
    pub metrics:          MetricsRecord,
}

/// Running sums over any subset of the held-out examples.
/// `merge` is commutative, so the order examples finish in
/// does not matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTotals {
    pub sums:             MetricsRecord,
    pub evaluated:        usize,
    pub failed_positions: Vec<usize>,
}

impl MetricTotals {
    fn success(record: &MetricsRecord, keys: &[&str]) -> Self {
        let mut sums = MetricsRecord::zeroed(keys);
        sums.accumulate(record, keys);
        Self { sums, evaluated: 1, failed_positions: Vec::new() }
    }

    fn failure(position: usize) -> Self {
        Self { failed_positions: vec![position], ..Self::default() }
    }

    pub fn merge(mut self, other: MetricTotals) -> Self {
        self.sums = self.sums.merge(&other.sums);
        self.evaluated += other.evaluated;
        self.failed_positions.extend(other.failed_positions);
        self
    }
}

// ─── EvaluateUseCase ─────────────────────────────────────────────────────────

pub struct EvaluateUseCase {
    pipeline: SummarizePipeline,
    metrics:  Box<dyn MetricScorer>,
    config:   EvalConfig,
}

impl EvaluateUseCase {
    pub fn new(pipeline: SummarizePipeline, metrics: Box<dyn MetricScorer>, config: EvalConfig) -> Self {
        Self { pipeline, metrics, config }
    }

    pub fn metric_keys(&self) -> &[&'static str] {
        self.metrics.metric_keys()
    }

    /// Evaluate the held-out fold of `examples`.
    pub fn execute(&self, examples: &[LabeledExample]) -> Result<EvaluationReport, EvaluationError> {
        let bar = if self.config.progress { styled_bar() } else { ProgressBar::hidden() };
        self.execute_with_progress(examples, &bar)
    }

    /// `execute`, advancing `bar` once per held-out example.
    pub fn execute_with_progress(
        &self,
        examples: &[LabeledExample],
        bar:      &ProgressBar,
    ) -> Result<EvaluationReport, EvaluationError> {
        let cfg = &self.config;

        // ── Step 1: Held-out fold ────────────────────────────────────────────
        let held_out = split_folds(examples, cfg.fold, cfg.num_folds, FoldMode::Valid)?;
        let train = split_folds(examples, cfg.fold, cfg.num_folds, FoldMode::Train)?;
        tracing::info!(
            "Evaluating fold {}/{}: {} held-out, {} in the other folds ({:?}{})",
            cfg.fold,
            cfg.num_folds,
            held_out.len(),
            train.len(),
            cfg.failure_policy,
            if cfg.parallel { ", parallel" } else { "" },
        );

        // ── Step 2: Predict + score every held-out example ───────────────────
        bar.set_length(held_out.len() as u64);
        bar.set_message(format!("fold {}/{}", cfg.fold, cfg.num_folds));
        let step = |&(position, example): &(usize, &LabeledExample)| {
            let result = self.evaluate_one(position, example);
            bar.inc(1);
            result
        };

        let totals = if cfg.parallel {
            held_out
                .par_iter()
                .map(step)
                .try_reduce(MetricTotals::default, |a, b| Ok(a.merge(b)))
        } else {
            held_out
                .iter()
                .map(step)
                .try_fold(MetricTotals::default(), |acc, t| t.map(|t| acc.merge(t)))
        };
        bar.finish_and_clear();
        let totals = totals?;

        // ── Step 3: Average ──────────────────────────────────────────────────
        let mut failed_positions = totals.failed_positions;
        failed_positions.sort_unstable();

        if totals.evaluated == 0 {
            return Err(EvaluationError::NothingEvaluated { failed: failed_positions.len() });
        }

        let report = EvaluationReport {
            fold:      cfg.fold,
            num_folds: cfg.num_folds,
            evaluated: totals.evaluated,
            failed:    failed_positions.len(),
            failed_positions,
            metrics:   totals.sums.averaged(totals.evaluated),
        };

        tracing::info!(
            "Fold {} done: {} evaluated, {} failed",
            report.fold,
            report.evaluated,
            report.failed
        );
        Ok(report)
    }

    fn evaluate_one(
        &self,
        position: usize,
        example:  &LabeledExample,
    ) -> Result<MetricTotals, EvaluationError> {
        let text = example.source_text();

        let summary = match self.pipeline.predict_default(&text) {
            Ok(summary) => summary,
            Err(source) => match self.config.failure_policy {
                FailurePolicy::Abort => {
                    return Err(EvaluationError::Example { position, source });
                }
                FailurePolicy::SkipAndCount => {
                    tracing::warn!("Skipping example at position {}: {}", position, source);
                    return Ok(MetricTotals::failure(position));
                }
            },
        };

        let record = self
            .metrics
            .compute_metrics(&summary, &example.summary)
            .map_err(|source| EvaluationError::Metrics { position, source })?;

        tracing::debug!("Example {}: {:?}", position, record);
        Ok(MetricTotals::success(&record, self.metrics.metric_keys()))
    }
}

fn styled_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} examples ({percent}%) {msg}")
    {
        bar.set_style(style.progress_chars("█▓▒░  "));
    }
    bar
}

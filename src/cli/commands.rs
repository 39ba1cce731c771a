// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Three subcommands share one set of pipeline flags:
//
//   summarize - one document (file or stdin) → summary
//   batch     - every record of a JSON-lines dataset → summary
//   evaluate  - k-fold evaluation on a JSON-lines dataset
//   init      - write the effective pipeline config to disk
//
// Pipeline flags are overrides: anything left out falls back to
// pipeline_config.json in --model-dir, then to the defaults.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::evaluate_use_case::{EvalConfig, FailurePolicy};
use crate::application::summarize_use_case::{PipelineConfig, ScorerKind};
use crate::infra::metrics::RougeUnit;
use crate::ml::generator::DecodingPolicy;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize one document
    Summarize(SummarizeArgs),

    /// Summarize every record of a JSON-lines dataset
    Batch(BatchArgs),

    /// Evaluate the summarizer on one held-out fold
    Evaluate(EvaluateArgs),

    /// Write pipeline_config.json into --model-dir
    Init(InitArgs),
}

// ─── Shared pipeline flags ───────────────────────────────────────────────────

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ScorerArg {
    /// Cosine similarity to the document centroid
    Centroid,
    /// Trained relevance head from --model-dir
    Linear,
}

impl From<ScorerArg> for ScorerKind {
    fn from(a: ScorerArg) -> Self {
        match a {
            ScorerArg::Centroid => ScorerKind::Centroid,
            ScorerArg::Linear   => ScorerKind::Linear,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Candidates kept per decoding step
    #[arg(long)]
    pub topk: Option<usize>,

    /// Sentences scoring strictly above this are extracted
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Directory holding pipeline_config.json and model weights
    #[arg(long, default_value = "models")]
    pub model_dir: String,

    #[arg(long, value_enum)]
    pub scorer: Option<ScorerArg>,

    /// Sample among the top-k with this seed instead of greedy decoding
    #[arg(long)]
    pub seed: Option<u64>,
}

impl PipelineArgs {
    /// Apply the flags that were given on top of `cfg`.
    pub fn apply(&self, mut cfg: PipelineConfig) -> PipelineConfig {
        if let Some(topk) = self.topk {
            cfg.default_topk = topk;
        }
        if let Some(threshold) = self.threshold {
            cfg.threshold = threshold;
        }
        if let Some(scorer) = self.scorer {
            cfg.scorer = scorer.into();
        }
        if let Some(seed) = self.seed {
            cfg.decoding = DecodingPolicy::Sample { seed };
        }
        cfg
    }
}

// ─── init ────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Replace an existing pipeline_config.json
    #[arg(long)]
    pub force: bool,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

// ─── summarize ───────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Document to summarize (.docx or UTF-8 text); stdin if omitted
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

// ─── batch ───────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON-lines dataset
    #[arg(long)]
    pub data: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

// ─── evaluate ────────────────────────────────────────────────────────────────

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FailurePolicyArg {
    /// Stop at the first failing example
    Abort,
    /// Leave failing examples out of the averages and count them
    Skip,
}

impl From<FailurePolicyArg> for FailurePolicy {
    fn from(a: FailurePolicyArg) -> Self {
        match a {
            FailurePolicyArg::Abort => FailurePolicy::Abort,
            FailurePolicyArg::Skip  => FailurePolicy::SkipAndCount,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RougeUnitArg {
    /// Characters (Chinese text)
    Char,
    /// Whitespace-separated words
    Word,
}

impl From<RougeUnitArg> for RougeUnit {
    fn from(a: RougeUnitArg) -> Self {
        match a {
            RougeUnitArg::Char => RougeUnit::Char,
            RougeUnitArg::Word => RougeUnit::Word,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// JSON-lines dataset
    #[arg(long)]
    pub data: String,

    /// Held-out fold, in [0, num_folds)
    #[arg(long, default_value_t = 0)]
    pub fold: usize,

    #[arg(long, default_value_t = 15)]
    pub num_folds: usize,

    #[arg(long, value_enum, default_value = "abort")]
    pub failure_policy: FailurePolicyArg,

    /// Evaluate held-out examples on all cores
    #[arg(long)]
    pub parallel: bool,

    /// ROUGE token granularity
    #[arg(long, value_enum, default_value = "char")]
    pub rouge_unit: RougeUnitArg,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Directory for eval_metrics.csv
    #[arg(long, default_value = "reports")]
    pub report_dir: String,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// The application layer never sees clap types.
impl From<&EvaluateArgs> for EvalConfig {
    fn from(a: &EvaluateArgs) -> Self {
        EvalConfig {
            fold:           a.fold,
            num_folds:      a.num_folds,
            failure_policy: a.failure_policy.into(),
            parallel:       a.parallel,
            progress:       !a.no_progress,
        }
    }
}

// ─── Unit Tests ──────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn no_flags() -> PipelineArgs {
        PipelineArgs { topk: None, threshold: None, model_dir: "models".into(), scorer: None, seed: None }
    }

    #[test]
    fn test_missing_flags_keep_config() {
        let cfg = PipelineConfig { threshold: 0.35, ..PipelineConfig::default() };
        assert_eq!(no_flags().apply(cfg.clone()), cfg);
    }

    #[test]
    fn test_flags_override_config() {
        let args = PipelineArgs {
            topk:      Some(5),
            threshold: Some(0.6),
            scorer:    Some(ScorerArg::Linear),
            seed:      Some(9),
            ..no_flags()
        };
        let cfg = args.apply(PipelineConfig::default());
        assert_eq!(cfg.default_topk, 5);
        assert_eq!(cfg.threshold, 0.6);
        assert_eq!(cfg.scorer, ScorerKind::Linear);
        assert_eq!(cfg.decoding, DecodingPolicy::Sample { seed: 9 });
    }

    #[test]
    fn test_evaluate_args_into_config() {
        let args = EvaluateArgs {
            data:           "d.jsonl".into(),
            fold:           2,
            num_folds:      5,
            failure_policy: FailurePolicyArg::Skip,
            parallel:       true,
            rouge_unit:     RougeUnitArg::Word,
            no_progress:    true,
            report_dir:     "reports".into(),
            pipeline:       no_flags(),
        };
        let cfg = EvalConfig::from(&args);
        assert_eq!(cfg.fold, 2);
        assert_eq!(cfg.num_folds, 5);
        assert_eq!(cfg.failure_policy, FailurePolicy::SkipAndCount);
        assert!(cfg.parallel);
        assert!(!cfg.progress);
        assert_eq!(RougeUnit::from(args.rouge_unit), RougeUnit::Word);
    }
}

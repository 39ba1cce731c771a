// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and prints results. All work is
// delegated to Layer 2 (application).
//
//   summarize → SummarizePipeline::summarize
//   batch     → SummarizePipeline::predict per dataset record
//   evaluate  → EvaluateUseCase::execute + ReportLogger
//   init      → ModelStore::save_config
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;

use commands::{BatchArgs, Commands, EvaluateArgs, InitArgs, PipelineArgs, SummarizeArgs};

use crate::application::evaluate_use_case::EvaluateUseCase;
use crate::application::summarize_use_case::SummarizePipeline;
use crate::data::loader::{load_examples, FileDocumentSource};
use crate::data::preprocessor::Preprocessor;
use crate::domain::document::Document;
use crate::domain::traits::DocumentSource;
use crate::infra::checkpoint::ModelStore;
use crate::infra::metrics::{ReportLogger, RougeScorer};

#[derive(Parser, Debug)]
#[command(
    name = "legal-summarizer",
    version = "0.1.0",
    about = "Extract salient sentences from legal judgments, then rewrite them with top-k decoding."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Summarize(args) => run_summarize(args),
            Commands::Batch(args)     => run_batch(args),
            Commands::Evaluate(args)  => run_evaluate(args),
            Commands::Init(args)      => run_init(args),
        }
    }
}

/// Model directory config with the CLI overrides applied.
fn build_pipeline(args: &PipelineArgs) -> Result<SummarizePipeline> {
    let store = ModelStore::new(&args.model_dir);
    let cfg = args.apply(store.load_config_or_default()?);
    SummarizePipeline::from_config(&cfg, &store)
}

fn run_summarize(args: SummarizeArgs) -> Result<()> {
    let pipeline = build_pipeline(&args.pipeline)?;

    let doc = match &args.input {
        Some(path) => FileDocumentSource::new(path).load()?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Cannot read document from stdin")?;
            Document::new("<stdin>", Preprocessor::new().clean(&raw))
        }
    };

    if doc.is_blank() {
        tracing::warn!("'{}' has no text", doc.source);
    }

    let summary = pipeline.summarize(&doc, pipeline.default_topk())?;
    println!("{}", summary);
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<()> {
    let pipeline = build_pipeline(&args.pipeline)?;
    let examples = load_examples(&args.data)?;

    for (position, example) in examples.iter().enumerate() {
        let summary = pipeline
            .predict_default(&example.batch_text())
            .with_context(|| format!("Cannot summarize record {}", position))?;
        let line = serde_json::json!({ "id": example.id, "summary": summary });
        println!("{}", line);
    }

    tracing::info!("Summarized {} records from '{}'", examples.len(), args.data);
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let pipeline = build_pipeline(&args.pipeline)?;
    let examples = load_examples(&args.data)?;

    let use_case = EvaluateUseCase::new(
        pipeline,
        Box::new(RougeScorer::new(args.rouge_unit.into())),
        (&args).into(),
    );
    let report = use_case.execute(&examples)?;

    let logger = ReportLogger::new(args.report_dir.clone(), use_case.metric_keys())?;
    logger.log(&report)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    tracing::info!("Report appended to '{}'", logger.csv_path().display());
    Ok(())
}

fn run_init(args: InitArgs) -> Result<()> {
    let store = ModelStore::new(&args.pipeline.model_dir);
    if store.has_config() && !args.force {
        anyhow::bail!(
            "'{}' already has a pipeline config; pass --force to replace it",
            args.pipeline.model_dir
        );
    }
    let cfg = args.pipeline.apply(store.load_config_or_default()?);
    store.save_config(&cfg)?;
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}

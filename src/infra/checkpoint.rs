// ============================================================
// Layer 6 - Model Store
// ============================================================
// Reads (and writes) the offline artefacts of a model directory:
//
//   models/
//     pipeline_config.json     ← threshold, topk, encoder dim, ...
//     relevance_head.mpk.gz    ← RelevanceHead weights (burn)
//
// Both are produced offline; this crate never trains. A missing
// pipeline_config.json means "use the defaults". A missing
// weight file is an error only when the linear scorer is asked
// for.
//
// Weights use Burn's CompactRecorder (MessagePack + gzip, half
// precision). Loading fails if the input dimension of the
// stored head differs from the one requested.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::summarize_use_case::PipelineConfig;
use crate::ml::model::RelevanceHead;

const CONFIG_FILE: &str = "pipeline_config.json";
const HEAD_FILE: &str   = "relevance_head";

pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn has_config(&self) -> bool {
        self.dir.join(CONFIG_FILE).exists()
    }

    /// Write the pipeline configuration as pretty JSON.
    pub fn save_config(&self, cfg: &PipelineConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved pipeline config to '{}'", path.display());
        Ok(())
    }

    /// Pipeline configuration stored in the directory, or the
    /// defaults when there is none.
    pub fn load_config_or_default(&self) -> Result<PipelineConfig> {
        let path = self.dir.join(CONFIG_FILE);
        if !path.exists() {
            tracing::debug!("No '{}', using default pipeline config", path.display());
            return Ok(PipelineConfig::default());
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let cfg = serde_json::from_str(&json)
            .with_context(|| format!("Invalid pipeline config '{}'", path.display()))?;
        tracing::info!("Loaded pipeline config from '{}'", path.display());
        Ok(cfg)
    }

    /// Save relevance head weights.
    #[cfg(test)]
    pub fn save_relevance_head<B: Backend>(&self, model: &RelevanceHead<B>) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        let path = self.dir.join(HEAD_FILE);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save weights to '{}'", path.display()))?;
        tracing::debug!("Saved relevance head to '{}'", path.display());
        Ok(())
    }

    /// Restore relevance head weights into `model`, which must
    /// have been built with the same input dimension.
    pub fn load_relevance_head<B: Backend>(
        &self,
        model:  RelevanceHead<B>,
        device: &B::Device,
    ) -> Result<RelevanceHead<B>> {
        let path = self.dir.join(HEAD_FILE);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load relevance head weights '{}'", path.display())
            })?;
        tracing::info!("Loaded relevance head from '{}'", path.display());
        Ok(model.load_record(record))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ModelStore::new(dir.path()).load_config_or_default().unwrap();
        assert_eq!(cfg, PipelineConfig::default());
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let cfg = PipelineConfig { threshold: 0.35, default_topk: 1, ..PipelineConfig::default() };
        assert!(!store.has_config());
        store.save_config(&cfg).unwrap();
        assert!(store.has_config());
        assert_eq!(store.load_config_or_default().unwrap(), cfg);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ threshold: }").unwrap();
        assert!(ModelStore::new(dir.path()).load_config_or_default().is_err());
    }

    #[test]
    fn test_missing_weights_is_an_error() {
        use crate::ml::model::RelevanceHeadConfig;
        type B = burn::backend::NdArray;

        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let model = RelevanceHeadConfig::new(8).init::<B>(&device);
        assert!(ModelStore::new(dir.path()).load_relevance_head(model, &device).is_err());
    }
}

// src/model/checkpoint.rs
//! Snapshot and restore of the full training state
//!
//! A checkpoint is a directory:
//! - `config.json`    model config
//! - `model.mpk`      every learnable parameter, full precision
//! - `optimizer.mpk`  Adam moment accumulators
//! - `state.json`     learning rate and step counter

use std::path::Path;

use burn::{
    config::Config,
    module::Module,
    optim::Optimizer,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::config::ModelConfig;
use super::language_model::RecurrentLanguageModel;
use crate::error::{CharnnError, Result};

const CONFIG_FILE: &str = "config.json";
const MODEL_FILE: &str = "model";
const OPTIMIZER_FILE: &str = "optimizer";
const STATE_FILE: &str = "state.json";

/// Scalars that are persisted but never touched by gradient descent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingState {
    pub learning_rate: f64,
    pub step: usize,
}

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

pub fn read_config(dir: &Path) -> Result<ModelConfig> {
    ModelConfig::load(dir.join(CONFIG_FILE))
        .map_err(|e| CharnnError::CheckpointLoad(format!("{}: {}", dir.join(CONFIG_FILE).display(), e)))
}

impl<B: AutodiffBackend> RecurrentLanguageModel<B> {
    pub fn save_checkpoint(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        self.config
            .save(dir.join(CONFIG_FILE))
            .map_err(|e| CharnnError::CheckpointSave(e.to_string()))?;

        self.model
            .clone()
            .save_file(dir.join(MODEL_FILE), &recorder())
            .map_err(|e| CharnnError::CheckpointSave(e.to_string()))?;

        Recorder::<B>::record(&recorder(), self.optimizer.to_record(), dir.join(OPTIMIZER_FILE))
            .map_err(|e| CharnnError::CheckpointSave(e.to_string()))?;

        let state = TrainingState {
            learning_rate: self.learning_rate,
            step: self.step,
        };
        std::fs::write(dir.join(STATE_FILE), serde_json::to_string_pretty(&state)?)?;

        info!(path = %dir.display(), step = self.step, "checkpoint saved");
        Ok(())
    }

    /// Restores parameters, optimizer moments, learning rate and step counter.
    pub fn load_checkpoint(dir: &Path, device: B::Device) -> Result<Self> {
        let config = read_config(dir)?;
        let mut lm = Self::new(config, device)?;
        lm.restore_parameters(dir)?;

        let record = Recorder::<B>::load(&recorder(), dir.join(OPTIMIZER_FILE), &lm.device)
            .map_err(|e| CharnnError::CheckpointLoad(e.to_string()))?;
        lm.optimizer = Self::build_optimizer().load_record(record);

        let path = dir.join(STATE_FILE);
        let raw = std::fs::read_to_string(&path).map_err(|source| CharnnError::FileRead { path, source })?;
        let state: TrainingState = serde_json::from_str(&raw)?;
        lm.learning_rate = state.learning_rate;
        lm.step = state.step;

        info!(path = %dir.display(), step = lm.step, "checkpoint restored");
        Ok(lm)
    }

    /// Restores parameters only, with batch and sequence forced to 1.
    pub fn load_for_inference(dir: &Path, device: B::Device) -> Result<Self> {
        let config = read_config(dir)?.with_training(false);
        let mut lm = Self::new(config, device)?;
        lm.restore_parameters(dir)?;
        info!(path = %dir.display(), "checkpoint restored for inference");
        Ok(lm)
    }

    fn restore_parameters(&mut self, dir: &Path) -> Result<()> {
        self.model = self
            .model
            .clone()
            .load_file(dir.join(MODEL_FILE), &recorder(), &self.device)
            .map_err(|e| CharnnError::CheckpointLoad(e.to_string()))?;
        Ok(())
    }
}

// src/model/config.rs
//! Model and training configuration

use burn::config::Config;

use crate::error::CharnnError;

#[derive(Config, Debug)]
pub struct ModelConfig {
    pub vocab_size: usize,

    #[config(default = "128")]
    pub hidden_size: usize,

    #[config(default = "2")]
    pub layers_size: usize,

    #[config(default = "50")]
    pub batch_size: usize,

    #[config(default = "50")]
    pub sequence_length: usize,

    /// Global-norm threshold for gradient clipping
    #[config(default = "5.0")]
    pub gradient_clip: f32,

    #[config(default = "0.002")]
    pub learning_rate: f64,

    /// Added to the forget gate pre-activation of every LSTM cell
    #[config(default = "1.0")]
    pub forget_bias: f32,

    /// Inference mode forces batch_size and sequence_length to 1
    #[config(default = "true")]
    pub training: bool,
}

impl ModelConfig {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.vocab_size == 0 {
            return Err(CharnnError::Config("vocab_size must be positive".into()));
        }
        if self.hidden_size == 0 {
            return Err(CharnnError::Config("hidden_size must be positive".into()));
        }
        if self.layers_size == 0 {
            return Err(CharnnError::Config("layers_size must be positive".into()));
        }
        if self.training && self.batch_size == 0 {
            return Err(CharnnError::Config("batch_size must be positive in training mode".into()));
        }
        if self.training && self.sequence_length == 0 {
            return Err(CharnnError::Config(
                "sequence_length must be positive in training mode".into(),
            ));
        }
        if !(self.gradient_clip.is_finite() && self.gradient_clip > 0.0) {
            return Err(CharnnError::Config(format!(
                "gradient_clip must be a positive finite number, got {}",
                self.gradient_clip
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate >= 0.0) {
            return Err(CharnnError::Config(format!(
                "learning_rate must be a non-negative finite number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    pub fn effective_batch_size(&self) -> usize {
        if self.training { self.batch_size } else { 1 }
    }

    pub fn effective_sequence_length(&self) -> usize {
        if self.training { self.sequence_length } else { 1 }
    }

    pub fn num_parameters(&self) -> usize {
        let h = self.hidden_size;
        let embed = self.vocab_size * h;
        // input kernel + recurrent kernel + bias, four gates each
        let per_layer = 4 * h * h + 4 * h * h + 4 * h;
        let softmax = h * self.vocab_size + self.vocab_size;
        embed + self.layers_size * per_layer + softmax
    }
}

/// Options owned by the training driver, not by the model.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub num_epochs: usize,
    pub save_every: usize,
    pub decay_rate: f64,
    pub log_every: usize,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            num_epochs: 50,
            save_every: 1000,
            decay_rate: 0.97,
            log_every: 10,
        }
    }
}

impl TrainingOptions {
    /// Exponential decay applied once per epoch
    pub fn learning_rate_for_epoch(&self, base: f64, epoch: usize) -> f64 {
        base * self.decay_rate.powi(epoch as i32)
    }
}

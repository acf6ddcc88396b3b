//! Train Command
//!
//! Builds the vocabulary and batches from a text file and trains the model.

use std::path::Path;
use std::time::Instant;

use burn::config::Config;
use tracing::info;

use super::VOCAB_FILE;
use crate::backend::{get_device, TrainBackend};
use crate::data::{BatchLoader, Vocabulary};
use crate::error::{CharnnError, Result};
use crate::logger::MetricsCsv;
use crate::model::{ModelConfig, RecurrentLanguageModel, TrainingOptions};
use crate::utils::{format_duration, format_params};

/// Model hyperparameters chosen on the command line
#[derive(Debug, Clone)]
pub struct ModelParams {
    pub hidden_size: usize,
    pub layers_size: usize,
    pub batch_size: usize,
    pub sequence_length: usize,
    pub gradient_clip: f32,
    pub learning_rate: f64,
}

pub fn execute(input: &Path, output: &Path, params: &ModelParams, options: &TrainingOptions) -> Result<()> {
    println!("═══════════════════════════════════════════════════════════");
    println!("  Training character model");
    println!("═══════════════════════════════════════════════════════════");

    let text = std::fs::read_to_string(input).map_err(|source| CharnnError::FileRead {
        path: input.to_path_buf(),
        source,
    })?;
    let vocab = Vocabulary::from_text(&text);
    let encoded = vocab.encode(&text)?;

    let config = ModelConfig::new(vocab.len())
        .with_hidden_size(params.hidden_size)
        .with_layers_size(params.layers_size)
        .with_batch_size(params.batch_size)
        .with_sequence_length(params.sequence_length)
        .with_gradient_clip(params.gradient_clip)
        .with_learning_rate(params.learning_rate);

    let mut loader = BatchLoader::new(&encoded, config.batch_size, config.sequence_length)?;
    std::fs::create_dir_all(output)?;
    vocab.save(&output.join(VOCAB_FILE))?;
    config.save(output.join("config.json"))?;

    println!("  Corpus: {} symbols, vocabulary {}", encoded.len(), vocab.len());
    println!("  Parameters: {}", format_params(config.num_parameters()));
    println!("  Batches per epoch: {}", loader.num_batches());
    println!();

    let base_lr = config.learning_rate;
    let batch_size = config.batch_size;
    let mut lm: RecurrentLanguageModel<TrainBackend> = RecurrentLanguageModel::new(config, get_device())?;
    let mut metrics = MetricsCsv::new(output)?;

    let total_steps = options.num_epochs * loader.num_batches();
    let start = Instant::now();

    for epoch in 0..options.num_epochs {
        lm.set_learning_rate(options.learning_rate_for_epoch(base_lr, epoch));
        loader.reset();
        let mut state = lm.zero_state(batch_size);

        while let Some(batch) = loader.next_batch() {
            let batch_start = Instant::now();
            let result = lm.train_step(&batch.inputs, &batch.targets, state)?;
            state = result.state;

            let step = lm.step();
            let secs = batch_start.elapsed().as_secs_f64();
            metrics.record_train(
                step,
                epoch,
                result.loss,
                lm.learning_rate(),
                result.grad_norm,
                result.clipped_grad_norm,
                secs,
            );

            if step % options.log_every.max(1) == 0 {
                info!(
                    "{}/{} (epoch {}), train_loss = {:.3}, time/batch = {:.3}",
                    step, total_steps, epoch, result.loss, secs
                );
            }

            if step % options.save_every.max(1) == 0 || step == total_steps {
                lm.save_checkpoint(output)?;
            }
        }
    }

    println!();
    println!("  Done: {} steps in {}", lm.step(), format_duration(start.elapsed()));
    println!("  Checkpoint: {}", output.display());
    Ok(())
}

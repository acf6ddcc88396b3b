//! Sample Command
//!
//! Generates text from a priming string using a trained checkpoint.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::VOCAB_FILE;
use crate::backend::{get_device, InferBackend, TrainBackend};
use crate::data::Vocabulary;
use crate::error::Result;
use crate::model::{CharRnn, RecurrentLanguageModel, Sampler};

pub fn execute(checkpoint: &Path, num: usize, prime: &str, seed: Option<u64>) -> Result<()> {
    let vocab = Vocabulary::load(&checkpoint.join(VOCAB_FILE))?;
    let lm = RecurrentLanguageModel::<TrainBackend>::load_for_inference(checkpoint, get_device())?;

    let model: CharRnn<InferBackend> = lm.inference_model();
    let sampler = Sampler::new(&model, &vocab)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let text = sampler.generate(prime, num, &mut rng)?;
    println!("{}", text);
    Ok(())
}

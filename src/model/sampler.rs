//! Autoregressive text sampler
//!
//! Warms the recurrent state up on the priming string, then feeds back one
//! stochastically picked symbol per step.

use rand::Rng;
use tracing::debug;

use super::traits::StepModel;
use crate::data::Vocabulary;
use crate::error::{CharnnError, Result};
use crate::helpers::weighted_pick;

pub const DEFAULT_NUM: usize = 200;
pub const DEFAULT_PRIME: &str = "The ";

pub struct Sampler<'a, M: StepModel> {
    model: &'a M,
    vocab: &'a Vocabulary,
}

impl<'a, M: StepModel> Sampler<'a, M> {
    pub fn new(model: &'a M, vocab: &'a Vocabulary) -> Result<Self> {
        if vocab.len() != model.vocab_size() {
            return Err(CharnnError::Config(format!(
                "vocabulary has {} symbols but the model scores {}",
                vocab.len(),
                model.vocab_size()
            )));
        }
        Ok(Self { model, vocab })
    }

    /// Returns `prime` followed by `num` sampled symbols.
    ///
    /// The whole priming string is looked up before the model runs, so an
    /// unknown symbol fails without producing any output.
    pub fn generate<R: Rng + ?Sized>(&self, prime: &str, num: usize, rng: &mut R) -> Result<String> {
        let symbols = self.vocab.encode(prime)?;
        let (&last, warmup) = symbols.split_last().ok_or(CharnnError::EmptyPrime)?;

        let mut state = self.model.zero_state(1);
        for &symbol in warmup {
            let (_, next) = self.model.infer_step(symbol, state)?;
            state = next;
        }

        let mut output = String::from(prime);
        let mut current = last;
        for _ in 0..num {
            let (probs, next) = self.model.infer_step(current, state)?;
            state = next;

            let picked = weighted_pick(&probs, rng);
            output.push(self.vocab.symbol(picked)?);
            current = picked;
        }

        debug!(prime_len = symbols.len(), generated = num, "sampling finished");
        Ok(output)
    }
}

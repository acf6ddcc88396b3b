//! StepModel trait: single-step inference seam
//!
//! The Sampler drives any model exposing this interface: a bare `CharRnn`
//! on a plain backend, or a `RecurrentLanguageModel` that is being trained.

use burn::tensor::backend::Backend;

use super::lstm::RnnState;
use super::rnn::CharRnn;
use crate::error::Result;

pub trait StepModel {
    type Backend: Backend;

    /// Number of symbols the model scores.
    fn vocab_size(&self) -> usize;

    /// All-zero recurrent state, the start of every new sequence.
    fn zero_state(&self, batch_size: usize) -> RnnState<Self::Backend>;

    /// Consumes one symbol, returns the next-symbol distribution (sums to 1)
    /// and the updated state. Never mutates parameters.
    fn infer_step(
        &self,
        symbol: usize,
        state: RnnState<Self::Backend>,
    ) -> Result<(Vec<f32>, RnnState<Self::Backend>)>;
}

impl<B: Backend> StepModel for CharRnn<B> {
    type Backend = B;

    fn vocab_size(&self) -> usize {
        CharRnn::vocab_size(self)
    }

    fn zero_state(&self, batch_size: usize) -> RnnState<B> {
        CharRnn::zero_state(self, batch_size)
    }

    fn infer_step(&self, symbol: usize, state: RnnState<B>) -> Result<(Vec<f32>, RnnState<B>)> {
        CharRnn::infer_step(self, symbol, state)
    }
}

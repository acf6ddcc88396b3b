//! Character-level recurrent language model

use std::fmt;

use burn::{
    constant,
    module::{Module, ModuleVisitor, ParamId},
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig},
    tensor::{backend::Backend, Int, Tensor},
};

use super::config::ModelConfig;
use super::lstm::{RnnState, StackedLstm};
use crate::error::{CharnnError, Result};
use crate::helpers::softmax;

/// Where each unrolled timestep takes its input from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFeed {
    /// Ground-truth symbol at every position
    TeacherForced,
    /// Arg-max of the previous step's projected output, re-embedded
    SelfFed,
}

impl fmt::Display for InputFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFeed::TeacherForced => write!(f, "teacher-forced"),
            InputFeed::SelfFed => write!(f, "self-fed"),
        }
    }
}

// no parameters, carried through records and `valid()` as-is
constant!(InputFeed);

// ============================================================
// MODEL
// ============================================================

#[derive(Module, Debug)]
pub struct CharRnn<B: Backend> {
    embedding: Embedding<B>,
    cells: StackedLstm<B>,
    /// `softmax_w: [hidden, vocab]`, `softmax_b: [vocab]`
    softmax: Linear<B>,
    feed: InputFeed,
    vocab_size: usize,
    hidden_size: usize,
    layers_size: usize,
}

impl<B: Backend> CharRnn<B> {
    /// Input feed is teacher-forced in training mode and self-fed otherwise.
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        let feed = if config.training {
            InputFeed::TeacherForced
        } else {
            InputFeed::SelfFed
        };

        Self {
            embedding: EmbeddingConfig::new(config.vocab_size, config.hidden_size).init(device),
            cells: StackedLstm::new(config.layers_size, config.hidden_size, config.forget_bias, device),
            softmax: LinearConfig::new(config.hidden_size, config.vocab_size).init(device),
            feed,
            vocab_size: config.vocab_size,
            hidden_size: config.hidden_size,
            layers_size: config.layers_size,
        }
    }

    /// Same parameters, different input feed.
    pub fn with_feed(mut self, feed: InputFeed) -> Self {
        self.feed = feed;
        self
    }

    pub fn feed(&self) -> InputFeed { self.feed }
    pub fn vocab_size(&self) -> usize { self.vocab_size }
    pub fn hidden_size(&self) -> usize { self.hidden_size }
    pub fn layers_size(&self) -> usize { self.layers_size }

    pub fn device(&self) -> B::Device {
        self.softmax.weight.val().device()
    }

    pub fn zero_state(&self, batch_size: usize) -> RnnState<B> {
        RnnState::zeros(self.layers_size, self.hidden_size, batch_size, &self.device())
    }

    /// Unrolls the stack over `input: [batch, seq]`.
    ///
    /// Returns logits `[batch * seq, vocab]` (rows ordered batch-major) and the
    /// state after the last timestep. With `InputFeed::SelfFed` only the first
    /// column of `input` is consumed.
    pub fn forward(&self, input: Tensor<B, 2, Int>, state: RnnState<B>) -> (Tensor<B, 2>, RnnState<B>) {
        let [batch, seq] = input.dims();
        let h = self.hidden_size;
        let embedded = self.embedding.forward(input);

        let mut state = state;
        let mut outputs: Vec<Tensor<B, 2>> = Vec::with_capacity(seq);

        for t in 0..seq {
            let x = match (self.feed, outputs.last()) {
                (InputFeed::SelfFed, Some(prev)) => self.feed_back(prev.clone()),
                _ => embedded.clone().slice([0..batch, t..t + 1, 0..h]).reshape([batch, h]),
            };
            let (output, next) = self.cells.forward(x, state);
            state = next;
            outputs.push(output);
        }

        let output = Tensor::cat(outputs, 1).reshape([batch * seq, h]);
        (self.softmax.forward(output), state)
    }

    /// Projects the previous output, takes the arg-max symbol and re-embeds it.
    /// No gradient flows through the selection.
    fn feed_back(&self, prev: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch, _] = prev.dims();
        let symbols = self.softmax.forward(prev.detach()).argmax(1);
        self.embedding.forward(symbols).reshape([batch, self.hidden_size])
    }

    /// Arg-max symbol of each logits row.
    pub fn greedy_symbols(logits: Tensor<B, 2>) -> Vec<usize> {
        logits
            .argmax(1)
            .into_data()
            .iter::<i64>()
            .map(|idx| idx as usize)
            .collect()
    }

    /// Single symbol in, next-symbol distribution and updated state out.
    pub fn infer_step(&self, symbol: usize, state: RnnState<B>) -> Result<(Vec<f32>, RnnState<B>)> {
        if symbol >= self.vocab_size {
            return Err(CharnnError::OutOfVocabulary {
                index: symbol,
                vocab_size: self.vocab_size,
            });
        }
        let [layers, batch, hidden] = state.shape();
        if layers != self.layers_size || batch != 1 || hidden != self.hidden_size {
            return Err(CharnnError::ShapeMismatch {
                expected: format!("state [{}, 1, {}]", self.layers_size, self.hidden_size),
                got: format!("state [{}, {}, {}]", layers, batch, hidden),
            });
        }

        let input: Tensor<B, 2, Int> =
            Tensor::<B, 1, Int>::from_ints([symbol as i32], &self.device()).reshape([1, 1]);
        let (logits, state) = self.forward(input, state);
        let logits: Vec<f32> = logits.into_data().iter::<f32>().collect();

        Ok((softmax(&logits), state))
    }

    /// Every learnable value, in module visiting order.
    pub fn flat_parameters(&self) -> Vec<f32> {
        let mut collector = ParamCollector { values: Vec::new() };
        self.visit(&mut collector);
        collector.values
    }
}

struct ParamCollector {
    values: Vec<f32>,
}

impl<B: Backend> ModuleVisitor<B> for ParamCollector {
    fn visit_float<const D: usize>(&mut self, _id: ParamId, tensor: &Tensor<B, D>) {
        self.values.extend(tensor.to_data().iter::<f32>());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};

    type TestBackend = NdArray;

    fn tiny_config() -> ModelConfig {
        ModelConfig::new(5)
            .with_hidden_size(8)
            .with_layers_size(2)
            .with_batch_size(3)
            .with_sequence_length(4)
    }

    #[test]
    fn test_forward_logits_shape() {
        let device = NdArrayDevice::Cpu;
        let model: CharRnn<TestBackend> = CharRnn::new(&tiny_config(), &device);
        let input: Tensor<TestBackend, 2, Int> = Tensor::zeros([3, 4], &device);

        let (logits, state) = model.forward(input, model.zero_state(3));
        assert_eq!(logits.dims(), [12, 5]);
        assert_eq!(state.shape(), [2, 3, 8]);
    }

    #[test]
    fn test_feed_selected_by_mode() {
        let device = NdArrayDevice::Cpu;
        let train: CharRnn<TestBackend> = CharRnn::new(&tiny_config(), &device);
        let infer: CharRnn<TestBackend> = CharRnn::new(&tiny_config().with_training(false), &device);
        assert_eq!(train.feed(), InputFeed::TeacherForced);
        assert_eq!(infer.feed(), InputFeed::SelfFed);
    }

    #[test]
    fn test_feed_survives_valid_copy() {
        use burn::backend::Autodiff;
        use burn::module::AutodiffModule;

        let device = NdArrayDevice::Cpu;
        let model: CharRnn<Autodiff<TestBackend>> =
            CharRnn::new(&tiny_config(), &device).with_feed(InputFeed::SelfFed);
        let inner = model.valid();
        assert_eq!(inner.feed(), InputFeed::SelfFed);
        assert_eq!(inner.vocab_size(), 5);
        assert_eq!(InputFeed::SelfFed.to_string(), "self-fed");
    }

    #[test]
    fn test_self_fed_ignores_later_columns() {
        let device = NdArrayDevice::Cpu;
        let model: CharRnn<TestBackend> =
            CharRnn::new(&tiny_config(), &device).with_feed(InputFeed::SelfFed);

        let a: Tensor<TestBackend, 2, Int> = Tensor::from_ints([[1, 0, 0, 0]], &device);
        let b: Tensor<TestBackend, 2, Int> = Tensor::from_ints([[1, 4, 2, 3]], &device);
        let (logits_a, _) = model.forward(a, model.zero_state(1));
        let (logits_b, _) = model.forward(b, model.zero_state(1));

        let a: Vec<f32> = logits_a.into_data().iter::<f32>().collect();
        let b: Vec<f32> = logits_b.into_data().iter::<f32>().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_infer_step_rejects_out_of_vocab() {
        let device = NdArrayDevice::Cpu;
        let model: CharRnn<TestBackend> = CharRnn::new(&tiny_config(), &device);
        let err = model.infer_step(5, model.zero_state(1)).unwrap_err();
        assert!(matches!(err, CharnnError::OutOfVocabulary { index: 5, vocab_size: 5 }));
    }

    #[test]
    fn test_infer_step_rejects_batched_state() {
        let device = NdArrayDevice::Cpu;
        let model: CharRnn<TestBackend> = CharRnn::new(&tiny_config(), &device);
        let err = model.infer_step(0, model.zero_state(2)).unwrap_err();
        assert!(matches!(err, CharnnError::ShapeMismatch { .. }));
    }
}

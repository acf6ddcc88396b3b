//! Common test utilities and helpers
//!
//! Shared helpers for integration tests.

#![allow(dead_code)]

use burn::backend::ndarray::{NdArray, NdArrayDevice};
use burn::backend::Autodiff;

use charnn::{ModelConfig, RecurrentLanguageModel, Vocabulary};

pub type TestBackend = NdArray;
pub type TestTrainBackend = Autodiff<NdArray>;

pub fn test_device() -> NdArrayDevice {
    NdArrayDevice::Cpu
}

/// Small config for fast tests: 2 rows of 4 symbols, 2 layers of 8 units.
pub fn test_model_config(vocab_size: usize) -> ModelConfig {
    ModelConfig::new(vocab_size)
        .with_hidden_size(8)
        .with_layers_size(2)
        .with_batch_size(2)
        .with_sequence_length(4)
}

pub fn test_model(config: ModelConfig) -> RecurrentLanguageModel<TestTrainBackend> {
    RecurrentLanguageModel::new(config, test_device()).expect("valid test config")
}

/// Three-symbol vocabulary `a`, `b`, `c`.
pub fn abc_vocab() -> Vocabulary {
    Vocabulary::from_symbols(vec!['a', 'b', 'c']).expect("unique symbols")
}

pub fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
}

//! charnn: character-level recurrent language model

pub mod backend;
pub mod commands;
pub mod data;
pub mod error;
pub mod helpers;
pub mod logger;
pub mod model;
pub mod utils;

pub use backend::backend_name;
pub use data::{Batch, BatchLoader, Vocabulary};
pub use error::{CharnnError, Result};
pub use model::{
    CharRnn, ModelConfig, RecurrentLanguageModel, RnnState, Sampler, StepModel, TrainStep,
    TrainingOptions,
};

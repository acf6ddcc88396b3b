mod checkpoint;
mod clip;
mod config;
mod language_model;
mod lstm;
mod rnn;
mod sampler;
mod traits;

pub use checkpoint::{read_config, TrainingState};
pub use clip::{clip_by_global_norm, ClipReport};
pub use config::{ModelConfig, TrainingOptions};
pub use language_model::{RecurrentLanguageModel, TrainStep};
pub use lstm::{LstmCell, LstmState, RnnState, StackedLstm};
pub use rnn::{CharRnn, InputFeed};
pub use sampler::{Sampler, DEFAULT_NUM, DEFAULT_PRIME};
pub use traits::StepModel;

// src/data/mod.rs

mod loader;
mod vocab;

pub use loader::{Batch, BatchLoader};
pub use vocab::Vocabulary;

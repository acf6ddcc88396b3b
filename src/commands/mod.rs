//! Commands Module
//!
//! All CLI subcommand implementations.

pub mod info;
pub mod sample;
pub mod train;

/// Vocabulary file written next to the checkpoint by `train`
pub const VOCAB_FILE: &str = "vocab.json";

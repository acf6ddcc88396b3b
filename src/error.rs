use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CharnnError {
    // --- I/O ---
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    // --- Config ---
    #[error("Invalid config: {0}")]
    Config(String),

    // --- Model ---
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("Symbol index {index} out of vocabulary (size {vocab_size})")]
    OutOfVocabulary { index: usize, vocab_size: usize },

    #[error("Checkpoint load failed: {0}")]
    CheckpointLoad(String),

    #[error("Checkpoint save failed: {0}")]
    CheckpointSave(String),

    // --- Vocabulary / data ---
    #[error("Unknown symbol {0:?}")]
    UnknownSymbol(char),

    #[error("Priming string must contain at least one symbol")]
    EmptyPrime,

    #[error("Not enough data: {symbols} symbols for batch_size={batch_size} x sequence_length={sequence_length}")]
    NotEnoughData {
        symbols: usize,
        batch_size: usize,
        sequence_length: usize,
    },
}

pub type Result<T> = std::result::Result<T, CharnnError>;

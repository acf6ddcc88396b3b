// src/utils/mod.rs

mod format;

pub use format::{format_duration, format_params};

// src/logger/mod.rs

mod metrics;

pub use metrics::MetricsCsv;

// src/logger/metrics.rs
//! Training metrics as CSV for later analysis

use std::fs::File;
use std::io::Write;
use std::path::Path;

pub struct MetricsCsv {
    file: File,
}

impl MetricsCsv {
    /// Creates `metrics.csv` in `output_dir`, truncating any previous run
    pub fn new(output_dir: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        let mut file = File::create(output_dir.join("metrics.csv"))?;
        writeln!(file, "step,epoch,loss,ppl,lr,grad_norm,clipped_norm,secs_per_batch")?;
        Ok(Self { file })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record_train(
        &mut self,
        step: usize,
        epoch: usize,
        loss: f32,
        lr: f64,
        grad_norm: f32,
        clipped_norm: f32,
        secs_per_batch: f64,
    ) {
        let ppl = (loss as f64).exp();
        let _ = writeln!(
            self.file,
            "{},{},{:.6},{:.2},{:.2e},{:.4},{:.4},{:.4}",
            step, epoch, loss, ppl, lr, grad_norm, clipped_norm, secs_per_batch
        );
        let _ = self.file.flush();
    }
}

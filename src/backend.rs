//! Compile-time backend selection
//!
//! `cpu` (default) trains on NdArray, `gpu` on Wgpu. With both enabled the
//! CPU backend wins.

use burn::backend::Autodiff;

#[cfg(all(feature = "gpu", not(feature = "cpu")))]
mod selected {
    use burn::backend::wgpu::{Wgpu, WgpuDevice};

    pub type MyBackend = Wgpu<f32, i32>;
    pub const NAME: &str = "WGPU";

    pub fn get_device() -> WgpuDevice {
        WgpuDevice::BestAvailable
    }
}

#[cfg(not(all(feature = "gpu", not(feature = "cpu"))))]
mod selected {
    use burn::backend::ndarray::{NdArray, NdArrayDevice};

    pub type MyBackend = NdArray;
    pub const NAME: &str = "CPU (NdArray)";

    pub fn get_device() -> NdArrayDevice {
        NdArrayDevice::Cpu
    }
}

pub use selected::{get_device, MyBackend};

/// Inference and sampling run on this backend.
pub type InferBackend = MyBackend;

/// Training wraps the selected backend with autodiff.
pub type TrainBackend = Autodiff<MyBackend>;

/// Name of the backend chosen by the enabled features.
pub fn backend_name() -> &'static str {
    selected::NAME
}

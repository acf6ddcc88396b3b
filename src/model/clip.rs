//! Global-norm gradient clipping
//!
//! All gradients are treated as one flattened vector and rescaled by a single
//! factor `clip / max(norm, clip)`.

use burn::{
    module::{AutodiffModule, ModuleVisitor, ParamId},
    optim::GradientsParams,
    tensor::{backend::AutodiffBackend, backend::Backend, Tensor},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipReport {
    /// Global norm before clipping. May be non-finite.
    pub grad_norm: f32,
    /// Global norm of the gradients handed to the optimizer, never above the
    /// clip threshold.
    pub clipped_norm: f32,
    /// Some gradient entry was NaN or infinite and gradients were sanitized.
    pub non_finite: bool,
}

pub fn clip_by_global_norm<B, M>(module: &M, mut grads: GradientsParams, clip: f32) -> (GradientsParams, ClipReport)
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let mut norm = SquaredNorm { grads: &grads, total: 0.0 };
    module.visit(&mut norm);
    let raw_norm = norm.total.sqrt();

    // squares of finite f32 values cannot overflow an f64 sum
    let non_finite = !raw_norm.is_finite();
    let norm_before_scale = if non_finite {
        // NaN -> 0, +-inf -> +-clip, then clip as usual
        let mut sanitize = Rescale { grads: &mut grads, scale: 1.0, sanitize: Some(clip), total: 0.0 };
        module.visit(&mut sanitize);
        sanitize.total.sqrt()
    } else {
        raw_norm
    };

    let clip_norm = clip as f64;
    let scale = if norm_before_scale > clip_norm {
        // shave two ulps so f32 rounding cannot land above the threshold
        clip_norm / norm_before_scale * (1.0 - 2.0 * f32::EPSILON as f64)
    } else {
        1.0
    };
    let mut rescale = Rescale { grads: &mut grads, scale: scale as f32, sanitize: None, total: 0.0 };
    module.visit(&mut rescale);

    let report = ClipReport {
        grad_norm: raw_norm as f32,
        clipped_norm: rescale.total.sqrt() as f32,
        non_finite,
    };
    (grads, report)
}

/// Sum of squares accumulated in f64 on the host.
fn squared_sum<B: Backend, const D: usize>(grad: Tensor<B, D>) -> f64 {
    grad.into_data()
        .iter::<f32>()
        .map(|v| v as f64 * v as f64)
        .sum()
}

struct SquaredNorm<'a> {
    grads: &'a GradientsParams,
    total: f64,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for SquaredNorm<'_> {
    fn visit_float<const D: usize>(&mut self, id: ParamId, _tensor: &Tensor<B, D>) {
        if let Some(grad) = self.grads.get::<B::InnerBackend, D>(id) {
            self.total += squared_sum(grad);
        }
    }
}

struct Rescale<'a> {
    grads: &'a mut GradientsParams,
    scale: f32,
    sanitize: Option<f32>,
    total: f64,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for Rescale<'_> {
    fn visit_float<const D: usize>(&mut self, id: ParamId, _tensor: &Tensor<B, D>) {
        let Some(grad) = self.grads.remove::<B::InnerBackend, D>(id) else {
            return;
        };
        let grad = match self.sanitize {
            Some(limit) => {
                let nan = grad.clone().is_nan();
                grad.mask_fill(nan, 0.0).clamp(-limit, limit)
            }
            None => grad,
        };
        let grad = if self.scale == 1.0 { grad } else { grad.mul_scalar(self.scale) };
        self.total += squared_sum(grad.clone());
        self.grads.register::<B::InnerBackend, D>(id, grad);
    }
}

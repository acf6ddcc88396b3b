//! Common Helper Functions
//!
//! Shared numeric utilities used by the model, the sampler and the commands.

use burn::tensor::{backend::Backend, Int, Tensor, TensorData};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Packs rows of symbol indices into a `[batch, seq]` index tensor.
///
/// Rows must already be validated to share one length.
pub fn create_batch_tensor<B: Backend>(rows: &[Vec<usize>], device: &B::Device) -> Tensor<B, 2, Int> {
    let seq_len = rows.first().map_or(0, Vec::len);
    let indices: Vec<i32> = rows.iter().flatten().map(|&symbol| symbol as i32).collect();

    Tensor::from_data(TensorData::new(indices, [rows.len(), seq_len]), device)
}

/// Numerically stable softmax over a logits row
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.iter().map(|x| x / sum).collect()
}

/// Picks an index with probability proportional to its weight.
///
/// Zero-weight entries are never picked. When the weights cannot form a
/// distribution (empty, all zero, negative or NaN) the arg-max of the finite
/// weights is returned, or 0 if there is none.
pub fn weighted_pick<R: Rng + ?Sized>(weights: &[f32], rng: &mut R) -> usize {
    match WeightedIndex::new(weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => weights
            .iter()
            .enumerate()
            .filter(|(_, w)| w.is_finite())
            .fold(None, |best: Option<(usize, f32)>, (i, &w)| match best {
                Some((_, b)) if b >= w => best,
                _ => Some((i, w)),
            })
            .map(|(i, _)| i)
            .unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_large_logits_stable() {
        let probs = softmax(&[1000.0, 1000.0, -1000.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!(probs[2] < 1e-6);
    }

    #[test]
    fn test_weighted_pick_single_mass() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert_eq!(weighted_pick(&[0.0, 1.0, 0.0], &mut rng), 1);
        }
    }

    #[test]
    fn test_weighted_pick_uniform_converges() {
        let mut rng = StdRng::seed_from_u64(42);
        let weights = [1.0 / 3.0; 3];
        let draws = 30_000;
        let mut counts = [0usize; 3];
        for _ in 0..draws {
            counts[weighted_pick(&weights, &mut rng)] += 1;
        }
        for count in counts {
            let freq = count as f64 / draws as f64;
            assert!((freq - 1.0 / 3.0).abs() < 0.02, "frequency {} too far from uniform", freq);
        }
    }

    #[test]
    fn test_weighted_pick_unnormalized_weights() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(weighted_pick(&[0.0, 0.0, 5.0], &mut rng), 2);
        }
    }

    #[test]
    fn test_weighted_pick_degenerate_weights() {
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(weighted_pick(&[0.0, 0.0, 0.0], &mut rng), 0);
        assert_eq!(weighted_pick(&[], &mut rng), 0);
        assert_eq!(weighted_pick(&[0.2, f32::NAN, 0.7], &mut rng), 2);
    }
}

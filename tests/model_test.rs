//! Model Integration Tests
//!
//! Single-step inference, state threading and greedy decoding.

mod common;

use charnn::model::CharRnn;
use charnn::StepModel;

#[test]
fn test_infer_step_returns_distribution() {
    let lm = common::test_model(common::test_model_config(6).with_training(false));

    let mut state = lm.zero_state(1);
    for symbol in [0, 3, 5, 1] {
        let (probs, next) = lm.infer_step(symbol, state).unwrap();
        state = next;

        assert_eq!(probs.len(), 6);
        assert!(probs.iter().all(|p| p.is_finite() && *p >= 0.0));
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "probabilities sum to {}", sum);
    }
}

#[test]
fn test_state_shape_is_invariant() {
    let lm = common::test_model(common::test_model_config(4).with_training(false));

    let mut state = lm.zero_state(1);
    assert_eq!(state.shape(), [2, 1, 8]);
    for _ in 0..5 {
        let (_, next) = lm.infer_step(2, state).unwrap();
        assert_eq!(next.shape(), [2, 1, 8]);
        state = next;
    }
}

#[test]
fn test_zero_state_is_zero() {
    let lm = common::test_model(common::test_model_config(4));
    let state = lm.zero_state(3);
    assert_eq!(state.shape(), [2, 3, 8]);
    assert!(state.to_vec().iter().all(|&v| v == 0.0));
}

#[test]
fn test_state_carries_context() {
    let lm = common::test_model(common::test_model_config(5).with_training(false));

    let (fresh, _) = lm.infer_step(1, lm.zero_state(1)).unwrap();
    let (_, warmed) = lm.infer_step(4, lm.zero_state(1)).unwrap();
    let (after_context, _) = lm.infer_step(1, warmed).unwrap();

    assert!(common::max_abs_diff(&fresh, &after_context) > 0.0);
}

#[test]
fn test_inference_model_matches_language_model() {
    let lm = common::test_model(common::test_model_config(5).with_training(false));
    let model: CharRnn<common::TestBackend> = lm.inference_model();

    let (a, _) = lm.infer_step(3, lm.zero_state(1)).unwrap();
    let (b, _) = StepModel::infer_step(&model, 3, model.zero_state(1)).unwrap();
    assert!(common::max_abs_diff(&a, &b) < 1e-6);
}

#[test]
fn test_decode_greedy() {
    let lm = common::test_model(common::test_model_config(5).with_training(false));

    let (symbols, state) = lm.decode_greedy(2, 6, lm.zero_state(1)).unwrap();
    assert_eq!(symbols.len(), 6);
    assert!(symbols.iter().all(|&s| s < 5));
    assert_eq!(state.shape(), [2, 1, 8]);

    // first prediction equals the arg-max of a single inference step
    let (probs, _) = lm.infer_step(2, lm.zero_state(1)).unwrap();
    let best = probs
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |acc, (i, &p)| if p > acc.1 { (i, p) } else { acc })
        .0;
    assert_eq!(symbols[0], best);
}

#[test]
fn test_decode_greedy_zero_steps() {
    let lm = common::test_model(common::test_model_config(5).with_training(false));
    let (symbols, _) = lm.decode_greedy(0, 0, lm.zero_state(1)).unwrap();
    assert!(symbols.is_empty());
}

#[test]
fn test_decode_greedy_rejects_out_of_vocab() {
    let lm = common::test_model(common::test_model_config(5).with_training(false));
    assert!(lm.decode_greedy(5, 3, lm.zero_state(1)).is_err());
}

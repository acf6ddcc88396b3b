use burn::{
    module::AutodiffModule,
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    tensor::{activation, backend::AutodiffBackend, ElementConversion, Int, Tensor},
};
use tracing::{debug, info, warn};

use super::clip::clip_by_global_norm;
use super::config::ModelConfig;
use super::lstm::RnnState;
use super::rnn::{CharRnn, InputFeed};
use super::traits::StepModel;
use crate::error::{CharnnError, Result};
use crate::helpers::create_batch_tensor;
use crate::utils::format_params;

pub(crate) type RnnOptimizer<B> =
    OptimizerAdaptor<Adam<<B as AutodiffBackend>::InnerBackend>, CharRnn<B>, B>;

type InnerState<B> = RnnState<<B as AutodiffBackend>::InnerBackend>;

/// Result of one optimization step. Tensors live on the inner (non-autodiff) backend.
#[derive(Debug, Clone)]
pub struct TrainStep<B: AutodiffBackend> {
    /// Mean negative log-likelihood over every position of the window
    pub loss: f32,
    /// State after the last timestep, detached from the graph
    pub state: InnerState<B>,
    /// Negative log-likelihood of each position, batch-major
    pub per_position_loss: Vec<f32>,
    /// `[batch * seq, vocab]`
    pub logits: Tensor<B::InnerBackend, 2>,
    /// Global gradient norm before clipping
    pub grad_norm: f32,
    /// Global gradient norm handed to the optimizer
    pub clipped_grad_norm: f32,
    /// Pre-clip norm was NaN or infinite
    pub numeric_instability: bool,
}

pub struct RecurrentLanguageModel<B: AutodiffBackend> {
    pub(crate) model: CharRnn<B>,
    pub(crate) optimizer: RnnOptimizer<B>,
    pub(crate) config: ModelConfig,
    pub(crate) learning_rate: f64,
    pub(crate) step: usize,
    pub(crate) device: B::Device,
}

impl<B: AutodiffBackend> RecurrentLanguageModel<B> {
    /// Builds a fresh model. In inference mode batch size and sequence length
    /// are forced to 1 whatever the config says.
    pub fn new(config: ModelConfig, device: B::Device) -> Result<Self> {
        config.validate()?;
        let mut config = config;
        if !config.training {
            config.batch_size = 1;
            config.sequence_length = 1;
        }

        let model = CharRnn::new(&config, &device);
        info!(
            parameters = %format_params(config.num_parameters()),
            hidden_size = config.hidden_size,
            layers_size = config.layers_size,
            training = config.training,
            "model initialized"
        );

        Ok(Self {
            model,
            optimizer: Self::build_optimizer(),
            learning_rate: config.learning_rate,
            config,
            step: 0,
            device,
        })
    }

    pub(crate) fn build_optimizer() -> RnnOptimizer<B> {
        AdamConfig::new().with_epsilon(1e-8).init()
    }

    /// One teacher-forced forward pass, clipped backward pass and Adam update.
    ///
    /// `input` and `target` are `[batch_size][sequence_length]` symbol indices.
    /// Every check runs before any tensor is built, so a rejected call leaves
    /// parameters, optimizer moments and counters untouched.
    pub fn train_step(
        &mut self,
        input: &[Vec<usize>],
        target: &[Vec<usize>],
        state: InnerState<B>,
    ) -> Result<TrainStep<B>> {
        self.check_window("input", input)?;
        self.check_window("target", target)?;
        self.check_state(&state, self.config.batch_size)?;

        let input = create_batch_tensor::<B>(input, &self.device);
        let targets = create_batch_tensor::<B>(target, &self.device);

        let (logits, next_state) = self.model.forward(input, RnnState::from_inner(state));
        let per_position = Self::per_position_loss(logits.clone(), targets);
        let loss = per_position.clone().mean();
        let loss_value: f32 = loss.clone().into_scalar().elem();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        let (grads, report) =
            clip_by_global_norm::<B, _>(&self.model, grads, self.config.gradient_clip);

        if report.non_finite {
            warn!(
                step = self.step,
                grad_norm = report.grad_norm,
                "non-finite gradient norm, applying sanitized clipped gradients"
            );
        }

        self.model = self
            .optimizer
            .step(self.learning_rate, self.model.clone(), grads);
        self.step += 1;

        debug!(
            step = self.step,
            loss = loss_value,
            grad_norm = report.grad_norm,
            clipped = report.clipped_norm,
            "train step"
        );

        Ok(TrainStep {
            loss: loss_value,
            state: next_state.detach().inner(),
            per_position_loss: per_position.inner().into_data().iter::<f32>().collect(),
            logits: logits.inner(),
            grad_norm: report.grad_norm,
            clipped_grad_norm: report.clipped_norm,
            numeric_instability: report.non_finite,
        })
    }

    /// Negative log-likelihood of the target symbol at every position.
    fn per_position_loss(logits: Tensor<B, 2>, targets: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        let [positions, _] = logits.dims();
        let targets = targets.reshape([positions, 1]);

        // log-softmax, not log(softmax), so large logits stay finite
        let log_probs = activation::log_softmax(logits, 1);
        log_probs.gather(1, targets).reshape([positions]).neg()
    }

    fn check_window(&self, name: &str, window: &[Vec<usize>]) -> Result<()> {
        let batch = self.config.batch_size;
        let seq = self.config.sequence_length;

        if window.len() != batch || window.iter().any(|row| row.len() != seq) {
            let got = match window.iter().find(|row| row.len() != seq) {
                Some(row) => format!("{} row of length {}", name, row.len()),
                None => format!("{} [{}, {}]", name, window.len(), seq),
            };
            return Err(CharnnError::ShapeMismatch {
                expected: format!("{} [{}, {}]", name, batch, seq),
                got,
            });
        }

        let vocab_size = self.config.vocab_size;
        if let Some(&index) = window.iter().flatten().find(|&&idx| idx >= vocab_size) {
            return Err(CharnnError::OutOfVocabulary { index, vocab_size });
        }
        Ok(())
    }

    fn check_state(&self, state: &InnerState<B>, batch_size: usize) -> Result<()> {
        let expected = [self.config.layers_size, batch_size, self.config.hidden_size];
        let got = state.shape();
        if got != expected {
            return Err(CharnnError::ShapeMismatch {
                expected: format!("state {:?}", expected),
                got: format!("state {:?}", got),
            });
        }
        Ok(())
    }

    /// All-zero state for `batch_size` parallel sequences.
    pub fn zero_state(&self, batch_size: usize) -> InnerState<B> {
        RnnState::zeros(
            self.config.layers_size,
            self.config.hidden_size,
            batch_size,
            &self.device,
        )
    }

    /// Single-symbol inference against the current parameters.
    ///
    /// Builds a gradient-free view of the module on every call. For long
    /// sampling runs take `inference_model()` once and drive that instead.
    pub fn infer_step(&self, symbol: usize, state: InnerState<B>) -> Result<(Vec<f32>, InnerState<B>)> {
        self.model.valid().infer_step(symbol, state)
    }

    /// Closed-loop greedy decoding: `symbol` feeds the first step, the arg-max
    /// of each step's prediction feeds the next. Returns the `steps` predicted
    /// symbols and the final state.
    pub fn decode_greedy(
        &self,
        symbol: usize,
        steps: usize,
        state: InnerState<B>,
    ) -> Result<(Vec<usize>, InnerState<B>)> {
        let vocab_size = self.config.vocab_size;
        if symbol >= vocab_size {
            return Err(CharnnError::OutOfVocabulary { index: symbol, vocab_size });
        }
        self.check_state(&state, 1)?;
        if steps == 0 {
            return Ok((Vec::new(), state));
        }

        let model = self.model.valid().with_feed(InputFeed::SelfFed);
        let mut column = vec![0i32; steps];
        column[0] = symbol as i32;
        let input: Tensor<B::InnerBackend, 2, Int> =
            Tensor::<B::InnerBackend, 1, Int>::from_ints(column.as_slice(), &self.device)
                .reshape([1, steps]);

        let (logits, state) = model.forward(input, state);
        Ok((CharRnn::greedy_symbols(logits), state))
    }

    /// Gradient-free copy of the current parameters, the model to hand to a
    /// `Sampler`. Later training steps do not affect it.
    pub fn inference_model(&self) -> CharRnn<B::InnerBackend> {
        self.model.valid()
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub fn learning_rate(&self) -> f64 { self.learning_rate }
    pub fn step(&self) -> usize { self.step }
    pub fn config(&self) -> &ModelConfig { &self.config }
    pub fn model(&self) -> &CharRnn<B> { &self.model }
    pub fn device(&self) -> &B::Device { &self.device }
}

impl<B: AutodiffBackend> StepModel for RecurrentLanguageModel<B> {
    type Backend = B::InnerBackend;

    fn vocab_size(&self) -> usize {
        self.config.vocab_size
    }

    fn zero_state(&self, batch_size: usize) -> RnnState<Self::Backend> {
        RecurrentLanguageModel::zero_state(self, batch_size)
    }

    fn infer_step(
        &self,
        symbol: usize,
        state: RnnState<Self::Backend>,
    ) -> Result<(Vec<f32>, RnnState<Self::Backend>)> {
        RecurrentLanguageModel::infer_step(self, symbol, state)
    }
}

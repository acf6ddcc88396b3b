//! LSTM cell, layer stack and recurrent state

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{activation, backend::AutodiffBackend, backend::Backend, Tensor},
};

// ============================================================
// RECURRENT STATE
// ============================================================

#[derive(Clone, Debug)]
pub struct LstmState<B: Backend> {
    /// Memory cell `c`, `[batch, hidden]`
    pub cell: Tensor<B, 2>,
    /// Hidden output `h`, `[batch, hidden]`
    pub hidden: Tensor<B, 2>,
}

impl<B: Backend> LstmState<B> {
    pub fn zeros(batch_size: usize, hidden_size: usize, device: &B::Device) -> Self {
        Self {
            cell: Tensor::zeros([batch_size, hidden_size], device),
            hidden: Tensor::zeros([batch_size, hidden_size], device),
        }
    }

    pub fn detach(self) -> Self {
        Self {
            cell: self.cell.detach(),
            hidden: self.hidden.detach(),
        }
    }
}

/// Per-layer states of the whole stack, ordered bottom to top.
#[derive(Clone, Debug)]
pub struct RnnState<B: Backend> {
    pub layers: Vec<LstmState<B>>,
}

impl<B: Backend> RnnState<B> {
    pub fn zeros(layers_size: usize, hidden_size: usize, batch_size: usize, device: &B::Device) -> Self {
        Self {
            layers: (0..layers_size)
                .map(|_| LstmState::zeros(batch_size, hidden_size, device))
                .collect(),
        }
    }

    /// `[layers, batch, hidden]`
    pub fn shape(&self) -> [usize; 3] {
        match self.layers.first() {
            Some(layer) => {
                let [batch, hidden] = layer.hidden.dims();
                [self.layers.len(), batch, hidden]
            }
            None => [0, 0, 0],
        }
    }

    pub fn batch_size(&self) -> usize {
        self.shape()[1]
    }

    pub fn detach(self) -> Self {
        Self {
            layers: self.layers.into_iter().map(LstmState::detach).collect(),
        }
    }

    /// Flattened `(c, h)` values of every layer, for inspection and comparison.
    pub fn to_vec(&self) -> Vec<f32> {
        self.layers
            .iter()
            .flat_map(|layer| {
                let cell: Vec<f32> = layer.cell.to_data().iter::<f32>().collect();
                let hidden: Vec<f32> = layer.hidden.to_data().iter::<f32>().collect();
                cell.into_iter().chain(hidden)
            })
            .collect()
    }
}

impl<B: AutodiffBackend> RnnState<B> {
    /// Lifts a plain state into the autodiff graph as a constant.
    pub fn from_inner(state: RnnState<B::InnerBackend>) -> Self {
        Self {
            layers: state
                .layers
                .into_iter()
                .map(|layer| LstmState {
                    cell: Tensor::from_inner(layer.cell),
                    hidden: Tensor::from_inner(layer.hidden),
                })
                .collect(),
        }
    }

    /// Drops the graph and returns the plain state.
    pub fn inner(self) -> RnnState<B::InnerBackend> {
        RnnState {
            layers: self
                .layers
                .into_iter()
                .map(|layer| LstmState {
                    cell: layer.cell.inner(),
                    hidden: layer.hidden.inner(),
                })
                .collect(),
        }
    }
}

// ============================================================
// LSTM CELL
// ============================================================

#[derive(Module, Debug)]
pub struct LstmCell<B: Backend> {
    /// `[input, 4 * hidden]` with the gate bias
    input_gates: Linear<B>,
    /// `[hidden, 4 * hidden]`, no bias
    hidden_gates: Linear<B>,
    hidden_size: usize,
    forget_bias: f32,
}

impl<B: Backend> LstmCell<B> {
    pub fn new(input_size: usize, hidden_size: usize, forget_bias: f32, device: &B::Device) -> Self {
        Self {
            input_gates: LinearConfig::new(input_size, 4 * hidden_size).init(device),
            hidden_gates: LinearConfig::new(hidden_size, 4 * hidden_size)
                .with_bias(false)
                .init(device),
            hidden_size,
            forget_bias,
        }
    }

    /// One timestep. Gate order in the fused projection is `i, j, f, o`.
    pub fn forward(&self, x: Tensor<B, 2>, state: LstmState<B>) -> LstmState<B> {
        let gates = self.input_gates.forward(x) + self.hidden_gates.forward(state.hidden);

        let input_gate = activation::sigmoid(self.gate(&gates, 0));
        let candidate = self.gate(&gates, 1).tanh();
        let forget_gate = activation::sigmoid(self.gate(&gates, 2).add_scalar(self.forget_bias));
        let output_gate = activation::sigmoid(self.gate(&gates, 3));

        let cell = forget_gate * state.cell + input_gate * candidate;
        let hidden = output_gate * cell.clone().tanh();

        LstmState { cell, hidden }
    }

    fn gate(&self, gates: &Tensor<B, 2>, k: usize) -> Tensor<B, 2> {
        let [batch, _] = gates.dims();
        let h = self.hidden_size;
        gates.clone().slice([0..batch, k * h..(k + 1) * h])
    }
}

// ============================================================
// STACK
// ============================================================

/// Cells composed so that each timestep runs every layer before advancing.
#[derive(Module, Debug)]
pub struct StackedLstm<B: Backend> {
    cells: Vec<LstmCell<B>>,
}

impl<B: Backend> StackedLstm<B> {
    pub fn new(layers_size: usize, hidden_size: usize, forget_bias: f32, device: &B::Device) -> Self {
        Self {
            cells: (0..layers_size)
                .map(|_| LstmCell::new(hidden_size, hidden_size, forget_bias, device))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the top layer's hidden output and the updated stack state.
    pub fn forward(&self, x: Tensor<B, 2>, state: RnnState<B>) -> (Tensor<B, 2>, RnnState<B>) {
        let mut input = x;
        let mut layers = Vec::with_capacity(self.cells.len());

        for (cell, layer_state) in self.cells.iter().zip(state.layers) {
            let next = cell.forward(input, layer_state);
            input = next.hidden.clone();
            layers.push(next);
        }

        (input, RnnState { layers })
    }
}

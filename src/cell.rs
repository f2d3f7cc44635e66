use ndarray::Array1;

use crate::activations::{SoftmaxMode, sigmoid_vec, softmax, tanh_vec};
use crate::error::{LstmError, LstmResult};
use crate::params::{Gate, Parameters};

/// Recurrent state carried between timesteps of one window.
#[derive(Debug, Clone, PartialEq)]
pub struct LstmState {
    pub cell: Array1<f64>,
    pub hidden: Array1<f64>,
}

impl LstmState {
    pub fn zeros(hidden_size: usize) -> Self {
        LstmState {
            cell: Array1::zeros(hidden_size),
            hidden: Array1::zeros(hidden_size),
        }
    }
}

/// Everything one forward step produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub candidate: Array1<f64>,
    pub input_gate: Array1<f64>,
    pub forget_gate: Array1<f64>,
    pub output_gate: Array1<f64>,
    pub cell: Array1<f64>,
    pub hidden: Array1<f64>,
    pub probabilities: Array1<f64>,
}

impl Step {
    /// The state to feed into the next timestep.
    pub fn state(&self) -> LstmState {
        LstmState {
            cell: self.cell.clone(),
            hidden: self.hidden.clone(),
        }
    }
}

fn preactivation(params: &Parameters, gate: Gate, input: &Array1<f64>, hidden: &Array1<f64>) -> Array1<f64> {
    let p = params.gate(gate);
    p.input_weights.dot(input) + p.recurrent_weights.dot(hidden) + &p.bias
}

/// One timestep of the cell followed by the softmax classifier.
///
/// ```text
/// a  = tanh(Wa x + Ra h + ba)      i = σ(Wi x + Ri h + bi)
/// f  = σ(Wf x + Rf h + bf)         o = σ(Wo x + Ro h + bo)
/// c' = a ⊙ i + f ⊙ c               h' = tanh(c') ⊙ o
/// p  = softmax(Wy h' + by)
/// ```
pub fn forward(
    params: &Parameters,
    input: &Array1<f64>,
    state: &LstmState,
    softmax_mode: SoftmaxMode,
) -> LstmResult<Step> {
    let (hidden_size, vocab_size) = (params.hidden_size(), params.vocab_size());
    if input.len() != vocab_size {
        return Err(LstmError::shape("input", &[vocab_size], &[input.len()]));
    }
    if state.cell.len() != hidden_size || state.hidden.len() != hidden_size {
        return Err(LstmError::shape(
            "recurrent state",
            &[hidden_size, hidden_size],
            &[state.cell.len(), state.hidden.len()],
        ));
    }

    let candidate = tanh_vec(&preactivation(params, Gate::Candidate, input, &state.hidden));
    let input_gate = sigmoid_vec(&preactivation(params, Gate::Input, input, &state.hidden));
    let forget_gate = sigmoid_vec(&preactivation(params, Gate::Forget, input, &state.hidden));
    let output_gate = sigmoid_vec(&preactivation(params, Gate::Output, input, &state.hidden));

    let cell = &candidate * &input_gate + &forget_gate * &state.cell;
    let hidden = tanh_vec(&cell) * &output_gate;

    let logits = params.output_weights.dot(&hidden) + &params.output_bias;
    let probabilities = softmax(&logits, softmax_mode);

    Ok(Step {
        candidate,
        input_gate,
        forget_gate,
        output_gate,
        cell,
        hidden,
        probabilities,
    })
}

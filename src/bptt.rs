use ndarray::{Array1, Array2, Axis};

use crate::error::LstmResult;
use crate::params::{Gate, Parameters};
use crate::trajectory::Trajectory;

/// Gradient accumulators share the parameter layout one-to-one.
pub type Gradients = Parameters;

/// Error signal at the pre-activation of each gate for one timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDeltas {
    pub candidate: Array1<f64>,
    pub input: Array1<f64>,
    pub forget: Array1<f64>,
    pub output: Array1<f64>,
}

impl GateDeltas {
    pub fn get(&self, gate: Gate) -> &Array1<f64> {
        match gate {
            Gate::Candidate => &self.candidate,
            Gate::Input => &self.input,
            Gate::Forget => &self.forget,
            Gate::Output => &self.output,
        }
    }
}

/// `acc += a ⊗ b`
fn add_outer(acc: &mut Array2<f64>, a: &Array1<f64>, b: &Array1<f64>) {
    let column = a.view().insert_axis(Axis(1));
    let row = b.view().insert_axis(Axis(0));
    *acc += &column.dot(&row);
}

/// Gradient reaching the cell state at step `t`.
///
/// `carried` is the cell gradient of step `t+1` together with that step's
/// forget gate, or `None` when `t` is the last step of the window.
pub fn cell_delta(
    d_hidden: &Array1<f64>,
    output_gate: &Array1<f64>,
    cell: &Array1<f64>,
    carried: Option<(&Array1<f64>, &Array1<f64>)>,
) -> Array1<f64> {
    let local = d_hidden * output_gate * &cell.mapv(|c| 1.0 - c.tanh().powi(2));
    match carried {
        Some((d_cell_next, forget_next)) => local + d_cell_next * forget_next,
        None => local,
    }
}

/// Gate deltas for step `t` given the hidden and cell gradients there.
/// At `t == 0` the forget delta is zero: no earlier cell exists in the window.
pub fn gate_deltas(
    trajectory: &Trajectory,
    t: usize,
    d_hidden: &Array1<f64>,
    d_cell: &Array1<f64>,
) -> GateDeltas {
    let candidate = &trajectory.candidate[t];
    let input_gate = &trajectory.input_gate[t];
    let forget_gate = &trajectory.forget_gate[t];
    let output_gate = &trajectory.output_gate[t];
    let sigmoid_slope = |g: &Array1<f64>| g.mapv(|x| x * (1.0 - x));

    let forget = if t == 0 {
        Array1::zeros(d_cell.len())
    } else {
        d_cell * &trajectory.cell[t - 1] * &sigmoid_slope(forget_gate)
    };

    GateDeltas {
        candidate: d_cell * input_gate * &candidate.mapv(|a| 1.0 - a * a),
        input: d_cell * candidate * &sigmoid_slope(input_gate),
        forget,
        output: d_hidden * &trajectory.cell[t].mapv(f64::tanh) * &sigmoid_slope(output_gate),
    }
}

/// Accumulates unclipped gradients of the summed window loss, walking from the
/// last step back through at most `lookback` steps.
pub fn gradients(params: &Parameters, trajectory: &Trajectory, lookback: usize) -> LstmResult<Gradients> {
    let (hidden_size, vocab_size) = (params.hidden_size(), params.vocab_size());
    let steps = trajectory.validate(hidden_size, vocab_size)?;
    let stop = steps.saturating_sub(lookback);

    let mut grads = Parameters::zeros(hidden_size, vocab_size);
    let mut carried_hidden = Array1::<f64>::zeros(hidden_size);
    let mut carried_cell = Array1::<f64>::zeros(hidden_size);

    for t in (stop..steps).rev() {
        // softmax + cross-entropy
        let mut d_logits = trajectory.probabilities[t].clone();
        d_logits[trajectory.labels[t]] -= 1.0;

        add_outer(&mut grads.output_weights, &d_logits, &trajectory.hidden[t]);
        grads.output_bias += &d_logits;

        let d_hidden = params.output_weights.t().dot(&d_logits) + &carried_hidden;
        let carried = trajectory.forget_gate.get(t + 1).map(|f_next| (&carried_cell, f_next));
        let d_cell = cell_delta(&d_hidden, &trajectory.output_gate[t], &trajectory.cell[t], carried);

        let deltas = gate_deltas(trajectory, t, &d_hidden, &d_cell);

        carried_hidden = Array1::zeros(hidden_size);
        for gate in Gate::ALL {
            let delta = deltas.get(gate);
            carried_hidden += &params.gate(gate).recurrent_weights.t().dot(delta);

            let acc = grads.gate_mut(gate);
            add_outer(&mut acc.input_weights, delta, &trajectory.inputs[t]);
            if t > 0 {
                add_outer(&mut acc.recurrent_weights, delta, &trajectory.hidden[t - 1]);
            }
            acc.bias += delta;
        }

        carried_cell = d_cell;
    }

    log::trace!("bptt covered steps {stop}..{steps}");
    Ok(grads)
}

/// Clamps every gradient entry to `[-threshold, threshold]`.
pub fn clip_gradients(grads: &mut Gradients, threshold: f64) {
    grads.clamp(threshold);
}

/// One truncated-BPTT update: accumulate, clip, then a single gradient-descent
/// step on every parameter. The trajectory is left untouched and `params` is
/// only written once every gradient is ready.
pub fn backward(
    params: &mut Parameters,
    trajectory: &Trajectory,
    lookback: usize,
    learning_rate: f64,
    clip_threshold: f64,
) -> LstmResult<()> {
    let mut grads = gradients(params, trajectory, lookback)?;
    clip_gradients(&mut grads, clip_threshold);
    params.apply_gradients(&grads, learning_rate)
}

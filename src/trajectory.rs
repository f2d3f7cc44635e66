use itertools::izip;
use ndarray::Array1;

use crate::activations::{SoftmaxMode, cross_entropy};
use crate::cell::{LstmState, Step, forward};
use crate::error::{LstmError, LstmResult};
use crate::params::Parameters;

/// Forward-pass snapshots of one training window, stored column by column.
///
/// Entry `t` of every column belongs to timestep `t`. `push` keeps the columns
/// aligned; code that fills the columns directly must keep them aligned too,
/// `validate` rejects anything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub candidate: Vec<Array1<f64>>,
    pub input_gate: Vec<Array1<f64>>,
    pub forget_gate: Vec<Array1<f64>>,
    pub output_gate: Vec<Array1<f64>>,
    pub hidden: Vec<Array1<f64>>,
    pub cell: Vec<Array1<f64>>,
    pub inputs: Vec<Array1<f64>>,
    pub probabilities: Vec<Array1<f64>>,
    /// Index of the symbol that actually followed each input.
    pub labels: Vec<usize>,
}

impl Trajectory {
    pub fn new() -> Self {
        Trajectory::default()
    }

    pub fn with_capacity(steps: usize) -> Self {
        Trajectory {
            candidate: Vec::with_capacity(steps),
            input_gate: Vec::with_capacity(steps),
            forget_gate: Vec::with_capacity(steps),
            output_gate: Vec::with_capacity(steps),
            hidden: Vec::with_capacity(steps),
            cell: Vec::with_capacity(steps),
            inputs: Vec::with_capacity(steps),
            probabilities: Vec::with_capacity(steps),
            labels: Vec::with_capacity(steps),
        }
    }

    pub fn push(&mut self, input: Array1<f64>, step: Step, label: usize) {
        self.candidate.push(step.candidate);
        self.input_gate.push(step.input_gate);
        self.forget_gate.push(step.forget_gate);
        self.output_gate.push(step.output_gate);
        self.hidden.push(step.hidden);
        self.cell.push(step.cell);
        self.inputs.push(input);
        self.probabilities.push(step.probabilities);
        self.labels.push(label);
    }

    /// Number of timesteps, taken from the label column.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Checks every column has one entry per timestep with the expected width,
    /// and every label is a valid class. Returns the number of timesteps.
    pub fn validate(&self, hidden_size: usize, vocab_size: usize) -> LstmResult<usize> {
        let steps = self.len();
        let columns: [(&str, &Vec<Array1<f64>>, usize); 8] = [
            ("candidate", &self.candidate, hidden_size),
            ("input_gate", &self.input_gate, hidden_size),
            ("forget_gate", &self.forget_gate, hidden_size),
            ("output_gate", &self.output_gate, hidden_size),
            ("hidden", &self.hidden, hidden_size),
            ("cell", &self.cell, hidden_size),
            ("inputs", &self.inputs, vocab_size),
            ("probabilities", &self.probabilities, vocab_size),
        ];

        for (name, column, width) in columns {
            if column.len() != steps {
                return Err(LstmError::MalformedTrajectory(format!(
                    "column {name} has {} entries but there are {steps} labels",
                    column.len()
                )));
            }
            if let Some((t, v)) = column.iter().enumerate().find(|(_, v)| v.len() != width) {
                return Err(LstmError::MalformedTrajectory(format!(
                    "column {name} at step {t} has width {}, expected {width}",
                    v.len()
                )));
            }
        }

        if let Some((t, label)) = self.labels.iter().enumerate().find(|&(_, &l)| l >= vocab_size) {
            return Err(LstmError::MalformedTrajectory(format!(
                "label {label} at step {t} is outside a vocabulary of {vocab_size}"
            )));
        }

        Ok(steps)
    }

    /// Runs the forward engine over `symbols` from a zero state, recording each
    /// step against the symbol that followed it in `labels`.
    pub fn record(
        params: &Parameters,
        symbols: &[usize],
        labels: &[usize],
        softmax_mode: SoftmaxMode,
    ) -> LstmResult<Self> {
        if symbols.len() != labels.len() {
            return Err(LstmError::MalformedTrajectory(format!(
                "{} inputs but {} labels",
                symbols.len(),
                labels.len()
            )));
        }
        let vocab_size = params.vocab_size();
        let mut trajectory = Trajectory::with_capacity(symbols.len());
        let mut state = LstmState::zeros(params.hidden_size());

        for (&symbol, &label) in symbols.iter().zip(labels) {
            if symbol >= vocab_size || label >= vocab_size {
                return Err(LstmError::MalformedTrajectory(format!(
                    "symbol {symbol} -> {label} outside a vocabulary of {vocab_size}"
                )));
            }
            let mut input = Array1::zeros(vocab_size);
            input[symbol] = 1.0;
            let step = forward(params, &input, &state, softmax_mode)?;
            state = step.state();
            trajectory.push(input, step, label);
        }
        Ok(trajectory)
    }

    /// Sum of per-step cross-entropy losses over the window.
    pub fn total_loss(&self) -> f64 {
        izip!(&self.probabilities, &self.labels)
            .map(|(p, &label)| cross_entropy(p, label))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_step_trajectory() -> Trajectory {
        let params = Parameters::zeros(2, 3);
        Trajectory::record(&params, &[0, 1], &[1, 2], SoftmaxMode::Raw).unwrap()
    }

    #[test]
    fn test_push_keeps_columns_aligned() {
        let trajectory = two_step_trajectory();
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.validate(2, 3).unwrap(), 2);
    }

    #[test]
    fn test_total_loss_of_uniform_predictions() {
        let trajectory = two_step_trajectory();
        assert!((trajectory.total_loss() - 2.0 * 3f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_validate_catches_short_column() {
        let mut trajectory = two_step_trajectory();
        trajectory.forget_gate.pop();
        assert!(matches!(
            trajectory.validate(2, 3),
            Err(LstmError::MalformedTrajectory(_))
        ));
    }

    #[test]
    fn test_validate_catches_wrong_width_and_label() {
        let mut trajectory = two_step_trajectory();
        trajectory.hidden[1] = array![0.0, 0.0, 0.0];
        assert!(trajectory.validate(2, 3).is_err());

        let mut trajectory = two_step_trajectory();
        trajectory.labels[0] = 3;
        assert!(trajectory.validate(2, 3).is_err());
    }

    #[test]
    fn test_record_rejects_out_of_range_symbols() {
        let params = Parameters::zeros(2, 3);
        assert!(Trajectory::record(&params, &[0, 3], &[1, 2], SoftmaxMode::Raw).is_err());
        assert!(Trajectory::record(&params, &[0], &[1, 2], SoftmaxMode::Raw).is_err());
    }
}

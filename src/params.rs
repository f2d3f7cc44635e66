use std::fmt;

use ndarray::{Array1, Array2, ArrayViewD, ArrayViewMutD};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::error::{LstmError, LstmResult};

/// The four gates of the cell. The candidate activation is counted as a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    Candidate,
    Input,
    Forget,
    Output,
}

impl Gate {
    pub const ALL: [Gate; 4] = [Gate::Candidate, Gate::Input, Gate::Forget, Gate::Output];

    pub fn code(self) -> char {
        match self {
            Gate::Candidate => 'a',
            Gate::Input => 'i',
            Gate::Forget => 'f',
            Gate::Output => 'o',
        }
    }
}

/// Identifies one of the fourteen parameter tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TensorKind {
    InputWeights(Gate),
    RecurrentWeights(Gate),
    Bias(Gate),
    OutputWeights,
    OutputBias,
}

impl TensorKind {
    /// Canonical order, also the order tensors are written to disk.
    pub const ALL: [TensorKind; 14] = [
        TensorKind::InputWeights(Gate::Candidate),
        TensorKind::InputWeights(Gate::Input),
        TensorKind::InputWeights(Gate::Forget),
        TensorKind::InputWeights(Gate::Output),
        TensorKind::RecurrentWeights(Gate::Candidate),
        TensorKind::RecurrentWeights(Gate::Input),
        TensorKind::RecurrentWeights(Gate::Forget),
        TensorKind::RecurrentWeights(Gate::Output),
        TensorKind::Bias(Gate::Candidate),
        TensorKind::Bias(Gate::Input),
        TensorKind::Bias(Gate::Forget),
        TensorKind::Bias(Gate::Output),
        TensorKind::OutputWeights,
        TensorKind::OutputBias,
    ];

    /// Two-letter tensor name, e.g. `Wa`, `Rf`, `bo`, `Wy`.
    pub fn name(self) -> String {
        match self {
            TensorKind::InputWeights(g) => format!("W{}", g.code()),
            TensorKind::RecurrentWeights(g) => format!("R{}", g.code()),
            TensorKind::Bias(g) => format!("b{}", g.code()),
            TensorKind::OutputWeights => "Wy".to_string(),
            TensorKind::OutputBias => "by".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<TensorKind> {
        TensorKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// `(rows, cols)`; bias vectors are a single column.
    pub fn shape(self, hidden_size: usize, vocab_size: usize) -> (usize, usize) {
        match self {
            TensorKind::InputWeights(_) => (hidden_size, vocab_size),
            TensorKind::RecurrentWeights(_) => (hidden_size, hidden_size),
            TensorKind::Bias(_) => (hidden_size, 1),
            TensorKind::OutputWeights => (vocab_size, hidden_size),
            TensorKind::OutputBias => (vocab_size, 1),
        }
    }

    fn position(self) -> usize {
        TensorKind::ALL
            .iter()
            .position(|&kind| kind == self)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for TensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateParams {
    /// [hidden_size, vocab_size], applied to the one-hot input
    pub input_weights: Array2<f64>,
    /// [hidden_size, hidden_size], applied to the previous hidden state
    pub recurrent_weights: Array2<f64>,
    pub bias: Array1<f64>,
}

impl GateParams {
    fn zeros(hidden_size: usize, vocab_size: usize) -> Self {
        GateParams {
            input_weights: Array2::zeros((hidden_size, vocab_size)),
            recurrent_weights: Array2::zeros((hidden_size, hidden_size)),
            bias: Array1::zeros(hidden_size),
        }
    }
}

/// Every weight and bias of the cell and its output projection.
///
/// The same type doubles as the gradient accumulator in the backward pass,
/// since each gradient has exactly the shape of its parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub candidate: GateParams,
    pub input: GateParams,
    pub forget: GateParams,
    pub output: GateParams,
    /// [vocab_size, hidden_size]
    pub output_weights: Array2<f64>,
    pub output_bias: Array1<f64>,
}

impl Parameters {
    pub fn zeros(hidden_size: usize, vocab_size: usize) -> Self {
        Parameters {
            candidate: GateParams::zeros(hidden_size, vocab_size),
            input: GateParams::zeros(hidden_size, vocab_size),
            forget: GateParams::zeros(hidden_size, vocab_size),
            output: GateParams::zeros(hidden_size, vocab_size),
            output_weights: Array2::zeros((vocab_size, hidden_size)),
            output_bias: Array1::zeros(vocab_size),
        }
    }

    /// Draws every value independently from `U[-init_range, init_range]`.
    pub fn random<R: Rng + ?Sized>(
        hidden_size: usize,
        vocab_size: usize,
        init_range: f64,
        rng: &mut R,
    ) -> LstmResult<Self> {
        let dist = Uniform::new_inclusive(-init_range, init_range).map_err(|e| {
            LstmError::InvalidConfig(format!("init range {init_range}: {e}"))
        })?;

        let mut params = Parameters::zeros(hidden_size, vocab_size);
        for (_, mut tensor) in params.tensors_mut() {
            tensor.map_inplace(|x| *x = dist.sample(&mut *rng));
        }
        Ok(params)
    }

    pub fn hidden_size(&self) -> usize {
        self.candidate.bias.len()
    }

    pub fn vocab_size(&self) -> usize {
        self.output_bias.len()
    }

    pub fn gate(&self, gate: Gate) -> &GateParams {
        match gate {
            Gate::Candidate => &self.candidate,
            Gate::Input => &self.input,
            Gate::Forget => &self.forget,
            Gate::Output => &self.output,
        }
    }

    pub fn gate_mut(&mut self, gate: Gate) -> &mut GateParams {
        match gate {
            Gate::Candidate => &mut self.candidate,
            Gate::Input => &mut self.input,
            Gate::Forget => &mut self.forget,
            Gate::Output => &mut self.output,
        }
    }

    pub fn tensor(&self, kind: TensorKind) -> ArrayViewD<'_, f64> {
        match kind {
            TensorKind::InputWeights(g) => self.gate(g).input_weights.view().into_dyn(),
            TensorKind::RecurrentWeights(g) => self.gate(g).recurrent_weights.view().into_dyn(),
            TensorKind::Bias(g) => self.gate(g).bias.view().into_dyn(),
            TensorKind::OutputWeights => self.output_weights.view().into_dyn(),
            TensorKind::OutputBias => self.output_bias.view().into_dyn(),
        }
    }

    pub fn tensor_mut(&mut self, kind: TensorKind) -> ArrayViewMutD<'_, f64> {
        match kind {
            TensorKind::InputWeights(g) => self.gate_mut(g).input_weights.view_mut().into_dyn(),
            TensorKind::RecurrentWeights(g) => self.gate_mut(g).recurrent_weights.view_mut().into_dyn(),
            TensorKind::Bias(g) => self.gate_mut(g).bias.view_mut().into_dyn(),
            TensorKind::OutputWeights => self.output_weights.view_mut().into_dyn(),
            TensorKind::OutputBias => self.output_bias.view_mut().into_dyn(),
        }
    }

    /// All tensors in canonical order.
    pub fn tensors(&self) -> Vec<(TensorKind, ArrayViewD<'_, f64>)> {
        TensorKind::ALL
            .into_iter()
            .map(|kind| (kind, self.tensor(kind)))
            .collect()
    }

    /// All tensors in canonical order, mutably.
    pub fn tensors_mut(&mut self) -> Vec<(TensorKind, ArrayViewMutD<'_, f64>)> {
        let Parameters {
            candidate,
            input,
            forget,
            output,
            output_weights,
            output_bias,
        } = self;

        let mut entries = Vec::with_capacity(TensorKind::ALL.len());
        for (gate, params) in [
            (Gate::Candidate, candidate),
            (Gate::Input, input),
            (Gate::Forget, forget),
            (Gate::Output, output),
        ] {
            let GateParams {
                input_weights,
                recurrent_weights,
                bias,
            } = params;
            entries.push((TensorKind::InputWeights(gate), input_weights.view_mut().into_dyn()));
            entries.push((
                TensorKind::RecurrentWeights(gate),
                recurrent_weights.view_mut().into_dyn(),
            ));
            entries.push((TensorKind::Bias(gate), bias.view_mut().into_dyn()));
        }
        entries.push((TensorKind::OutputWeights, output_weights.view_mut().into_dyn()));
        entries.push((TensorKind::OutputBias, output_bias.view_mut().into_dyn()));

        entries.sort_by_key(|(kind, _)| kind.position());
        entries
    }

    /// Clamps every entry to `[-threshold, threshold]`.
    pub fn clamp(&mut self, threshold: f64) {
        for (_, mut tensor) in self.tensors_mut() {
            tensor.mapv_inplace(|x| x.clamp(-threshold, threshold));
        }
    }

    /// Plain gradient descent: `param -= learning_rate * grad` for every tensor.
    pub fn apply_gradients(&mut self, grads: &Parameters, learning_rate: f64) -> LstmResult<()> {
        self.check_same_shape(grads)?;
        for ((_, mut param), (_, grad)) in self.tensors_mut().into_iter().zip(grads.tensors()) {
            param.scaled_add(-learning_rate, &grad);
        }
        Ok(())
    }

    pub fn check_same_shape(&self, other: &Parameters) -> LstmResult<()> {
        for kind in TensorKind::ALL {
            let (ours, theirs) = (self.tensor(kind), other.tensor(kind));
            if ours.shape() != theirs.shape() {
                return Err(LstmError::shape(kind.name(), ours.shape(), theirs.shape()));
            }
        }
        Ok(())
    }

    pub fn parameter_count(&self) -> usize {
        self.tensors().iter().map(|(_, t)| t.len()).sum()
    }

    pub fn max_abs(&self) -> f64 {
        self.tensors()
            .iter()
            .map(|(_, t)| t.fold(0.0, |m: f64, x| m.max(x.abs())))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_tensor_names_round_trip() {
        let names: Vec<String> = TensorKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            vec!["Wa", "Wi", "Wf", "Wo", "Ra", "Ri", "Rf", "Ro", "ba", "bi", "bf", "bo", "Wy", "by"]
        );
        for kind in TensorKind::ALL {
            assert_eq!(TensorKind::from_name(&kind.name()), Some(kind));
        }
        assert_eq!(TensorKind::from_name("Wz"), None);
    }

    #[test]
    fn test_shapes_follow_hidden_and_vocab() {
        let params = Parameters::zeros(3, 5);
        for (kind, tensor) in params.tensors() {
            let (rows, cols) = kind.shape(3, 5);
            assert_eq!(tensor.len(), rows * cols, "{kind}");
        }
        assert_eq!(params.output_weights.dim(), (5, 3));
        assert_eq!(params.parameter_count(), 4 * (3 * 5 + 3 * 3 + 3) + 5 * 3 + 5);
    }

    #[test]
    fn test_random_init_stays_in_range_and_is_seeded() {
        let mut rng = StdRng::seed_from_u64(11);
        let a = Parameters::random(4, 6, 0.5, &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let b = Parameters::random(4, 6, 0.5, &mut rng).unwrap();
        assert_eq!(a, b);
        assert!(a.max_abs() <= 0.5);
        assert!(a.max_abs() > 0.0);
    }

    #[test]
    fn test_tensors_mut_matches_canonical_order() {
        let mut params = Parameters::zeros(2, 3);
        let kinds: Vec<TensorKind> = params.tensors_mut().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, TensorKind::ALL.to_vec());
    }

    #[test]
    fn test_apply_gradients_rejects_other_shapes() {
        let mut params = Parameters::zeros(2, 3);
        let grads = Parameters::zeros(2, 4);
        assert!(params.apply_gradients(&grads, 0.1).is_err());
    }
}

use std::fmt;
use std::str::FromStr;

use ndarray::Array1;

use crate::error::LstmError;

/// How the output logits are normalised into a distribution.
///
/// `Raw` exponentiates the logits directly and overflows once a logit passes
/// ~709. `Stabilized` subtracts the largest logit first; the result is the
/// same distribution up to rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoftmaxMode {
    Raw,
    #[default]
    Stabilized,
}

impl FromStr for SoftmaxMode {
    type Err = LstmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(SoftmaxMode::Raw),
            "stabilized" | "stable" => Ok(SoftmaxMode::Stabilized),
            other => Err(LstmError::InvalidConfig(format!(
                "unknown softmax mode '{other}' (expected raw or stabilized)"
            ))),
        }
    }
}

impl fmt::Display for SoftmaxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoftmaxMode::Raw => write!(f, "raw"),
            SoftmaxMode::Stabilized => write!(f, "stabilized"),
        }
    }
}

#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn sigmoid_vec(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(sigmoid)
}

pub fn tanh_vec(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(f64::tanh)
}

pub fn softmax(logits: &Array1<f64>, mode: SoftmaxMode) -> Array1<f64> {
    let shift = match mode {
        SoftmaxMode::Raw => 0.0,
        SoftmaxMode::Stabilized => logits.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };
    let exps = logits.mapv(|x| (x - shift).exp());
    let sum = exps.sum();
    exps / sum
}

/// Cross-entropy of a single prediction against its true class.
pub fn cross_entropy(probabilities: &Array1<f64>, label: usize) -> f64 {
    -probabilities[label].ln()
}

/// Index of the largest entry; ties resolve to the lowest index.
pub fn argmax(values: &Array1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

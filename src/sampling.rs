use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use rand::Rng;

use crate::activations::argmax;
use crate::error::LstmError;

/// Strategy for turning an output distribution into the next symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingPolicy {
    /// Always the most probable class. Deterministic.
    #[default]
    ArgMax,
    /// Draw a class with probability proportional to its weight.
    Weighted,
}

impl SamplingPolicy {
    pub fn select<R: Rng + ?Sized>(&self, probabilities: &Array1<f64>, rng: &mut R) -> usize {
        match self {
            SamplingPolicy::ArgMax => argmax(probabilities),
            SamplingPolicy::Weighted => weighted_draw(probabilities, rng),
        }
    }
}

fn weighted_draw<R: Rng + ?Sized>(probabilities: &Array1<f64>, rng: &mut R) -> usize {
    let total = probabilities.sum();
    let mut target = rng.random::<f64>() * total;
    for (i, &p) in probabilities.iter().enumerate() {
        if target < p {
            return i;
        }
        target -= p;
    }
    // rounding can leave a sliver past the last bucket
    probabilities.len().saturating_sub(1)
}

impl FromStr for SamplingPolicy {
    type Err = LstmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "argmax" | "greedy" => Ok(SamplingPolicy::ArgMax),
            "weighted" => Ok(SamplingPolicy::Weighted),
            other => Err(LstmError::InvalidConfig(format!(
                "unknown sampling policy '{other}' (expected argmax or weighted)"
            ))),
        }
    }
}

impl fmt::Display for SamplingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingPolicy::ArgMax => write!(f, "argmax"),
            SamplingPolicy::Weighted => write!(f, "weighted"),
        }
    }
}

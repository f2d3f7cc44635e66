use crate::activations::SoftmaxMode;
use crate::error::{LstmError, LstmResult};
use crate::sampling::SamplingPolicy;
use crate::{EPOCHS, GRAD_CLIP, HIDDEN_SIZE, INIT_RANGE, LEARNING_RATE, LOG_EVERY, LOOKBACK, NUM_STEPS};

/// Hyperparameters fixed for the lifetime of a parameter store.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub hidden_size: usize,
    pub learning_rate: f64,
    pub epochs: usize,
    /// Timesteps per training window.
    pub num_steps: usize,
    /// Most recent timesteps of a window that receive gradient.
    pub lookback: usize,
    pub clip_threshold: f64,
    /// Half-width of the uniform distribution used to initialise parameters.
    pub init_range: f64,
    pub softmax: SoftmaxMode,
    pub sampling: SamplingPolicy,
    pub seed: Option<u64>,
    pub log_every: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hidden_size: HIDDEN_SIZE,
            learning_rate: LEARNING_RATE,
            epochs: EPOCHS,
            num_steps: NUM_STEPS,
            lookback: LOOKBACK,
            clip_threshold: GRAD_CLIP,
            init_range: INIT_RANGE,
            softmax: SoftmaxMode::default(),
            sampling: SamplingPolicy::default(),
            seed: None,
            log_every: LOG_EVERY,
        }
    }
}

impl Config {
    pub fn validate(&self) -> LstmResult<()> {
        if self.hidden_size == 0 {
            return Err(invalid("hidden_size must be positive"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(invalid(format!(
                "learning_rate must be a positive number, got {}",
                self.learning_rate
            )));
        }
        if self.num_steps == 0 {
            return Err(invalid("num_steps must be positive"));
        }
        if self.lookback == 0 {
            return Err(invalid("lookback must be positive"));
        }
        if !(self.clip_threshold.is_finite() && self.clip_threshold > 0.0) {
            return Err(invalid(format!(
                "clip_threshold must be a positive number, got {}",
                self.clip_threshold
            )));
        }
        if !(self.init_range.is_finite() && self.init_range > 0.0) {
            return Err(invalid(format!(
                "init_range must be a positive number, got {}",
                self.init_range
            )));
        }
        if self.log_every == 0 {
            return Err(invalid("log_every must be positive"));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> LstmError {
    LstmError::InvalidConfig(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_degenerate_values() {
        let cases = [
            Config { hidden_size: 0, ..Config::default() },
            Config { learning_rate: 0.0, ..Config::default() },
            Config { learning_rate: f64::NAN, ..Config::default() },
            Config { lookback: 0, ..Config::default() },
            Config { num_steps: 0, ..Config::default() },
            Config { clip_threshold: -1.0, ..Config::default() },
            Config { init_range: 0.0, ..Config::default() },
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(LstmError::InvalidConfig(_))));
        }
    }
}

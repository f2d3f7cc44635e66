use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::bptt;
use crate::cell::{self, LstmState, Step};
use crate::config::Config;
use crate::error::{LstmError, LstmResult};
use crate::params::Parameters;
use crate::persistence;
use crate::trajectory::Trajectory;
use crate::vocab::Vocab;

/// A single LSTM cell with a softmax classifier on top, plus the
/// hyperparameters it was built with.
///
/// The model never owns recurrent state or a vocabulary: callers hold an
/// [`LstmState`] per window and pass the [`Vocab`] in explicitly, so several
/// models can coexist without sharing anything.
#[derive(Debug, Clone)]
pub struct Lstm {
    pub params: Parameters,
    pub config: Config,
}

impl Lstm {
    /// Fresh model with randomly initialised parameters sized for `vocab`.
    pub fn new(config: Config, vocab: &Vocab) -> LstmResult<Self> {
        config.validate()?;
        if vocab.is_empty() {
            return Err(LstmError::InvalidConfig("vocabulary is empty".to_string()));
        }

        let params = match config.seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                Parameters::random(config.hidden_size, vocab.len(), config.init_range, &mut rng)?
            }
            None => {
                let mut rng = rand::rng();
                Parameters::random(config.hidden_size, vocab.len(), config.init_range, &mut rng)?
            }
        };
        Ok(Lstm { params, config })
    }

    pub fn from_parameters(config: Config, params: Parameters) -> LstmResult<Self> {
        config.validate()?;
        if params.hidden_size() != config.hidden_size {
            return Err(LstmError::ParameterMismatch(format!(
                "parameters have hidden size {}, configuration says {}",
                params.hidden_size(),
                config.hidden_size
            )));
        }
        Ok(Lstm { params, config })
    }

    /// Loads a parameter file that must match the configured hidden size and `vocab`.
    pub fn load<P: AsRef<Path>>(path: P, config: Config, vocab: &Vocab) -> LstmResult<Self> {
        config.validate()?;
        let params = persistence::load(path, config.hidden_size, vocab.len())?;
        Lstm::from_parameters(config, params)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> LstmResult<()> {
        persistence::save(&self.params, path)
    }

    pub fn hidden_size(&self) -> usize {
        self.params.hidden_size()
    }

    pub fn vocab_size(&self) -> usize {
        self.params.vocab_size()
    }

    pub fn total_parameters(&self) -> usize {
        self.params.parameter_count()
    }

    pub fn network_description(&self) -> String {
        format!(
            "LSTM({} -> {}) -> Linear({} -> {}) -> Softmax[{}]",
            self.vocab_size(),
            self.hidden_size(),
            self.hidden_size(),
            self.vocab_size(),
            self.config.softmax
        )
    }

    /// Fails unless `vocab` has exactly as many symbols as the output layer.
    pub fn check_vocab(&self, vocab: &Vocab) -> LstmResult<()> {
        if vocab.len() != self.vocab_size() {
            return Err(LstmError::ParameterMismatch(format!(
                "model was built for {} symbols but the vocabulary has {}",
                self.vocab_size(),
                vocab.len()
            )));
        }
        Ok(())
    }

    /// Zero state for the start of a window or a generation run.
    pub fn reset(&self) -> LstmState {
        LstmState::zeros(self.hidden_size())
    }

    /// Forward step on a single character.
    pub fn feedforward(&self, vocab: &Vocab, symbol: char, state: &LstmState) -> LstmResult<Step> {
        self.check_vocab(vocab)?;
        let input = vocab.one_hot(symbol)?;
        cell::forward(&self.params, &input, state, self.config.softmax)
    }

    /// Forward sweep over a window of symbol indices from a fresh state.
    pub fn record(&self, symbols: &[usize], labels: &[usize]) -> LstmResult<Trajectory> {
        Trajectory::record(&self.params, symbols, labels, self.config.softmax)
    }

    /// One truncated-BPTT update from a completed window.
    pub fn backpropagate(&mut self, trajectory: &Trajectory) -> LstmResult<()> {
        bptt::backward(
            &mut self.params,
            trajectory,
            self.config.lookback,
            self.config.learning_rate,
            self.config.clip_threshold,
        )
    }
}

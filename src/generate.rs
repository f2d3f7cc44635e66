use std::collections::VecDeque;

use rand::Rng;

use crate::error::{LstmError, LstmResult};
use crate::model::Lstm;
use crate::vocab::Vocab;

/// Seed text used when none is given on the command line.
pub const DEFAULT_SEED: &str = "Japan is a sovereign island nation in East Asia ";

/// Extends `seed` by `length` characters.
///
/// For each new character the whole seed window is replayed from a zeroed
/// state, the model's sampling policy picks a symbol from the final
/// distribution, and the window slides forward by that symbol. With
/// [`SamplingPolicy::ArgMax`](crate::SamplingPolicy::ArgMax) the `rng` is never
/// consulted and the output is fully determined by the parameters and seed.
pub fn generate<R: Rng + ?Sized>(
    model: &Lstm,
    vocab: &Vocab,
    seed: &str,
    length: usize,
    rng: &mut R,
) -> LstmResult<String> {
    model.check_vocab(vocab)?;
    let mut window: VecDeque<char> = seed.chars().collect();
    if window.is_empty() {
        return Err(LstmError::EmptySeed);
    }
    if let Some(&unknown) = window.iter().find(|&&c| vocab.encode(c).is_err()) {
        return Err(LstmError::UnknownSymbol(unknown));
    }

    let policy = model.config.sampling;
    let mut output = String::from(seed);
    for _ in 0..length {
        let mut state = model.reset();
        let mut probabilities = None;
        for &c in &window {
            let step = model.feedforward(vocab, c, &state)?;
            state = step.state();
            probabilities = Some(step.probabilities);
        }
        let probabilities = probabilities.ok_or(LstmError::EmptySeed)?;

        let index = policy.select(&probabilities, rng);
        let next = vocab.decode(index).ok_or_else(|| {
            LstmError::ParameterMismatch(format!("class {index} has no symbol in the vocabulary"))
        })?;
        output.push(next);

        window.pop_front();
        window.push_back(next);
    }

    log::debug!("generated {length} characters with {policy} sampling");
    Ok(output)
}

use std::collections::HashMap;

use ndarray::Array1;

use crate::error::{LstmError, LstmResult};

/// Bidirectional mapping between characters and dense indices `[0, len)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Vocab {
    pub symbols: Vec<char>,
    indices: HashMap<char, usize>,
}

impl Vocab {
    /// Builds a vocabulary from symbols in the given order. Repeats are skipped,
    /// so the first occurrence of each symbol fixes its index.
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Self {
        let mut vocab = Vocab {
            symbols: Vec::new(),
            indices: HashMap::new(),
        };
        for c in symbols {
            if !vocab.indices.contains_key(&c) {
                vocab.indices.insert(c, vocab.symbols.len());
                vocab.symbols.push(c);
            }
        }
        vocab
    }

    /// Vocabulary of every distinct character in `text`, in order of first appearance.
    pub fn from_text(text: &str) -> Self {
        Vocab::new(text.chars())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn encode(&self, c: char) -> LstmResult<usize> {
        self.indices
            .get(&c)
            .copied()
            .ok_or(LstmError::UnknownSymbol(c))
    }

    pub fn decode(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }

    pub fn encode_text(&self, text: &str) -> LstmResult<Vec<usize>> {
        text.chars().map(|c| self.encode(c)).collect()
    }

    pub fn one_hot(&self, c: char) -> LstmResult<Array1<f64>> {
        Ok(self.one_hot_index(self.encode(c)?))
    }

    pub fn one_hot_index(&self, index: usize) -> Array1<f64> {
        let mut v = Array1::zeros(self.len());
        v[index] = 1.0;
        v
    }
}

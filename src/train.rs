use crate::error::{LstmError, LstmResult};
use crate::model::Lstm;
use crate::vocab::Vocab;

#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    pub windows: usize,
    /// Mean over windows of the per-step cross-entropy.
    pub mean_loss: f64,
}

/// Streams a text through a model in overlapping windows.
///
/// Window `s` covers the characters `s .. s + num_steps` with each following
/// character as its label, so consecutive windows overlap and slide by one
/// character. An epoch ends with the first window that runs into the end of the
/// text; that window is shortened to the characters that still have a successor.
pub struct Trainer<'a> {
    vocab: &'a Vocab,
    encoded: Vec<usize>,
    iteration: usize,
}

impl<'a> Trainer<'a> {
    pub fn new(vocab: &'a Vocab, text: &str) -> LstmResult<Self> {
        let encoded = vocab.encode_text(text)?;
        if encoded.len() < 2 {
            return Err(LstmError::InvalidConfig(format!(
                "training text needs at least two characters, got {}",
                encoded.len()
            )));
        }
        Ok(Trainer {
            vocab,
            encoded,
            iteration: 0,
        })
    }

    /// Windows processed so far, across epochs.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn train_epoch(&mut self, model: &mut Lstm, epoch: usize) -> LstmResult<EpochReport> {
        model.check_vocab(self.vocab)?;
        let num_steps = model.config.num_steps;
        let log_every = model.config.log_every;
        let last = self.encoded.len() - 1;

        let mut total_loss = 0.0;
        let mut windows = 0;
        let mut start = 0;
        loop {
            let end = (start + num_steps).min(last);
            if end > start {
                let symbols = &self.encoded[start..end];
                let labels = &self.encoded[start + 1..end + 1];

                let trajectory = model.record(symbols, labels)?;
                let loss = trajectory.total_loss() / symbols.len() as f64;
                model.backpropagate(&trajectory)?;

                if !loss.is_finite() {
                    log::warn!("iteration {}: loss is {loss}", self.iteration);
                }
                if self.iteration % log_every == 0 {
                    log::info!("iter: {} loss: {:.6}", self.iteration, loss);
                }
                self.iteration += 1;
                total_loss += loss;
                windows += 1;
            }
            if start + num_steps >= self.encoded.len() {
                break;
            }
            start += 1;
        }

        let mean_loss = if windows > 0 { total_loss / windows as f64 } else { 0.0 };
        Ok(EpochReport {
            epoch,
            windows,
            mean_loss,
        })
    }

    /// Runs `model.config.epochs` epochs, handing each report to `on_epoch`
    /// (typically to checkpoint the parameters).
    pub fn train<F>(&mut self, model: &mut Lstm, mut on_epoch: F) -> LstmResult<Vec<EpochReport>>
    where
        F: FnMut(&Lstm, &EpochReport) -> LstmResult<()>,
    {
        let epochs = model.config.epochs;
        let mut reports = Vec::with_capacity(epochs);
        for epoch in 1..=epochs {
            let report = self.train_epoch(model, epoch)?;
            log::info!(
                "epoch {}/{}: {} windows, mean loss {:.6}",
                epoch,
                epochs,
                report.windows,
                report.mean_loss
            );
            on_epoch(model, &report)?;
            reports.push(report);
        }
        Ok(reports)
    }
}

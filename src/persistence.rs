//! Line-oriented parameter file.
//!
//! One line per tensor: the two-letter name, then every value in row-major
//! order, each followed by a tab, then `\r\n`:
//!
//! ```text
//! Wa\t0.25\t-0.5\t...\t\r\n
//! ```
//!
//! Lines are written in [`TensorKind::ALL`] order. On load the order does not
//! matter, but all fourteen tensors must be present exactly once with exactly
//! the number of values their shape requires.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use itertools::Itertools;

use crate::error::{LstmError, LstmResult};
use crate::params::{Parameters, TensorKind};

pub fn to_text(params: &Parameters) -> String {
    let mut out = String::new();
    for (kind, tensor) in params.tensors() {
        out.push_str(&kind.name());
        out.push('\t');
        for value in tensor.iter() {
            // Display for f64 is the shortest string that parses back to the same bits
            let _ = write!(out, "{value}\t");
        }
        out.push_str("\r\n");
    }
    out
}

pub fn from_text(text: &str, hidden_size: usize, vocab_size: usize) -> LstmResult<Parameters> {
    let mut params = Parameters::zeros(hidden_size, vocab_size);
    let mut seen = HashSet::new();

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let line = line.strip_suffix('\t').unwrap_or(line);
        let mut fields = line.split('\t');
        let name = fields.next().unwrap_or_default().trim();

        let kind = TensorKind::from_name(name).ok_or_else(|| {
            LstmError::ParameterMismatch(format!("unknown tensor '{name}' on line {line_no}"))
        })?;
        if !seen.insert(kind) {
            return Err(LstmError::ParameterMismatch(format!(
                "tensor {kind} appears twice (again on line {line_no})"
            )));
        }

        let values = fields
            .map(|field| {
                field.trim().parse::<f64>().map_err(|e| LstmError::Parse {
                    line: line_no,
                    reason: format!("{kind}: '{field}': {e}"),
                })
            })
            .collect::<LstmResult<Vec<f64>>>()?;

        let (rows, cols) = kind.shape(hidden_size, vocab_size);
        if values.len() != rows * cols {
            return Err(LstmError::ParameterMismatch(format!(
                "tensor {kind} has {} values, expected {rows}x{cols} = {} for hidden size {hidden_size} and vocabulary {vocab_size}",
                values.len(),
                rows * cols
            )));
        }

        let mut tensor = params.tensor_mut(kind);
        for (slot, value) in tensor.iter_mut().zip(values) {
            *slot = value;
        }
    }

    let missing = TensorKind::ALL
        .into_iter()
        .filter(|kind| !seen.contains(kind))
        .map(|kind| kind.name())
        .join(", ");
    if !missing.is_empty() {
        return Err(LstmError::ParameterMismatch(format!("missing tensors: {missing}")));
    }

    Ok(params)
}

pub fn save<P: AsRef<Path>>(params: &Parameters, path: P) -> LstmResult<()> {
    let path = path.as_ref();
    fs::write(path, to_text(params)).map_err(|e| LstmError::io(path, e))?;
    log::debug!("saved {} parameters to {}", params.parameter_count(), path.display());
    Ok(())
}

/// Loads parameters, requiring them to fit the given hidden and vocabulary sizes.
pub fn load<P: AsRef<Path>>(path: P, hidden_size: usize, vocab_size: usize) -> LstmResult<Parameters> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| LstmError::io(path, e))?;
    let params = from_text(&text, hidden_size, vocab_size)?;
    log::debug!("loaded {} parameters from {}", params.parameter_count(), path.display());
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn small_params() -> Parameters {
        let mut params = Parameters::zeros(1, 2);
        for (i, (_, mut tensor)) in params.tensors_mut().into_iter().enumerate() {
            tensor.fill(i as f64 * 0.1 - 0.5);
        }
        params
    }

    #[test]
    fn test_line_layout() {
        let mut params = Parameters::zeros(1, 2);
        params.candidate.input_weights = array![[0.25, -1.5]];
        let text = to_text(&params);
        let first = text.split("\r\n").next().unwrap();
        assert_eq!(first, "Wa\t0.25\t-1.5\t");
        assert_eq!(text.matches("\r\n").count(), 14);
        assert!(text.ends_with("by\t0\t0\t\r\n"));
    }

    #[test]
    fn test_order_does_not_matter_on_load() {
        let params = small_params();
        let text = to_text(&params);
        let mut lines: Vec<&str> = text.split_terminator("\r\n").collect();
        lines.reverse();
        let shuffled = lines.join("\r\n");
        assert_eq!(from_text(&shuffled, 1, 2).unwrap(), params);
    }

    #[test]
    fn test_missing_tensor_is_rejected() {
        let text: String = to_text(&small_params())
            .split_terminator("\r\n")
            .filter(|line| !line.starts_with("Rf\t"))
            .map(|line| format!("{line}\r\n"))
            .collect();
        let err = from_text(&text, 1, 2).unwrap_err();
        assert!(err.to_string().contains("Rf"), "{err}");
    }

    #[test]
    fn test_wrong_value_count_is_rejected() {
        let text = to_text(&small_params());
        // the file was written for a vocabulary of 2
        assert!(matches!(
            from_text(&text, 1, 3),
            Err(LstmError::ParameterMismatch(_))
        ));
        assert!(from_text(&text, 2, 2).is_err());
    }

    #[test]
    fn test_unknown_and_duplicate_names_are_rejected() {
        let text = to_text(&small_params());
        assert!(from_text(&format!("{text}Wz\t1\t\r\n"), 1, 2).is_err());
        assert!(from_text(&format!("{text}by\t1\t2\t\r\n"), 1, 2).is_err());
    }

    #[test]
    fn test_non_numeric_field_is_a_parse_error() {
        let text = to_text(&small_params()).replacen("Wa\t-0.5", "Wa\tabc", 1);
        assert!(matches!(
            from_text(&text, 1, 2),
            Err(LstmError::Parse { line: 1, .. })
        ));
    }
}

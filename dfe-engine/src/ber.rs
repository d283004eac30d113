// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Bit error rate between a transmitted and a decided symbol stream.

use std::ops::Range;

use crate::sim_error;
use crate::types::{SimError, Symbol};

/// Number of positions at which the two streams differ.
pub fn count_errors(tx: &[Symbol], rx: &[Symbol]) -> Result<usize, SimError> {
    if tx.len() != rx.len() {
        return sim_error!(format!(
            "Cannot compare {} transmitted symbols with {} received symbols",
            tx.len(),
            rx.len()
        ));
    }
    Ok(tx.iter().zip(rx).filter(|(t, r)| t != r).count())
}

/// Fraction of symbols decided incorrectly, in `[0, 1]`.
///
/// Empty streams have no defined rate and are rejected.
pub fn bit_error_rate(tx: &[Symbol], rx: &[Symbol]) -> Result<f64, SimError> {
    let errors = count_errors(tx, rx)?;
    if tx.is_empty() {
        return sim_error!("Cannot compute a bit error rate over zero symbols");
    }
    Ok(errors as f64 / tx.len() as f64)
}

/// Bit error rate over `range` of both streams.
pub fn windowed(tx: &[Symbol], rx: &[Symbol], range: Range<usize>) -> Result<f64, SimError> {
    if range.end > tx.len() || range.end > rx.len() || range.start > range.end {
        return sim_error!(format!(
            "Window {range:?} is outside streams of {} and {} symbols",
            tx.len(),
            rx.len()
        ));
    }
    bit_error_rate(&tx[range.clone()], &rx[range])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol::{Negative as N, Positive as P};

    #[test]
    fn counts_mismatches() {
        let tx = [P, N, P, P];
        let rx = [P, P, P, N];
        assert_eq!(count_errors(&tx, &rx).unwrap(), 2);
        assert_eq!(bit_error_rate(&tx, &rx).unwrap(), 0.5);
    }

    #[test]
    fn window_selects_suffix() {
        let tx = [P, N, P, P];
        let rx = [N, P, P, P];
        assert_eq!(windowed(&tx, &rx, 2..4).unwrap(), 0.0);
        assert_eq!(windowed(&tx, &rx, 0..2).unwrap(), 1.0);
    }

    #[test]
    #[should_panic(expected = "zero symbols")]
    fn empty_streams() {
        bit_error_rate(&[], &[]).unwrap();
    }

    #[test]
    #[should_panic(expected = "Cannot compare 2 transmitted symbols with 1 received")]
    fn unequal_streams() {
        bit_error_rate(&[P, N], &[P]).unwrap();
    }
}

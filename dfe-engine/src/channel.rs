// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! FIR channel model.
//!
//! The channel keeps the most recent transmitted symbols (most recent first)
//! and convolves them with a fixed impulse response. `H[0]` is the main
//! cursor, `H[1..]` add post-cursor inter-symbol interference.

use log::trace;

use crate::sim_error;
use crate::types::{SimError, Symbol};

#[derive(Clone, Debug)]
pub struct Channel {
    /// Transmitted symbols as `±1`. Zero until the slot has been filled.
    tx_history: Vec<f64>,
    impulse_response: Vec<f64>,
}

impl Channel {
    /// Create a channel using the first `channel_taps` coefficients of
    /// `impulse_response`.
    pub fn new(impulse_response: &[f64], channel_taps: usize) -> Result<Self, SimError> {
        if channel_taps == 0 {
            return sim_error!("A channel requires at least one tap");
        }
        if impulse_response.len() < channel_taps {
            return sim_error!(format!(
                "Impulse response has {} coefficients but {channel_taps} channel taps are declared",
                impulse_response.len()
            ));
        }

        Ok(Self {
            tx_history: vec![0.0; channel_taps],
            impulse_response: impulse_response[..channel_taps].to_vec(),
        })
    }

    /// Transmit one bit and return the sample seen at the receiver.
    pub fn send(&mut self, bit: u8) -> f64 {
        let symbol = Symbol::from_bit(bit);

        // Oldest symbol drops off the end
        self.tx_history.rotate_right(1);
        self.tx_history[0] = symbol.as_f64();

        let sample: f64 = self
            .tx_history
            .iter()
            .zip(&self.impulse_response)
            .map(|(tx, h)| tx * h)
            .sum();

        trace!("channel: sent {symbol}, received {sample}");
        sample
    }

    /// Forget every transmitted symbol.
    pub fn reset(&mut self) {
        self.tx_history.fill(0.0);
    }

    #[must_use]
    pub fn num_taps(&self) -> usize {
        self.impulse_response.len()
    }

    #[must_use]
    pub fn tx_history(&self) -> &[f64] {
        &self.tx_history
    }

    #[must_use]
    pub fn impulse_response(&self) -> &[f64] {
        &self.impulse_response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_most_recent_first() {
        let mut channel = Channel::new(&[1.0, 0.0, 0.0], 3).unwrap();
        channel.send(1);
        channel.send(0);
        assert_eq!(channel.tx_history(), &[-1.0, 1.0, 0.0]);
        channel.send(0);
        channel.send(1);
        assert_eq!(channel.tx_history(), &[1.0, -1.0, -1.0]);
    }

    #[test]
    fn extra_coefficients_are_ignored() {
        let channel = Channel::new(&[1.0, 0.9, -0.5, 0.3, -0.2, 0.0, 0.0], 4).unwrap();
        assert_eq!(channel.impulse_response(), &[1.0, 0.9, -0.5, 0.3]);
    }

    #[test]
    #[should_panic(expected = "Impulse response has 2 coefficients")]
    fn short_impulse_response() {
        Channel::new(&[1.0, 0.5], 4).unwrap();
    }
}

// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Decision-feedback equalizer with sign-sign LMS adaptation.
//!
//! ```text
//!  sample ──►(Σ)──┬──►[slicer]──► decision ──► d[0]
//!             ▲   │                            │
//!             │   └──►(Σ)◄── d[0]·c[0]         ▼
//!             │        │               [delay line d[1..]]
//!             │        ▼                       │
//!             │     error ──► sign-sign LMS ◄──┤
//!             │                                │
//!             └────────── Σ d[i]·c[i] ◄────────┘
//! ```
//!
//! Tap `c[0]` is the main cursor and is used to form the error. Taps `c[1..]`
//! cancel post-cursor ISI using finalized past decisions.
//!
//! Each received sample may be resolved speculatively (a forced `+1` or `-1`
//! probe in place of the slicer output). Taps are only updated when the probe
//! agrees with the slicer, and the delay line always keeps the slicer output.

use log::{trace, warn};

use crate::sim_error;
use crate::types::{SimError, SpeculationMode, Symbol};

/// Outcome of receiving one sample.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Decision {
    /// Slicer output for the sample.
    pub symbol: Symbol,

    /// Sign of the residual error after removing the main cursor.
    pub error: Symbol,

    /// Sample with post-cursor ISI cancelled.
    pub equalized: f64,

    /// Whether the adaptation gate passed and the taps were updated.
    pub adapted: bool,
}

#[derive(Clone, Debug)]
pub struct Equalizer {
    taps: Vec<f64>,

    /// Past decisions as `±1`, most recent first. Zero until the slot has been
    /// filled.
    decision_history: Vec<f64>,

    gain: Vec<f64>,
    adapt_mask: Vec<bool>,
}

impl Equalizer {
    pub fn new(dfe_taps: usize, gain: &[f64], adapt_mask: &[bool]) -> Result<Self, SimError> {
        if dfe_taps == 0 {
            return sim_error!("An equalizer requires at least one tap");
        }
        if gain.len() != dfe_taps {
            return sim_error!(format!(
                "{} adaptation gains given for {dfe_taps} DFE taps",
                gain.len()
            ));
        }
        if adapt_mask.len() != dfe_taps {
            return sim_error!(format!(
                "{} adaptation enables given for {dfe_taps} DFE taps",
                adapt_mask.len()
            ));
        }

        Ok(Self {
            taps: vec![0.0; dfe_taps],
            decision_history: vec![0.0; dfe_taps],
            gain: gain.to_vec(),
            adapt_mask: adapt_mask.to_vec(),
        })
    }

    /// Receive one channel sample.
    ///
    /// With `freeze` set the taps are never updated.
    pub fn receive(&mut self, sample: f64, speculation: SpeculationMode, freeze: bool) -> Decision {
        // Make room for this sample's decision at index 0
        self.decision_history.rotate_right(1);

        let equalized = self.decision_history[1..]
            .iter()
            .zip(&self.taps[1..])
            .fold(sample, |acc, (d, c)| acc - d * c);

        let symbol = Symbol::sign(equalized);
        let probe = speculation.resolve(equalized);
        self.decision_history[0] = probe.as_f64();

        let residual = equalized - probe.as_f64() * self.taps[0];
        let error = Symbol::sign(residual);

        let adapted = probe == symbol && !freeze;
        if adapted {
            self.update_taps(error);
        }

        // The delay line only ever carries slicer decisions
        self.decision_history[0] = symbol.as_f64();

        trace!(
            "dfe: equalized {equalized}, residual {residual}, mode {speculation}, adapted {adapted}"
        );

        Decision {
            symbol,
            error,
            equalized,
            adapted,
        }
    }

    fn update_taps(&mut self, error: Symbol) {
        let error = error.as_f64();
        for (i, tap) in self.taps.iter_mut().enumerate() {
            if self.adapt_mask[i] {
                let regressor = Symbol::sign(self.decision_history[i]).as_f64();
                *tap += self.gain[i] * error * regressor;
            }
        }
    }

    /// Overwrite the taps, zero-filling any not given.
    ///
    /// Values beyond the number of taps are dropped.
    pub fn load_taps(&mut self, values: &[f64]) {
        if values.len() > self.taps.len() {
            warn!(
                "dfe: {} tap values given for {} taps, ignoring the excess",
                values.len(),
                self.taps.len()
            );
        }
        for (i, tap) in self.taps.iter_mut().enumerate() {
            *tap = values.get(i).copied().unwrap_or(0.0);
        }
    }

    /// Zero the taps and the decision history. Gains and mask are kept.
    pub fn reset(&mut self) {
        self.taps.fill(0.0);
        self.decision_history.fill(0.0);
    }

    #[must_use]
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    #[must_use]
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    #[must_use]
    pub fn decision_history(&self) -> &[f64] {
        &self.decision_history
    }

    #[must_use]
    pub fn gain(&self) -> &[f64] {
        &self.gain
    }

    #[must_use]
    pub fn adapt_mask(&self) -> &[bool] {
        &self.adapt_mask
    }
}

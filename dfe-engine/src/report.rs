// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Export of a finished run.
//!
//! A [RunReport] captures the configuration and every recorded stream so that
//! external tools (plotting, BER summaries) can work from a file rather than
//! from a live [Simulation].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{RunConfig, SimConfig};
use crate::simulation::Simulation;
use crate::types::{SimError, SimResult, Symbol};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub config: SimConfig,
    pub run: RunConfig,

    /// Taps at the end of the run.
    pub taps: Vec<f64>,

    /// `None` when the run transmitted nothing.
    pub ber: Option<f64>,

    pub tx: Vec<Symbol>,
    pub rx: Vec<Symbol>,
    pub channel_samples: Vec<f64>,

    /// Per-tap coefficient history since the last reset.
    pub trajectory: Vec<Vec<f64>>,
}

impl RunReport {
    /// Snapshot `sim` after it has completed `run`.
    #[must_use]
    pub fn new(sim: &Simulation, run: &RunConfig) -> Self {
        Self {
            config: sim.config().clone(),
            run: run.clone(),
            taps: sim.taps().to_vec(),
            ber: sim.bit_error_rate().ok(),
            tx: sim.tx().to_vec(),
            rx: sim.rx().to_vec(),
            channel_samples: sim.channel_samples().to_vec(),
            trajectory: sim.trajectory().to_vec(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, SimError> {
        serde_yaml_ng::to_string(self)
            .map_err(|e| SimError::Configuration(format!("serde_yaml_ng::to_string failed: {e}")))
    }

    pub fn from_yaml(report: &str) -> Result<Self, SimError> {
        serde_yaml_ng::from_str(report)
            .map_err(|e| SimError::Configuration(format!("serde_yaml_ng::from_str failed: {e}")))
    }

    pub fn write_to_file(&self, path: &Path) -> SimResult {
        let yaml = self.to_yaml()?;
        std::fs::write(path, yaml)
            .map_err(|e| SimError::Configuration(format!("Unable to write {}: {e}", path.display())))
    }

    pub fn from_file(path: &Path) -> Result<Self, SimError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| SimError::Configuration(format!("Unable to read {}: {e}", path.display())))?;
        RunReport::from_yaml(&s)
    }
}

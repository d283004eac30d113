// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Simulation configuration.
//!
//! Configuration is gathered from several sources, each overriding the one
//! before:
//!  - the built-in defaults,
//!  - an optional TOML file with `[sim]` and `[run]` tables,
//!  - environment variables prefixed with `DFE_`, using `__` to separate
//!    the table from the key (e.g. `DFE_RUN__SEED=5`),
//!  - command-line arguments, applied by the caller on the returned value.
//!
//! ```toml
//! [sim]
//! dfe_taps = 8
//! impulse_response = [1.0, 0.9, -0.5, 0.3]
//! channel_taps = 4
//!
//! [run]
//! num_words = 200
//! seed = 10
//! ```

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::prbs::{PRBS7_MASK, Prbs7};
use crate::sim_error;
use crate::types::{SimError, SimResult, SpeculationWiring};

/// Prefix of the environment variables that are merged into the config.
pub const ENV_PREFIX: &str = "DFE_";

/// Default per-tap adaptation gain.
pub const DEFAULT_GAIN: f64 = 0.01;

/// Bits carried by one PRBS7 word.
pub const MAX_DATA_WIDTH: usize = 7;

/// Fixed structure of the link: channel, equalizer and serializer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Length of the channel FIR and of the transmit history.
    pub channel_taps: usize,

    /// Number of DFE taps, including the main-cursor tap.
    pub dfe_taps: usize,

    /// Bits serialized from each PRBS word.
    pub data_width: usize,

    /// Channel coefficients. Only the first `channel_taps` are used.
    pub impulse_response: Vec<f64>,

    /// Per-tap LMS step size.
    pub gain: Vec<f64>,

    /// Per-tap adaptation enable.
    pub adapt_mask: Vec<bool>,

    /// Taps loaded when the simulation is created. Missing taps are zero.
    pub initial_taps: Vec<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let dfe_taps = 8;
        Self {
            channel_taps: 4,
            dfe_taps,
            data_width: MAX_DATA_WIDTH,
            impulse_response: vec![1.0, 0.9, -0.5, 0.3, -0.2, 0.0, 0.0],
            gain: vec![DEFAULT_GAIN; dfe_taps],
            adapt_mask: vec![true; dfe_taps],
            initial_taps: Vec::new(),
        }
    }
}

fn check_finite(name: &str, values: &[f64]) -> SimResult {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => sim_error!(format!("{name}[{i}] is not a finite number")),
        None => Ok(()),
    }
}

impl SimConfig {
    /// Use `impulse_response` in full as the channel.
    #[must_use]
    pub fn with_impulse_response(mut self, impulse_response: &[f64]) -> Self {
        self.impulse_response = impulse_response.to_vec();
        self.channel_taps = impulse_response.len();
        self
    }

    /// Change the number of DFE taps. Added taps get the default gain and
    /// are adapted.
    #[must_use]
    pub fn with_dfe_taps(mut self, dfe_taps: usize) -> Self {
        self.dfe_taps = dfe_taps;
        self.gain.resize(dfe_taps, DEFAULT_GAIN);
        self.adapt_mask.resize(dfe_taps, true);
        self
    }

    /// Use the same step size for every tap.
    #[must_use]
    pub fn with_uniform_gain(mut self, gain: f64) -> Self {
        self.gain = vec![gain; self.dfe_taps];
        self
    }

    #[must_use]
    pub fn with_adapt_mask(mut self, adapt_mask: &[bool]) -> Self {
        self.adapt_mask = adapt_mask.to_vec();
        self
    }

    #[must_use]
    pub fn with_initial_taps(mut self, initial_taps: &[f64]) -> Self {
        self.initial_taps = initial_taps.to_vec();
        self
    }

    /// Check that all the sizes agree with each other.
    pub fn validate(&self) -> SimResult {
        if self.channel_taps == 0 {
            return sim_error!("channel_taps must be at least 1");
        }
        if self.impulse_response.len() < self.channel_taps {
            return sim_error!(format!(
                "impulse_response has {} coefficients, channel_taps is {}",
                self.impulse_response.len(),
                self.channel_taps
            ));
        }
        if self.dfe_taps == 0 {
            return sim_error!("dfe_taps must be at least 1");
        }
        if self.gain.len() != self.dfe_taps {
            return sim_error!(format!(
                "gain has {} entries, dfe_taps is {}",
                self.gain.len(),
                self.dfe_taps
            ));
        }
        if self.adapt_mask.len() != self.dfe_taps {
            return sim_error!(format!(
                "adapt_mask has {} entries, dfe_taps is {}",
                self.adapt_mask.len(),
                self.dfe_taps
            ));
        }
        if self.initial_taps.len() > self.dfe_taps {
            return sim_error!(format!(
                "initial_taps has {} entries, dfe_taps is {}",
                self.initial_taps.len(),
                self.dfe_taps
            ));
        }
        if self.data_width == 0 || self.data_width > MAX_DATA_WIDTH {
            return sim_error!(format!(
                "data_width {} must be between 1 and {MAX_DATA_WIDTH}",
                self.data_width
            ));
        }
        check_finite("impulse_response", &self.impulse_response)?;
        check_finite("gain", &self.gain)?;
        check_finite("initial_taps", &self.initial_taps)
    }
}

/// Parameters of one pass of the simulation driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of PRBS words to transmit.
    pub num_words: usize,

    /// Clear channel and equalizer state before the run.
    pub reset: bool,

    /// PRBS7 seed. The first word sent is the seed's successor.
    pub seed: u8,

    /// Disable all tap updates.
    pub freeze_adaptation: bool,

    /// Alternate forced `+1`/`-1` probes every three bits.
    pub speculation: bool,

    /// Whether the probes reach the equalizer.
    pub speculation_wiring: SpeculationWiring,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_words: 20,
            reset: false,
            seed: 10,
            freeze_adaptation: false,
            speculation: true,
            speculation_wiring: SpeculationWiring::Disconnected,
        }
    }
}

impl RunConfig {
    #[must_use]
    pub fn with_num_words(mut self, num_words: usize) -> Self {
        self.num_words = num_words;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u8) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    #[must_use]
    pub fn with_freeze_adaptation(mut self, freeze_adaptation: bool) -> Self {
        self.freeze_adaptation = freeze_adaptation;
        self
    }

    #[must_use]
    pub fn with_speculation(mut self, speculation: bool) -> Self {
        self.speculation = speculation;
        self
    }

    #[must_use]
    pub fn with_speculation_wiring(mut self, speculation_wiring: SpeculationWiring) -> Self {
        self.speculation_wiring = speculation_wiring;
        self
    }

    pub fn validate(&self) -> SimResult {
        if self.seed > PRBS7_MASK {
            return sim_error!(format!("seed 0x{:x} does not fit in 7 bits", self.seed));
        }
        Prbs7::new(self.seed).map(|_| ())
    }
}

/// Everything that can be read from configuration sources.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sim: SimConfig,
    pub run: RunConfig,
}

impl Config {
    /// Load the defaults, then `conf_file` (if given), then the environment.
    pub fn from_sources(conf_file: Option<&Path>) -> Result<Self, SimError> {
        if let Some(conf_file) = conf_file {
            check_conf_file(conf_file)?;
        }
        let config: Config = Config::figment(conf_file)
            .extract()
            .map_err(|e| SimError::Configuration(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// The layered configuration before extraction.
    #[must_use]
    pub fn figment(conf_file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(conf_file) = conf_file {
            figment = figment.merge(Toml::file(conf_file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> SimResult {
        self.sim.validate()?;
        self.run.validate()
    }
}

fn check_conf_file(conf_file: &Path) -> SimResult {
    if conf_file.is_dir() {
        return sim_error!(format!("{} is not a file path", conf_file.display()));
    }
    if !conf_file.exists() {
        return sim_error!(format!("{} not found", conf_file.display()));
    }
    Ok(())
}

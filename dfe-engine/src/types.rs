// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Shared types.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// Simulation errors

#[macro_export]
/// Build a [SimError::Configuration] from a message that supports
/// `to_string`
macro_rules! sim_error {
    ($msg:expr) => {
        Err($crate::types::SimError::Configuration($msg.to_string()))
    };
}

/// The `SimError` is what should be returned in the case of an error
///
/// Both kinds are caller precondition violations. They are reported as soon as
/// they are detected and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Inconsistent sizes, out-of-range values or unreadable inputs.
    Configuration(String),

    /// A PRBS seed of zero, which the LFSR can never leave.
    DegenerateSeed,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimError::Configuration(msg) => write!(f, "Error: {msg}"),
            SimError::DegenerateSeed => {
                write!(f, "Error: PRBS seed 0 is a fixed point of the LFSR")
            }
        }
    }
}

impl Error for SimError {}

/// The SimResult is the return type for most simulation functions
pub type SimResult = Result<(), SimError>;

/// A bipolar NRZ symbol.
///
/// Bits `{0, 1}` map to `{-1, +1}` and all channel and equalizer arithmetic is
/// done on this representation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Negative,
    Positive,
}

impl Symbol {
    /// Map a transmitted bit onto the bipolar representation.
    ///
    /// Only the least-significant bit is considered.
    #[must_use]
    pub fn from_bit(bit: u8) -> Self {
        if bit & 0x1 == 1 {
            Symbol::Positive
        } else {
            Symbol::Negative
        }
    }

    /// Slicer decision.
    ///
    /// Strictly positive values are `+1`. Zero (and NaN) resolve to `-1`; the
    /// adaptation gate statistics depend on this tie-break.
    #[must_use]
    pub fn sign(value: f64) -> Self {
        if value > 0.0 {
            Symbol::Positive
        } else {
            Symbol::Negative
        }
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Symbol::Negative => -1.0,
            Symbol::Positive => 1.0,
        }
    }

    #[must_use]
    pub fn as_i8(self) -> i8 {
        match self {
            Symbol::Negative => -1,
            Symbol::Positive => 1,
        }
    }

    #[must_use]
    pub fn as_bit(self) -> u8 {
        match self {
            Symbol::Negative => 0,
            Symbol::Positive => 1,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Negative => write!(f, "-1"),
            Symbol::Positive => write!(f, "+1"),
        }
    }
}

impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i8(self.as_i8())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match i8::deserialize(deserializer)? {
            1 => Ok(Symbol::Positive),
            -1 => Ok(Symbol::Negative),
            other => Err(de::Error::custom(format!(
                "'{other}': a symbol must be either -1 or 1"
            ))),
        }
    }
}

/// How the current-symbol decision is resolved before the adaptation gate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeculationMode {
    /// Use the slicer output.
    #[default]
    DecisionDirected,

    /// Probe with `+1`.
    ForcePositive,

    /// Probe with `-1`.
    ForceNegative,
}

impl SpeculationMode {
    /// Swap the probe polarity. Decision-directed mode is left unchanged.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            SpeculationMode::DecisionDirected => SpeculationMode::DecisionDirected,
            SpeculationMode::ForcePositive => SpeculationMode::ForceNegative,
            SpeculationMode::ForceNegative => SpeculationMode::ForcePositive,
        }
    }

    /// The decision this mode places in the delay line before the gate.
    #[must_use]
    pub fn resolve(self, provisional: f64) -> Symbol {
        match self {
            SpeculationMode::DecisionDirected => Symbol::sign(provisional),
            SpeculationMode::ForcePositive => Symbol::Positive,
            SpeculationMode::ForceNegative => Symbol::Negative,
        }
    }
}

impl fmt::Display for SpeculationMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SpeculationMode::DecisionDirected => write!(f, "DecisionDirected"),
            SpeculationMode::ForcePositive => write!(f, "ForcePositive"),
            SpeculationMode::ForceNegative => write!(f, "ForceNegative"),
        }
    }
}

/// Whether the driver's alternating speculation toggle reaches the equalizer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeculationWiring {
    /// The toggle is computed but every symbol is received decision-directed.
    #[default]
    Disconnected,

    /// The toggle is passed to the equalizer as its speculation mode.
    Threaded,
}

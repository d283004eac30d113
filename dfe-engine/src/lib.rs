// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! `dfe-engine` - receiver equalizer adaptation models
//!
//! This library models a serial-link receiver whose decision-feedback
//! equalizer (DFE) adapts its taps with the sign-sign LMS algorithm while a
//! PRBS7 test pattern is sent through a fixed dispersive channel.
//!
//! The building blocks are:
//!  - [prbs]: the PRBS7 pattern generator and bit serializer.
//!  - [channel]: the FIR channel that adds inter-symbol interference.
//!  - [equalizer]: the DFE receive/adapt engine.
//!  - [simulation]: the driver that threads each symbol through the channel
//!    and the equalizer and records what happened.
//!
//! # Simple Application
//!
//! ```rust
//! use dfe_engine::config::{RunConfig, SimConfig};
//! use dfe_engine::simulation::Simulation;
//!
//! let mut sim = Simulation::new(&SimConfig::default())
//!     .expect("default configuration should be valid");
//! let run = RunConfig::default().with_num_words(40);
//! sim.run(&run).expect("run should succeed");
//! assert_eq!(sim.tx().len(), 40 * 7);
//! let ber = sim.bit_error_rate().expect("run produced symbols");
//! assert!((0.0..=1.0).contains(&ber));
//! ```
//!
//! All state is owned by the [Simulation](simulation::Simulation) and
//! persists across calls to `run()` until `reset()`, which allows
//! multi-pass convergence studies.

pub mod ber;
pub mod channel;
pub mod config;
pub mod equalizer;
pub mod prbs;
pub mod report;
pub mod simulation;
pub mod test_helpers;
pub mod tracker;
pub mod types;

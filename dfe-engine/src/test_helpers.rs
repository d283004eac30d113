// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Helpers shared by the unit, integration and benchmark code.

use std::sync::Once;

use log::LevelFilter;
use simplelog::{Config, TestLogger};

use crate::config::SimConfig;
use crate::simulation::Simulation;

static LOGGER: Once = Once::new();

/// Route log output through the test harness so that it is only shown for
/// failing tests.
pub fn init_test_logger() {
    LOGGER.call_once(|| {
        // Another logger may already be installed by the test binary
        let _ = TestLogger::init(LevelFilter::Debug, Config::default());
    });
}

/// Create a simulation for a test, logging which test file it belongs to.
#[must_use]
pub fn start_test(full_filepath: &str, config: &SimConfig) -> Simulation {
    init_test_logger();
    log::debug!("starting test from {full_filepath}");
    Simulation::new(config).expect("test configuration should be valid")
}

/// Configuration of a channel with no ISI: `H = [1, 0, .., 0]`.
#[must_use]
pub fn ideal_channel_config(channel_taps: usize) -> SimConfig {
    let mut impulse_response = vec![0.0; channel_taps];
    if let Some(main_cursor) = impulse_response.first_mut() {
        *main_cursor = 1.0;
    }
    SimConfig::default().with_impulse_response(&impulse_response)
}

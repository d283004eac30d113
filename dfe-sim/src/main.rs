// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! # DFE adaptation simulator
//!
//! `dfe-sim` sends a PRBS7 pattern through a dispersive channel into a
//! sign-sign LMS decision-feedback equalizer and reports how the taps and the
//! bit error rate evolve.
//!
//! Configuration is read from the defaults, then an optional TOML file, then
//! `DFE_` environment variables, then the command line.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use dfe_engine::config::{Config, RunConfig};
use dfe_engine::prbs::prbs7_period;
use dfe_engine::report::RunReport;
use dfe_engine::simulation::Simulation;
use dfe_engine::tracker::build_file_tracker;
use dfe_engine::types::{SimResult, SpeculationWiring};
use log::{LevelFilter, info, warn};

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Simulate sign-sign LMS adaptation of a decision-feedback equalizer")]
struct Cli {
    /// Enable debug log messages
    #[arg(short, long)]
    debug: bool,

    /// TOML file with `[sim]` and `[run]` tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: CommandArg,
}

#[derive(Debug, Subcommand)]
enum CommandArg {
    /// Transmit PRBS words and adapt the equalizer
    Run {
        /// Number of PRBS words per pass
        #[arg(short, long)]
        words: Option<usize>,

        /// PRBS7 seed (1 to 127)
        #[arg(short, long)]
        seed: Option<u8>,

        /// Number of back-to-back passes. Equalizer state carries over.
        #[arg(long, default_value_t = 1)]
        runs: usize,

        /// Start every pass from the initial taps with a cleared channel
        #[arg(long)]
        reset: bool,

        /// Disable tap adaptation
        #[arg(long)]
        freeze: bool,

        /// Do not compute alternating +1/-1 probes
        #[arg(long)]
        no_speculation: bool,

        /// Drive the equalizer with the alternating probes
        #[arg(long)]
        thread_speculation: bool,

        /// Initial tap values, comma separated. Missing taps are zero.
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        taps: Option<Vec<f64>>,

        /// Write a YAML report of the final pass
        #[arg(long)]
        report: Option<PathBuf>,

        /// Write one line per symbol to this file
        #[arg(long)]
        trace: Option<PathBuf>,
    },
    /// Report the PRBS7 period from a seed
    Prbs {
        /// PRBS7 seed (1 to 127)
        #[arg(short, long, default_value_t = 5)]
        seed: u8,
    },
}

/// Configure the logger level and formating string.
fn setup_logger(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::builder()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();
}

/// Apply the command-line overrides on top of the loaded run configuration.
fn merge_run_args(mut run: RunConfig, words: Option<usize>, seed: Option<u8>) -> RunConfig {
    if let Some(words) = words {
        run.num_words = words;
    }
    if let Some(seed) = seed {
        run.seed = seed;
    }
    run
}

/// Run `passes` back-to-back passes of `run`.
///
/// When `run.reset` is set every pass starts from a cleared state with
/// `initial_taps` reloaded. Otherwise equalizer state carries over.
fn run_passes(
    sim: &mut Simulation,
    run: &RunConfig,
    passes: usize,
    initial_taps: &[f64],
) -> SimResult {
    let pass_run = run.clone().with_reset(false);
    for pass in 0..passes {
        if run.reset {
            sim.reset();
            sim.load_taps(initial_taps);
        }
        sim.run(&pass_run)?;
        if let Ok(ber) = sim.bit_error_rate() {
            info!("pass {pass}: BER {ber:.4}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    setup_logger(args.debug);

    let mut config = Config::from_sources(args.config.as_deref())?;

    match args.command {
        CommandArg::Run {
            words,
            seed,
            runs,
            reset,
            freeze,
            no_speculation,
            thread_speculation,
            taps,
            report,
            trace,
        } => {
            let mut run = merge_run_args(config.run.clone(), words, seed);
            if reset {
                run.reset = true;
            }
            if freeze {
                run.freeze_adaptation = true;
            }
            if no_speculation {
                run.speculation = false;
            }
            if thread_speculation {
                run.speculation_wiring = SpeculationWiring::Threaded;
            }
            if let Some(taps) = taps {
                config.sim.initial_taps = taps;
            }
            if run.speculation && run.speculation_wiring == SpeculationWiring::Disconnected {
                warn!("speculation probes are computed but not passed to the equalizer");
            }

            let mut sim = Simulation::new(&config.sim)?;
            if let Some(trace) = &trace {
                sim.set_tracker(Some(build_file_tracker(trace)?));
            }

            run_passes(&mut sim, &run, runs, &config.sim.initial_taps)?;
            info!("final taps: {:?}", sim.taps());

            if let Some(report) = &report {
                RunReport::new(&sim, &run).write_to_file(report)?;
                info!("report written to {}", report.display());
            }
        }
        CommandArg::Prbs { seed } => {
            let period = prbs7_period(seed)?;
            info!("PRBS7 period from seed 0x{seed:02x}: {period}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use dfe_engine::config::SimConfig;
    use dfe_engine::test_helpers::start_test;

    use super::*;

    #[test]
    fn command_line_overrides_loaded_values() {
        let loaded = RunConfig::default().with_num_words(50).with_seed(7);
        let merged = merge_run_args(loaded.clone(), None, Some(3));
        assert_eq!(merged.num_words, 50);
        assert_eq!(merged.seed, 3);
        assert_eq!(merge_run_args(loaded.clone(), None, None), loaded);
    }

    fn preloaded_config() -> SimConfig {
        SimConfig::default()
            .with_impulse_response(&[1.0, 0.9, -0.5, 0.3])
            .with_initial_taps(&[1.0, 0.9])
    }

    #[test]
    fn reset_keeps_initial_taps() {
        let config = preloaded_config();
        let mut sim = start_test(file!(), &config);
        let run = RunConfig::default()
            .with_reset(true)
            .with_freeze_adaptation(true);

        run_passes(&mut sim, &run, 2, &config.initial_taps).unwrap();
        assert_eq!(sim.taps(), &[1.0, 0.9, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn reset_makes_passes_independent() {
        let config = preloaded_config();
        let run = RunConfig::default().with_speculation(false).with_reset(true);

        let mut single = start_test(file!(), &config);
        run_passes(&mut single, &run, 1, &config.initial_taps).unwrap();

        let mut repeated = start_test(file!(), &config);
        run_passes(&mut repeated, &run, 3, &config.initial_taps).unwrap();

        assert_eq!(repeated.taps(), single.taps());
        assert_eq!(repeated.trajectory()[0].len(), 140);
    }

    #[test]
    fn passes_accumulate_without_reset() {
        let config = preloaded_config();
        let mut sim = start_test(file!(), &config);
        let run = RunConfig::default();

        run_passes(&mut sim, &run, 3, &config.initial_taps).unwrap();
        assert_eq!(sim.trajectory()[0].len(), 3 * 140);
        assert_eq!(sim.tx().len(), 140);
    }

    #[test]
    fn report_records_requested_reset() {
        let config = preloaded_config();
        let mut sim = start_test(file!(), &config);
        let run = RunConfig::default().with_num_words(2).with_reset(true);

        run_passes(&mut sim, &run, 2, &config.initial_taps).unwrap();
        assert!(RunReport::new(&sim, &run).run.reset);
    }

    #[test]
    fn parse_negative_taps() {
        let cli = Cli::parse_from(["dfe-sim", "run", "--taps", "1.0,-0.5", "--runs", "3"]);
        match cli.command {
            CommandArg::Run { taps, runs, .. } => {
                assert_eq!(taps, Some(vec![1.0, -0.5]));
                assert_eq!(runs, 3);
            }
            CommandArg::Prbs { .. } => panic!("expected the run command"),
        }
    }
}

// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! The simulation driver.
//!
//! Each PRBS7 word is serialized least-significant bit first. Every bit is
//! sent through the [Channel] and the resulting sample is handed to the
//! [Equalizer]. The driver records the transmitted symbols, the channel
//! samples, the decisions and a snapshot of the taps after every symbol.
//!
//! # Speculation
//!
//! When speculation is enabled the driver alternates between forced `+1` and
//! forced `-1` probes, flipping after every third bit. With
//! [SpeculationWiring::Disconnected] (the default) the probe is computed but
//! the equalizer is always driven decision-directed.
//! [SpeculationWiring::Threaded] hands the probe to the equalizer.

use log::{debug, info, trace};

use crate::ber;
use crate::channel::Channel;
use crate::config::{RunConfig, SimConfig};
use crate::equalizer::{Decision, Equalizer};
use crate::prbs::{Prbs7, serialize_lsb_first};
use crate::tracker::Tracker;
use crate::types::{SimError, SimResult, SpeculationMode, SpeculationWiring, Symbol};

/// The probe polarity flips after this many bits.
pub const SPECULATION_TOGGLE_BITS: usize = 3;

/// Everything that happened to one transmitted bit.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolRecord {
    /// Position of the bit within the run.
    pub index: usize,

    /// PRBS word the bit was taken from.
    pub word: u8,

    pub tx: Symbol,

    /// Channel output for this bit.
    pub sample: f64,

    /// Speculation mode the equalizer was driven with.
    pub speculation: SpeculationMode,

    pub decision: Decision,

    /// Tap values after the equalizer has processed the sample.
    pub taps: Vec<f64>,
}

/// A finite stream of symbols for one run.
///
/// Each call to `next()` transmits one bit, so the stream advances the channel
/// and equalizer it borrows and extends the tap trajectory. Restart by
/// building a new stream.
pub struct SymbolStream<'a> {
    channel: &'a mut Channel,
    equalizer: &'a mut Equalizer,
    trajectory: &'a mut [Vec<f64>],
    bits: Box<dyn Iterator<Item = (u8, u8)> + Send>,
    index: usize,
    probe: SpeculationMode,
    wiring: SpeculationWiring,
    freeze: bool,
}

impl<'a> SymbolStream<'a> {
    fn new(
        channel: &'a mut Channel,
        equalizer: &'a mut Equalizer,
        trajectory: &'a mut [Vec<f64>],
        data_width: usize,
        run: &RunConfig,
    ) -> Result<Self, SimError> {
        let words = Prbs7::new(run.seed)?.take(run.num_words);
        let bits = words.flat_map(move |word| {
            serialize_lsb_first(word, data_width).map(move |bit| (word, bit))
        });
        let probe = if run.speculation {
            SpeculationMode::ForcePositive
        } else {
            SpeculationMode::DecisionDirected
        };

        Ok(Self {
            channel,
            equalizer,
            trajectory,
            bits: Box::new(bits),
            index: 0,
            probe,
            wiring: run.speculation_wiring,
            freeze: run.freeze_adaptation,
        })
    }
}

impl Iterator for SymbolStream<'_> {
    type Item = SymbolRecord;

    fn next(&mut self) -> Option<SymbolRecord> {
        let (word, bit) = self.bits.next()?;

        let speculation = match self.wiring {
            SpeculationWiring::Disconnected => SpeculationMode::DecisionDirected,
            SpeculationWiring::Threaded => self.probe,
        };

        let sample = self.channel.send(bit);
        let decision = self.equalizer.receive(sample, speculation, self.freeze);

        let record = SymbolRecord {
            index: self.index,
            word,
            tx: Symbol::from_bit(bit),
            sample,
            speculation,
            decision,
            taps: self.equalizer.taps().to_vec(),
        };
        for (series, tap) in self.trajectory.iter_mut().zip(&record.taps) {
            series.push(*tap);
        }
        trace!(
            "bit {}: sent {}, received {}",
            record.index, record.tx, record.decision.symbol
        );

        self.index += 1;
        if self.index % SPECULATION_TOGGLE_BITS == 0 {
            self.probe = self.probe.toggled();
        }
        Some(record)
    }
}

/// Owns the link state and everything recorded about it.
///
/// Channel and equalizer state persist across runs until [reset()] is
/// called. The transmitted, sampled and decided streams hold the most recent
/// run only; the tap trajectory covers every run since the last reset.
///
/// [reset()]: Simulation::reset
pub struct Simulation {
    config: SimConfig,
    channel: Channel,
    equalizer: Equalizer,
    tx: Vec<Symbol>,
    rx: Vec<Symbol>,
    channel_samples: Vec<f64>,

    /// One series per tap.
    trajectory: Vec<Vec<f64>>,

    tracker: Option<Tracker>,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let channel = Channel::new(&config.impulse_response, config.channel_taps)?;
        let mut equalizer = Equalizer::new(config.dfe_taps, &config.gain, &config.adapt_mask)?;
        equalizer.load_taps(&config.initial_taps);

        Ok(Self {
            config: config.clone(),
            channel,
            equalizer,
            tx: Vec::new(),
            rx: Vec::new(),
            channel_samples: Vec::new(),
            trajectory: vec![Vec::new(); config.dfe_taps],
            tracker: None,
        })
    }

    #[must_use]
    pub fn with_tracker(mut self, tracker: Tracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn set_tracker(&mut self, tracker: Option<Tracker>) {
        self.tracker = tracker;
    }

    /// Start a run and return its symbols.
    ///
    /// The run's `reset` flag is honoured before the stream is created. Only
    /// the tap trajectory is recorded; the per-run streams are left alone.
    pub fn symbols(&mut self, run: &RunConfig) -> Result<SymbolStream<'_>, SimError> {
        run.validate()?;
        if run.reset {
            self.reset();
        }
        SymbolStream::new(
            &mut self.channel,
            &mut self.equalizer,
            &mut self.trajectory,
            self.config.data_width,
            run,
        )
    }

    /// Transmit `run.num_words` PRBS words and record the outcome.
    pub fn run(&mut self, run: &RunConfig) -> SimResult {
        run.validate()?;
        if run.reset {
            self.reset();
        }
        info!(
            "run: {} words from seed 0x{:02x}, speculation {} ({:?}), adaptation {}",
            run.num_words,
            run.seed,
            run.speculation,
            run.speculation_wiring,
            if run.freeze_adaptation {
                "frozen"
            } else {
                "enabled"
            }
        );

        self.tx.clear();
        self.rx.clear();
        self.channel_samples.clear();

        let stream = SymbolStream::new(
            &mut self.channel,
            &mut self.equalizer,
            &mut self.trajectory,
            self.config.data_width,
            run,
        )?;
        for record in stream {
            self.tx.push(record.tx);
            self.rx.push(record.decision.symbol);
            self.channel_samples.push(record.sample);
            if let Some(tracker) = self.tracker.as_mut() {
                tracker.symbol(&record)?;
            }
        }
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.shutdown()?;
        }

        if !self.tx.is_empty() {
            let errors = ber::count_errors(&self.tx, &self.rx)?;
            info!(
                "run: {} symbols, {errors} errors, taps {:?}",
                self.tx.len(),
                self.equalizer.taps()
            );
        }
        Ok(())
    }

    /// Zero the channel and equalizer state and clear every log.
    pub fn reset(&mut self) {
        debug!("simulation: reset");
        self.channel.reset();
        self.equalizer.reset();
        self.tx.clear();
        self.rx.clear();
        self.channel_samples.clear();
        for series in &mut self.trajectory {
            series.clear();
        }
    }

    /// Overwrite the equalizer taps. See [Equalizer::load_taps].
    pub fn load_taps(&mut self, values: &[f64]) {
        debug!("simulation: loading taps {values:?}");
        self.equalizer.load_taps(values);
    }

    /// Bit error rate of the most recent run.
    pub fn bit_error_rate(&self) -> Result<f64, SimError> {
        ber::bit_error_rate(&self.tx, &self.rx)
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn tx(&self) -> &[Symbol] {
        &self.tx
    }

    #[must_use]
    pub fn rx(&self) -> &[Symbol] {
        &self.rx
    }

    #[must_use]
    pub fn channel_samples(&self) -> &[f64] {
        &self.channel_samples
    }

    /// Per-tap coefficient history, indexed `[tap][symbol]`.
    #[must_use]
    pub fn trajectory(&self) -> &[Vec<f64>] {
        &self.trajectory
    }

    #[must_use]
    pub fn taps(&self) -> &[f64] {
        self.equalizer.taps()
    }

    #[must_use]
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    #[must_use]
    pub fn equalizer(&self) -> &Equalizer {
        &self.equalizer
    }
}

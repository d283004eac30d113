// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! PRBS7 test-pattern generation.
//!
//! The generator is a 7-bit Fibonacci LFSR with characteristic polynomial
//! `x^7 + x^6 + 1`. Every nonzero seed walks through all 127 nonzero states
//! before repeating. Zero is a fixed point and is rejected.

use crate::sim_error;
use crate::types::SimError;

/// Mask selecting the seven LFSR bits.
pub const PRBS7_MASK: u8 = 0x7f;

/// Number of distinct states visited from any valid seed.
pub const PRBS7_PERIOD: usize = (1 << 7) - 1;

/// Advance the LFSR by one step.
///
/// The feedback bit is `bit6 ^ bit5`; the state is shifted left and the
/// feedback inserted at bit 0.
#[must_use]
pub fn prbs7_next(state: u8) -> u8 {
    let feedback = ((state >> 6) ^ (state >> 5)) & 0x1;
    ((state << 1) | feedback) & PRBS7_MASK
}

fn check_seed(seed: u8) -> Result<u8, SimError> {
    if seed == 0 {
        return Err(SimError::DegenerateSeed);
    }
    if seed > PRBS7_MASK {
        return sim_error!(format!("PRBS7 seed 0x{seed:x} does not fit in 7 bits"));
    }
    Ok(seed)
}

/// Infinite sequence of PRBS7 words.
///
/// The first word produced is the successor of the seed, so the seed itself
/// is never emitted until the sequence wraps.
#[derive(Clone, Debug)]
pub struct Prbs7 {
    state: u8,
}

impl Prbs7 {
    pub fn new(seed: u8) -> Result<Self, SimError> {
        Ok(Self {
            state: check_seed(seed)?,
        })
    }

    /// The most recently produced word (the seed before the first call to
    /// `next`).
    #[must_use]
    pub fn state(&self) -> u8 {
        self.state
    }
}

impl Iterator for Prbs7 {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.state = prbs7_next(self.state);
        Some(self.state)
    }
}

/// Count the steps taken to return to `seed`.
pub fn prbs7_period(seed: u8) -> Result<usize, SimError> {
    let seed = check_seed(seed)?;
    match Prbs7::new(seed)?
        .take(PRBS7_PERIOD)
        .position(|word| word == seed)
    {
        Some(position) => Ok(position + 1),
        None => sim_error!(format!(
            "PRBS7 sequence from 0x{seed:x} did not return within {PRBS7_PERIOD} steps"
        )),
    }
}

/// Split `word` into `data_width` bits, least-significant bit first.
///
/// `data_width` must not exceed the 8 bits of `word`.
pub fn serialize_lsb_first(word: u8, data_width: usize) -> impl Iterator<Item = u8> {
    debug_assert!(data_width <= 8, "data_width {data_width} exceeds a byte");
    (0..data_width).map(move |i| (word >> i) & 0x1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_successors() {
        // 0b0001010 -> 0b0010100 (bits 6 and 5 clear)
        assert_eq!(prbs7_next(10), 20);
        // 0b1000000 -> 0b0000001 (bit 6 set, bit 5 clear)
        assert_eq!(prbs7_next(0x40), 0x01);
        // 0b1100000 -> 0b1000000 (bits 6 and 5 set)
        assert_eq!(prbs7_next(0x60), 0x40);
    }

    #[test]
    fn serializer_is_lsb_first() {
        let bits: Vec<u8> = serialize_lsb_first(0b000_1011, 7).collect();
        assert_eq!(bits, vec![1, 1, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn serializer_truncates_to_width() {
        let bits: Vec<u8> = serialize_lsb_first(0b111_0101, 3).collect();
        assert_eq!(bits, vec![1, 0, 1]);
    }
}

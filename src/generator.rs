// vinylla - (c) 2021 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synthetic timecode signal generation, for tests and demos.
//!
//! Produces a stereo PCM stream carrying a [`Definition`]'s bitstream as an amplitude-modulated
//! carrier: each full wave cycle carries one bit, encoded as one of two peak amplitudes, with the
//! left channel leading the right by a quarter cycle so that forward playback has left leading
//! right as spec.md §6 requires of real DVS hardware.

use std::f64::consts::{FRAC_PI_4, PI};

use crate::definitions::Definition;
use crate::lfsr::Lfsr;

/// Peak amplitude for a "1" bit, leaving headroom below `i16::MAX` the way real pressings do.
const FULL_SCALE: f64 = i16::MAX as f64 * 0.5;
/// Peak amplitude for a "0" bit, relative to [`FULL_SCALE`].
const LOW_BIT_SCALE: f64 = 0.75;

/// Generates a synthetic timecode signal for one [`Definition`] at a given sample rate.
#[derive(Debug, Clone)]
pub struct Generator {
    definition: &'static Definition,
    lfsr: Lfsr,
    phase_increment: f64,
    theta: f64,
    current_bit: bool,
}

impl Generator {
    pub fn new(definition: &'static Definition, sample_rate_hz: f64) -> Self {
        let lfsr = Lfsr::new(definition.bits as usize, definition.seed, definition.taps);
        let current_bit = Self::msb(&lfsr);
        Generator {
            definition,
            lfsr,
            phase_increment: 2.0 * PI * f64::from(definition.resolution) / sample_rate_hz,
            theta: 0.0,
            current_bit,
        }
    }

    fn msb(lfsr: &Lfsr) -> bool {
        (lfsr.state >> (lfsr.size - 1)) & 1 == 1
    }

    fn amplitude(&self) -> f64 {
        if self.current_bit {
            FULL_SCALE
        } else {
            FULL_SCALE * LOW_BIT_SCALE
        }
    }

    /// Current LFSR state (the cycle about to be emitted).
    pub fn state(&self) -> u32 {
        self.lfsr.state
    }

    /// Produce the next interleaved stereo frame.
    pub fn next_frame(&mut self) -> (i16, i16) {
        let amp = self.amplitude();
        let left = amp * (self.theta + FRAC_PI_4).sin();
        let right = amp * (self.theta - FRAC_PI_4).sin();

        self.theta += self.phase_increment;
        if self.theta >= 2.0 * PI {
            self.theta -= 2.0 * PI;
            self.lfsr.advance();
            self.current_bit = Self::msb(&self.lfsr);
        }

        (left.round() as i16, right.round() as i16)
    }

    /// Produce `frames` interleaved stereo frames as a flat `[L, R, L, R, ...]` buffer.
    pub fn take_samples(&mut self, frames: usize) -> Vec<i16> {
        let mut out = Vec::with_capacity(frames * 2);
        for _ in 0..frames {
            let (left, right) = self.next_frame();
            out.push(left);
            out.push(right);
        }
        out
    }

    pub fn definition(&self) -> &'static Definition {
        self.definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;

    #[test]
    fn test_amplitude_is_within_scale() {
        let mut generator = Generator::new(definitions::by_name("serato_2a").unwrap(), 44_100.0);
        for (left, right) in (0..1000).map(|_| generator.next_frame()) {
            assert!(i32::from(left).abs() <= FULL_SCALE.ceil() as i32);
            assert!(i32::from(right).abs() <= FULL_SCALE.ceil() as i32);
        }
    }

    #[test]
    fn test_left_leads_right_by_quarter_cycle() {
        // At theta == 0 (start of a cycle, bit held constant), left should be near its rising
        // zero crossing and lead right, whose own zero crossing is a quarter-cycle away.
        let mut generator = Generator::new(definitions::by_name("serato_2a").unwrap(), 44_100.0);
        generator.current_bit = true;
        let (left, right) = generator.next_frame();
        assert!(left > 0);
        assert!(right < 0);
    }

    #[test]
    fn test_state_advances_once_per_cycle() {
        let def = definitions::by_name("serato_2a").unwrap();
        let mut generator = Generator::new(def, 44_100.0);
        let initial = generator.state();
        let samples_per_cycle = (44_100.0 / f64::from(def.resolution)).ceil() as usize + 1;
        for _ in 0..samples_per_cycle {
            generator.next_frame();
        }
        assert_ne!(generator.state(), initial);
    }

    #[test]
    fn test_take_samples_interleaves_stereo() {
        let mut generator = Generator::new(definitions::by_name("serato_2a").unwrap(), 44_100.0);
        let samples = generator.take_samples(100);
        assert_eq!(samples.len(), 200);
    }
}

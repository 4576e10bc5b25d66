// vinylla - (c) 2021 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pitch-window accounting: counts signed zero-crossings against elapsed samples, and turns that
//! ratio into a speed multiple of the timecode's nominal resolution on request.
//!
//! `get_pitch` is a destructive, single-consumer query: reading it drains the accumulators.

#[derive(Debug, Clone, Copy, Default)]
pub struct Pitch {
    /// Signed count of completed mono half-cycles since the last drain; incremented when
    /// forwards, decremented when reverse.
    crossings: i32,
    /// Samples accumulated while those crossings were counted.
    pitch_ticker: u32,
    /// Samples elapsed since the last mono swap; accumulated into `pitch_ticker` and reset at
    /// each swap.
    cycle_ticker: u32,
}

impl Pitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per sample, unconditionally.
    pub fn tick(&mut self) {
        self.cycle_ticker += 1;
    }

    /// Called on every mono zero crossing, after direction has been (re)inferred.
    pub fn on_swap(&mut self, forwards: bool) {
        self.crossings += if forwards { 1 } else { -1 };
        self.pitch_ticker += self.cycle_ticker;
        self.cycle_ticker = 0;
    }

    /// Drain the accumulators and compute the pitch as a multiple of `resolution * 2` Hz, or
    /// `None` if no crossings have been observed since the last drain.
    pub fn drain(&mut self, rate: f64, resolution: u32) -> Option<f64> {
        if self.crossings == 0 {
            return None;
        }

        let pitch = rate * f64::from(self.crossings) / f64::from(self.pitch_ticker)
            / f64::from(resolution * 2);

        self.crossings = 0;
        self.pitch_ticker = 0;

        Some(pitch)
    }
}

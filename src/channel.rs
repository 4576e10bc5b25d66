// vinylla - (c) 2021 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adaptive zero-crossing detection for a single audio channel.
//!
//! One [`Channel`] tracks one input: the left channel, the right channel, or their mono sum. Each
//! maintains a running DC estimate and a hysteretic sign state, and reports whether the signal
//! has "just crossed" zero on the current sample.

use crate::util::Ewma;

/// Hysteresis band around the running zero estimate, in signed 16-bit sample units. A sample
/// must clear this band past the estimate before a crossing is registered, which keeps noise
/// near the zero line from producing spurious crossings.
const ZERO_THRESHOLD: f64 = 128.0;

/// One channel's zero-crossing detector state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    /// Running estimate of the channel's DC offset.
    zero: Ewma,
    /// Current hysteretic sign state.
    pub positive: bool,
    /// Samples since the last sign change; monotonically increasing between crossings.
    pub crossing_ticker: u32,
}

impl Channel {
    pub fn new() -> Self {
        Channel {
            zero: Ewma::default(),
            positive: false,
            crossing_ticker: 0,
        }
    }

    /// The current DC offset estimate.
    pub fn zero(&self) -> f64 {
        self.zero.last_output
    }

    /// Feed one sample through the detector. Returns `true` if this sample caused a zero
    /// crossing ("swap").
    pub fn process(&mut self, sample: f64, alpha: f64) -> bool {
        self.crossing_ticker += 1;
        self.zero.alpha = alpha;

        let zero = self.zero.last_output;
        let swapped = if !self.positive && sample >= zero + ZERO_THRESHOLD {
            self.positive = true;
            true
        } else if self.positive && sample < zero - ZERO_THRESHOLD {
            self.positive = false;
            true
        } else {
            false
        };

        if swapped {
            self.crossing_ticker = 0;
        }

        self.zero.process(sample);

        swapped
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

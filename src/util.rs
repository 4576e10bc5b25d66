// Copyright (c) 2025 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Helper Utilities

/// Discrete-time implementation of a simple RC low-pass filter to calculate the exponential
/// weighted moving average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ewma {
    /// The smoothed last output.
    pub last_output: f64,

    /// The smoothing factor (commonly named α in literature). Needs to be in range 0.0 − 1.0.
    /// (inclusive).
    pub alpha: f64,
}

impl Default for Ewma {
    /// A filter with no smoothing yet configured; callers that derive `α` from a rate known only
    /// at submit time (see [`crate::channel::Channel`], [`crate::decoder::Decoder`]) set `alpha`
    /// before the first [`Ewma::process`] call.
    fn default() -> Self {
        Ewma {
            last_output: 0.0,
            alpha: 0.0,
        }
    }
}

impl Ewma {
    pub fn new(time_constant_secs: f64, sample_rate_hz: f64) -> Self {
        Ewma {
            last_output: 0.0,
            alpha: alpha_for(time_constant_secs, sample_rate_hz),
        }
    }

    /// Calculate the difference between the current input and last output value.
    pub fn difference_to(&self, input: f64) -> f64 {
        input - self.last_output
    }

    /// Calculate the next smoothed value.
    ///
    /// This calculates the next smoothed value yᵢ using the previous smoothed value yᵢ₋₁, the
    /// current unsmoothed value xᵢ and the smoothing factor α:
    ///
    /// yᵢ = α ⋅ xᵢ + (1 − α) ⋅ yᵢ₋₁
    /// = yᵢ₋₁ + α ⋅ (xᵢ − yᵢ₋₁)
    pub fn smoothen(&self, input: f64) -> f64 {
        self.last_output + self.alpha * self.difference_to(input)
    }

    /// Calculate the next smoothed value and store it.
    pub fn process(&mut self, input: f64) -> f64 {
        self.last_output = self.smoothen(input);
        self.last_output
    }
}

/// Calculate the smoothing factor α for a one-pole low-pass filter with time constant `τ` at a
/// given sample rate.
///
/// Δt = 1/f_s
/// α = Δt / (τ + Δt)
pub fn alpha_for(time_constant_secs: f64, sample_rate_hz: f64) -> f64 {
    let sampling_period_secs = 1.0 / sample_rate_hz;
    sampling_period_secs / (time_constant_secs + sampling_period_secs)
}

// vinylla - (c) 2021 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The decoder pipeline: the per-sample loop that turns a stereo PCM stream into position and
//! pitch, wiring together the crossing detectors, the bitstream/LFSR fusion, and peak tracking.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::bitstream::Bitstream;
use crate::channel::Channel;
use crate::definitions::{Definition, Polarity};
use crate::lookup::Lookup;
use crate::monitor::Monitor;
use crate::pitch::Pitch;
use crate::util::{alpha_for, Ewma};

/// Time constant for the per-channel zero estimator.
const TAU_ZERO: f64 = 0.001;
/// Time constant for the signal-liveness estimator.
const TAU_SIGNAL: f64 = 0.004;
/// Wave cycles over which `ref_level` is averaged.
const REF_PEAKS_AVG: f64 = 48.0;
/// Minimum smoothed absolute signal level for the decoder to be considered "alive".
const SIGNAL_THRESHOLD: f64 = 256.0;

/// A real-time DVS timecode decoder for one pressed format.
///
/// Owns no audio I/O: callers feed it interleaved stereo PCM via [`Decoder::submit`] and poll it
/// between blocks for position, pitch, and liveness. `submit` allocates nothing and blocks on
/// nothing but an optional, caller-supplied bit-log write.
pub struct Decoder {
    definition: &'static Definition,
    lookup: Arc<Lookup>,

    rate: f64,
    zero_alpha: f64,
    signal_alpha: f64,

    left: Channel,
    right: Channel,
    mono: Channel,

    forwards: bool,
    half_peak: f64,
    wave_peak: f64,
    /// Sentinel `-1.0` before the first full cycle is sliced.
    ref_level: f64,
    signal_level: Ewma,

    pitch: Pitch,
    bitstream: Bitstream,
    timecode_ticker: u64,

    monitor: Option<Monitor>,
    log_sink: Option<Box<dyn Write + Send>>,
}

impl Decoder {
    /// Construct a decoder for `definition`, sharing a (possibly large) pre-built `lookup` table
    /// with any other decoder of the same format.
    pub fn new(definition: &'static Definition, lookup: Arc<Lookup>) -> Self {
        Decoder {
            definition,
            lookup,
            rate: 0.0,
            zero_alpha: 0.0,
            signal_alpha: 0.0,
            left: Channel::new(),
            right: Channel::new(),
            mono: Channel::new(),
            forwards: true,
            half_peak: 0.0,
            wave_peak: 0.0,
            ref_level: -1.0,
            signal_level: Ewma::default(),
            pitch: Pitch::new(),
            bitstream: Bitstream::new(definition.bits as usize, definition.taps),
            timecode_ticker: 0,
            monitor: None,
            log_sink: None,
        }
    }

    pub fn definition(&self) -> &'static Definition {
        self.definition
    }

    pub fn attach_monitor(&mut self, side: usize) {
        self.monitor = Some(Monitor::new(side));
    }

    pub fn detach_monitor(&mut self) {
        self.monitor = None;
    }

    pub fn monitor(&self) -> Option<&Monitor> {
        self.monitor.as_ref()
    }

    /// Attach a sink that receives one ASCII `'0'`/`'1'` byte per decoded bit. Write failures are
    /// swallowed (the log is advisory, spec.md §7).
    pub fn set_log_sink(&mut self, sink: Box<dyn Write + Send>) {
        self.log_sink = Some(sink);
    }

    pub fn clear_log_sink(&mut self) {
        self.log_sink = None;
    }

    /// Reset all running state to what [`Decoder::new`] would produce, detaching the monitor and
    /// dropping the log sink. The (possibly large) lookup table is shared via `Arc` and is not
    /// reallocated.
    pub fn clear(&mut self) {
        self.rate = 0.0;
        self.zero_alpha = 0.0;
        self.signal_alpha = 0.0;
        self.left = Channel::new();
        self.right = Channel::new();
        self.mono = Channel::new();
        self.forwards = true;
        self.half_peak = 0.0;
        self.wave_peak = 0.0;
        self.ref_level = -1.0;
        self.signal_level = Ewma::default();
        self.pitch = Pitch::new();
        self.bitstream = Bitstream::new(self.definition.bits as usize, self.definition.taps);
        self.timecode_ticker = 0;
        self.monitor = None;
        self.log_sink = None;
    }

    /// Submit a block of interleaved stereo PCM (`[L0, R0, L1, R1, ...]`) sampled at `rate` Hz.
    pub fn submit(&mut self, samples: &[i16], rate: f64) {
        self.rate = rate;
        self.zero_alpha = alpha_for(TAU_ZERO, rate);
        self.signal_alpha = alpha_for(TAU_SIGNAL, rate);

        for frame in samples.chunks_exact(2) {
            self.submit_one(frame[0], frame[1]);
        }
    }

    fn submit_one(&mut self, left_raw: i16, right_raw: i16) {
        let l = f64::from(left_raw);
        let r = f64::from(right_raw);

        self.left.process(l, self.zero_alpha);
        self.right.process(r, self.zero_alpha);

        let g = l + r;
        let mono_swapped = self.mono.process(g, self.zero_alpha);

        if mono_swapped {
            self.on_mono_swap();
        }

        self.timecode_ticker += 1;
        self.pitch.tick();

        let deviation = (g - self.mono.zero()).abs();
        self.wave_peak = self.wave_peak.max(deviation);
        self.signal_level.alpha = self.signal_alpha;
        self.signal_level.process(deviation);

        if let Some(monitor) = &mut self.monitor {
            monitor.process(left_raw, right_raw, self.ref_level);
        }
    }

    /// Handles everything that happens on a mono zero crossing: half-cycle disambiguation, bit
    /// slicing and fusion, direction inference, and the ref/pitch bookkeeping that always follows
    /// a swap regardless of which half it was.
    fn on_mono_swap(&mut self) {
        // A swap whose new sign equals `polarity XOR forwards` enters the cycle's second half
        // (store half_peak); the opposite sign means a full cycle has just completed.
        let second_half_sign =
            matches!(self.definition.polarity, Polarity::Positive) ^ self.forwards;

        if self.mono.positive == second_half_sign {
            // Entering the second half of a wave cycle.
            self.half_peak = self.wave_peak;
        } else {
            // A full wave cycle has just completed; slice a bit from the two half-peaks.
            let bit = (self.wave_peak + self.half_peak) > self.ref_level;

            if let Some(sink) = &mut self.log_sink {
                let _ = sink.write_all(if bit { b"1" } else { b"0" });
            }

            if self.forwards {
                self.bitstream.fuse_forward(bit);
            } else {
                self.bitstream.fuse_backward(bit);
            }

            self.timecode_ticker = 0;

            let measurement = self.half_peak + self.wave_peak;
            self.ref_level = if self.ref_level < 0.0 {
                measurement
            } else {
                self.ref_level + (measurement - self.ref_level) / REF_PEAKS_AVG
            };
        }

        // Direction inference: the channel that crossed zero earlier (larger ticker) is leading.
        self.forwards = self.left.crossing_ticker > self.right.crossing_ticker;
        self.pitch.on_swap(self.forwards);
        self.wave_peak = 0.0;
    }

    /// Drain the pitch accumulators: a signed multiple of `resolution * 2` Hz, or `None` if no
    /// full cycles have completed since the last call.
    pub fn get_pitch(&mut self) -> Option<f64> {
        self.pitch.drain(self.rate, self.definition.resolution)
    }

    /// The currently decoded cycle index and the age (since it was last confirmed) of that
    /// reading, or `None` if the decoder isn't locked on a valid code word.
    pub fn get_position(&self) -> Option<(i32, Duration)> {
        if !self.bitstream.is_locked() {
            return None;
        }
        let cycle = self.lookup.get(self.bitstream.bitstream())?;
        let age = Duration::from_secs_f64(self.timecode_ticker as f64 / self.rate);
        Some((cycle as i32, age))
    }

    /// `true` iff the smoothed signal level indicates a live timecode input.
    pub fn get_alive(&self) -> bool {
        self.signal_level.last_output >= SIGNAL_THRESHOLD
    }

    pub fn get_safe(&self) -> u32 {
        self.definition.safe
    }

    pub fn get_resolution(&self) -> u32 {
        self.definition.resolution
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("definition", &self.definition.name)
            .field("rate", &self.rate)
            .field("forwards", &self.forwards)
            .field("ref_level", &self.ref_level)
            .field("signal_level", &self.signal_level.last_output)
            .field("valid_counter", &self.bitstream.valid_counter())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;
    use crate::generator::Generator;

    fn decoder_for(name: &str) -> Decoder {
        let def = definitions::by_name(name).unwrap();
        let lookup = Arc::new(Lookup::build(def).unwrap());
        Decoder::new(def, lookup)
    }

    #[test]
    fn test_fresh_decoder_reports_nothing() {
        let decoder = decoder_for("serato_2a");
        assert_eq!(decoder.get_position(), None);
        assert!(!decoder.get_alive());
    }

    #[test]
    fn test_clear_resets_state_without_reallocating_lookup() {
        let mut decoder = decoder_for("serato_2a");
        let samples = Generator::new(definitions::by_name("serato_2a").unwrap(), 44_100.0)
            .take_samples(44_100);
        decoder.submit(&samples, 44_100.0);
        decoder.clear();
        assert_eq!(decoder.get_position(), None);
        assert!(!decoder.get_alive());
        assert_eq!(decoder.get_pitch(), None);
    }

    #[test]
    fn test_silence_is_not_alive() {
        let mut decoder = decoder_for("serato_2a");
        let silence = vec![0i16; 44_100 * 2];
        decoder.submit(&silence, 44_100.0);
        assert!(!decoder.get_alive());
        assert_eq!(decoder.get_position(), None);
        assert_eq!(decoder.get_pitch(), None);
    }

    /// Run `def`'s generator sample-by-sample until `cycles` full wave cycles (LFSR advances)
    /// have completed, returning the interleaved stereo buffer and the cycle index of the last
    /// one fully completed (`cycles - 1`, since the generator starts at `seed` == cycle 0).
    fn generate_cycles(def: &'static definitions::Definition, cycles: u32) -> (Vec<i16>, u32) {
        let mut generator = Generator::new(def, 44_100.0);
        let mut samples = Vec::new();
        let mut completed = 0u32;
        let mut last_state = generator.state();
        loop {
            let (left, right) = generator.next_frame();
            samples.push(left);
            samples.push(right);
            let state = generator.state();
            if state != last_state {
                completed += 1;
                last_state = state;
                if completed == cycles {
                    break;
                }
            }
        }
        (samples, cycles - 1)
    }

    /// Reverse playback in time and swap channels, mirroring the physical effect of scratching
    /// backwards: frames reverse order, and left/right swap so the phase relationship (left
    /// leads right for forward playback) still holds in the new direction.
    fn reverse_and_swap(samples: &[i16]) -> Vec<i16> {
        let mut reversed = Vec::with_capacity(samples.len());
        for frame in samples.chunks_exact(2).rev() {
            reversed.push(frame[1]);
            reversed.push(frame[0]);
        }
        reversed
    }

    /// Comfortably past the worst case lock-in delay (`bits` to flush the sliding window, plus
    /// `VALID_BITS` consecutive correct predictions) for every registered definition.
    const LOCK_TEST_CYCLES: u32 = 200;

    #[test]
    fn test_forward_sine_locks_and_reports_position() {
        let def = definitions::by_name("serato_2a").unwrap();
        let lookup = Arc::new(Lookup::build(def).unwrap());
        let mut decoder = Decoder::new(def, lookup);

        let (samples, expected_cycle) = generate_cycles(def, LOCK_TEST_CYCLES);
        decoder.submit(&samples, 44_100.0);

        assert!(decoder.get_alive());
        let (cycle, _age) = decoder
            .get_position()
            .expect("decoder should be locked after 200 cycles");
        assert!(
            (cycle - expected_cycle as i32).abs() <= 1,
            "reported cycle {cycle} not within ±1 of expected {expected_cycle}"
        );

        let pitch = decoder.get_pitch().expect("pitch should be available");
        assert!((pitch - 1.0).abs() < 0.1);
    }

    #[test]
    fn test_reverse_sine_has_negative_pitch() {
        let def = definitions::by_name("serato_2a").unwrap();
        let lookup = Arc::new(Lookup::build(def).unwrap());
        let mut decoder = Decoder::new(def, lookup);

        let (samples, _) = generate_cycles(def, LOCK_TEST_CYCLES);
        let samples = reverse_and_swap(&samples);
        decoder.submit(&samples, 44_100.0);

        let pitch = decoder.get_pitch().expect("pitch should be available");
        assert!(pitch < 0.0);
    }

    #[test]
    fn test_reverse_sine_positions_decrease() {
        let def = definitions::by_name("serato_2a").unwrap();
        let lookup = Arc::new(Lookup::build(def).unwrap());
        let mut decoder = Decoder::new(def, lookup);

        let (samples, _) = generate_cycles(def, LOCK_TEST_CYCLES * 2);
        let samples = reverse_and_swap(&samples);

        // Feed in two blocks so the reported position can be observed decreasing between them,
        // as spec.md §8 scenario 4 requires of reverse playback.
        let midpoint = samples.len() / 4 * 2;
        decoder.submit(&samples[..midpoint], 44_100.0);
        let (first, _) = decoder
            .get_position()
            .expect("decoder should be locked partway through reverse playback");

        decoder.submit(&samples[midpoint..], 44_100.0);
        let (second, _) = decoder
            .get_position()
            .expect("decoder should still be locked after more reverse playback");

        assert!(
            second < first,
            "position should decrease during reverse playback: {first} -> {second}"
        );
    }
}

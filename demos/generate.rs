// vinylla - (c) 2021 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Writes a full pressed-format timecode signal to a WAV file: one revolution of the LFSR
//! sequence, from `seed` back to `seed`. For the larger formats this is tens of minutes of audio.
//!
//! ```bash
//! $ cargo run --example generate -- serato_2a /tmp/serato_2a.wav
//! ```

use hound::{SampleFormat, WavSpec, WavWriter};
use std::env;
use vinylla::{definition_by_name, Generator};

const SAMPLE_RATE_HZ: f64 = 44_100.0;

fn main() {
    let mut args = env::args().skip(1);
    let name = args.next().expect("usage: generate <format-name> <output.wav>");
    let path = args.next().expect("usage: generate <format-name> <output.wav>");

    let definition = definition_by_name(&name).expect("unknown timecode format");

    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE_HZ as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(&path, spec).unwrap();
    let mut generator = Generator::new(definition, SAMPLE_RATE_HZ);
    let initial_state = generator.state();
    let mut state_changed = false;

    loop {
        let (left, right) = generator.next_frame();
        writer.write_sample(left).unwrap();
        writer.write_sample(right).unwrap();
        if !state_changed {
            state_changed = generator.state() != initial_state;
        } else if generator.state() == initial_state {
            break;
        }
    }
    writer.finalize().unwrap();
}

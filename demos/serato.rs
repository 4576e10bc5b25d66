// vinylla - (c) 2021 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reads a pressed-format WAV file and prints the decoded positions as they lock.
//!
//! ```bash
//! $ cargo run --example serato -- serato_2a /path/to/file.wav
//! ```

use hound::WavReader;
use std::env;
use std::sync::Arc;
use vinylla::{definition_by_name, Decoder, Lookup};

const SAMPLE_RATE_HZ: f64 = 44_100.0;
/// Number of frames fed to the decoder per `submit` call.
const BLOCK_FRAMES: usize = 1024;

fn main() {
    let mut args = env::args().skip(1);
    let name = args.next().expect("usage: serato <format-name> <input.wav>");
    let path = args.next().expect("usage: serato <format-name> <input.wav>");

    let definition = definition_by_name(&name).expect("unknown timecode format");
    let lookup = Arc::new(Lookup::build(definition).expect("failed to build lookup table"));
    let mut decoder = Decoder::new(definition, lookup);

    let mut reader = WavReader::open(&path).unwrap();
    let mut samples = reader.samples::<i16>().map(|x| x.unwrap());

    let mut block = Vec::with_capacity(BLOCK_FRAMES * 2);
    let mut reported = None;
    loop {
        block.clear();
        for _ in 0..(BLOCK_FRAMES * 2) {
            match samples.next() {
                Some(sample) => block.push(sample),
                None => break,
            }
        }
        if block.is_empty() {
            break;
        }

        decoder.submit(&block, SAMPLE_RATE_HZ);

        if let Some((cycle, age)) = decoder.get_position() {
            if reported != Some(cycle) {
                println!("cycle {cycle:10} (age {:?})", age);
                reported = Some(cycle);
            }
        }
    }
}

// vinylla - (c) 2021 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The crate's error type.
//!
//! Decoding itself has no error path (every sample is consumed); errors can only occur during
//! setup, when selecting a format or building its lookup table.

use std::fmt;

/// Errors that can occur while selecting a timecode format or building its lookup table.
#[derive(Debug)]
pub enum Error {
    /// [`crate::definitions::by_name`] was given a name that isn't in the registry.
    UnknownTimecode(String),
    /// The LFSR sequence revisited a state before reaching `length` steps; `length`, `taps` and
    /// `seed` are inconsistent for this definition.
    LookupWrap {
        definition: &'static str,
        at_cycle: u32,
    },
    /// The lookup table allocation failed.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownTimecode(name) => {
                write!(f, "timecode definition '{name}' is not known")
            }
            Error::LookupWrap {
                definition,
                at_cycle,
            } => {
                write!(
                    f,
                    "lookup table for '{definition}' wrapped after {at_cycle} cycles"
                )
            }
            Error::OutOfMemory => write!(f, "failed to allocate lookup table"),
        }
    }
}

impl std::error::Error for Error {}

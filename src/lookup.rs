// vinylla - (c) 2021 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builds and owns the dense code-word → cycle-index lookup table for a [`Definition`].

use crate::definitions::Definition;
use crate::error::Error;
use crate::lfsr::Lfsr;

/// Sentinel stored for code words that are not part of the pressed sequence.
const NOT_PRESENT: i32 = -1;

/// A dense lookup table mapping every possible `bits`-wide code word to its cycle index, or to
/// the "not present" sentinel.
///
/// The table is built once, at setup time, and is read-only afterwards (spec.md §3's "write-once"
/// invariant). It is deliberately a flat `Vec<i32>` rather than a hash map: `bits <= 23` across
/// every registered definition, so the dense table is at most 32 MiB, and array indexing is the
/// appropriate real-time-safe structure for the decode hot path (no hashing per decoded bit).
#[derive(Debug)]
pub struct Lookup {
    table: Vec<i32>,
}

impl Lookup {
    /// Build the lookup table for `def` by walking its LFSR from `seed` for `length` steps.
    ///
    /// Fails with [`Error::LookupWrap`] if the sequence revisits a state before `length` steps
    /// have been taken, which indicates `length`/`taps`/`seed` are mutually inconsistent.
    pub fn build(def: &Definition) -> Result<Self, Error> {
        let size = 1usize << def.bits;
        log::info!(
            "building lookup table for '{}' ({} entries, {} KiB)",
            def.name,
            size,
            size * std::mem::size_of::<i32>() / 1024,
        );

        let mut table = Vec::new();
        table.try_reserve_exact(size).map_err(|_| Error::OutOfMemory)?;
        table.resize(size, NOT_PRESENT);
        let mut lfsr = Lfsr::new(def.bits as usize, def.seed, def.taps);

        for cycle in 0..def.length {
            let current = lfsr.state as usize;
            if table[current] != NOT_PRESENT {
                log::warn!(
                    "lookup table for '{}' wrapped after {} of {} expected cycles",
                    def.name,
                    cycle,
                    def.length
                );
                return Err(Error::LookupWrap {
                    definition: def.name,
                    at_cycle: cycle,
                });
            }
            table[current] = cycle as i32;
            lfsr.advance();
        }

        Ok(Lookup { table })
    }

    /// Look up the cycle index for `code`, or `None` if it isn't part of the pressed sequence.
    pub fn get(&self, code: u32) -> Option<u32> {
        match self.table.get(code as usize) {
            Some(&NOT_PRESENT) | None => None,
            Some(&n) => Some(n as u32),
        }
    }

    /// Number of non-sentinel entries in the table (equal to the definition's `length`, once
    /// built successfully).
    pub fn len(&self) -> usize {
        self.table.iter().filter(|&&v| v != NOT_PRESENT).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

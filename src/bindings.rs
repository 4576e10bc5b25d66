// vinylla - (c) 2021 Jan Holthuis <holthuis.jan@gmail.com> et al.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! C FFI surface, for embedding this decoder in a non-Rust DJ application. Mirrors
//! [`crate::decoder::Decoder`]'s Rust API one-for-one; see `cbindgen.toml` for the generated
//! header.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::sync::Arc;

use crate::decoder::Decoder;
use crate::definitions;
use crate::lookup::Lookup;

/// Construct a decoder for the named format (see [`crate::definitions::all`] for valid names).
/// Returns a null pointer if the name is unknown or the lookup table fails to build.
///
/// # Safety
///
/// `name` must be a valid, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn vinylla_init(name: *const c_char) -> *mut Decoder {
    if name.is_null() {
        return std::ptr::null_mut();
    }
    let name = match CStr::from_ptr(name).to_str() {
        Ok(name) => name,
        Err(_) => return std::ptr::null_mut(),
    };

    let definition = match definitions::by_name(name) {
        Ok(definition) => definition,
        Err(err) => {
            log::warn!("vinylla_init: {err}");
            return std::ptr::null_mut();
        }
    };

    let lookup = match Lookup::build(definition) {
        Ok(lookup) => Arc::new(lookup),
        Err(err) => {
            log::warn!("vinylla_init: {err}");
            return std::ptr::null_mut();
        }
    };

    Box::into_raw(Box::new(Decoder::new(definition, lookup)))
}

/// Release a decoder previously returned by [`vinylla_init`].
///
/// # Safety
///
/// `ptr` must either be null or a pointer previously returned by [`vinylla_init`] that has not
/// already been freed.
#[no_mangle]
pub unsafe extern "C" fn vinylla_free(ptr: *mut Decoder) {
    if !ptr.is_null() {
        drop(Box::from_raw(ptr));
    }
}

/// Submit `len` interleaved stereo samples (`2 * len` `i16`s) at the given sample rate.
///
/// # Safety
///
/// `ptr` must be a live pointer from [`vinylla_init`]; `samples` must point to at least
/// `2 * frames` valid `i16`s.
#[no_mangle]
pub unsafe extern "C" fn vinylla_submit(
    ptr: *mut Decoder,
    samples: *const i16,
    frames: usize,
    rate: f64,
) {
    let decoder = &mut *ptr;
    let slice = std::slice::from_raw_parts(samples, frames * 2);
    decoder.submit(slice, rate);
}

/// Query the current pitch, draining the internal accumulator. Returns `f64::NAN` if no pitch
/// reading is currently available.
///
/// # Safety
///
/// `ptr` must be a live pointer from [`vinylla_init`].
#[no_mangle]
pub unsafe extern "C" fn vinylla_get_pitch(ptr: *mut Decoder) -> f64 {
    let decoder = &mut *ptr;
    decoder.get_pitch().unwrap_or(f64::NAN)
}

/// Query the current position. Returns the cycle index, or `-1` if not currently known. If
/// `age_secs` is non-null and a position is known, writes the age of that reading in seconds.
///
/// # Safety
///
/// `ptr` must be a live pointer from [`vinylla_init`]; `age_secs`, if non-null, must point to a
/// valid, writable `f64`.
#[no_mangle]
pub unsafe extern "C" fn vinylla_get_position(ptr: *const Decoder, age_secs: *mut f64) -> i64 {
    let decoder = &*ptr;
    match decoder.get_position() {
        Some((cycle, age)) => {
            if !age_secs.is_null() {
                *age_secs = age.as_secs_f64();
            }
            i64::from(cycle)
        }
        None => -1,
    }
}

/// # Safety
///
/// `ptr` must be a live pointer from [`vinylla_init`].
#[no_mangle]
pub unsafe extern "C" fn vinylla_get_alive(ptr: *const Decoder) -> bool {
    let decoder = &*ptr;
    decoder.get_alive()
}

/// # Safety
///
/// `ptr` must be a live pointer from [`vinylla_init`].
#[no_mangle]
pub unsafe extern "C" fn vinylla_get_safe(ptr: *const Decoder) -> u32 {
    let decoder = &*ptr;
    decoder.get_safe()
}

/// # Safety
///
/// `ptr` must be a live pointer from [`vinylla_init`].
#[no_mangle]
pub unsafe extern "C" fn vinylla_get_resolution(ptr: *const Decoder) -> u32 {
    let decoder = &*ptr;
    decoder.get_resolution()
}

/// Reset a decoder to its freshly initialized state.
///
/// # Safety
///
/// `ptr` must be a live pointer from [`vinylla_init`].
#[no_mangle]
pub unsafe extern "C" fn vinylla_clear(ptr: *mut Decoder) {
    let decoder = &mut *ptr;
    decoder.clear();
}

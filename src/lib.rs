// FIXME: Enable missing_docs
//#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![deny(broken_intra_doc_links)]
#![cfg_attr(test, deny(warnings))]

mod bindings;
mod bits;
mod bitstream;
mod channel;
mod decoder;
mod definitions;
mod error;
mod generator;
mod lfsr;
mod lookup;
mod monitor;
mod pitch;
mod util;

pub use decoder::Decoder;
pub use definitions::{all as definitions, by_name as definition_by_name, Definition, Polarity};
pub use error::Error;
pub use generator::Generator;
pub use lookup::Lookup;
pub use monitor::Monitor;

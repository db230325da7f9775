//! Folio opaque identifiers.
//!
//! Internal integer keys never cross the public boundary as-is. Each
//! namespace ("author", "article") owns a salted codec that maps a key to a
//! short, non-sequential string and validates strings coming back in.
//!
//! The text format is the hashids scheme. Public ids are embedded in shared
//! links, so the format is a compatibility contract: ids issued by earlier
//! deployments with the same salt and minimum length keep decoding.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod codec;
mod error;
mod namespace;

pub use codec::{CodecSettings, OpaqueIdCodec, DEFAULT_ALPHABET, DEFAULT_MIN_LENGTH};
pub use error::{IdError, IdResult};
pub use namespace::{IdCodecs, IdNamespace};

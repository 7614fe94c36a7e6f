//! The binary wire format: tag-delta framing over varints, fixed-width
//! big-endian scalars, subtype chains, and shared-object interning.

pub mod decoder;
pub mod encoder;
pub mod tag;
pub mod varint;

pub use decoder::BinaryDecoder;
pub use encoder::{BinaryEncoder, DEFAULT_MAX_DEPTH};

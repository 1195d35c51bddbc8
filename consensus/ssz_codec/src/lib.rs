//! Provides encoding (serialization) and decoding (deserialization) in the SimpleSerialize (SSZ)
//! format designed for use in Ethereum 2.0.
//!
//! Values are described at runtime by an [`SszType`] (the "shape") and carried as an
//! [`SszValue`]. Every operation is driven by the shape: the same value bytes may only be
//! interpreted once the shape is known.
//!
//! ## Example
//!
//! ```rust
//! use ssz_codec::{SszType, SszValue};
//!
//! let ty = SszType::container([
//!     ("a", SszType::uint16()),
//!     ("b", SszType::list(SszType::uint16(), 1024)),
//! ]);
//!
//! let value = SszValue::Container(vec![
//!     SszValue::Uint16(42),
//!     SszValue::List(vec![1u16.into(), 2u16.into(), 3u16.into()]),
//! ]);
//!
//! let bytes = ty.encode(&value).unwrap();
//! assert_eq!(bytes, vec![42, 0, 6, 0, 0, 0, 1, 0, 2, 0, 3, 0]);
//!
//! let decoded = ty.decode(&bytes).unwrap();
//! assert_eq!(decoded, value);
//! ```

mod bitfield;
mod decode;
mod encode;
mod shape;
mod value;

pub use bitfield::{BitIter, Bitfield, Error as BitfieldError};
pub use decode::{
    decode, decode_list_of_variable_length_items, read_offset, read_scalar, sanitize_offset,
    Decode, DecodeError, OffsetError, SszDecoder, SszDecoderBuilder,
};
pub use encode::{
    encode, encode_into, encode_length, ssz_bytes_len, write_scalar, Encode, EncodeError,
    SszEncoder,
};
pub use ethereum_types::{U128, U256};
pub use shape::{Field, SszType, UintWidth};
pub use value::{SszValue, ValueError};

/// The number of bytes used to represent an offset.
pub const BYTES_PER_LENGTH_OFFSET: usize = 4;
/// The maximum value that can be represented using `BYTES_PER_LENGTH_OFFSET`.
pub const MAX_LENGTH_VALUE: usize = u32::MAX as usize;

pub const BITS_PER_BYTE: usize = 8;

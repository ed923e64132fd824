mod decode;
mod encode;
mod types;
mod utils;

use std::io;

use thiserror::Error;

pub use types::WideUint;
pub use utils::{
    decode_from_reader, decode_offset, decode_variable_sized_items, encode_items_from_parts,
    encode_offset, encode_to_writer, ssz_encode, Decoder,
};

pub const BYTES_PER_LENGTH_OFFSET: usize = 4;

pub trait SszEncode {
    fn as_ssz_bytes(&self) -> Vec<u8>;

    fn is_ssz_fixed_len() -> bool;
}

pub trait SszDecode: Sized {
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError>;

    fn is_ssz_fixed_len() -> bool;

    fn ssz_fixed_len() -> usize {
        BYTES_PER_LENGTH_OFFSET
    }
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum SszDecodeError {
    #[error("got {len} bytes, expected {expected}")]
    InvalidByteLength { len: usize, expected: usize },
    #[error("length prefix spans {len} bytes, expected {expected}")]
    InvalidLengthPrefix { len: usize, expected: usize },
    #[error("offset {0} points into the fixed-size portion")]
    OffsetIntoFixedPortion(usize),
    #[error("first offset {0} does not point at the end of the fixed-size portion")]
    OffsetSkipsVariableBytes(usize),
    #[error("offset {0} is lower than the offset preceding it")]
    OffsetsAreDecreasing(usize),
    #[error("offset {0} exceeds the section length")]
    OffsetOutOfBounds(usize),
    #[error("fixed-size portion spans {0} bytes, not a whole number of offsets")]
    InvalidListFixedBytesLen(usize),
    #[error("{0}")]
    BytesInvalid(String),
}

#[derive(Debug, PartialEq, Clone, Error)]
pub enum SszEncodeError {
    #[error("cannot encode a negative big integer")]
    NegativeBigInt,
    #[error("big integer spans {len} bytes, supported lengths are 9 to 32")]
    BigIntWidthOutOfRange { len: usize },
}

#[derive(Debug, Error)]
pub enum SszStreamError {
    #[error("i/o failure on the underlying stream")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Decode(#[from] SszDecodeError),
}

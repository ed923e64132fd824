#![allow(clippy::use_self)]

use crate::*;
use ethereum_types::{H256, U128, U256};

macro_rules! decode_for_uintn {
    ( $(($type_ident: ty, $size_in_bits: expr)),* ) => { $(
        impl SszDecode for $type_ident {
            fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
                if bytes.len() == <Self as SszDecode>::ssz_fixed_len() {
                    let mut arr = [0; $size_in_bits / 8];
                    arr.clone_from_slice(bytes);
                    Ok(<$type_ident>::from_le_bytes(arr))
                } else {
                    Err(SszDecodeError::InvalidByteLength {
                        len: bytes.len(),
                        expected: <Self as SszDecode>::ssz_fixed_len(),
                    })
                }
            }

            fn is_ssz_fixed_len() -> bool {
                true
            }

            fn ssz_fixed_len() -> usize {
                $size_in_bits / 8
            }
        }
    )* };
}

decode_for_uintn!((u8, 8), (u16, 16), (u32, 32), (u64, 64));

impl SszDecode for bool {
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
        if bytes.len() == <Self as SszDecode>::ssz_fixed_len() {
            match bytes[0] {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(SszDecodeError::BytesInvalid(format!(
                    "Cannot deserialize bool from {}",
                    bytes[0]
                ))),
            }
        } else {
            Err(SszDecodeError::InvalidByteLength {
                len: bytes.len(),
                expected: <Self as SszDecode>::ssz_fixed_len(),
            })
        }
    }

    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        1
    }
}

fn collect_array<T, const N: usize>(items: Vec<T>) -> Result<[T; N], SszDecodeError> {
    let len = items.len();
    <[T; N]>::try_from(items).map_err(|_| {
        SszDecodeError::BytesInvalid(format!("Cannot build a {}-element array from {}", N, len))
    })
}

impl<T: SszDecode, const N: usize> SszDecode for [T; N] {
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
        if <T as SszDecode>::is_ssz_fixed_len() {
            let fixed_len = <T as SszDecode>::ssz_fixed_len();
            if bytes.len() != N * fixed_len {
                return Err(SszDecodeError::InvalidByteLength {
                    len: bytes.len(),
                    expected: N * fixed_len,
                });
            }

            let mut result = Vec::with_capacity(N);
            for chunk in bytes.chunks(fixed_len) {
                result.push(T::from_ssz_bytes(chunk)?);
            }

            collect_array(result)
        } else if bytes.is_empty() {
            collect_array(vec![])
        } else {
            collect_array(decode_variable_sized_items(bytes)?)
        }
    }

    fn is_ssz_fixed_len() -> bool {
        <T as SszDecode>::is_ssz_fixed_len()
    }

    fn ssz_fixed_len() -> usize {
        if <Self as SszDecode>::is_ssz_fixed_len() {
            N * <T as SszDecode>::ssz_fixed_len()
        } else {
            BYTES_PER_LENGTH_OFFSET
        }
    }
}

impl<T: SszDecode> SszDecode for Vec<T> {
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
        let bytes_len = bytes.len();
        let fixed_len = <T as SszDecode>::ssz_fixed_len();

        if bytes.is_empty() {
            Ok(vec![])
        } else if !T::is_ssz_fixed_len() {
            decode_variable_sized_items(bytes)
        } else if bytes_len % fixed_len == 0 {
            let mut result = Vec::with_capacity(bytes.len() / fixed_len);
            for chunk in bytes.chunks(fixed_len) {
                result.push(T::from_ssz_bytes(chunk)?);
            }

            Ok(result)
        } else {
            Err(SszDecodeError::InvalidByteLength {
                len: bytes_len,
                expected: bytes.len() / <T as SszDecode>::ssz_fixed_len() + 1,
            })
        }
    }

    fn is_ssz_fixed_len() -> bool {
        false
    }
}

impl SszDecode for String {
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
        match std::str::from_utf8(bytes) {
            Ok(string) => Ok(string.to_string()),
            Err(err) => Err(SszDecodeError::BytesInvalid(format!(
                "Cannot deserialize string: {}",
                err
            ))),
        }
    }

    fn is_ssz_fixed_len() -> bool {
        false
    }
}

impl<T: SszDecode> SszDecode for Option<T> {
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
        if bytes.len() < BYTES_PER_LENGTH_OFFSET {
            return Err(SszDecodeError::InvalidByteLength {
                len: bytes.len(),
                expected: BYTES_PER_LENGTH_OFFSET,
            });
        }

        let (index_bytes, value_bytes) = bytes.split_at(BYTES_PER_LENGTH_OFFSET);

        let index = decode_offset(index_bytes)?;
        if index == 0 {
            Ok(None)
        } else if index == 1 {
            Ok(Some(T::from_ssz_bytes(value_bytes)?))
        } else {
            Err(SszDecodeError::BytesInvalid(format!(
                "{} is not a valid union index for Option<T>",
                index
            )))
        }
    }

    fn is_ssz_fixed_len() -> bool {
        false
    }
}

macro_rules! decode_for_tuples {
    ($(
        $Tuple:ident {
            $(($idx:tt) -> $T:ident)+
        }
    )+) => {
        $(
            impl<$($T: SszDecode),+> SszDecode for ($($T,)+) {
                fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
                    let mut decoder = Decoder::for_bytes(bytes);

                    $(
                        decoder.next_type::<$T>()?;
                    )+

                    Ok(($(
                        decoder.deserialize_next::<$T>()?,
                    )+))
                }

                fn is_ssz_fixed_len() -> bool {
                    $(
                        <$T as SszDecode>::is_ssz_fixed_len() &&
                    )+
                        true
                }

                fn ssz_fixed_len() -> usize {
                    if <Self as SszDecode>::is_ssz_fixed_len() {
                        $(
                            <$T as SszDecode>::ssz_fixed_len() +
                        )+
                            0
                    } else {
                        BYTES_PER_LENGTH_OFFSET
                    }
                }
            }
        )+
    };
}

decode_for_tuples! {
    Tuple2 {
        (0) -> A
        (1) -> B
    }
    Tuple3 {
        (0) -> A
        (1) -> B
        (2) -> C
    }
    Tuple4 {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
    }
    Tuple5 {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
        (4) -> E
    }
    Tuple6 {
        (0) -> A
        (1) -> B
        (2) -> C
        (3) -> D
        (4) -> E
        (5) -> F
    }
}

impl SszDecode for H256 {
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
        let len = bytes.len();
        let expected = <Self as SszDecode>::ssz_fixed_len();

        if len == expected {
            Ok(H256::from_slice(bytes))
        } else {
            Err(SszDecodeError::InvalidByteLength { len, expected })
        }
    }

    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        32
    }
}

impl SszDecode for U256 {
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
        let len = bytes.len();
        let expected = <Self as SszDecode>::ssz_fixed_len();

        if len == expected {
            Ok(U256::from_little_endian(bytes))
        } else {
            Err(SszDecodeError::InvalidByteLength { len, expected })
        }
    }

    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        32
    }
}

impl SszDecode for U128 {
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
        let len = bytes.len();
        let expected = <Self as SszDecode>::ssz_fixed_len();

        if len == expected {
            Ok(U128::from_little_endian(bytes))
        } else {
            Err(SszDecodeError::InvalidByteLength { len, expected })
        }
    }

    fn is_ssz_fixed_len() -> bool {
        true
    }

    fn ssz_fixed_len() -> usize {
        16
    }
}

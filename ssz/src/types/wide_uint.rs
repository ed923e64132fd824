use super::*;
use num_bigint::{BigInt, BigUint, Sign};

const NARROW_WIDTH: usize = 16;
const WIDE_WIDTH: usize = 32;
const MIN_MAGNITUDE_BYTES: usize = 9;

/// A big unsigned integer wider than `u64`.
///
/// Values are validated on construction: the magnitude must span 9 to 32
/// bytes. On the wire a `WideUint` occupies 16 bytes when the magnitude fits
/// in 16, otherwise 32, little-endian and zero-padded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WideUint(BigUint);

impl WideUint {
    pub fn new(value: BigInt) -> Result<Self, SszEncodeError> {
        if value.sign() == Sign::Minus {
            return Err(SszEncodeError::NegativeBigInt);
        }
        Self::from_magnitude(value.magnitude().clone())
    }

    pub fn from_magnitude(value: BigUint) -> Result<Self, SszEncodeError> {
        let len = magnitude_len(&value);
        if !(MIN_MAGNITUDE_BYTES..=WIDE_WIDTH).contains(&len) {
            return Err(SszEncodeError::BigIntWidthOutOfRange { len });
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }
}

/// Length of the minimal big-endian representation.
fn magnitude_len(value: &BigUint) -> usize {
    ((value.bits() + 7) / 8) as usize
}

impl SszEncode for WideUint {
    fn as_ssz_bytes(&self) -> Vec<u8> {
        let mut bytes = self.0.to_bytes_le();
        let width = if bytes.len() <= NARROW_WIDTH {
            NARROW_WIDTH
        } else {
            WIDE_WIDTH
        };
        bytes.resize(width, 0);
        bytes
    }

    fn is_ssz_fixed_len() -> bool {
        false
    }
}

impl SszDecode for WideUint {
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, SszDecodeError> {
        if bytes.len() != NARROW_WIDTH && bytes.len() != WIDE_WIDTH {
            return Err(SszDecodeError::InvalidByteLength {
                len: bytes.len(),
                expected: NARROW_WIDTH,
            });
        }

        let value = BigUint::from_bytes_le(bytes);
        let len = magnitude_len(&value);
        let canonical = if bytes.len() == NARROW_WIDTH {
            (MIN_MAGNITUDE_BYTES..=NARROW_WIDTH).contains(&len)
        } else {
            ((NARROW_WIDTH + 1)..=WIDE_WIDTH).contains(&len)
        };

        if canonical {
            Ok(Self(value))
        } else {
            Err(SszDecodeError::BytesInvalid(format!(
                "a {}-byte wide integer cannot hold a {}-byte value",
                bytes.len(),
                len
            )))
        }
    }

    fn is_ssz_fixed_len() -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_be(bytes: &[u8]) -> WideUint {
        WideUint::from_magnitude(BigUint::from_bytes_be(bytes)).expect("Test")
    }

    mod construction {
        use super::*;

        #[test]
        fn rejects_negative() {
            let negative = BigInt::from_bytes_be(Sign::Minus, &[1; 12]);
            assert_eq!(
                WideUint::new(negative),
                Err(SszEncodeError::NegativeBigInt)
            );
        }

        #[test]
        fn rejects_narrow_and_wide_magnitudes() {
            assert_eq!(
                WideUint::from_magnitude(BigUint::from(u64::max_value())),
                Err(SszEncodeError::BigIntWidthOutOfRange { len: 8 })
            );
            assert_eq!(
                WideUint::from_magnitude(BigUint::from_bytes_be(&[1; 33])),
                Err(SszEncodeError::BigIntWidthOutOfRange { len: 33 })
            );
            assert_eq!(
                WideUint::from_magnitude(BigUint::from(0_u8)),
                Err(SszEncodeError::BigIntWidthOutOfRange { len: 0 })
            );
        }

        #[test]
        fn accepts_boundary_magnitudes() {
            assert!(WideUint::from_magnitude(BigUint::from_bytes_be(&[1; 9])).is_ok());
            assert!(WideUint::from_magnitude(BigUint::from_bytes_be(&[1; 32])).is_ok());

            let positive = BigInt::from_bytes_be(Sign::Plus, &[1; 12]);
            assert!(WideUint::new(positive).is_ok());
        }
    }

    mod serialize {
        use super::*;

        #[test]
        fn nine_byte_value_widens_to_sixteen() {
            let value = from_be(&[0x02, 0, 0, 0, 0, 0, 0, 0, 0x01]);
            assert_eq!(
                value.as_ssz_bytes(),
                vec![0x01, 0, 0, 0, 0, 0, 0, 0, 0x02, 0, 0, 0, 0, 0, 0, 0]
            );
        }

        #[test]
        fn seventeen_byte_value_widens_to_thirty_two() {
            let value = from_be(&[1; 17]);
            let encoded = value.as_ssz_bytes();
            assert_eq!(encoded.len(), 32);
            assert_eq!(&encoded[..17], &[1; 17][..]);
            assert_eq!(&encoded[17..], &[0; 15][..]);
        }

        #[test]
        fn is_variable_size() {
            assert!(!<WideUint as SszEncode>::is_ssz_fixed_len());
            assert_eq!(
                <WideUint as SszDecode>::ssz_fixed_len(),
                BYTES_PER_LENGTH_OFFSET
            );
        }
    }

    mod deserialize {
        use super::*;

        #[test]
        fn round_trips() {
            let narrow = from_be(&[0x02, 0, 0, 0, 0, 0, 0, 0, 0x01]);
            assert_eq!(
                WideUint::from_ssz_bytes(&narrow.as_ssz_bytes()).expect("Test"),
                narrow
            );

            let wide = from_be(&[0xff; 32]);
            assert_eq!(
                WideUint::from_ssz_bytes(&wide.as_ssz_bytes()).expect("Test"),
                wide
            );
        }

        #[test]
        fn rejects_bad_widths() {
            assert!(WideUint::from_ssz_bytes(&[0; 8]).is_err());
            assert!(WideUint::from_ssz_bytes(&[0; 17]).is_err());
            assert!(WideUint::from_ssz_bytes(&[0; 33]).is_err());
        }

        #[test]
        fn rejects_non_canonical_widths() {
            // An 8-byte value padded to 16.
            let mut bytes = vec![0xff; 8];
            bytes.resize(16, 0);
            assert!(WideUint::from_ssz_bytes(&bytes).is_err());

            // A 16-byte value padded to 32.
            let mut bytes = vec![0xff; 16];
            bytes.resize(32, 0);
            assert!(WideUint::from_ssz_bytes(&bytes).is_err());
        }
    }
}

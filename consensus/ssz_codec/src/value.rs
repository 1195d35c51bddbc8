use crate::{Bitfield, SszType, UintWidth, U128, U256};

/// Returned when a value does not conform to the shape it is paired with.
#[derive(Debug, PartialEq, Clone)]
pub enum ValueError {
    /// The value is a different variant to the shape, e.g. a `List` given for a `uint64`.
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A vector does not hold exactly the number of elements declared by its shape.
    WrongVectorLength { len: usize, expected: usize },
    /// A bitvector does not hold exactly the number of bits declared by its shape.
    WrongBitLength { len: usize, expected: usize },
    /// A container does not hold exactly one value per declared field.
    WrongFieldCount { len: usize, expected: usize },
    /// A list or bitlist holds more elements than its limit permits.
    LimitExceeded { len: usize, max_len: usize },
}

/// An owned SSZ value. Only meaningful when paired with an `SszType`.
///
/// Container fields are held positionally, in the order the shape declares them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SszValue {
    Bool(bool),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Uint128(U128),
    Uint256(U256),
    Vector(Vec<SszValue>),
    List(Vec<SszValue>),
    Bitvector(Bitfield),
    Bitlist(Bitfield),
    Container(Vec<SszValue>),
}

impl SszValue {
    /// A `Vector[uint8, N]` holding `bytes`.
    pub fn byte_vector(bytes: &[u8]) -> Self {
        SszValue::Vector(bytes.iter().copied().map(SszValue::Uint8).collect())
    }

    /// A `List[uint8, N]` holding `bytes`.
    pub fn byte_list(bytes: &[u8]) -> Self {
        SszValue::List(bytes.iter().copied().map(SszValue::Uint8).collect())
    }

    /// Returns the bytes of a vector or list of `uint8`, or `None` for any other value.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        match self {
            SszValue::Vector(items) | SszValue::List(items) => items
                .iter()
                .map(|item| match item {
                    SszValue::Uint8(byte) => Some(*byte),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// A short name for the variant, matching `SszType::kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            SszValue::Bool(_) => "bool",
            SszValue::Uint8(_) => "uint8",
            SszValue::Uint16(_) => "uint16",
            SszValue::Uint32(_) => "uint32",
            SszValue::Uint64(_) => "uint64",
            SszValue::Uint128(_) => "uint128",
            SszValue::Uint256(_) => "uint256",
            SszValue::Vector(_) => "vector",
            SszValue::List(_) => "list",
            SszValue::Bitvector(_) => "bitvector",
            SszValue::Bitlist(_) => "bitlist",
            SszValue::Container(_) => "container",
        }
    }
}

macro_rules! impl_from_for_value {
    ($type: ty, $variant: ident) => {
        impl From<$type> for SszValue {
            fn from(x: $type) -> Self {
                SszValue::$variant(x)
            }
        }
    };
}

impl_from_for_value!(bool, Bool);
impl_from_for_value!(u8, Uint8);
impl_from_for_value!(u16, Uint16);
impl_from_for_value!(u32, Uint32);
impl_from_for_value!(u64, Uint64);
impl_from_for_value!(U128, Uint128);
impl_from_for_value!(U256, Uint256);

impl SszType {
    /// Checks that `value` conforms to `self` in full, including list and bitlist limits.
    ///
    /// Encoding and decoding never enforce list limits; callers that need to reject an
    /// over-long list (e.g. when checking invalid test vectors) must call this.
    pub fn validate(&self, value: &SszValue) -> Result<(), ValueError> {
        match (self, value) {
            (SszType::Bool, SszValue::Bool(_))
            | (SszType::Uint(UintWidth::U8), SszValue::Uint8(_))
            | (SszType::Uint(UintWidth::U16), SszValue::Uint16(_))
            | (SszType::Uint(UintWidth::U32), SszValue::Uint32(_))
            | (SszType::Uint(UintWidth::U64), SszValue::Uint64(_))
            | (SszType::Uint(UintWidth::U128), SszValue::Uint128(_))
            | (SszType::Uint(UintWidth::U256), SszValue::Uint256(_)) => Ok(()),
            (SszType::Vector { elem, len }, SszValue::Vector(items)) => {
                if items.len() != *len {
                    return Err(ValueError::WrongVectorLength {
                        len: items.len(),
                        expected: *len,
                    });
                }
                items.iter().try_for_each(|item| elem.validate(item))
            }
            (SszType::List { elem, max_len }, SszValue::List(items)) => {
                if items.len() > *max_len {
                    return Err(ValueError::LimitExceeded {
                        len: items.len(),
                        max_len: *max_len,
                    });
                }
                items.iter().try_for_each(|item| elem.validate(item))
            }
            (SszType::Bitvector { len }, SszValue::Bitvector(bits)) => {
                if bits.len() == *len {
                    Ok(())
                } else {
                    Err(ValueError::WrongBitLength {
                        len: bits.len(),
                        expected: *len,
                    })
                }
            }
            (SszType::Bitlist { max_len }, SszValue::Bitlist(bits)) => {
                if bits.len() <= *max_len {
                    Ok(())
                } else {
                    Err(ValueError::LimitExceeded {
                        len: bits.len(),
                        max_len: *max_len,
                    })
                }
            }
            (SszType::Container(fields), SszValue::Container(values)) => {
                if fields.len() != values.len() {
                    return Err(ValueError::WrongFieldCount {
                        len: values.len(),
                        expected: fields.len(),
                    });
                }
                fields
                    .iter()
                    .zip(values)
                    .try_for_each(|(field, value)| field.ty.validate(value))
            }
            _ => Err(ValueError::ShapeMismatch {
                expected: self.kind(),
                found: value.kind(),
            }),
        }
    }
}

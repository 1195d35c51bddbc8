use crate::{
    decode::{decode, DecodeError},
    encode::{encode, EncodeError},
    value::{SszValue, ValueError},
    Bitfield, BITS_PER_BYTE, BYTES_PER_LENGTH_OFFSET, U128, U256,
};
use std::fmt;

/// The width of an SSZ unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UintWidth {
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
}

impl UintWidth {
    pub fn byte_len(self) -> usize {
        match self {
            UintWidth::U8 => 1,
            UintWidth::U16 => 2,
            UintWidth::U32 => 4,
            UintWidth::U64 => 8,
            UintWidth::U128 => 16,
            UintWidth::U256 => 32,
        }
    }

    pub fn bits(self) -> usize {
        self.byte_len() * BITS_PER_BYTE
    }

    /// Returns the width with exactly `bits` bits, if one exists.
    pub fn from_bits(bits: usize) -> Option<Self> {
        match bits {
            8 => Some(UintWidth::U8),
            16 => Some(UintWidth::U16),
            32 => Some(UintWidth::U32),
            64 => Some(UintWidth::U64),
            128 => Some(UintWidth::U128),
            256 => Some(UintWidth::U256),
            _ => None,
        }
    }
}

/// A named member of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: SszType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: SszType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// The shape of an SSZ value.
///
/// Vector lengths and list/bitlist limits are part of the shape. They are fixed when the shape
/// is constructed and never appear on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SszType {
    Bool,
    Uint(UintWidth),
    Vector { elem: Box<SszType>, len: usize },
    List { elem: Box<SszType>, max_len: usize },
    Bitvector { len: usize },
    Bitlist { max_len: usize },
    Container(Vec<Field>),
}

impl SszType {
    pub fn uint8() -> Self {
        SszType::Uint(UintWidth::U8)
    }

    pub fn uint16() -> Self {
        SszType::Uint(UintWidth::U16)
    }

    pub fn uint32() -> Self {
        SszType::Uint(UintWidth::U32)
    }

    pub fn uint64() -> Self {
        SszType::Uint(UintWidth::U64)
    }

    pub fn uint128() -> Self {
        SszType::Uint(UintWidth::U128)
    }

    pub fn uint256() -> Self {
        SszType::Uint(UintWidth::U256)
    }

    pub fn vector(elem: SszType, len: usize) -> Self {
        SszType::Vector {
            elem: Box::new(elem),
            len,
        }
    }

    pub fn list(elem: SszType, max_len: usize) -> Self {
        SszType::List {
            elem: Box::new(elem),
            max_len,
        }
    }

    pub fn bitvector(len: usize) -> Self {
        SszType::Bitvector { len }
    }

    pub fn bitlist(max_len: usize) -> Self {
        SszType::Bitlist { max_len }
    }

    /// A `Vector[uint8, len]`, e.g. a `Bytes32` root or a `Bytes96` signature.
    pub fn byte_vector(len: usize) -> Self {
        Self::vector(Self::uint8(), len)
    }

    pub fn byte_list(max_len: usize) -> Self {
        Self::list(Self::uint8(), max_len)
    }

    /// Builds a container from `(name, type)` pairs, in declaration order.
    pub fn container<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, SszType)>,
        S: Into<String>,
    {
        SszType::Container(
            fields
                .into_iter()
                .map(|(name, ty)| Field::new(name, ty))
                .collect(),
        )
    }

    /// Returns `true` if every value of this shape encodes to the same number of bytes.
    pub fn is_ssz_fixed_len(&self) -> bool {
        match self {
            SszType::Bool | SszType::Uint(_) | SszType::Bitvector { .. } => true,
            SszType::Vector { elem, .. } => elem.is_ssz_fixed_len(),
            SszType::List { .. } | SszType::Bitlist { .. } => false,
            SszType::Container(fields) => fields.iter().all(|field| field.ty.is_ssz_fixed_len()),
        }
    }

    /// The number of bytes this shape occupies in the fixed-length portion of an enclosing
    /// encoding.
    ///
    /// Variable-length shapes occupy `BYTES_PER_LENGTH_OFFSET` bytes (their offset).
    pub fn ssz_fixed_len(&self) -> usize {
        match self {
            SszType::Bool => 1,
            SszType::Uint(width) => width.byte_len(),
            SszType::Bitvector { len } => (len + 7) / BITS_PER_BYTE,
            SszType::Vector { elem, len } if elem.is_ssz_fixed_len() => {
                elem.ssz_fixed_len().saturating_mul(*len)
            }
            SszType::Container(fields) if self.is_ssz_fixed_len() => fields
                .iter()
                .map(|field| field.ty.ssz_fixed_len())
                .fold(0, usize::saturating_add),
            _ => BYTES_PER_LENGTH_OFFSET,
        }
    }

    /// Returns `true` for booleans and unsigned integers.
    pub fn is_basic(&self) -> bool {
        matches!(self, SszType::Bool | SszType::Uint(_))
    }

    /// A short name for the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SszType::Bool => "bool",
            SszType::Uint(UintWidth::U8) => "uint8",
            SszType::Uint(UintWidth::U16) => "uint16",
            SszType::Uint(UintWidth::U32) => "uint32",
            SszType::Uint(UintWidth::U64) => "uint64",
            SszType::Uint(UintWidth::U128) => "uint128",
            SszType::Uint(UintWidth::U256) => "uint256",
            SszType::Vector { .. } => "vector",
            SszType::List { .. } => "list",
            SszType::Bitvector { .. } => "bitvector",
            SszType::Bitlist { .. } => "bitlist",
            SszType::Container(_) => "container",
        }
    }

    /// Returns the all-zero value of this shape: zero integers, `false` bits, vectors of
    /// default elements and empty lists.
    pub fn default_value(&self) -> SszValue {
        match self {
            SszType::Bool => SszValue::Bool(false),
            SszType::Uint(UintWidth::U8) => SszValue::Uint8(0),
            SszType::Uint(UintWidth::U16) => SszValue::Uint16(0),
            SszType::Uint(UintWidth::U32) => SszValue::Uint32(0),
            SszType::Uint(UintWidth::U64) => SszValue::Uint64(0),
            SszType::Uint(UintWidth::U128) => SszValue::Uint128(U128::zero()),
            SszType::Uint(UintWidth::U256) => SszValue::Uint256(U256::zero()),
            SszType::Vector { elem, len } => SszValue::Vector(vec![elem.default_value(); *len]),
            SszType::List { .. } => SszValue::List(vec![]),
            SszType::Bitvector { len } => SszValue::Bitvector(Bitfield::with_len(*len)),
            SszType::Bitlist { .. } => SszValue::Bitlist(Bitfield::with_len(0)),
            SszType::Container(fields) => SszValue::Container(
                fields.iter().map(|field| field.ty.default_value()).collect(),
            ),
        }
    }

    /// Returns an error if `value` is not of the same variant as `self`.
    ///
    /// Only the outermost variant is compared; see `Self::validate` for a full check.
    pub fn check_kind(&self, value: &SszValue) -> Result<(), ValueError> {
        if self.kind() == value.kind() {
            Ok(())
        } else {
            Err(ValueError::ShapeMismatch {
                expected: self.kind(),
                found: value.kind(),
            })
        }
    }

    /// Equivalent to `ssz_codec::encode(self, value)`.
    pub fn encode(&self, value: &SszValue) -> Result<Vec<u8>, EncodeError> {
        encode(self, value)
    }

    /// Equivalent to `ssz_codec::decode(self, bytes)`.
    pub fn decode(&self, bytes: &[u8]) -> Result<SszValue, DecodeError> {
        decode(self, bytes)
    }
}

impl fmt::Display for SszType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SszType::Vector { elem, len } => write!(f, "Vector[{}, {}]", elem, len),
            SszType::List { elem, max_len } => write!(f, "List[{}, {}]", elem, max_len),
            SszType::Bitvector { len } => write!(f, "Bitvector[{}]", len),
            SszType::Bitlist { max_len } => write!(f, "Bitlist[{}]", max_len),
            SszType::Container(fields) => {
                write!(f, "Container(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, ")")
            }
            other => write!(f, "{}", other.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_len_of_basic_types() {
        assert!(SszType::Bool.is_ssz_fixed_len());
        assert_eq!(SszType::Bool.ssz_fixed_len(), 1);
        assert_eq!(SszType::uint16().ssz_fixed_len(), 2);
        assert_eq!(SszType::uint256().ssz_fixed_len(), 32);
    }

    #[test]
    fn fixed_len_of_composites() {
        assert_eq!(SszType::byte_vector(32).ssz_fixed_len(), 32);
        assert_eq!(SszType::bitvector(1).ssz_fixed_len(), 1);
        assert_eq!(SszType::bitvector(9).ssz_fixed_len(), 2);

        let fixed = SszType::container([
            ("a", SszType::uint8()),
            ("b", SszType::uint64()),
            ("c", SszType::uint32()),
        ]);
        assert!(fixed.is_ssz_fixed_len());
        assert_eq!(fixed.ssz_fixed_len(), 13);
    }

    #[test]
    fn variable_len_is_contagious() {
        let list = SszType::list(SszType::uint16(), 1024);
        assert!(!list.is_ssz_fixed_len());
        assert_eq!(list.ssz_fixed_len(), BYTES_PER_LENGTH_OFFSET);

        let vector_of_lists = SszType::vector(list.clone(), 2);
        assert!(!vector_of_lists.is_ssz_fixed_len());

        let container = SszType::container([("a", SszType::uint16()), ("b", list)]);
        assert!(!container.is_ssz_fixed_len());
        assert_eq!(container.ssz_fixed_len(), BYTES_PER_LENGTH_OFFSET);

        assert!(!SszType::bitlist(0).is_ssz_fixed_len());
    }

    #[test]
    fn uint_width_bits() {
        for width in [
            UintWidth::U8,
            UintWidth::U16,
            UintWidth::U32,
            UintWidth::U64,
            UintWidth::U128,
            UintWidth::U256,
        ] {
            assert_eq!(UintWidth::from_bits(width.bits()), Some(width));
        }
        assert_eq!(UintWidth::from_bits(24), None);
    }

    #[test]
    fn default_values() {
        let ty = SszType::container([
            ("a", SszType::vector(SszType::Bool, 2)),
            ("b", SszType::list(SszType::uint8(), 4)),
            ("c", SszType::bitvector(3)),
        ]);
        assert_eq!(
            ty.default_value(),
            SszValue::Container(vec![
                SszValue::Vector(vec![SszValue::Bool(false), SszValue::Bool(false)]),
                SszValue::List(vec![]),
                SszValue::Bitvector(Bitfield::with_len(3)),
            ])
        );
    }

    #[test]
    fn display() {
        let ty = SszType::container([
            ("a", SszType::list(SszType::uint16(), 8)),
            ("b", SszType::bitlist(5)),
        ]);
        assert_eq!(ty.to_string(), "Container(a: List[uint16, 8], b: Bitlist[5])");
    }
}

use super::*;

mod impls;

/// Returned when SSZ encoding fails.
#[derive(Debug, PartialEq, Clone)]
pub enum EncodeError {
    /// The destination buffer cannot hold the encoding.
    BufferTooSmall { len: usize, expected: usize },
    /// A variable-length item would start at a position that cannot be represented in
    /// `BYTES_PER_LENGTH_OFFSET` bytes.
    OffsetOverflow(usize),
    /// The value does not conform to its shape.
    Value(ValueError),
}

impl From<ValueError> for EncodeError {
    fn from(e: ValueError) -> Self {
        EncodeError::Value(e)
    }
}

/// Provides SSZ encoding (serialization) for scalar types via the `as_ssz_bytes(&self)`
/// method.
pub trait Encode {
    /// Returns `true` if this object has a fixed-length.
    fn is_ssz_fixed_len() -> bool;

    /// Append the encoding `self` to `buf`.
    fn ssz_append(&self, buf: &mut Vec<u8>);

    /// The number of bytes this object occupies in the fixed-length portion of the SSZ bytes.
    ///
    /// By default, this is set to `BYTES_PER_LENGTH_OFFSET` which is suitable for variable length
    /// objects, but not fixed-length objects. Fixed-length objects _must_ return a value which
    /// represents their length.
    fn ssz_fixed_len() -> usize {
        BYTES_PER_LENGTH_OFFSET
    }

    /// Returns the size (in bytes) when `self` is serialized.
    fn ssz_bytes_len(&self) -> usize;

    /// Returns the full-form encoding of this object.
    fn as_ssz_bytes(&self) -> Vec<u8> {
        let mut buf = vec![];

        self.ssz_append(&mut buf);

        buf
    }
}

/// Allow for encoding an ordered series of distinct or indistinct objects as SSZ bytes.
///
/// **You must call `finalize(..)` after the final `append(..)` call** to ensure the bytes are
/// written to `buf`.
///
/// Used for containers and for vectors/lists of variable-length elements. Fixed-length items
/// are written in place; variable-length items are replaced by an offset and collected in a
/// separate buffer which `finalize` appends after the fixed portion.
pub struct SszEncoder<'a> {
    offset: usize,
    buf: &'a mut Vec<u8>,
    variable_bytes: Vec<u8>,
}

impl<'a> SszEncoder<'a> {
    /// Instantiate a new encoder for encoding a SSZ container or a sequence of variable-length
    /// items.
    ///
    /// `num_fixed_bytes` is the length of the fixed portion: the sum of the fixed lengths of all
    /// fixed-length items plus `BYTES_PER_LENGTH_OFFSET` for each variable-length item.
    pub fn container(buf: &'a mut Vec<u8>, num_fixed_bytes: usize) -> Self {
        buf.reserve(num_fixed_bytes);

        Self {
            offset: num_fixed_bytes,
            buf,
            variable_bytes: vec![],
        }
    }

    /// Append some `item` to the SSZ bytes.
    pub fn append<T: Encode>(&mut self, item: &T) -> Result<(), EncodeError> {
        self.append_parameterized(T::is_ssz_fixed_len(), |buf| {
            item.ssz_append(buf);
            Ok(())
        })
    }

    /// Uses `ssz_append` to append the encoding of some item to the SSZ bytes.
    pub fn append_parameterized<F>(
        &mut self,
        is_ssz_fixed_len: bool,
        ssz_append: F,
    ) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut Vec<u8>) -> Result<(), EncodeError>,
    {
        if is_ssz_fixed_len {
            ssz_append(self.buf)
        } else {
            let offset = self
                .offset
                .checked_add(self.variable_bytes.len())
                .ok_or(EncodeError::OffsetOverflow(self.offset))?;
            self.buf.extend_from_slice(&encode_length(offset)?);
            ssz_append(&mut self.variable_bytes)
        }
    }

    /// Write the variable bytes to `self.bytes`.
    ///
    /// This method must be called after the final `append(..)` call when serializing
    /// variable-length items.
    pub fn finalize(&mut self) -> &mut Vec<u8> {
        self.buf.append(&mut self.variable_bytes);

        self.buf
    }
}

/// Encode `len` as a little-endian byte array of `BYTES_PER_LENGTH_OFFSET` length.
///
/// Returns `OffsetOverflow` if `len` does not fit.
pub fn encode_length(len: usize) -> Result<[u8; BYTES_PER_LENGTH_OFFSET], EncodeError> {
    if len > MAX_LENGTH_VALUE {
        return Err(EncodeError::OffsetOverflow(len));
    }

    let mut bytes = [0; BYTES_PER_LENGTH_OFFSET];
    bytes.copy_from_slice(&len.to_le_bytes()[0..BYTES_PER_LENGTH_OFFSET]);
    Ok(bytes)
}

/// Writes the encoding of a scalar to the front of `dst`, returning the number of bytes
/// written.
pub fn write_scalar<T: Encode>(dst: &mut [u8], value: &T) -> Result<usize, EncodeError> {
    let expected = value.ssz_bytes_len();
    let len = dst.len();

    dst.get_mut(..expected)
        .ok_or(EncodeError::BufferTooSmall { len, expected })?
        .copy_from_slice(&value.as_ssz_bytes());

    Ok(expected)
}

/// Returns the SSZ encoding of `value`, interpreted as `ty`.
pub fn encode(ty: &SszType, value: &SszValue) -> Result<Vec<u8>, EncodeError> {
    let mut buf = vec![];
    ssz_append(ty, value, &mut buf)?;
    Ok(buf)
}

/// Writes the SSZ encoding of `value` to the front of `dst`, returning the number of bytes
/// written.
///
/// Nothing is written if `dst` cannot hold the whole encoding.
pub fn encode_into(ty: &SszType, value: &SszValue, dst: &mut [u8]) -> Result<usize, EncodeError> {
    let expected = ssz_bytes_len(ty, value)?;
    let len = dst.len();
    let dst = dst
        .get_mut(..expected)
        .ok_or(EncodeError::BufferTooSmall { len, expected })?;

    let bytes = encode(ty, value)?;
    dst.copy_from_slice(&bytes);

    Ok(expected)
}

/// Returns the number of bytes `encode(ty, value)` would produce.
pub fn ssz_bytes_len(ty: &SszType, value: &SszValue) -> Result<usize, EncodeError> {
    match (ty, value) {
        _ if ty.is_ssz_fixed_len() => {
            ty.check_kind(value)?;
            Ok(ty.ssz_fixed_len())
        }
        (SszType::Vector { elem, .. }, SszValue::Vector(items))
        | (SszType::List { elem, .. }, SszValue::List(items)) => {
            sequence_ssz_bytes_len(elem, items)
        }
        (SszType::Bitlist { .. }, SszValue::Bitlist(bits)) => Ok(bits.len() / BITS_PER_BYTE + 1),
        (SszType::Container(fields), SszValue::Container(values)) => {
            check_field_count(fields, values)?;
            fields
                .iter()
                .zip(values)
                .try_fold(0, |len, (field, value)| {
                    checked_len_add(len, item_ssz_bytes_len(&field.ty, value)?)
                })
        }
        _ => Err(ValueError::ShapeMismatch {
            expected: ty.kind(),
            found: value.kind(),
        }
        .into()),
    }
}

/// The bytes an item occupies inside a container or sequence, including its offset.
fn item_ssz_bytes_len(ty: &SszType, value: &SszValue) -> Result<usize, EncodeError> {
    if ty.is_ssz_fixed_len() {
        ty.check_kind(value)?;
        Ok(ty.ssz_fixed_len())
    } else {
        checked_len_add(BYTES_PER_LENGTH_OFFSET, ssz_bytes_len(ty, value)?)
    }
}

fn checked_len_add(len: usize, item_len: usize) -> Result<usize, EncodeError> {
    len.checked_add(item_len)
        .ok_or(EncodeError::OffsetOverflow(len))
}

fn sequence_ssz_bytes_len(elem: &SszType, items: &[SszValue]) -> Result<usize, EncodeError> {
    if elem.is_ssz_fixed_len() {
        elem.ssz_fixed_len()
            .checked_mul(items.len())
            .ok_or(EncodeError::OffsetOverflow(usize::MAX))
    } else {
        items
            .iter()
            .try_fold(0, |len, item| checked_len_add(len, item_ssz_bytes_len(elem, item)?))
    }
}

fn check_field_count(fields: &[Field], values: &[SszValue]) -> Result<(), ValueError> {
    if fields.len() == values.len() {
        Ok(())
    } else {
        Err(ValueError::WrongFieldCount {
            len: values.len(),
            expected: fields.len(),
        })
    }
}

/// Appends the encoding of `value` to `buf`.
pub(crate) fn ssz_append(
    ty: &SszType,
    value: &SszValue,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    match (ty, value) {
        (SszType::Bool, SszValue::Bool(x)) => x.ssz_append(buf),
        (SszType::Uint(UintWidth::U8), SszValue::Uint8(x)) => x.ssz_append(buf),
        (SszType::Uint(UintWidth::U16), SszValue::Uint16(x)) => x.ssz_append(buf),
        (SszType::Uint(UintWidth::U32), SszValue::Uint32(x)) => x.ssz_append(buf),
        (SszType::Uint(UintWidth::U64), SszValue::Uint64(x)) => x.ssz_append(buf),
        (SszType::Uint(UintWidth::U128), SszValue::Uint128(x)) => x.ssz_append(buf),
        (SszType::Uint(UintWidth::U256), SszValue::Uint256(x)) => x.ssz_append(buf),
        (SszType::Vector { elem, len }, SszValue::Vector(items)) => {
            if items.len() != *len {
                return Err(ValueError::WrongVectorLength {
                    len: items.len(),
                    expected: *len,
                }
                .into());
            }
            sequence_ssz_append(elem, items, buf)?
        }
        (SszType::List { elem, .. }, SszValue::List(items)) => {
            sequence_ssz_append(elem, items, buf)?
        }
        (SszType::Bitvector { len }, SszValue::Bitvector(bits)) => {
            if bits.len() != *len {
                return Err(ValueError::WrongBitLength {
                    len: bits.len(),
                    expected: *len,
                }
                .into());
            }
            buf.extend_from_slice(bits.as_raw_bytes())
        }
        (SszType::Bitlist { max_len }, SszValue::Bitlist(bits)) => {
            if bits.len() > *max_len {
                return Err(ValueError::LimitExceeded {
                    len: bits.len(),
                    max_len: *max_len,
                }
                .into());
            }
            buf.extend_from_slice(&bits.to_bitlist_bytes())
        }
        (SszType::Container(fields), SszValue::Container(values)) => {
            check_field_count(fields, values)?;

            if ty.is_ssz_fixed_len() {
                for (field, value) in fields.iter().zip(values) {
                    ssz_append(&field.ty, value, buf)?;
                }
            } else {
                let num_fixed_bytes = fields.iter().try_fold(0, |len, field| {
                    checked_len_add(len, field.ty.ssz_fixed_len())
                })?;
                // The first offset points just past the fixed portion.
                encode_length(num_fixed_bytes)?;

                let mut encoder = SszEncoder::container(buf, num_fixed_bytes);

                for (field, value) in fields.iter().zip(values) {
                    encoder.append_parameterized(field.ty.is_ssz_fixed_len(), |buf| {
                        ssz_append(&field.ty, value, buf)
                    })?;
                }

                encoder.finalize();
            }
        }
        _ => {
            return Err(ValueError::ShapeMismatch {
                expected: ty.kind(),
                found: value.kind(),
            }
            .into())
        }
    }

    Ok(())
}

/// Appends a homogeneous sequence: a flat concatenation for fixed-length elements, otherwise an
/// offset table followed by the elements.
fn sequence_ssz_append(
    elem: &SszType,
    items: &[SszValue],
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    if elem.is_ssz_fixed_len() {
        for item in items {
            ssz_append(elem, item, buf)?;
        }
    } else {
        let mut encoder = SszEncoder::container(buf, items.len() * BYTES_PER_LENGTH_OFFSET);

        for item in items {
            encoder.append_parameterized(false, |buf| ssz_append(elem, item, buf))?;
        }

        encoder.finalize();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var_container() -> SszType {
        SszType::container([
            ("a", SszType::uint16()),
            ("b", SszType::list(SszType::uint16(), 1024)),
        ])
    }

    #[test]
    fn uint32() {
        assert_eq!(
            encode(&SszType::uint32(), &SszValue::Uint32(7)),
            Ok(vec![0x07, 0x00, 0x00, 0x00])
        );
    }

    #[test]
    fn container_with_variable_field() {
        let value = SszValue::Container(vec![
            SszValue::Uint16(0xaabb),
            SszValue::List(vec![1u16.into(), 2u16.into(), 3u16.into()]),
        ]);
        let bytes = encode(&var_container(), &value).unwrap();
        assert_eq!(bytes, vec![0xbb, 0xaa, 6, 0, 0, 0, 1, 0, 2, 0, 3, 0]);
        assert_eq!(ssz_bytes_len(&var_container(), &value), Ok(12));
    }

    #[test]
    fn list_of_lists() {
        let ty = SszType::list(SszType::byte_list(8), 8);

        let value = SszValue::List(vec![]);
        assert_eq!(encode(&ty, &value), Ok(vec![]));

        let value = SszValue::List(vec![SszValue::byte_list(&[])]);
        assert_eq!(encode(&ty, &value), Ok(vec![4, 0, 0, 0]));

        let value = SszValue::List(vec![
            SszValue::byte_list(&[0, 1, 2]),
            SszValue::byte_list(&[11, 22, 33]),
        ]);
        assert_eq!(
            encode(&ty, &value),
            Ok(vec![8, 0, 0, 0, 11, 0, 0, 0, 0, 1, 2, 11, 22, 33])
        );
    }

    #[test]
    fn list_limit_is_not_enforced() {
        let ty = SszType::list(SszType::uint8(), 1);
        assert_eq!(
            encode(&ty, &SszValue::byte_list(&[1, 2])),
            Ok(vec![1, 2])
        );
    }

    #[test]
    fn bitlist_limit_is_enforced() {
        let ty = SszType::bitlist(2);
        assert_eq!(
            encode(&ty, &SszValue::Bitlist(Bitfield::with_len(3))),
            Err(EncodeError::Value(ValueError::LimitExceeded {
                len: 3,
                max_len: 2
            }))
        );
    }

    #[test]
    fn bitlist() {
        let ty = SszType::bitlist(8);
        let value = SszValue::Bitlist(Bitfield::from_bools(&[true, false, true]));
        assert_eq!(encode(&ty, &value), Ok(vec![0b0000_1101]));
    }

    #[test]
    fn shape_mismatch() {
        assert_eq!(
            encode(&SszType::uint64(), &SszValue::Uint32(1)),
            Err(EncodeError::Value(ValueError::ShapeMismatch {
                expected: "uint64",
                found: "uint32"
            }))
        );
        assert_eq!(
            encode(&SszType::byte_vector(2), &SszValue::byte_vector(&[1])),
            Err(EncodeError::Value(ValueError::WrongVectorLength {
                len: 1,
                expected: 2
            }))
        );
        assert_eq!(
            ssz_bytes_len(&var_container(), &SszValue::List(vec![])),
            Err(EncodeError::Value(ValueError::ShapeMismatch {
                expected: "container",
                found: "list"
            }))
        );
    }

    #[test]
    fn encode_into_buffer() {
        let ty = SszType::byte_vector(4);
        let value = SszValue::byte_vector(&[1, 2, 3, 4]);

        let mut dst = [0; 6];
        assert_eq!(encode_into(&ty, &value, &mut dst), Ok(4));
        assert_eq!(dst, [1, 2, 3, 4, 0, 0]);

        let mut dst = [0; 3];
        assert_eq!(
            encode_into(&ty, &value, &mut dst),
            Err(EncodeError::BufferTooSmall {
                len: 3,
                expected: 4
            })
        );
        assert_eq!(dst, [0; 3]);
    }

    #[test]
    fn offset_overflow() {
        assert_eq!(encode_length(MAX_LENGTH_VALUE), Ok([0xff; 4]));
        assert_eq!(
            encode_length(MAX_LENGTH_VALUE + 1),
            Err(EncodeError::OffsetOverflow(MAX_LENGTH_VALUE + 1))
        );
    }

    #[test]
    fn oversized_fixed_portion() {
        let huge = SszType::vector(SszType::uint64(), usize::MAX / 2);

        let ty = SszType::container([
            ("a", SszType::uint8()),
            ("b", huge.clone()),
            ("c", SszType::uint8()),
        ]);
        let value = SszValue::Container(vec![1u8.into(), SszValue::Vector(vec![]), 2u8.into()]);
        assert_eq!(
            encode(&ty, &value),
            Err(EncodeError::Value(ValueError::WrongVectorLength {
                len: 0,
                expected: usize::MAX / 2
            }))
        );
        assert_eq!(
            encode_into(&ty, &value, &mut [0; 16]),
            Err(EncodeError::BufferTooSmall {
                len: 16,
                expected: usize::MAX
            })
        );

        let ty = SszType::container([("a", huge), ("b", SszType::byte_list(4))]);
        let value = SszValue::Container(vec![SszValue::Vector(vec![]), SszValue::byte_list(&[])]);
        assert_eq!(
            ssz_bytes_len(&ty, &value),
            Err(EncodeError::OffsetOverflow(usize::MAX))
        );
        assert_eq!(
            encode(&ty, &value),
            Err(EncodeError::OffsetOverflow(usize::MAX))
        );
    }

    #[test]
    fn write_scalar_into_buffer() {
        let mut dst = [0; 4];
        assert_eq!(write_scalar(&mut dst, &0x0102_u16), Ok(2));
        assert_eq!(dst, [2, 1, 0, 0]);
        assert_eq!(
            write_scalar(&mut dst, &1_u64),
            Err(EncodeError::BufferTooSmall {
                len: 4,
                expected: 8
            })
        );
    }
}

use super::*;
use smallvec::{smallvec, SmallVec};
use std::cmp::Ordering;

type SmallVec8<T> = SmallVec<[T; 8]>;

pub mod impls;

/// Returned when SSZ decoding fails.
#[derive(Debug, PartialEq, Clone)]
pub enum DecodeError {
    /// The bytes supplied were not the exact length required by a fixed-length shape.
    WrongLength { len: usize, expected: usize },
    /// The bytes supplied were too short to read a scalar from their front.
    BufferTooSmall { len: usize, expected: usize },
    /// A boolean byte was neither `0x00` nor `0x01`.
    InvalidBoolean(u8),
    /// A bitvector had a non-zero padding bit, or a bitlist had no delimiter bit in its final
    /// byte.
    InvalidPadding,
    /// A bitlist must contain at least the delimiter byte.
    EmptyBitlist,
    /// A bitlist declared more bits than its limit permits.
    LimitExceeded { len: usize, max_len: usize },
    /// A list of fixed-length items was not a whole number of items long.
    MisalignedLength { len: usize, item_len: usize },
    /// The offset table of a container or variable-length sequence is malformed.
    InvalidOffsetTable(OffsetError),
    /// Some item has a `ssz_fixed_len` of zero. This is illegal.
    ZeroLengthItem,
    /// `SszDecoder` was asked for more items than were registered with its builder.
    NoMoreItems { registered: usize },
}

/// Describes how an offset table is malformed.
///
/// The checks are derived from this document:
///
/// https://notes.ethereum.org/ruKvDXl6QOW3gnqVYb8ezA?view
#[derive(Debug, PartialEq, Clone)]
pub enum OffsetError {
    /// An offset points “backwards” into the fixed-bytes portion of the message, essentially
    /// double-decoding bytes that will also be decoded as fixed-length.
    IntoFixedPortion(usize),
    /// The first offset does not point to the byte that follows the fixed byte portion,
    /// essentially skipping a variable-length byte.
    SkipsVariableBytes(usize),
    /// An offset points to bytes prior to the previous offset. Depending on how you look at it,
    /// this either double-decodes bytes or makes the first offset a negative-length.
    Decreasing(usize),
    /// An offset references byte indices that do not exist in the source bytes.
    OutOfBounds(usize),
    /// The first offset of a variable-length sequence is not a non-zero multiple of
    /// `BYTES_PER_LENGTH_OFFSET`.
    UnalignedFirstOffset(usize),
    /// The bytes ended where an offset was expected. `len` is the number of bytes that remained.
    MissingOffset { len: usize },
}

impl From<OffsetError> for DecodeError {
    fn from(e: OffsetError) -> Self {
        DecodeError::InvalidOffsetTable(e)
    }
}

/// Performs checks on the `offset` based upon the other parameters provided.
///
/// ## Detail
///
/// - `offset`: the offset bytes (e.g., result of `read_offset(..)`).
/// - `previous_offset`: unless this is the first offset in the SSZ object, the value of the
/// previously-read offset. Used to ensure offsets are not decreasing.
/// - `num_bytes`: the total number of bytes in the SSZ object. Used to ensure the offset is not
/// out of bounds.
/// - `num_fixed_bytes`: the number of fixed-bytes in the struct, if it is known. Used to ensure
/// that the first offset doesn't skip any variable bytes.
pub fn sanitize_offset(
    offset: usize,
    previous_offset: Option<usize>,
    num_bytes: usize,
    num_fixed_bytes: Option<usize>,
) -> Result<usize, DecodeError> {
    if num_fixed_bytes.map_or(false, |fixed_bytes| offset < fixed_bytes) {
        Err(OffsetError::IntoFixedPortion(offset).into())
    } else if previous_offset.is_none()
        && num_fixed_bytes.map_or(false, |fixed_bytes| offset != fixed_bytes)
    {
        Err(OffsetError::SkipsVariableBytes(offset).into())
    } else if offset > num_bytes {
        Err(OffsetError::OutOfBounds(offset).into())
    } else if previous_offset.map_or(false, |prev| prev > offset) {
        Err(OffsetError::Decreasing(offset).into())
    } else {
        Ok(offset)
    }
}

/// Provides SSZ decoding (de-serialization) for scalar types via the `from_ssz_bytes(&bytes)`
/// method.
pub trait Decode: Sized {
    /// Returns `true` if this object has a fixed-length.
    fn is_ssz_fixed_len() -> bool;

    /// The number of bytes this object occupies in the fixed-length portion of the SSZ bytes.
    fn ssz_fixed_len() -> usize {
        BYTES_PER_LENGTH_OFFSET
    }

    /// Attempts to decode `Self` from `bytes`, returning a `DecodeError` on failure.
    ///
    /// The supplied bytes must be the exact length required to decode `Self`, excess bytes will
    /// result in an error.
    fn from_ssz_bytes(bytes: &[u8]) -> Result<Self, DecodeError>;
}

/// Reads a fixed-length scalar from the front of `src`, ignoring any trailing bytes.
pub fn read_scalar<T: Decode>(src: &[u8]) -> Result<T, DecodeError> {
    let expected = T::ssz_fixed_len();

    T::from_ssz_bytes(src.get(..expected).ok_or(DecodeError::BufferTooSmall {
        len: src.len(),
        expected,
    })?)
}

#[derive(Copy, Clone, Debug)]
pub struct Offset {
    position: usize,
    offset: usize,
}

/// Builds an `SszDecoder`.
///
/// The purpose of this struct is to split some SSZ bytes into individual slices. The builder is
/// then converted into a `SszDecoder` which decodes those values into object instances.
pub struct SszDecoderBuilder<'a> {
    bytes: &'a [u8],
    items: SmallVec8<&'a [u8]>,
    offsets: SmallVec8<Offset>,
    items_index: usize,
}

impl<'a> SszDecoderBuilder<'a> {
    /// Instantiate a new builder that should build a `SszDecoder` over the given `bytes` which
    /// are assumed to be the SSZ encoding of some object.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            items: smallvec![],
            offsets: smallvec![],
            items_index: 0,
        }
    }

    /// Declares that a value of shape `ty` is the next item in `bytes`.
    pub fn register_shape(&mut self, ty: &SszType) -> Result<(), DecodeError> {
        self.register_type_parameterized(ty.is_ssz_fixed_len(), ty.ssz_fixed_len())
    }

    /// Declares that some type `T` is the next item in `bytes`.
    pub fn register_type<T: Decode>(&mut self) -> Result<(), DecodeError> {
        self.register_type_parameterized(T::is_ssz_fixed_len(), T::ssz_fixed_len())
    }

    /// Declares that a type with the given parameters is the next item in `bytes`.
    pub fn register_type_parameterized(
        &mut self,
        is_ssz_fixed_len: bool,
        ssz_fixed_len: usize,
    ) -> Result<(), DecodeError> {
        if is_ssz_fixed_len {
            let start = self.items_index;
            self.items_index = self.next_items_index(ssz_fixed_len)?;

            let slice =
                self.bytes
                    .get(start..self.items_index)
                    .ok_or(DecodeError::WrongLength {
                        len: self.bytes.len(),
                        expected: self.items_index,
                    })?;

            self.items.push(slice);
        } else {
            let remaining = self.bytes.get(self.items_index..).unwrap_or(&[]);

            self.offsets.push(Offset {
                position: self.items.len(),
                offset: sanitize_offset(
                    read_offset(remaining)?,
                    self.offsets.last().map(|o| o.offset),
                    self.bytes.len(),
                    None,
                )?,
            });

            // Push an empty slice into items; it will be replaced later.
            self.items.push(&[]);

            self.items_index = self.next_items_index(BYTES_PER_LENGTH_OFFSET)?;
        }

        Ok(())
    }

    /// The end of the fixed portion after `len` more bytes. A fixed portion that does not fit in
    /// a `usize` can never match the bytes.
    fn next_items_index(&self, len: usize) -> Result<usize, DecodeError> {
        self.items_index
            .checked_add(len)
            .ok_or(DecodeError::WrongLength {
                len: self.bytes.len(),
                expected: usize::MAX,
            })
    }

    fn finalize(&mut self) -> Result<(), DecodeError> {
        if let Some(first_offset) = self.offsets.first().map(|o| o.offset) {
            // Check to ensure the first offset points to the byte immediately following the
            // fixed-length bytes.
            match first_offset.cmp(&self.items_index) {
                Ordering::Less => return Err(OffsetError::IntoFixedPortion(first_offset).into()),
                Ordering::Greater => {
                    return Err(OffsetError::SkipsVariableBytes(first_offset).into())
                }
                Ordering::Equal => (),
            }

            // Iterate through each pair of offsets, grabbing the slice between each of the offsets.
            for pair in self.offsets.windows(2) {
                let a = pair[0];
                let b = pair[1];

                self.items[a.position] = self
                    .bytes
                    .get(a.offset..b.offset)
                    .ok_or(OffsetError::OutOfBounds(b.offset))?;
            }

            // Handle the last offset, pushing a slice from it's start through to the end of
            // `self.bytes`.
            if let Some(last) = self.offsets.last() {
                self.items[last.position] = self
                    .bytes
                    .get(last.offset..)
                    .ok_or(OffsetError::OutOfBounds(last.offset))?;
            }
        } else {
            // If the container is fixed-length, ensure there are no excess bytes.
            if self.items_index != self.bytes.len() {
                return Err(DecodeError::WrongLength {
                    len: self.bytes.len(),
                    expected: self.items_index,
                });
            }
        }

        Ok(())
    }

    /// Finalizes the builder, returning a `SszDecoder` that may be used to instantiate objects.
    pub fn build(mut self) -> Result<SszDecoder<'a>, DecodeError> {
        self.finalize()?;

        Ok(SszDecoder {
            items: self.items,
            next: 0,
        })
    }
}

/// Decodes some slices of SSZ into object instances. Should be instantiated using
/// [`SszDecoderBuilder`](struct.SszDecoderBuilder.html).
pub struct SszDecoder<'a> {
    items: SmallVec8<&'a [u8]>,
    next: usize,
}

impl<'a> SszDecoder<'a> {
    /// Decodes the next item.
    ///
    /// Returns `NoMoreItems` when attempting to decode more items than were registered.
    pub fn decode_next<T: Decode>(&mut self) -> Result<T, DecodeError> {
        self.decode_next_with(|slice| T::from_ssz_bytes(slice))
    }

    /// Decodes the next item using the provided function.
    pub fn decode_next_with<T, F>(&mut self, f: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&'a [u8]) -> Result<T, DecodeError>,
    {
        let slice = *self
            .items
            .get(self.next)
            .ok_or(DecodeError::NoMoreItems {
                registered: self.items.len(),
            })?;
        self.next += 1;

        f(slice)
    }
}

/// Reads a `BYTES_PER_LENGTH_OFFSET`-byte length from `bytes`, where `bytes.len() >=
/// BYTES_PER_LENGTH_OFFSET`.
pub fn read_offset(bytes: &[u8]) -> Result<usize, DecodeError> {
    decode_offset(
        bytes
            .get(0..BYTES_PER_LENGTH_OFFSET)
            .ok_or(OffsetError::MissingOffset { len: bytes.len() })?,
    )
}

/// Decode bytes as a little-endian usize, returning an `Err` if `bytes.len() !=
/// BYTES_PER_LENGTH_OFFSET`.
fn decode_offset(bytes: &[u8]) -> Result<usize, DecodeError> {
    let len = bytes.len();

    if len != BYTES_PER_LENGTH_OFFSET {
        Err(OffsetError::MissingOffset { len }.into())
    } else {
        let mut array: [u8; BYTES_PER_LENGTH_OFFSET] = std::default::Default::default();
        array.clone_from_slice(bytes);

        Ok(u32::from_le_bytes(array) as usize)
    }
}

/// Decodes `bytes` as an SSZ list of variable-length items, using `f` to decode each item.
///
/// When `expected_len` is `Some(n)` the bytes are a vector and must hold exactly `n` items.
/// Otherwise the item count is derived from the first offset.
pub fn decode_list_of_variable_length_items<T, F>(
    bytes: &[u8],
    expected_len: Option<usize>,
    mut f: F,
) -> Result<Vec<T>, DecodeError>
where
    F: FnMut(&[u8]) -> Result<T, DecodeError>,
{
    if bytes.is_empty() && expected_len.map_or(true, |n| n == 0) {
        return Ok(vec![]);
    }

    let first_offset = read_offset(bytes)?;
    sanitize_offset(
        first_offset,
        None,
        bytes.len(),
        expected_len.map(|n| n.saturating_mul(BYTES_PER_LENGTH_OFFSET)),
    )?;

    if first_offset % BYTES_PER_LENGTH_OFFSET != 0 || first_offset < BYTES_PER_LENGTH_OFFSET {
        return Err(OffsetError::UnalignedFirstOffset(first_offset).into());
    }

    let num_items = first_offset / BYTES_PER_LENGTH_OFFSET;
    let mut values = Vec::with_capacity(num_items);
    let mut offset = first_offset;

    for i in 1..=num_items {
        let slice_option = if i == num_items {
            bytes.get(offset..)
        } else {
            let start = offset;

            let next_offset = read_offset(
                bytes
                    .get(i * BYTES_PER_LENGTH_OFFSET..)
                    .ok_or(OffsetError::MissingOffset { len: 0 })?,
            )?;
            offset = sanitize_offset(next_offset, Some(offset), bytes.len(), Some(first_offset))?;

            bytes.get(start..offset)
        };

        let slice = slice_option.ok_or(OffsetError::OutOfBounds(offset))?;

        values.push(f(slice)?);
    }

    Ok(values)
}

/// Decodes `bytes` as a value of shape `ty`.
///
/// The whole of `bytes` must be consumed; list limits are not checked (see
/// `SszType::validate`), bitlist limits are.
pub fn decode(ty: &SszType, bytes: &[u8]) -> Result<SszValue, DecodeError> {
    match ty {
        SszType::Bool => bool::from_ssz_bytes(bytes).map(SszValue::Bool),
        SszType::Uint(UintWidth::U8) => u8::from_ssz_bytes(bytes).map(SszValue::Uint8),
        SszType::Uint(UintWidth::U16) => u16::from_ssz_bytes(bytes).map(SszValue::Uint16),
        SszType::Uint(UintWidth::U32) => u32::from_ssz_bytes(bytes).map(SszValue::Uint32),
        SszType::Uint(UintWidth::U64) => u64::from_ssz_bytes(bytes).map(SszValue::Uint64),
        SszType::Uint(UintWidth::U128) => U128::from_ssz_bytes(bytes).map(SszValue::Uint128),
        SszType::Uint(UintWidth::U256) => U256::from_ssz_bytes(bytes).map(SszValue::Uint256),
        SszType::Vector { elem, len } => decode_vector(elem, *len, bytes).map(SszValue::Vector),
        SszType::List { elem, .. } => decode_list(elem, bytes).map(SszValue::List),
        SszType::Bitvector { len } => {
            Bitfield::from_bitvector_bytes(bytes, *len).map(SszValue::Bitvector)
        }
        SszType::Bitlist { max_len } => {
            Bitfield::from_bitlist_bytes(bytes, *max_len).map(SszValue::Bitlist)
        }
        SszType::Container(fields) => decode_container(fields, bytes).map(SszValue::Container),
    }
}

fn decode_vector(elem: &SszType, len: usize, bytes: &[u8]) -> Result<Vec<SszValue>, DecodeError> {
    if elem.is_ssz_fixed_len() {
        let item_len = elem.ssz_fixed_len();
        if item_len == 0 {
            return Err(DecodeError::ZeroLengthItem);
        }

        let expected = item_len.saturating_mul(len);
        if bytes.len() != expected {
            return Err(DecodeError::WrongLength {
                len: bytes.len(),
                expected,
            });
        }

        bytes
            .chunks(item_len)
            .map(|chunk| decode(elem, chunk))
            .collect()
    } else {
        decode_list_of_variable_length_items(bytes, Some(len), |slice| decode(elem, slice))
    }
}

fn decode_list(elem: &SszType, bytes: &[u8]) -> Result<Vec<SszValue>, DecodeError> {
    if elem.is_ssz_fixed_len() {
        let item_len = elem.ssz_fixed_len();
        if item_len == 0 {
            return Err(DecodeError::ZeroLengthItem);
        }

        if bytes.len() % item_len != 0 {
            return Err(DecodeError::MisalignedLength {
                len: bytes.len(),
                item_len,
            });
        }

        bytes
            .chunks(item_len)
            .map(|chunk| decode(elem, chunk))
            .collect()
    } else {
        decode_list_of_variable_length_items(bytes, None, |slice| decode(elem, slice))
    }
}

fn decode_container(fields: &[Field], bytes: &[u8]) -> Result<Vec<SszValue>, DecodeError> {
    let mut builder = SszDecoderBuilder::new(bytes);

    for field in fields {
        builder.register_shape(&field.ty)?;
    }

    let mut decoder = builder.build()?;

    fields
        .iter()
        .map(|field| decoder.decode_next_with(|slice| decode(&field.ty, slice)))
        .collect()
}

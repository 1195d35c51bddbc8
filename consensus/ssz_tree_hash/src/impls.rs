use super::*;
use rayon::prelude::*;
use ssz_codec::{encode, SszType, SszValue};

/// Sequences with at least this many composite elements hash their elements on the rayon pool.
const PARALLEL_ELEMENT_THRESHOLD: usize = 256;

/// Bits that fit into a single chunk.
const BITS_PER_CHUNK: usize = BYTES_PER_CHUNK * 8;

fn div_ceil(value: usize, divisor: usize) -> usize {
    value / divisor + usize::from(value % divisor != 0)
}

pub fn tree_hash_type(ty: &SszType) -> TreeHashType {
    match ty {
        SszType::Bool | SszType::Uint(_) => TreeHashType::Basic,
        SszType::Vector { .. } | SszType::Bitvector { .. } => TreeHashType::Vector,
        SszType::List { .. } | SszType::Bitlist { .. } => TreeHashType::List,
        SszType::Container(_) => TreeHashType::Container,
    }
}

/// The number of values of `ty` that are packed into a single chunk.
///
/// Only basic types are packed; every other type occupies exactly one chunk (its root).
pub fn packing_factor(ty: &SszType) -> usize {
    if ty.is_basic() {
        HASHSIZE / ty.ssz_fixed_len()
    } else {
        1
    }
}

/// The number of leaves a value of `ty` is merkleized over, before padding to a power of two.
///
/// For lists and bitlists this is derived from the limit, not from the current length. Limits
/// too large to address saturate at `usize::MAX`.
pub fn chunk_count(ty: &SszType) -> usize {
    match ty {
        SszType::Bool | SszType::Uint(_) => 1,
        SszType::Vector { elem, len: n } | SszType::List { elem, max_len: n } => {
            if elem.is_basic() {
                div_ceil(n.saturating_mul(elem.ssz_fixed_len()), BYTES_PER_CHUNK)
            } else {
                *n
            }
        }
        SszType::Bitvector { len: n } | SszType::Bitlist { max_len: n } => {
            div_ceil(*n, BITS_PER_CHUNK)
        }
        SszType::Container(fields) => fields.len(),
    }
}

/// Returns the bytes that are packed into chunks for a basic value, or a vector or list of basic
/// values: the concatenated serialization of each element.
pub fn packed_encoding(ty: &SszType, value: &SszValue) -> Result<Vec<u8>, Error> {
    match (ty, value) {
        _ if ty.is_basic() => Ok(encode(ty, value)?),
        (SszType::Vector { elem, .. }, SszValue::Vector(items))
        | (SszType::List { elem, .. }, SszValue::List(items))
            if elem.is_basic() =>
        {
            let mut bytes = Vec::with_capacity(items.len() * elem.ssz_fixed_len());
            for item in items {
                bytes.extend_from_slice(&encode(elem, item)?);
            }
            Ok(bytes)
        }
        _ => Err(ValueError::ShapeMismatch {
            expected: "basic value or sequence of basic values",
            found: value.kind(),
        }
        .into()),
    }
}

/// Returns the Merkle root of `value`, interpreted as `ty`.
///
/// The value is checked against its shape as it is hashed; a vector of the wrong length or a
/// list over its limit is an error rather than a root.
pub fn hash_tree_root(ty: &SszType, value: &SszValue) -> Result<Hash256, Error> {
    match (ty, value) {
        _ if ty.is_basic() => merkle_root(&packed_encoding(ty, value)?, 0),
        (SszType::Vector { elem, len }, SszValue::Vector(items)) => {
            if items.len() != *len {
                return Err(ValueError::WrongVectorLength {
                    len: items.len(),
                    expected: *len,
                }
                .into());
            }
            sequence_root(ty, elem, value, items)
        }
        (SszType::List { elem, max_len }, SszValue::List(items)) => {
            if items.len() > *max_len {
                return Err(ValueError::LimitExceeded {
                    len: items.len(),
                    max_len: *max_len,
                }
                .into());
            }
            let root = sequence_root(ty, elem, value, items)?;
            Ok(mix_in_length(&root, items.len()))
        }
        (SszType::Bitvector { len }, SszValue::Bitvector(bits)) => {
            if bits.len() != *len {
                return Err(ValueError::WrongBitLength {
                    len: bits.len(),
                    expected: *len,
                }
                .into());
            }
            merkle_root(bits.as_raw_bytes(), chunk_count(ty))
        }
        (SszType::Bitlist { max_len }, SszValue::Bitlist(bits)) => {
            if bits.len() > *max_len {
                return Err(ValueError::LimitExceeded {
                    len: bits.len(),
                    max_len: *max_len,
                }
                .into());
            }
            let root = merkle_root(bits.as_raw_bytes(), chunk_count(ty))?;
            Ok(mix_in_length(&root, bits.len()))
        }
        (SszType::Container(fields), SszValue::Container(values)) => {
            if fields.len() != values.len() {
                return Err(ValueError::WrongFieldCount {
                    len: values.len(),
                    expected: fields.len(),
                }
                .into());
            }

            let mut leaves = Vec::with_capacity(fields.len() * HASHSIZE);
            for (field, value) in fields.iter().zip(values) {
                leaves.extend_from_slice(hash_tree_root(&field.ty, value)?.as_bytes());
            }

            merkle_root(&leaves, fields.len())
        }
        _ => Err(ValueError::ShapeMismatch {
            expected: ty.kind(),
            found: value.kind(),
        }
        .into()),
    }
}

/// The root of a vector or list before any length is mixed in.
fn sequence_root(
    ty: &SszType,
    elem: &SszType,
    value: &SszValue,
    items: &[SszValue],
) -> Result<Hash256, Error> {
    let leaves = if elem.is_basic() {
        packed_encoding(ty, value)?
    } else {
        element_roots(elem, items)?
    };

    merkle_root(&leaves, chunk_count(ty))
}

/// Concatenates the roots of composite `items`.
fn element_roots(elem: &SszType, items: &[SszValue]) -> Result<Vec<u8>, Error> {
    let roots = if items.len() >= PARALLEL_ELEMENT_THRESHOLD {
        items
            .par_iter()
            .map(|item| hash_tree_root(elem, item))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        items
            .iter()
            .map(|item| hash_tree_root(elem, item))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut leaves = Vec::with_capacity(roots.len() * HASHSIZE);
    for root in roots {
        leaves.extend_from_slice(root.as_bytes());
    }
    Ok(leaves)
}

#[cfg(test)]
mod test {
    use super::*;
    use ssz_codec::Bitfield;

    #[test]
    fn packing() {
        assert_eq!(packing_factor(&SszType::Bool), 32);
        assert_eq!(packing_factor(&SszType::uint8()), 32);
        assert_eq!(packing_factor(&SszType::uint64()), 4);
        assert_eq!(packing_factor(&SszType::uint256()), 1);
        assert_eq!(packing_factor(&SszType::byte_list(4)), 1);
    }

    #[test]
    fn chunk_counts() {
        assert_eq!(chunk_count(&SszType::uint64()), 1);
        assert_eq!(chunk_count(&SszType::vector(SszType::uint64(), 5)), 2);
        assert_eq!(chunk_count(&SszType::list(SszType::uint16(), 16)), 1);
        assert_eq!(chunk_count(&SszType::list(SszType::uint16(), 17)), 2);
        assert_eq!(
            chunk_count(&SszType::list(SszType::byte_list(4), 1 << 40)),
            1 << 40
        );
        assert_eq!(chunk_count(&SszType::bitvector(256)), 1);
        assert_eq!(chunk_count(&SszType::bitlist(257)), 2);
        assert_eq!(chunk_count(&SszType::bitlist(0)), 0);
        assert_eq!(
            chunk_count(&SszType::container([
                ("a", SszType::uint8()),
                ("b", SszType::Bool)
            ])),
            2
        );
        assert_eq!(
            chunk_count(&SszType::list(SszType::uint64(), usize::MAX)),
            usize::MAX / BYTES_PER_CHUNK + 1
        );
    }

    #[test]
    fn types() {
        assert_eq!(tree_hash_type(&SszType::Bool), TreeHashType::Basic);
        assert_eq!(tree_hash_type(&SszType::bitvector(3)), TreeHashType::Vector);
        assert_eq!(tree_hash_type(&SszType::bitlist(3)), TreeHashType::List);
        assert_eq!(
            tree_hash_type(&SszType::container([("a", SszType::Bool)])),
            TreeHashType::Container
        );
    }

    #[test]
    fn packed_encoding_of_list() {
        let ty = SszType::list(SszType::uint16(), 8);
        let value = SszValue::List(vec![1u16.into(), 0x0203u16.into()]);
        assert_eq!(packed_encoding(&ty, &value), Ok(vec![1, 0, 3, 2]));

        assert!(packed_encoding(&SszType::list(SszType::byte_list(1), 1), &value).is_err());
    }

    #[test]
    fn basic_roots() {
        let mut expected = [0; 32];
        expected[..8].copy_from_slice(&42u64.to_le_bytes());
        assert_eq!(
            hash_tree_root(&SszType::uint64(), &42u64.into()),
            Ok(Hash256::from(expected))
        );

        assert_eq!(
            hash_tree_root(&SszType::Bool, &SszValue::Bool(false)),
            Ok(Hash256::zero())
        );
        assert_eq!(
            hash_tree_root(&SszType::uint64(), &SszValue::Bool(false)),
            Err(Error::Value(ValueError::ShapeMismatch {
                expected: "uint64",
                found: "bool"
            }))
        );
    }

    #[test]
    fn bitlist_root_mixes_in_bit_count() {
        let ty = SszType::bitlist(2048);
        let bits = Bitfield::from_bools(&[true, true, false, true]);
        let root = hash_tree_root(&ty, &SszValue::Bitlist(bits)).unwrap();

        let mut chunk = [0; HASHSIZE];
        chunk[0] = 0b0000_1011;
        let expected = mix_in_length(&merkle_root(&chunk, 8).unwrap(), 4);
        assert_eq!(root, expected);
    }

    #[test]
    fn limits_are_checked() {
        assert_eq!(
            hash_tree_root(
                &SszType::list(SszType::uint8(), 2),
                &SszValue::byte_list(&[1, 2, 3])
            ),
            Err(Error::Value(ValueError::LimitExceeded { len: 3, max_len: 2 }))
        );
        assert_eq!(
            hash_tree_root(
                &SszType::bitlist(1),
                &SszValue::Bitlist(Bitfield::from_bools(&[true, true]))
            ),
            Err(Error::Value(ValueError::LimitExceeded { len: 2, max_len: 1 }))
        );
        assert_eq!(
            hash_tree_root(&SszType::byte_vector(2), &SszValue::byte_vector(&[1])),
            Err(Error::Value(ValueError::WrongVectorLength {
                len: 1,
                expected: 2
            }))
        );
    }

    #[test]
    fn parallel_matches_sequential() {
        let elem = SszType::container([("a", SszType::uint64()), ("b", SszType::byte_list(8))]);
        let item = |i: u64| SszValue::Container(vec![i.into(), SszValue::byte_list(&[i as u8])]);
        let items = (0..PARALLEL_ELEMENT_THRESHOLD as u64 + 1)
            .map(item)
            .collect::<Vec<_>>();

        let parallel = element_roots(&elem, &items).unwrap();
        let sequential = items
            .iter()
            .flat_map(|item| hash_tree_root(&elem, item).unwrap().as_bytes().to_vec())
            .collect::<Vec<_>>();

        assert_eq!(parallel, sequential);
    }
}

//! Builds `SszValue`s from the YAML representation used by the corpus.
//!
//! - Integers up to 64 bits are YAML integers. Wider integers are decimal strings.
//! - Vectors and lists of `uint8` are `0x`-prefixed hex strings; other sequences are YAML lists.
//! - Bitvectors and bitlists are hex strings of their serialization (bitlists include the
//!   delimiter bit).
//! - Containers are mappings keyed by field name.

use crate::case_result::parse_hex;
use crate::Error;
use serde_yaml::Value;
use ssz_codec::{Bitfield, SszType, SszValue, UintWidth, U128, U256};
use std::convert::TryFrom;

/// Converts `yaml` into a value of shape `ty`.
///
/// Lengths and limits are not checked here; call `SszType::validate` on the result.
pub fn value_from_yaml(ty: &SszType, yaml: &Value) -> Result<SszValue, Error> {
    match ty {
        SszType::Bool => yaml
            .as_bool()
            .map(SszValue::Bool)
            .ok_or_else(|| unexpected(ty, yaml)),
        SszType::Uint(width) => uint_from_yaml(ty, *width, yaml),
        SszType::Vector { elem, .. } => sequence_from_yaml(elem, yaml).map(SszValue::Vector),
        SszType::List { elem, .. } => sequence_from_yaml(elem, yaml).map(SszValue::List),
        SszType::Bitvector { len } => {
            let bytes = hex_from_yaml(ty, yaml)?;
            Bitfield::from_bitvector_bytes(&bytes, *len)
                .map(SszValue::Bitvector)
                .map_err(|e| Error::FailedToParseTest(format!("{}: {:?}", ty, e)))
        }
        SszType::Bitlist { max_len } => {
            let bytes = hex_from_yaml(ty, yaml)?;
            Bitfield::from_bitlist_bytes(&bytes, *max_len)
                .map(SszValue::Bitlist)
                .map_err(|e| Error::FailedToParseTest(format!("{}: {:?}", ty, e)))
        }
        SszType::Container(fields) => fields
            .iter()
            .map(|field| {
                let field_yaml = yaml.get(field.name.as_str()).ok_or_else(|| {
                    Error::FailedToParseTest(format!("missing field {:?} for {}", field.name, ty))
                })?;
                value_from_yaml(&field.ty, field_yaml)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SszValue::Container),
    }
}

fn unexpected(ty: &SszType, yaml: &Value) -> Error {
    Error::FailedToParseTest(format!("cannot read {:?} as {}", yaml, ty))
}

fn hex_from_yaml(ty: &SszType, yaml: &Value) -> Result<Vec<u8>, Error> {
    yaml.as_str()
        .ok_or_else(|| unexpected(ty, yaml))
        .and_then(parse_hex)
}

fn sequence_from_yaml(elem: &SszType, yaml: &Value) -> Result<Vec<SszValue>, Error> {
    match yaml {
        Value::String(s) if matches!(elem, SszType::Uint(UintWidth::U8)) => {
            Ok(parse_hex(s)?.into_iter().map(SszValue::Uint8).collect())
        }
        Value::Sequence(items) => items
            .iter()
            .map(|item| value_from_yaml(elem, item))
            .collect(),
        other => Err(Error::FailedToParseTest(format!(
            "expected a sequence of {}, got {:?}",
            elem, other
        ))),
    }
}

/// Integers may be written either as YAML integers or as decimal strings.
fn yaml_u64(yaml: &Value) -> Option<u64> {
    match yaml {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn uint_from_yaml(ty: &SszType, width: UintWidth, yaml: &Value) -> Result<SszValue, Error> {
    let err = || unexpected(ty, yaml);
    let small = || yaml_u64(yaml).ok_or_else(err);

    Ok(match width {
        UintWidth::U8 => SszValue::Uint8(u8::try_from(small()?).map_err(|_| err())?),
        UintWidth::U16 => SszValue::Uint16(u16::try_from(small()?).map_err(|_| err())?),
        UintWidth::U32 => SszValue::Uint32(u32::try_from(small()?).map_err(|_| err())?),
        UintWidth::U64 => SszValue::Uint64(small()?),
        UintWidth::U128 => SszValue::Uint128(match yaml {
            Value::String(s) => U128::from_dec_str(s).map_err(|_| err())?,
            _ => U128::from(small()?),
        }),
        UintWidth::U256 => SszValue::Uint256(match yaml {
            Value::String(s) => U256::from_dec_str(s).map_err(|_| err())?,
            _ => U256::from(small()?),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn uints() {
        assert_eq!(
            value_from_yaml(&SszType::uint16(), &yaml("513")),
            Ok(SszValue::Uint16(513))
        );
        assert!(value_from_yaml(&SszType::uint8(), &yaml("256")).is_err());
        assert_eq!(
            value_from_yaml(&SszType::uint64(), &yaml("18446744073709551615")),
            Ok(SszValue::Uint64(u64::max_value()))
        );
        assert_eq!(
            value_from_yaml(
                &SszType::uint128(),
                &yaml("'340282366920938463463374607431768211455'")
            ),
            Ok(SszValue::Uint128(U128::max_value()))
        );
        assert_eq!(
            value_from_yaml(&SszType::uint256(), &yaml("'1'")),
            Ok(SszValue::Uint256(U256::from(1)))
        );
    }

    #[test]
    fn byte_sequences() {
        assert_eq!(
            value_from_yaml(&SszType::byte_list(4), &yaml("'0x0102'")),
            Ok(SszValue::byte_list(&[1, 2]))
        );
        assert_eq!(
            value_from_yaml(&SszType::byte_vector(2), &yaml("[3, 4]")),
            Ok(SszValue::byte_vector(&[3, 4]))
        );
        assert!(value_from_yaml(&SszType::list(SszType::uint16(), 4), &yaml("'0x0102'")).is_err());
    }

    #[test]
    fn bitfields() {
        assert_eq!(
            value_from_yaml(&SszType::bitlist(8), &yaml("'0x0d'")),
            Ok(SszValue::Bitlist(Bitfield::from_bools(&[true, false, true])))
        );
        assert_eq!(
            value_from_yaml(&SszType::bitvector(4), &yaml("'0x05'")),
            Ok(SszValue::Bitvector(Bitfield::from_bools(&[
                true, false, true, false
            ])))
        );
        assert!(value_from_yaml(&SszType::bitvector(4), &yaml("'0x15'")).is_err());
    }

    #[test]
    fn containers() {
        let ty = SszType::container([
            ("A", SszType::uint16()),
            ("B", SszType::list(SszType::uint16(), 1024)),
            ("C", SszType::uint8()),
        ]);
        assert_eq!(
            value_from_yaml(&ty, &yaml("{A: 1, B: [2, 3], C: 4}")),
            Ok(SszValue::Container(vec![
                1u16.into(),
                SszValue::List(vec![2u16.into(), 3u16.into()]),
                4u8.into(),
            ]))
        );
        assert!(value_from_yaml(&ty, &yaml("{A: 1, C: 4}")).is_err());
    }
}

use super::*;
use crate::cases::ssz_static::{check_serialization, check_tree_hash, valid_value_from_yaml};
use crate::decode::{optional_yaml_file, serialized_bytes};
use serde::Deserialize;
use serde_yaml::Value;
use ssz_codec::{decode, SszType, SszValue, UintWidth};

#[derive(Debug, Clone, Deserialize)]
struct Metadata {
    root: String,
}

/// A single `ssz_generic` case. The shape is not stored in the case but encoded in the handler
/// and case names, e.g. `basic_vector/valid/vec_uint16_31_max`.
#[derive(Debug, Clone)]
pub struct SszGeneric {
    path: PathBuf,
    handler_name: String,
    case_name: String,
}

impl LoadCase for SszGeneric {
    fn load_from_dir(path: &Path, _preset: Option<PresetName>) -> Result<Self, Error> {
        let components = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .rev()
            .collect::<Vec<_>>();

        match components.as_slice() {
            // <handler_name>/<suite_name>/<case_name>
            [case_name, _suite_name, handler_name, ..] => Ok(Self {
                path: path.into(),
                handler_name: handler_name.clone(),
                case_name: case_name.clone(),
            }),
            _ => Err(Error::FailedToParseTest(format!(
                "unexpected case path: {}",
                path.display()
            ))),
        }
    }
}

impl Case for SszGeneric {
    fn description(&self) -> String {
        format!("{}/{}", self.handler_name, self.case_name)
    }

    fn result(&self, _case_index: usize) -> Result<(), Error> {
        let shape = shape_for_case(&self.handler_name, &self.case_name)?;
        let serialized = serialized_bytes(&self.path)?;
        let value: Option<Value> = optional_yaml_file(&self.path, "value.yaml")?;
        let meta: Option<Metadata> = optional_yaml_file(&self.path, "meta.yaml")?;

        match (value, shape) {
            // Valid
            (Some(value), Some(ty)) => {
                let value = valid_value_from_yaml(&ty, &value)?;
                check_serialization(&ty, &value, &serialized)?;

                if let Some(meta) = meta {
                    check_tree_hash(&ty, &value, &meta.root)?;
                }
                Ok(())
            }
            (Some(_), None) => Err(Error::FailedToParseTest(format!(
                "valid case {} names a shape that cannot exist",
                self.case_name
            ))),
            // Invalid
            (None, Some(ty)) => match decode_and_validate(&ty, &serialized) {
                Ok(decoded) => Err(Error::DidntFail(format!(
                    "Decoded invalid bytes into: {:?}",
                    decoded
                ))),
                Err(_) => Ok(()),
            },
            // Nothing can be decoded as a shape that cannot exist.
            (None, None) => Ok(()),
        }
    }
}

/// Decodes `bytes` and additionally rejects values over a list limit, which decoding alone does
/// not check.
fn decode_and_validate(ty: &SszType, bytes: &[u8]) -> Result<SszValue, String> {
    let value = decode(ty, bytes).map_err(|e| format!("{:?}", e))?;
    ty.validate(&value).map_err(|e| format!("{:?}", e))?;
    Ok(value)
}

/// Returns the shape named by a handler and case name.
///
/// Returns `Ok(None)` for names that describe an illegal shape (vectors and bitvectors of length
/// zero), which only appear among the invalid cases.
pub fn shape_for_case(handler_name: &str, case_name: &str) -> Result<Option<SszType>, Error> {
    let parts = case_name.split('_').collect::<Vec<_>>();
    let part = |i: usize| {
        parts.get(i).copied().ok_or_else(|| {
            Error::FailedToParseTest(format!("cannot parse case name {:?}", case_name))
        })
    };

    let ty = match handler_name {
        "boolean" => SszType::Bool,
        "uints" => primitive_type(&format!("uint{}", part(1)?))?,
        "basic_vector" => {
            let elem = primitive_type(part(1)?)?;
            match parse_number(part(2)?)? {
                0 => return Ok(None),
                len => SszType::vector(elem, len),
            }
        }
        "bitvector" => match parse_number(part(1)?)? {
            0 => return Ok(None),
            len => SszType::bitvector(len),
        },
        "bitlist" => match part(1)? {
            // Test format is inconsistent, pretend the limit is 32 (arbitrary)
            "no" => SszType::bitlist(32),
            limit => SszType::bitlist(parse_number(limit)?),
        },
        "containers" => test_container(part(0)?)?,
        other => {
            return Err(Error::FailedToParseTest(format!(
                "unsupported handler: {}",
                other
            )))
        }
    };

    Ok(Some(ty))
}

fn parse_number(s: &str) -> Result<usize, Error> {
    s.parse()
        .map_err(|e| Error::FailedToParseTest(format!("cannot parse {:?}: {:?}", s, e)))
}

fn primitive_type(name: &str) -> Result<SszType, Error> {
    let unsupported = || Error::FailedToParseTest(format!("unsupported: {}", name));

    if name == "bool" {
        Ok(SszType::Bool)
    } else {
        name.strip_prefix("uint")
            .and_then(|bits| bits.parse().ok())
            .and_then(UintWidth::from_bits)
            .map(SszType::Uint)
            .ok_or_else(unsupported)
    }
}

fn var_test_struct() -> SszType {
    SszType::container([
        ("A", SszType::uint16()),
        ("B", SszType::list(SszType::uint16(), 1024)),
        ("C", SszType::uint8()),
    ])
}

fn fixed_test_struct() -> SszType {
    SszType::container([
        ("A", SszType::uint8()),
        ("B", SszType::uint64()),
        ("C", SszType::uint32()),
    ])
}

/// The containers used by the `containers` handler.
pub fn test_container(name: &str) -> Result<SszType, Error> {
    Ok(match name {
        "SingleFieldTestStruct" => SszType::container([("A", SszType::uint8())]),
        "SmallTestStruct" => {
            SszType::container([("A", SszType::uint16()), ("B", SszType::uint16())])
        }
        "FixedTestStruct" => fixed_test_struct(),
        "VarTestStruct" => var_test_struct(),
        "ComplexTestStruct" => SszType::container([
            ("A", SszType::uint16()),
            ("B", SszType::list(SszType::uint16(), 128)),
            ("C", SszType::uint8()),
            ("D", SszType::byte_list(256)),
            ("E", var_test_struct()),
            ("F", SszType::vector(fixed_test_struct(), 4)),
            ("G", SszType::vector(var_test_struct(), 2)),
        ]),
        "BitsStruct" => SszType::container([
            ("A", SszType::bitlist(5)),
            ("B", SszType::bitvector(2)),
            ("C", SszType::bitvector(1)),
            ("D", SszType::bitlist(6)),
            ("E", SszType::bitvector(8)),
        ]),
        _ => {
            return Err(Error::FailedToParseTest(format!(
                "unsupported container: {}",
                name
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssz_tree_hash::hash_tree_root;
    use std::fs;

    #[test]
    fn shapes_from_names() {
        assert_eq!(
            shape_for_case("uints", "uint_256_random_3"),
            Ok(Some(SszType::uint256()))
        );
        assert_eq!(shape_for_case("boolean", "byte_2"), Ok(Some(SszType::Bool)));
        assert_eq!(
            shape_for_case("basic_vector", "vec_uint16_31_max"),
            Ok(Some(SszType::vector(SszType::uint16(), 31)))
        );
        assert_eq!(shape_for_case("basic_vector", "vec_bool_0"), Ok(None));
        assert_eq!(shape_for_case("bitvector", "bitvec_0"), Ok(None));
        assert_eq!(
            shape_for_case("bitlist", "bitlist_no_delimiter_empty"),
            Ok(Some(SszType::bitlist(32)))
        );
        assert_eq!(
            shape_for_case("bitlist", "bitlist_512_random_chunk_0"),
            Ok(Some(SszType::bitlist(512)))
        );
        assert!(matches!(
            shape_for_case("containers", "ComplexTestStruct_max"),
            Ok(Some(SszType::Container(_)))
        ));
        assert!(shape_for_case("basic_vector", "vec_uint7_4_max").is_err());
        assert!(shape_for_case("progressive_list", "x").is_err());
    }

    fn case_dir(root: &Path, handler: &str, suite: &str, case: &str) -> PathBuf {
        let dir = root.join(handler).join(suite).join(case);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn valid_case() {
        let corpus = tempfile::tempdir().unwrap();
        let dir = case_dir(corpus.path(), "containers", "valid", "SmallTestStruct_max");

        let ty = test_container("SmallTestStruct").unwrap();
        let value = SszValue::Container(vec![0xffffu16.into(), 0xffffu16.into()]);
        let root = hash_tree_root(&ty, &value).unwrap();

        fs::write(dir.join("value.yaml"), "{A: 65535, B: 65535}\n").unwrap();
        fs::write(dir.join("serialized.ssz"), [0xff; 4]).unwrap();
        fs::write(
            dir.join("meta.yaml"),
            format!("{{root: '0x{}'}}\n", hex::encode(root.as_bytes())),
        )
        .unwrap();

        let case = SszGeneric::load_from_dir(&dir, None).unwrap();
        assert_eq!(case.description(), "containers/SmallTestStruct_max");
        assert_eq!(case.result(0), Ok(()));
    }

    #[test]
    fn invalid_cases() {
        let corpus = tempfile::tempdir().unwrap();

        // Three bytes cannot hold a `uint16` pair.
        let dir = case_dir(corpus.path(), "containers", "invalid", "SmallTestStruct_extra_byte");
        fs::write(dir.join("serialized.ssz"), [0xff; 3]).unwrap();
        let case = SszGeneric::load_from_dir(&dir, None).unwrap();
        assert_eq!(case.result(0), Ok(()));

        // A correct encoding in the invalid suite must be reported.
        let dir = case_dir(corpus.path(), "uints", "invalid", "uint_8_not_actually_invalid");
        fs::write(dir.join("serialized.ssz"), [7]).unwrap();
        let case = SszGeneric::load_from_dir(&dir, None).unwrap();
        assert!(matches!(case.result(0), Err(Error::DidntFail(_))));

        let dir = case_dir(corpus.path(), "basic_vector", "invalid", "vec_uint8_0");
        fs::write(dir.join("serialized.ssz"), b"").unwrap();
        let case = SszGeneric::load_from_dir(&dir, None).unwrap();
        assert_eq!(case.result(0), Ok(()));
    }

    #[test]
    fn limit_checked_on_invalid_bitlist() {
        let corpus = tempfile::tempdir().unwrap();
        let dir = case_dir(corpus.path(), "bitlist", "invalid", "bitlist_2_but_3");
        // Three data bits and a delimiter.
        fs::write(dir.join("serialized.ssz"), [0b0000_1111]).unwrap();
        let case = SszGeneric::load_from_dir(&dir, None).unwrap();
        assert_eq!(case.result(0), Ok(()));
    }
}

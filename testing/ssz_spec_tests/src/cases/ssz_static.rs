use super::*;
use crate::case_result::{check_root, compare_result};
use crate::decode::{serialized_bytes, yaml_decode_file};
use crate::yaml_value::value_from_yaml;
use consensus_types::type_by_name;
use serde::Deserialize;
use serde_yaml::Value;
use ssz_codec::{decode, encode, ssz_bytes_len, SszType, SszValue};
use ssz_tree_hash::hash_tree_root;

#[derive(Debug, Clone, Deserialize)]
pub struct SszStaticRoots {
    pub root: String,
    #[serde(default)]
    pub signing_root: Option<String>,
}

/// A single `ssz_static` case: a value of one consensus container, its serialization and root.
#[derive(Debug, Clone)]
pub struct SszStatic {
    pub type_name: String,
    pub preset: PresetName,
    pub roots: SszStaticRoots,
    pub serialized: Vec<u8>,
    pub value: Value,
}

impl LoadCase for SszStatic {
    fn load_from_dir(path: &Path, preset: Option<PresetName>) -> Result<Self, Error> {
        let preset = preset.ok_or_else(|| {
            Error::InternalError("ssz_static cases are always preset-specific".to_string())
        })?;
        // <type_name>/<suite_name>/<case_name>
        let type_name = path
            .parent()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::FailedToParseTest(format!("no type name in {}", path.display()))
            })?;

        Ok(Self {
            type_name,
            preset,
            roots: yaml_decode_file(&path.join("roots.yaml"))?,
            serialized: serialized_bytes(path)?,
            value: yaml_decode_file(&path.join("value.yaml"))?,
        })
    }
}

impl Case for SszStatic {
    fn description(&self) -> String {
        format!("{} {}", self.preset, self.type_name)
    }

    fn result(&self, _case_index: usize) -> Result<(), Error> {
        let ty = type_by_name(&self.type_name, &self.preset.preset()).ok_or_else(|| {
            Error::FailedToParseTest(format!("unknown type: {}", self.type_name))
        })?;

        let value = valid_value_from_yaml(&ty, &self.value)?;
        check_serialization(&ty, &value, &self.serialized)?;
        check_tree_hash(&ty, &value, &self.roots.root)
    }
}

/// Reads `yaml` as a value of `ty`, requiring it to respect every length and limit.
pub fn valid_value_from_yaml(ty: &SszType, yaml: &Value) -> Result<SszValue, Error> {
    let value = value_from_yaml(ty, yaml)?;
    ty.validate(&value)
        .map_err(|e| Error::FailedToParseTest(format!("value does not fit {}: {:?}", ty, e)))?;
    Ok(value)
}

/// Checks that `value` encodes to exactly `serialized` and that `serialized` decodes to exactly
/// `value`.
pub fn check_serialization(
    ty: &SszType,
    value: &SszValue,
    serialized: &[u8],
) -> Result<(), Error> {
    let expected_len = Some(serialized.len());
    compare_result(&ssz_bytes_len(ty, value), &expected_len)?;

    let expected_bytes = Some(serialized.to_vec());
    compare_result(&encode(ty, value), &expected_bytes)?;

    let expected_value = Some(value.clone());
    compare_result(&decode(ty, serialized), &expected_value)
}

pub fn check_tree_hash(ty: &SszType, value: &SszValue, expected_root: &str) -> Result<(), Error> {
    let root = hash_tree_root(ty, value)
        .map_err(|e| Error::InternalError(format!("unable to hash {}: {:?}", ty, e)))?;
    check_root(expected_root, root)
}

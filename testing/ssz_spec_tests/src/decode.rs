use super::*;
use snap::raw::Decoder;
use std::fs;
use std::path::Path;

pub fn yaml_decode<T: serde::de::DeserializeOwned>(string: &str) -> Result<T, Error> {
    serde_yaml::from_str(string).map_err(|e| Error::FailedToParseTest(format!("{:?}", e)))
}

pub fn yaml_decode_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Error> {
    fs::read_to_string(path)
        .map_err(|e| {
            Error::FailedToParseTest(format!("Unable to load {}: {:?}", path.display(), e))
        })
        .and_then(|s| yaml_decode(&s))
}

/// Decode a Snappy encoded file.
///
/// Files in the corpus are unframed, so we need to use `snap::raw::Decoder`.
pub fn snappy_decode_file(path: &Path) -> Result<Vec<u8>, Error> {
    let bytes = fs::read(path).map_err(|e| {
        Error::FailedToParseTest(format!("Unable to load {}: {:?}", path.display(), e))
    })?;
    let mut decoder = Decoder::new();
    decoder.decompress_vec(&bytes).map_err(|e| {
        Error::FailedToParseTest(format!(
            "Error decoding snappy encoding for {}: {:?}",
            path.display(),
            e
        ))
    })
}

/// Reads the serialized bytes of the case in `dir`.
///
/// Current releases ship `serialized.ssz_snappy`; older ones shipped an uncompressed
/// `serialized.ssz`.
pub fn serialized_bytes(dir: &Path) -> Result<Vec<u8>, Error> {
    let snappy = dir.join("serialized.ssz_snappy");
    let plain = dir.join("serialized.ssz");

    if snappy.is_file() {
        snappy_decode_file(&snappy)
    } else if plain.is_file() {
        fs::read(&plain).map_err(|e| {
            Error::FailedToParseTest(format!("Unable to load {}: {:?}", plain.display(), e))
        })
    } else {
        Err(Error::FailedToParseTest(format!(
            "No serialized bytes in {}",
            dir.display()
        )))
    }
}

/// Reads `dir/name` as YAML, or returns `None` if the file is absent.
pub fn optional_yaml_file<T: serde::de::DeserializeOwned>(
    dir: &Path,
    name: &str,
) -> Result<Option<T>, Error> {
    let path = dir.join(name);
    if path.is_file() {
        yaml_decode_file(&path).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snap::raw::Encoder;

    #[test]
    fn prefers_snappy() {
        let dir = tempfile::tempdir().unwrap();
        let compressed = Encoder::new().compress_vec(&[1, 2, 3]).unwrap();
        fs::write(dir.path().join("serialized.ssz_snappy"), compressed).unwrap();
        fs::write(dir.path().join("serialized.ssz"), [9]).unwrap();

        assert_eq!(serialized_bytes(dir.path()), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn falls_back_to_plain() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("serialized.ssz"), [9]).unwrap();
        assert_eq!(serialized_bytes(dir.path()), Ok(vec![9]));

        let empty = tempfile::tempdir().unwrap();
        assert!(serialized_bytes(empty.path()).is_err());
    }

    #[test]
    fn optional_yaml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("meta.yaml"), "root: '0x00'\n").unwrap();

        let meta: Option<serde_yaml::Value> = optional_yaml_file(dir.path(), "meta.yaml").unwrap();
        assert!(meta.is_some());

        let missing: Option<serde_yaml::Value> =
            optional_yaml_file(dir.path(), "value.yaml").unwrap();
        assert!(missing.is_none());
    }
}

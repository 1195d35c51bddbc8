use super::*;
use ssz_tree_hash::Hash256;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

#[derive(Debug, PartialEq, Clone)]
pub struct CaseResult {
    pub case_index: usize,
    pub desc: String,
    pub path: PathBuf,
    pub result: Result<(), Error>,
}

impl CaseResult {
    pub fn new(
        case_index: usize,
        path: &Path,
        case: &impl Case,
        result: Result<(), Error>,
    ) -> Self {
        CaseResult {
            case_index,
            desc: case.description(),
            path: path.into(),
            result,
        }
    }
}

/// Compares `result` with `expected`.
///
/// If `expected.is_none()` then `result` is expected to be `Err`. Otherwise, `T` in `result` and
/// `expected` must be equal.
pub fn compare_result<T, E>(result: &Result<T, E>, expected: &Option<T>) -> Result<(), Error>
where
    T: PartialEq<T> + Debug,
    E: Debug,
{
    match (result, expected) {
        // Pass: The should have failed and did fail.
        (Err(_), None) => Ok(()),
        // Fail: The test failed when it should have produced a result (fail).
        (Err(e), Some(expected)) => Err(Error::NotEqual(format!(
            "Got {:?} | Expected {:?}",
            e, expected
        ))),
        // Fail: The test produced a result when it should have failed (fail).
        (Ok(result), None) => Err(Error::DidntFail(format!("Got {:?}", result))),
        // Potential Pass: The test should have produced a result, and it did.
        (Ok(result), Some(expected)) => {
            if result == expected {
                Ok(())
            } else {
                Err(Error::NotEqual(format!(
                    "Got {:?} | Expected {:?}",
                    result, expected
                )))
            }
        }
    }
}

/// Parses a `0x`-prefixed hex string as a 32-byte root.
pub fn parse_root(root: &str) -> Result<Hash256, Error> {
    let bytes = parse_hex(root)?;
    if bytes.len() == 32 {
        Ok(Hash256::from_slice(&bytes))
    } else {
        Err(Error::FailedToParseTest(format!(
            "root must be 32 bytes, got {}",
            bytes.len()
        )))
    }
}

/// Decodes a hex string, with or without a `0x` prefix.
pub fn parse_hex(s: &str) -> Result<Vec<u8>, Error> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| Error::FailedToParseTest(format!("invalid hex {:?}: {:?}", s, e)))
}

/// Compares a computed root against the `0x`-prefixed `expected` root.
pub fn check_root(expected: &str, computed: Hash256) -> Result<(), Error> {
    let expected = parse_root(expected)?;
    compare_result::<Hash256, Error>(&Ok(computed), &Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare() {
        assert_eq!(compare_result::<u8, ()>(&Err(()), &None), Ok(()));
        assert_eq!(compare_result::<u8, ()>(&Ok(1), &Some(1)), Ok(()));
        assert!(matches!(
            compare_result::<u8, ()>(&Ok(1), &None),
            Err(Error::DidntFail(_))
        ));
        assert!(matches!(
            compare_result::<u8, ()>(&Ok(1), &Some(2)),
            Err(Error::NotEqual(_))
        ));
        assert!(matches!(
            compare_result::<u8, ()>(&Err(()), &Some(2)),
            Err(Error::NotEqual(_))
        ));
    }

    #[test]
    fn roots() {
        let root = format!("0x{}", "11".repeat(32));
        assert_eq!(
            check_root(&root, Hash256::from_slice(&[0x11; 32])),
            Ok(())
        );
        assert!(check_root(&root, Hash256::zero()).is_err());
        assert!(parse_root("0x1234").is_err());
        assert_eq!(parse_hex("abcd"), Ok(vec![0xab, 0xcd]));
    }
}

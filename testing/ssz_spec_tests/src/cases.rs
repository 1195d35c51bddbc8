use super::*;
use rayon::prelude::*;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

mod ssz_generic;
mod ssz_static;

pub use ssz_generic::*;
pub use ssz_static::*;

pub trait LoadCase: Sized {
    /// Load the test case from a test case directory.
    fn load_from_dir(path: &Path, preset: Option<PresetName>) -> Result<Self, Error>;
}

pub trait Case: Debug + Sync {
    /// An optional field for implementing a custom description.
    ///
    /// Defaults to "no description".
    fn description(&self) -> String {
        "no description".to_string()
    }

    /// Execute a test and return the result.
    ///
    /// `case_index` reports the index of the case in the set of test cases. It is not strictly
    /// necessary, but it's useful when troubleshooting specific failing tests.
    fn result(&self, case_index: usize) -> Result<(), Error>;
}

#[derive(Debug)]
pub struct Cases<T> {
    pub test_cases: Vec<(PathBuf, T)>,
}

impl<T: Case> Cases<T> {
    pub fn test_results(&self, use_rayon: bool) -> Vec<CaseResult> {
        if use_rayon {
            self.test_cases
                .par_iter()
                .enumerate()
                .map(|(i, (path, tc))| CaseResult::new(i, path, tc, tc.result(i)))
                .collect()
        } else {
            self.test_cases
                .iter()
                .enumerate()
                .map(|(i, (path, tc))| CaseResult::new(i, path, tc, tc.result(i)))
                .collect()
        }
    }
}

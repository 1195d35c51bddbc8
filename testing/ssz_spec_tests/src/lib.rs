//! Runs the `ssz_generic` and `ssz_static` vectors of the `consensus-spec-tests` corpus against
//! `ssz_codec` and `ssz_tree_hash`.
//!
//! The corpus is not vendored. Extract a release into `consensus-spec-tests/` beside this crate
//! (or point `SSZ_SPEC_TESTS_DIR` at one) and run the tests with `--features spec_tests`.

pub use case_result::CaseResult;
pub use cases::{Case, Cases, LoadCase, SszGeneric, SszStatic};
pub use config::{RunnerConfig, SEQUENTIAL_ENV, TESTS_DIR_ENV};
pub use consensus_types::PresetName;
pub use error::Error;
pub use handler::*;
pub use results::assert_tests_pass;

mod case_result;
mod cases;
mod config;
mod decode;
mod error;
mod handler;
mod results;
mod yaml_value;

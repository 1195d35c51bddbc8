//! Runs the handful of corpus-format cases checked in under `vectors/`. Unlike `tests.rs` these
//! need no download, so they run by default.

use ssz_spec_tests::*;
use std::path::PathBuf;

fn config() -> RunnerConfig {
    let vectors = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("vectors");
    RunnerConfig::new(vectors, false, logging::test_logger())
}

fn assert_ran<H: Handler>(handler: H, expected_cases: usize) {
    let config = config();
    let results = handler.run(&config).unwrap();
    assert_eq!(results.len(), expected_cases, "{}", handler.name());
    assert_tests_pass(&handler.name(), &handler.handler_path(&config), &results);
}

#[test]
fn ssz_generic_containers() {
    assert_ran(SszGenericHandler::new("containers"), 3);
}

#[test]
fn ssz_generic_bitlist() {
    assert_ran(SszGenericHandler::new("bitlist"), 4);
}

#[test]
fn ssz_generic_bitvector() {
    assert_ran(SszGenericHandler::new("bitvector"), 1);
}

#[test]
fn ssz_static_checkpoint() {
    assert_ran(SszStaticHandler::new("Checkpoint", PresetName::Minimal), 1);
}

#[test]
fn ssz_static_attestation() {
    assert_ran(SszStaticHandler::new("Attestation", PresetName::Minimal), 1);
}

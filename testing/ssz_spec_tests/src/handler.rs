use crate::cases::{self, Case, Cases, LoadCase};
use crate::config::{config_name, RunnerConfig};
use crate::results::{assert_tests_pass, categorize_results};
use crate::{CaseResult, Error, PresetName};
use consensus_types::phase0::TYPE_NAMES;
use slog::{debug, error, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Phase 0 is the only fork these vectors cover.
pub const FORK_NAME: &str = "phase0";

/// The `ssz_generic` handlers, one per directory under `tests/general/phase0/ssz_generic`.
pub const SSZ_GENERIC_HANDLERS: &[&str] = &[
    "basic_vector",
    "bitlist",
    "bitvector",
    "boolean",
    "containers",
    "uints",
];

pub trait Handler {
    type Case: Case + LoadCase;

    /// `None` for vectors under the `general` config.
    fn preset(&self) -> Option<PresetName>;

    fn fork_name(&self) -> &'static str {
        FORK_NAME
    }

    fn runner_name(&self) -> &'static str;

    fn handler_name(&self) -> String;

    /// Case descriptions that are reported as skipped rather than run.
    fn known_failures(&self) -> &[String] {
        &[]
    }

    fn name(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            config_name(self.preset()),
            self.fork_name(),
            self.runner_name(),
            self.handler_name()
        )
    }

    fn handler_path(&self, config: &RunnerConfig) -> PathBuf {
        config
            .runner_dir(config_name(self.preset()), self.fork_name(), self.runner_name())
            .join(self.handler_name())
    }

    /// Loads every `<suite>/<case>` directory below the handler directory.
    fn load_cases(&self, handler_path: &Path) -> Result<Cases<Self::Case>, Error> {
        let mut test_cases = vec![];

        for suite in subdirectories(handler_path)? {
            for case_dir in subdirectories(&suite)? {
                let case = Self::Case::load_from_dir(&case_dir, self.preset())?;
                test_cases.push((case_dir, case));
            }
        }

        Ok(Cases { test_cases })
    }

    /// Runs every case of the handler, logging each outcome.
    fn run(&self, config: &RunnerConfig) -> Result<Vec<CaseResult>, Error> {
        let handler_path = self.handler_path(config);
        let cases = self.load_cases(&handler_path)?;

        let mut results = cases.test_results(config.use_rayon);
        for result in results.iter_mut() {
            if self.known_failures().contains(&result.desc) {
                result.result = Err(Error::SkippedKnownFailure);
            }
        }

        let log = &config.log;
        for result in &results {
            match &result.result {
                Ok(()) | Err(Error::SkippedKnownFailure) => debug!(
                    log,
                    "Case finished";
                    "case" => &result.desc,
                    "path" => %result.path.display(),
                    "passed" => result.result.is_ok(),
                ),
                Err(e) => error!(
                    log,
                    "Case failed";
                    "case" => &result.desc,
                    "path" => %result.path.display(),
                    "error" => e.name(),
                    "message" => e.message(),
                ),
            }
        }

        let (failed, skipped) = categorize_results(&results);
        info!(
            log,
            "Handler finished";
            "handler" => self.name(),
            "cases" => results.len(),
            "failed" => failed.len(),
            "skipped" => skipped.len(),
        );

        Ok(results)
    }

    /// Runs the handler and panics if any case fails.
    fn run_and_assert(&self, config: &RunnerConfig) {
        let name = self.name();
        match self.run(config) {
            Ok(results) => assert_tests_pass(&name, &self.handler_path(config), &results),
            Err(e) => panic!("unable to run {}: {:?}", name, e),
        }
    }
}

fn subdirectories(path: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = fs::read_dir(path).map_err(|e| {
        Error::InternalError(format!("unable to read {}: {:?}", path.display(), e))
    })?;

    let mut dirs = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map_or(false, |ty| ty.is_dir()))
        .map(|entry| entry.path())
        .collect::<Vec<_>>();
    dirs.sort();

    Ok(dirs)
}

#[derive(Debug, Clone)]
pub struct SszGenericHandler {
    handler_name: String,
    known_failures: Vec<String>,
}

impl SszGenericHandler {
    pub fn new(handler_name: impl Into<String>) -> Self {
        Self {
            handler_name: handler_name.into(),
            known_failures: vec![],
        }
    }

    pub fn all() -> Vec<Self> {
        SSZ_GENERIC_HANDLERS.iter().copied().map(Self::new).collect()
    }

    pub fn with_known_failures(mut self, known_failures: Vec<String>) -> Self {
        self.known_failures = known_failures;
        self
    }
}

impl Handler for SszGenericHandler {
    type Case = cases::SszGeneric;

    fn preset(&self) -> Option<PresetName> {
        None
    }

    fn runner_name(&self) -> &'static str {
        "ssz_generic"
    }

    fn handler_name(&self) -> String {
        self.handler_name.clone()
    }

    fn known_failures(&self) -> &[String] {
        &self.known_failures
    }
}

#[derive(Debug, Clone)]
pub struct SszStaticHandler {
    type_name: String,
    preset: PresetName,
}

impl SszStaticHandler {
    pub fn new(type_name: impl Into<String>, preset: PresetName) -> Self {
        Self {
            type_name: type_name.into(),
            preset,
        }
    }

    /// A handler for every phase 0 container.
    pub fn all(preset: PresetName) -> Vec<Self> {
        TYPE_NAMES
            .iter()
            .map(|type_name| Self::new(*type_name, preset))
            .collect()
    }
}

impl Handler for SszStaticHandler {
    type Case = cases::SszStatic;

    fn preset(&self) -> Option<PresetName> {
        Some(self.preset)
    }

    fn runner_name(&self) -> &'static str {
        "ssz_static"
    }

    fn handler_name(&self) -> String {
        self.type_name.clone()
    }
}

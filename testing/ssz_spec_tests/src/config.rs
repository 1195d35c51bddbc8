use consensus_types::PresetName;
use slog::Logger;
use std::env;
use std::path::PathBuf;

/// Overrides the location of the corpus.
pub const TESTS_DIR_ENV: &str = "SSZ_SPEC_TESTS_DIR";
/// Runs cases on the calling thread when set, which keeps log output in case order.
pub const SEQUENTIAL_ENV: &str = "SSZ_SPEC_TESTS_SEQUENTIAL";

/// Where the runner finds the corpus and how it executes cases.
#[derive(Clone)]
pub struct RunnerConfig {
    /// The root of an extracted `consensus-spec-tests` release, the directory containing
    /// `tests/`.
    pub tests_dir: PathBuf,
    pub use_rayon: bool,
    pub log: Logger,
}

impl RunnerConfig {
    pub fn new(tests_dir: PathBuf, use_rayon: bool, log: Logger) -> Self {
        Self {
            tests_dir,
            use_rayon,
            log,
        }
    }

    /// Reads the configuration from the environment, defaulting to the corpus checked out beside
    /// this crate and to parallel execution.
    pub fn from_env(log: Logger) -> Self {
        let tests_dir = env::var_os(TESTS_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("consensus-spec-tests")
            });
        let use_rayon = env::var_os(SEQUENTIAL_ENV).is_none();

        Self::new(tests_dir, use_rayon, log)
    }

    /// The directory holding every handler of `runner` for `config_name`, e.g.
    /// `tests/general/phase0/ssz_generic`.
    pub fn runner_dir(&self, config_name: &str, fork_name: &str, runner_name: &str) -> PathBuf {
        self.tests_dir
            .join("tests")
            .join(config_name)
            .join(fork_name)
            .join(runner_name)
    }
}

/// The config directory used by vectors that do not depend on a preset.
pub const GENERAL_CONFIG: &str = "general";

pub fn config_name(preset: Option<PresetName>) -> &'static str {
    preset.map_or(GENERAL_CONFIG, PresetName::as_str)
}

use slog::Logger;
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::Build;

pub use sloggers::Error;

/// Returns a logger that writes to stderr, dropping records below `level`.
pub fn terminal_logger(level: Severity) -> Result<Logger, Error> {
    TerminalLoggerBuilder::new()
        .level(level)
        .destination(Destination::Stderr)
        .build()
}

/// Return a logger suitable for test usage.
///
/// By default no logs will be printed, but they can be enabled via the `test_logger` feature,
/// e.g. `cargo test -p ssz_spec_tests --features 'spec_tests logging/test_logger'`.
pub fn test_logger() -> Logger {
    let logger = if cfg!(feature = "test_logger") {
        terminal_logger(Severity::Debug)
    } else {
        sloggers::null::NullLoggerBuilder.build()
    };

    // Neither builder touches the filesystem; fall back to discarding records if one fails.
    logger.unwrap_or_else(|_| Logger::root(slog::Discard, slog::o!()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loggers_build() {
        let log = test_logger();
        slog::debug!(log, "Test logger built"; "enabled" => cfg!(feature = "test_logger"));

        assert!(terminal_logger(Severity::Critical).is_ok());
    }
}

use std::io::IsTerminal;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

/// Used when `RUST_LOG` is unset. Most events come from the member crates.
const DEFAULT_DIRECTIVES: &str = "closing_intake=info,intake_core=info,intake_storage_json=info";

/// `RUST_LOG` when set, else [`DEFAULT_DIRECTIVES`].
pub fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Colour escapes only for an interactive stderr, and never in plain mode.
pub fn use_ansi(stderr_is_terminal: bool, plain: bool) -> bool {
    stderr_is_terminal && !plain
}

/// Installs the global subscriber writing to stderr, so command output on
/// stdout stays machine-readable.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let ansi = use_ansi(
            std::io::stderr().is_terminal(),
            crate::cli::output::is_plain(),
        );
        let _ = tracing_subscriber::fmt()
            .with_env_filter(default_filter())
            .with_ansi(ansi)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

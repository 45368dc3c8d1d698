//! Telemetry helpers for structured logging.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "load_stagger=info";

/// Install an env-driven fmt subscriber unless the host already set one.
///
/// `RUST_LOG` wins when present; otherwise [`DEFAULT_FILTER`] applies. Scheduler
/// transitions log at `debug`, dispatches and deferrals at `info`/`warn`.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

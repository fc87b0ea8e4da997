//! Logging for the test binaries.
//!
//! Integration tests call [`init_test_setup`] from a `#[ctor::ctor]` hook so every
//! planner and executor span is visible when a merge scenario fails.

use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

/// Crate events at trace, dependencies at warn, unless `RUST_LOG` says otherwise.
const DEFAULT_DIRECTIVES: &str = "warn,rigmerge=trace";

/// Targets that log once per node and drown the per-operation lines.
const NOISY_TARGETS: [&str; 2] = ["config", "rigmerge::domain::scene"];

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("test logging ready");
    });
}

fn is_noisy(target: &str) -> bool {
    NOISY_TARGETS.iter().any(|noisy| target.starts_with(noisy))
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let module_filter = filter_fn(|metadata| !is_noisy(metadata.target()));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_repeated_calls_when_initializing_then_setup_runs_once() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn given_targets_when_filtering_then_only_scene_internals_and_config_are_noisy() {
        assert!(is_noisy("config::file"));
        assert!(is_noisy("rigmerge::domain::scene"));
        assert!(!is_noisy("rigmerge::application::plan"));
        assert!(!is_noisy("rigmerge::domain::bones"));
    }
}

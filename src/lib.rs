pub mod commands;
pub mod config;
pub mod core_state;
pub mod error;
pub mod models;
pub mod db;
pub mod schema_store; // Field configuration (JSON)
pub mod coercion; // Form text → typed values
pub mod metrics; // Medication totals, summary stats, correlations
pub mod charts; // Chart catalog + PNG rendering
pub mod report; // PDF report

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}

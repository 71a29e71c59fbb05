//! Quire command-line driver.
//!
//! Loads plug-ins into a registry seeded with the built-in element kinds
//! and backends, then runs one command against the frozen registry.

pub mod commands;

use std::sync::Once;

use tracing_subscriber::{prelude::*, EnvFilter};
use tracing_tree::HierarchicalLayer;

/// Primary log filter variable; `RUST_LOG` is read when it is unset.
pub const LOG_VAR: &str = "QUIRE_LOG";

static TRACING_INIT: Once = Once::new();

/// Install the stderr subscriber. Safe to call more than once.
///
/// Without a filter variable only warnings are shown.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let directives = std::env::var(LOG_VAR)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());
        let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::registry()
            .with(filter)
            .with(
                HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    });
}

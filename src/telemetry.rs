//! # Tracing Setup
//!
//! [`TracingSink`](crate::TracingSink) only emits events; something has to
//! collect them. [`setup_tracing`] installs a `tracing_subscriber::fmt`
//! subscriber for binaries and examples that have no subscriber of their own.
//!
//! ## Configuration
//!
//! The subscriber uses a compact format that hides the target column
//! (`with_target(false)`). Lifecycle events carry `type_name` and `member` as
//! fields, so the module path adds nothing.
//!
//! Filtering follows `RUST_LOG`:
//!
//! ```bash
//! # Everything the wrapper emits at the default level
//! RUST_LOG=aspect_logging=debug cargo run
//!
//! # Only failures
//! RUST_LOG=aspect_logging=error cargo run
//! ```
//!
//! With `RUST_LOG=debug` a successful call renders as:
//!
//! ```text
//! DEBUG Calculator.add:5b0f...:OnBefore log_point="OnBefore" type_name="Calculator" member="add"
//! DEBUG Calculator.add:5b0f...:OnAfter log_point="OnAfter" type_name="Calculator" member="add"
//! DEBUG Calculator.add:5b0f...:OnFinally (41µs) log_point="OnFinally" elapsed="41µs"
//! ```
//!
//! Both entry points may be called any number of times. Only the first call
//! installs a subscriber, and an already installed global subscriber is left
//! alone.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the compact subscriber, filtered by `RUST_LOG`.
pub fn setup_tracing() {
    INIT.call_once(|| install(EnvFilter::from_default_env()));
}

/// Like [`setup_tracing`], falling back to `directive` when `RUST_LOG` is unset
/// or invalid.
pub fn setup_tracing_with_default(directive: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
        install(filter);
    });
}

fn install(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

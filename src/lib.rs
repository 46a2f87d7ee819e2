#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Aspect Logging
//!
//! > **Structured lifecycle logging around method calls.**
//!
//! Wrap a call once and every invocation reports when it started, whether it
//! succeeded or failed, and how long it took. The records go to a pluggable
//! sink as message templates with ordered arguments, so structured backends
//! can index the fields instead of parsing text.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Observation, not handling
//!
//! The wrapper never changes what the caller sees by default. A failure is
//! logged (at `Error`, whatever the configured level) and returned unchanged.
//! Suppressing or replacing a failure is an explicit recovery hook supplied by
//! the caller.
//!
//! ### Explicit composition
//!
//! There is no runtime weaving. Instrumented functions are wrapped at
//! construction time, either by calling [`LogAspect::invoke`] around the body
//! or by building a wrapped function with [`compose::wrap`].
//!
//! ## 🚀 Core Concepts
//!
//! ### The lifecycle
//! Each call moves through `Entered → Running → Succeeded | Faulted → Finalized`.
//! Four points can be logged along the way: `OnBefore`, `OnAfter`,
//! `OnException` and `OnFinally`. `OnFinally` carries the elapsed time and is
//! guaranteed to be emitted exactly once. See the [`aspect`] module.
//!
//! ### Three layers of configuration
//! Settings declared on a class or method beat process-wide options, which beat
//! the defaults (`Debug`, `Before | After | Finally`, correlation ids on, no
//! prefix). Each field is resolved independently and the result is cached per
//! aspect. See the [`config`] module.
//!
//! ### Correlation
//! Every record of one call carries the same id, so the lines of a call can be
//! grouped afterwards even when calls interleave. See [`correlation`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Wrapper ([`aspect`], [`compose`])
//! - **Role**: Drives the lifecycle of one call, for blocking and async targets alike.
//! - **Key items**: [`LogAspect`], [`CallScope`], [`rethrow`], [`compose::wrap`].
//!
//! ### 2. The Inputs ([`metadata`], [`config`], [`level`], [`point`])
//! - **Role**: What is known about a call and how it should be logged.
//! - **Key items**: [`CallMetadata`], [`LogSettings`], [`LoggingOptions`], [`EffectiveConfig`].
//!
//! ### 3. The Output ([`context`], [`format`], [`sink`])
//! - **Role**: Turns one call and one lifecycle point into a record and hands it to a sink.
//! - **Key items**: [`CallContext`], [`MessageFormatter`], [`LogSink`], [`TracingSink`].
//!
//! ### 4. Testing ([`mock`])
//! - **Role**: In-memory sink and deterministic id providers.
//!
//! ## 🚀 Quick Start
//!
//! ```rust
//! use aspect_logging::{call_metadata, LogAspect, LogLevel, LogSettings};
//!
//! aspect_logging::telemetry::setup_tracing_with_default("aspect_logging=debug");
//!
//! let aspect = LogAspect::new(LogSettings::new().log_level(LogLevel::Information).prefix("billing"));
//! let total = aspect.invoke(call_metadata!(Invoice::total), || "120".parse::<u32>());
//! assert_eq!(total.unwrap(), 120);
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod aspect;
pub mod compose;
pub mod config;
pub mod context;
pub mod correlation;
pub mod error;
pub mod format;
pub mod level;
pub mod metadata;
pub mod mock;
pub mod point;
pub mod sink;
pub mod telemetry;

pub use aspect::{rethrow, CallScope, LogAspect, LogAspectBuilder};
pub use compose::{wrap, wrap_async};
pub use config::{EffectiveConfig, LogSettings, LoggingOptions};
pub use context::CallContext;
pub use correlation::{CorrelationId, CorrelationIdProvider, UuidProvider};
pub use error::ConfigError;
pub use format::{ArgValue, LogMessage, MessageFormatter, TemplateArg};
pub use level::LogLevel;
pub use metadata::CallMetadata;
pub use point::{LogPoint, LogPoints};
pub use sink::{LogSink, TracingSink};

//! # Lifecycle Wrapper
//!
//! [`LogAspect`] wraps a call and logs its lifecycle. One aspect is built per
//! instrumented class or method; every call through it gets its own
//! [`CallContext`] and correlation id, while the resolved configuration is
//! computed once and shared.
//!
//! ## The lifecycle
//!
//! ```text
//! Entered ──► OnBefore ──► invoke target ──┬─ Ok ──► OnAfter ─────────────────┐
//!                                          └─ Err ─► OnException ─► hook ─────┤
//!                                                                             ▼
//!                                                        OnFinally (elapsed) ◄┘
//! ```
//!
//! - `OnBefore`, `OnAfter` and `OnFinally` use the resolved level.
//! - `OnException` is always emitted at `Error`.
//! - Each point is only emitted if it is in the resolved [`LogPoints`](crate::LogPoints).
//! - `OnFinally` is emitted by a drop guard, so it also fires when a blocking
//!   target panics or when a pending async call is dropped.
//!
//! ## Blocking and async targets
//!
//! [`LogAspect::invoke`] and [`LogAspect::invoke_async`] run the same
//! algorithm. Both open a [`CallScope`], obtain the target's result (by calling
//! it, or by calling it and awaiting the future) and settle the scope. The
//! async variant suspends exactly where the target suspends.
//!
//! ## Suppressing failures
//!
//! The `*_with` variants take a recovery hook that is consulted after
//! `OnException` has been emitted. The hook may return a substitute `Ok` value
//! or pass the failure on. The plain variants use [`rethrow`], which returns the
//! failure unchanged. When `Exception` is not an enabled point the hook is not
//! consulted and the failure propagates as is.
//!
//! ```rust
//! use aspect_logging::{call_metadata, LogAspect, LogPoints, LogSettings};
//! use aspect_logging::mock::RecordingSink;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(RecordingSink::new());
//! let aspect = LogAspect::builder()
//!     .settings(LogSettings::new().log_points(LogPoints::ALL).include_correlation_id(false))
//!     .sink(sink.clone())
//!     .build();
//!
//! let sum: Result<i32, std::num::ParseIntError> =
//!     aspect.invoke(call_metadata!(Calculator::parse), || "42".parse::<i32>());
//!
//! assert_eq!(sum.unwrap(), 42);
//! assert_eq!(sink.lines()[0], "Calculator.parse:OnBefore");
//! assert_eq!(sink.lines()[1], "Calculator.parse:OnAfter");
//! ```

use crate::config::{EffectiveConfig, LogSettings, LoggingOptions};
use crate::context::CallContext;
use crate::correlation::{CorrelationIdProvider, UuidProvider};
use crate::format::MessageFormatter;
use crate::metadata::CallMetadata;
use crate::point::LogPoint;
use crate::sink::{LogSink, TracingSink};
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::time::Instant;

/// The default recovery hook: hand the failure back unchanged.
pub fn rethrow<T, E>(_ctx: &CallContext, error: E) -> Result<T, E> {
    Err(error)
}

// =============================================================================
// THE ASPECT
// =============================================================================

/// Logs the lifecycle of calls routed through it.
pub struct LogAspect {
    settings: LogSettings,
    options: Option<Arc<LoggingOptions>>,
    sink: Option<Arc<dyn LogSink>>,
    ids: Arc<dyn CorrelationIdProvider>,
    resolved: OnceLock<EffectiveConfig>,
}

impl fmt::Debug for LogAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogAspect")
            .field("settings", &self.settings)
            .field("options", &self.options)
            .field("has_sink", &self.sink.is_some())
            .field("resolved", &self.resolved.get())
            .finish()
    }
}

impl LogAspect {
    /// An aspect with the given settings, logging through [`TracingSink`] and
    /// without process options.
    pub fn new(settings: LogSettings) -> Self {
        Self::builder()
            .settings(settings)
            .sink(Arc::new(TracingSink))
            .build()
    }

    pub fn builder() -> LogAspectBuilder {
        LogAspectBuilder::default()
    }

    /// The resolved configuration, computed on first use.
    pub fn config(&self) -> &EffectiveConfig {
        self.resolved.get_or_init(|| {
            EffectiveConfig::resolve(Some(&self.settings), self.options.as_deref())
        })
    }

    /// Runs a blocking target inside the lifecycle.
    pub fn invoke<T, E, F>(&self, metadata: CallMetadata, target: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: Error + 'static,
    {
        self.invoke_with(metadata, target, rethrow)
    }

    /// Runs a blocking target, consulting `recover` when it fails.
    pub fn invoke_with<T, E, F, R>(&self, metadata: CallMetadata, target: F, recover: R) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        R: FnOnce(&CallContext, E) -> Result<T, E>,
        E: Error + 'static,
    {
        let scope = self.enter(metadata);
        let result = target();
        scope.settle(result, recover)
    }

    /// Runs an async target inside the lifecycle.
    pub async fn invoke_async<T, E, F, Fut>(&self, metadata: CallMetadata, target: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        self.invoke_async_with(metadata, target, rethrow).await
    }

    /// Runs an async target, consulting `recover` when it fails.
    pub async fn invoke_async_with<T, E, F, Fut, R>(
        &self,
        metadata: CallMetadata,
        target: F,
        recover: R,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: FnOnce(&CallContext, E) -> Result<T, E>,
        E: Error + 'static,
    {
        let scope = self.enter(metadata);
        let result = target().await;
        scope.settle(result, recover)
    }

    /// Opens the lifecycle of one call: builds its context, emits `OnBefore`
    /// and starts the clock.
    pub fn enter(&self, metadata: CallMetadata) -> CallScope<'_> {
        let ctx = CallContext::new(metadata, self.config(), self.ids.as_ref());
        let mut scope = CallScope {
            aspect: self,
            ctx,
            started: Instant::now(),
        };
        scope.emit(LogPoint::Before);
        scope.started = Instant::now();
        scope
    }

    fn enabled(&self, point: LogPoint) -> bool {
        self.config().log_points.contains(point)
    }
}

// =============================================================================
// THE PER-CALL SCOPE
// =============================================================================

/// One call in flight. Emits `OnFinally` when dropped, exactly once.
pub struct CallScope<'a> {
    aspect: &'a LogAspect,
    ctx: CallContext,
    started: Instant,
}

impl CallScope<'_> {
    pub fn context(&self) -> &CallContext {
        &self.ctx
    }

    /// Records the outcome of the target and returns what the caller should see.
    pub fn settle<T, E, R>(self, result: Result<T, E>, recover: R) -> Result<T, E>
    where
        R: FnOnce(&CallContext, E) -> Result<T, E>,
        E: Error + 'static,
    {
        match result {
            Ok(value) => {
                self.emit(LogPoint::After);
                Ok(value)
            }
            Err(error) if self.aspect.enabled(LogPoint::Exception) => {
                self.emit_failure(&error);
                recover(&self.ctx, error)
            }
            Err(error) => Err(error),
        }
    }

    fn emit(&self, point: LogPoint) {
        let Some(sink) = &self.aspect.sink else {
            return;
        };
        if !self.aspect.enabled(point) {
            return;
        }
        let elapsed = (point == LogPoint::Finally).then(|| self.started.elapsed());
        let message = MessageFormatter::format(&self.ctx, point, elapsed);
        isolate(point, || sink.log(self.ctx.log_level(), &message));
    }

    fn emit_failure(&self, error: &(dyn Error + 'static)) {
        if let Some(sink) = &self.aspect.sink {
            let message = MessageFormatter::format(&self.ctx, LogPoint::Exception, None);
            isolate(LogPoint::Exception, || {
                sink.log_failure(self.ctx.exception_level(), &message, error)
            });
        }
    }
}

/// Runs a sink call. A panicking sink loses its record; the call goes on.
fn isolate(point: LogPoint, log: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(log)).is_err() {
        tracing::warn!(
            target: "aspect_logging",
            log_point = point.label(),
            "log sink panicked, record dropped"
        );
    }
}

impl Drop for CallScope<'_> {
    fn drop(&mut self) {
        self.emit(LogPoint::Finally);
    }
}

// =============================================================================
// THE BUILDER
// =============================================================================

/// Builds a [`LogAspect`] with explicitly supplied collaborators.
///
/// Without a sink the aspect is silent: targets still run and their results
/// still propagate. Without an id provider, random UUIDs are used.
#[derive(Default)]
pub struct LogAspectBuilder {
    settings: LogSettings,
    options: Option<Arc<LoggingOptions>>,
    sink: Option<Arc<dyn LogSink>>,
    ids: Option<Arc<dyn CorrelationIdProvider>>,
}

impl LogAspectBuilder {
    /// Declarative settings of the call site.
    pub fn settings(mut self, settings: LogSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Class-level settings refined by method-level settings.
    pub fn class_and_method(self, class: &LogSettings, method: &LogSettings) -> Self {
        self.settings(class.overridden_by(method))
    }

    pub fn options(mut self, options: Arc<LoggingOptions>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn id_provider(mut self, ids: Arc<dyn CorrelationIdProvider>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> LogAspect {
        LogAspect {
            settings: self.settings,
            options: self.options,
            sink: self.sink,
            ids: self.ids.unwrap_or_else(|| Arc::new(UuidProvider)),
            resolved: OnceLock::new(),
        }
    }
}

//! # Mock Collaborators
//!
//! Utilities for testing instrumented code without a real logging backend.
//!
//! - [`RecordingSink`] keeps every record in memory, in emission order.
//! - [`FixedIdProvider`] hands out the same correlation id every time, which
//!   makes rendered lines predictable.
//! - [`SequentialIdProvider`] hands out `prefix-1`, `prefix-2`, ... so tests can
//!   tell concurrent or recursive calls apart.
//!
//! # Example
//! ```rust
//! use aspect_logging::mock::{FixedIdProvider, RecordingSink};
//! use aspect_logging::{LogAspect, LogLevel, LogPoints, LogSettings, CallMetadata};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(RecordingSink::new());
//! let aspect = LogAspect::builder()
//!     .settings(LogSettings::new().log_points(LogPoints::BEFORE))
//!     .sink(sink.clone())
//!     .id_provider(Arc::new(FixedIdProvider::new("abc")))
//!     .build();
//!
//! let _ = aspect.invoke(CallMetadata::new("Repo", "load"), || Ok::<_, std::io::Error>(()));
//!
//! let records = sink.records();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].level, LogLevel::Debug);
//! assert_eq!(records[0].rendered, "Repo.load:abc:OnBefore");
//! ```

use crate::correlation::{CorrelationId, CorrelationIdProvider};
use crate::format::{LogMessage, TemplateArg};
use crate::level::LogLevel;
use crate::point::LogPoint;
use crate::sink::LogSink;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// RECORDING SINK
// =============================================================================

/// One record captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: LogLevel,
    pub point: LogPoint,
    pub template: String,
    pub args: Vec<TemplateArg>,
    /// The rendered message, without the failure.
    pub rendered: String,
    /// Display text of the failure, for `OnException` records.
    pub failure: Option<String>,
}

/// Sink that stores records in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<Record>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far.
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    /// Rendered messages, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.rendered.clone()).collect()
    }

    /// Lifecycle points, in emission order.
    pub fn points(&self) -> Vec<LogPoint> {
        self.lock().iter().map(|r| r.point).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Record>> {
        // Poisoning is ignored.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, level: LogLevel, message: &LogMessage, failure: Option<String>) {
        self.lock().push(Record {
            level,
            point: message.point(),
            template: message.template().to_string(),
            args: message.args().to_vec(),
            rendered: message.render(),
            failure,
        });
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: LogLevel, message: &LogMessage) {
        self.push(level, message, None);
    }

    fn log_failure(&self, level: LogLevel, message: &LogMessage, failure: &(dyn Error + 'static)) {
        self.push(level, message, Some(failure.to_string()));
    }
}

// =============================================================================
// ID PROVIDERS
// =============================================================================

/// Always returns the same id.
#[derive(Debug, Clone)]
pub struct FixedIdProvider(CorrelationId);

impl FixedIdProvider {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(CorrelationId::from_string(id))
    }
}

impl CorrelationIdProvider for FixedIdProvider {
    fn new_id(&self) -> CorrelationId {
        self.0.clone()
    }
}

/// Returns `prefix-1`, `prefix-2`, ... Safe to share between threads.
#[derive(Debug)]
pub struct SequentialIdProvider {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl CorrelationIdProvider for SequentialIdProvider {
    fn new_id(&self) -> CorrelationId {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        CorrelationId::from_string(format!("{}-{}", self.prefix, n))
    }
}

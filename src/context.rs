//! # Call Context
//!
//! The per-call snapshot handed to the formatter, the sink and the suppression
//! hook: the call's metadata plus the pieces of the resolved configuration that
//! end up in the message (level, prefix) and the correlation id.
//!
//! A context is created when the call enters the wrapper and dropped when it
//! leaves. It is never shared between calls, so recursive or concurrent calls
//! on the same wrapper each see their own id.

use crate::config::EffectiveConfig;
use crate::correlation::{CorrelationId, CorrelationIdProvider};
use crate::level::LogLevel;
use crate::metadata::CallMetadata;
use std::sync::Arc;

/// Immutable snapshot of one call.
#[derive(Debug, Clone)]
pub struct CallContext {
    metadata: CallMetadata,
    correlation_id: Option<CorrelationId>,
    log_level: LogLevel,
    prefix: Option<Arc<str>>,
}

impl CallContext {
    /// Builds the context for a call. An id is drawn from `ids` only when the
    /// configuration asks for one.
    pub fn new(
        metadata: CallMetadata,
        config: &EffectiveConfig,
        ids: &dyn CorrelationIdProvider,
    ) -> Self {
        let correlation_id = config.include_correlation_id.then(|| ids.new_id());
        Self {
            metadata,
            correlation_id,
            log_level: config.log_level,
            prefix: config.prefix.clone(),
        }
    }

    pub fn metadata(&self) -> &CallMetadata {
        &self.metadata
    }

    pub fn type_name(&self) -> &str {
        self.metadata.type_name()
    }

    pub fn member_name(&self) -> &str {
        self.metadata.member_name()
    }

    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    /// Level for `OnBefore`, `OnAfter` and `OnFinally`.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Level for `OnException`. Always `Error`, whatever the resolved level is.
    pub fn exception_level(&self) -> LogLevel {
        LogLevel::Error
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

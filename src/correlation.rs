//! # Correlation Ids
//!
//! Every record produced for one call can carry the same opaque token, so the
//! `OnBefore`, `OnAfter`, `OnException` and `OnFinally` lines of a call can be
//! linked together afterwards.
//!
//! Ids come from a [`CorrelationIdProvider`]. Production code uses
//! [`UuidProvider`]; tests swap in the deterministic providers from
//! [`crate::mock`].

use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque token shared by all records of one call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(Arc<str>);

impl CorrelationId {
    /// Generate a new random id (UUIDv4).
    pub fn new() -> Self {
        Self::from_string(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an existing token.
    pub fn from_string(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of correlation ids.
///
/// Implementations must be cheap and callable from any thread. Uniqueness only
/// needs to be practical: a collision makes two calls look related in the logs,
/// nothing worse.
pub trait CorrelationIdProvider: Send + Sync {
    fn new_id(&self) -> CorrelationId;
}

/// Random UUIDv4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidProvider;

impl CorrelationIdProvider for UuidProvider {
    fn new_id(&self) -> CorrelationId {
        CorrelationId::new()
    }
}

impl<F> CorrelationIdProvider for F
where
    F: Fn() -> CorrelationId + Send + Sync,
{
    fn new_id(&self) -> CorrelationId {
        self()
    }
}

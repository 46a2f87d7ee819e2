//! # Explicit Composition
//!
//! Instead of rewriting call sites, instrumented functions are wrapped once at
//! construction time. [`wrap`] and [`wrap_async`] take an aspect, the static
//! part of the call metadata and the target, and return a function with the
//! same shape that runs every call through the aspect.
//!
//! The argument value is recorded in the metadata of each call using its
//! `Debug` rendering. Functions taking several arguments take them as a tuple.
//!
//! ```rust
//! use aspect_logging::{call_metadata, compose, LogAspect, LogSettings};
//! use std::sync::Arc;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("division by zero")]
//! struct DivByZero;
//!
//! let aspect = Arc::new(LogAspect::new(LogSettings::new()));
//! let divide = compose::wrap(aspect, call_metadata!(Calculator::divide), |(a, b): (i32, i32)| {
//!     if b == 0 { Err(DivByZero) } else { Ok(a / b) }
//! });
//!
//! assert_eq!(divide((10, 2)).unwrap(), 5);
//! assert!(divide((1, 0)).is_err());
//! ```

use crate::aspect::LogAspect;
use crate::metadata::CallMetadata;
use std::error::Error;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by functions built with [`wrap_async`].
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Wraps a blocking function.
pub fn wrap<A, T, E, F>(
    aspect: Arc<LogAspect>,
    metadata: CallMetadata,
    target: F,
) -> impl Fn(A) -> Result<T, E>
where
    A: Debug,
    F: Fn(A) -> Result<T, E>,
    E: Error + 'static,
{
    let metadata = metadata.returns::<Result<T, E>>();
    move |args: A| {
        let call = metadata.clone().with_arg(&args);
        aspect.invoke(call, || target(args))
    }
}

/// Wraps an async function. The returned function yields boxed futures.
pub fn wrap_async<A, T, E, F, Fut>(
    aspect: Arc<LogAspect>,
    metadata: CallMetadata,
    target: F,
) -> impl Fn(A) -> BoxFuture<Result<T, E>>
where
    A: Debug + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Error + Send + 'static,
{
    let metadata = metadata.returns::<Result<T, E>>();
    let target = Arc::new(target);
    move |args: A| {
        let aspect = Arc::clone(&aspect);
        let target = Arc::clone(&target);
        let call = metadata.clone().with_arg(&args);
        Box::pin(async move { aspect.invoke_async(call, move || target(args)).await })
    }
}

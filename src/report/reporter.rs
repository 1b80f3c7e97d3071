//! # Reporter abstraction and function-backed implementation.
//!
//! This module defines the [`Reporter`] trait and a closure-backed
//! implementation [`ReporterFn`]. The common handle type is [`ReporterRef`],
//! an `Arc<dyn Reporter>` shared by every live task showing that report.
//!
//! A reporter takes no arguments and must be safe to call repeatedly and
//! concurrently from different live tasks.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ReportError;

/// Shared handle to a reporter.
pub type ReporterRef = Arc<dyn Reporter>;

/// # Produces the current text of one report.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use hostwatch::{ReportError, Reporter};
///
/// struct Hello;
///
/// #[async_trait]
/// impl Reporter for Hello {
///     fn name(&self) -> &str { "hello" }
///
///     async fn report(&self) -> Result<String, ReportError> {
///         Ok("hello".into())
///     }
/// }
/// ```
#[async_trait]
pub trait Reporter: Send + Sync + 'static {
    /// Returns a stable, human-readable reporter name (used in events).
    fn name(&self) -> &str;

    /// Produces the report text. A failure means "no text this tick".
    async fn report(&self) -> Result<String, ReportError>;
}

/// Function-backed reporter.
///
/// Wraps a closure that *creates* a new future per call, so no state is shared
/// between calls unless the closure captures an `Arc` explicitly.
///
/// ## Example
/// ```rust
/// use hostwatch::{ReportError, ReporterFn, ReporterRef};
///
/// let r: ReporterRef = ReporterFn::arc("static", || async {
///     Ok::<_, ReportError>("all good".to_string())
/// });
/// assert_eq!(r.name(), "static");
/// ```
#[derive(Debug)]
pub struct ReporterFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ReporterFn<F> {
    /// Creates a new function-backed reporter.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the reporter and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Reporter for ReporterFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String, ReportError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn report(&self) -> Result<String, ReportError> {
        (self.f)().await
    }
}

/// Runs blocking collection on the blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ReportError>
where
    F: FnOnce() -> Result<T, ReportError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| ReportError::Worker(err.to_string()))?
}

//! # Producer abstraction and function-backed producer.
//!
//! A [`Producer`] is the opaque asynchronous work a
//! [`RetryableOperation`](crate::RetryableOperation) attempts and retries,
//! typically a call to a remote endpoint. Its errors are never inspected.
//!
//! [`ProducerFn`] wraps a closure `F: Fn() -> Fut`, creating a fresh future per
//! attempt. Shared state between attempts has to be put behind an `Arc`
//! explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use faultline::{Producer, ProducerFn};
//!
//! let health = ProducerFn::new("health", || async {
//!     Ok::<_, std::io::Error>("ok")
//! });
//! assert_eq!(health.name(), "health");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

/// # Asynchronous value producer.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use faultline::Producer;
///
/// struct Profile;
///
/// #[async_trait]
/// impl Producer for Profile {
///     type Output = String;
///     type Error = std::io::Error;
///
///     fn name(&self) -> &str { "profile" }
///
///     async fn produce(&self) -> Result<String, std::io::Error> {
///         Ok("alice".to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Producer: Send + Sync + 'static {
    /// Value produced on success.
    type Output: Send + 'static;
    /// Failure type; opaque to the retry machinery.
    type Error: Send + 'static;

    /// Stable name used in tracing output.
    fn name(&self) -> &str;

    /// Runs one attempt.
    async fn produce(&self) -> Result<Self::Output, Self::Error>;
}

/// Shared handle to a producer.
pub type ProducerRef<T, E> = Arc<dyn Producer<Output = T, Error = E>>;

/// Function-backed producer.
pub struct ProducerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ProducerFn<F> {
    /// Wraps `f` under the given name.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the producer behind an `Arc`.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> std::fmt::Debug for ProducerFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerFn").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F, Fut, T, E> Producer for ProducerFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self) -> Result<T, E> {
        (self.f)().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_fresh_future_per_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let p = ProducerFn::new("count", move || {
            let c = Arc::clone(&c);
            async move { Ok::<u32, ()>(c.fetch_add(1, Ordering::SeqCst) + 1) }
        });

        assert_eq!(p.produce().await, Ok(1));
        assert_eq!(p.produce().await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_as_producer_ref() {
        let p: ProducerRef<&'static str, String> =
            ProducerFn::arc("fails", || async { Err::<&'static str, _>("down".to_string()) });
        assert_eq!(p.name(), "fails");
        assert_eq!(p.produce().await, Err("down".to_string()));
    }
}

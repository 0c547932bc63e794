use std::fmt::Debug;
use std::time::Duration;

use crate::Body;
use crate::Result;

/// HttpSend is the transport capability used to exchange signed requests.
///
/// Implementations own connection pooling, TLS and redirects. They must not
/// collect a [`Body::Stream`] request body into memory, and should return
/// response bodies as [`Body::Stream`] so downloads can be written
/// incrementally.
///
/// A failure to obtain any response (DNS, connect, TLS, timeout) must be
/// reported as [`crate::ErrorKind::Connection`].
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Body>>;
}

/// Per-exchange timeout attached to a request's extensions.
///
/// Transports should abort the exchange once it elapses and report
/// [`crate::ErrorKind::Connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeout(pub Duration);

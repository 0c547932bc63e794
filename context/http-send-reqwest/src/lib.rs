// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Reqwest based transport for bucketwire.
//!
//! `ReqwestHttpSend` implements [`HttpSend`] on top of a [`reqwest::Client`].
//! Streaming request bodies are forwarded chunk by chunk and response bodies
//! are handed back as streams, so neither side is buffered in memory.
//!
//! ## Example
//!
//! ```no_run
//! use bucketwire_core::{Context, OsEnv};
//! use bucketwire_http_send_reqwest::ReqwestHttpSend;
//! use std::time::Duration;
//!
//! # fn example() -> bucketwire_core::Result<()> {
//! let ctx = Context::new()
//!     .with_http_send(ReqwestHttpSend::with_options(Duration::from_secs(30), true)?)
//!     .with_env(OsEnv);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use bucketwire_core::{Body, Error, HttpSend, RequestTimeout, Result};
use futures::StreamExt;
use futures::TryStreamExt;
use log::debug;
use reqwest::Client;

/// HttpSend implementation backed by reqwest.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Build a client with a per-exchange timeout and TLS verification policy.
    ///
    /// A [`RequestTimeout`] carried by a request overrides `timeout`.
    ///
    /// Disabling `verify_tls` accepts invalid certificates and should only be
    /// used against local test endpoints.
    pub fn with_options(timeout: Duration, verify_tls: bool) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .map_err(|e| Error::unexpected("failed to build reqwest client").with_source(e))?;

        Ok(Self {
            client,
            timeout: Some(timeout),
        })
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Body>> {
        let (parts, body) = req.into_parts();
        debug!("sending {} {}", parts.method, parts.uri);
        let timeout = parts
            .extensions
            .get::<RequestTimeout>()
            .map(|t| t.0)
            .or(self.timeout);

        let body = match body {
            Body::Empty => reqwest::Body::from(Vec::new()),
            Body::Bytes(bs) => reqwest::Body::from(bs),
            Body::Stream(s) => reqwest::Body::wrap_stream(s),
        };

        let mut builder = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let resp = builder.send().await.map_err(classify_reqwest_error)?;

        let mut out = http::Response::builder()
            .status(resp.status())
            .version(resp.version());
        if let Some(headers) = out.headers_mut() {
            *headers = resp.headers().clone();
        }

        let stream = resp.bytes_stream().map_err(classify_reqwest_error).boxed();
        Ok(out.body(Body::Stream(stream))?)
    }
}

/// Every reqwest failure means no (complete) response was received.
fn classify_reqwest_error(err: reqwest::Error) -> Error {
    let message = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "failed to connect"
    } else if err.is_body() || err.is_decode() {
        "connection broken while streaming body"
    } else {
        "failed to send request"
    };
    Error::connection(message).with_source(err)
}

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

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::env::NoopEnv;
use crate::Body;
use crate::ByteSink;
use crate::ByteSource;
use crate::Env;
use crate::FileOpen;
use crate::HttpSend;
use crate::{Error, Result};

/// Context holds the external capabilities a client talks through.
///
/// ## Important
///
/// bucketwire-core provides NO default implementations. Users MAY configure components they need.
/// Any unconfigured component will use a no-op implementation that returns errors or empty values when called.
///
/// ## Example
///
/// ```
/// use bucketwire_core::{Context, OsEnv};
///
/// // Create a context with explicit implementations
/// let ctx = Context::new()
///     .with_env(OsEnv);  // Optionally configure environment implementation
/// ```
#[derive(Clone)]
pub struct Context {
    fs: Arc<dyn FileOpen>,
    http: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("fs", &self.fs)
            .field("http", &self.http)
            .field("env", &self.env)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new Context with no-op implementations.
    ///
    /// All components use no-op implementations by default.
    /// Use the `with_*` methods to configure the components you need.
    ///
    /// ```
    /// use bucketwire_core::Context;
    ///
    /// let ctx = Context::new();
    /// // All components use no-op implementations by default
    /// // You can configure specific components as needed:
    /// // ctx.with_file_open(my_file_system)
    /// //    .with_http_send(my_http_client)
    /// //    .with_env(my_env_provider);
    /// ```
    pub fn new() -> Self {
        Self {
            fs: Arc::new(NoopFileOpen),
            http: Arc::new(NoopHttpSend),
            env: Arc::new(NoopEnv),
        }
    }

    /// Replace the file system implementation.
    pub fn with_file_open(mut self, fs: impl FileOpen) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// Replace the HTTP client implementation.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Replace the environment implementation.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Open a local file for reading.
    #[inline]
    pub async fn file_open_read(&self, path: &str) -> Result<Box<dyn ByteSource>> {
        self.fs.open_read(path).await
    }

    /// Open a local file for writing.
    #[inline]
    pub async fn file_open_write(&self, path: &str) -> Result<Box<dyn ByteSink>> {
        self.fs.open_write(path).await
    }

    /// Remove a local file.
    #[inline]
    pub async fn file_remove(&self, path: &str) -> Result<()> {
        self.fs.remove(path).await
    }

    /// Send http request and return the response.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Body>) -> Result<http::Response<Body>> {
        self.http.http_send(req).await
    }

    /// Get the home directory of the current user.
    #[inline]
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.env.home_dir()
    }

    /// Expand `~` in input path.
    ///
    /// - If path not starts with `~/` or `~\\`, returns `Some(path)` directly.
    /// - Otherwise, replace `~` with home dir instead.
    /// - If home_dir is not found, returns `None`.
    pub fn expand_home_dir(&self, path: &str) -> Option<String> {
        if !path.starts_with("~/") && !path.starts_with("~\\") {
            Some(path.to_string())
        } else {
            self.home_dir()
                .map(|home| path.replacen('~', &home.to_string_lossy(), 1))
        }
    }

    /// Get the environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Value of the first of `keys` set to a non-empty string.
    #[inline]
    pub fn env_first(&self, keys: &[&str]) -> Option<String> {
        self.env.first_var(keys)
    }
}

/// NoopFileOpen is a no-op implementation that always returns an error.
///
/// This is used when no file system is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileOpen;

#[async_trait::async_trait]
impl FileOpen for NoopFileOpen {
    async fn open_read(&self, _path: &str) -> Result<Box<dyn ByteSource>> {
        Err(Error::unexpected(
            "file reading not supported: no file system configured",
        ))
    }

    async fn open_write(&self, _path: &str) -> Result<Box<dyn ByteSink>> {
        Err(Error::unexpected(
            "file writing not supported: no file system configured",
        ))
    }

    async fn remove(&self, _path: &str) -> Result<()> {
        Err(Error::unexpected(
            "file removal not supported: no file system configured",
        ))
    }
}

/// NoopHttpSend is a no-op implementation that always returns an error.
///
/// This is used when no HTTP client is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait::async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, _req: http::Request<Body>) -> Result<http::Response<Body>> {
        Err(Error::connection(
            "HTTP sending not supported: no HTTP client configured",
        ))
    }
}

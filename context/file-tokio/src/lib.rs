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

//! Tokio-based file access for bucketwire.
//!
//! This crate provides `TokioFileSystem`, which implements the `FileOpen`
//! trait from `bucketwire_core` using Tokio's file system operations, together
//! with `TokioReadSource` and `TokioWriteSink`, adapters that turn any
//! [`AsyncRead`] / [`AsyncWrite`] into a [`ByteSource`] / [`ByteSink`].
//!
//! ## Example
//!
//! ```no_run
//! use bucketwire_core::{Context, OsEnv};
//! use bucketwire_file_tokio::TokioFileSystem;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_open(TokioFileSystem)
//!         .with_env(OsEnv);
//!
//!     match ctx.file_open_read("/path/to/object.bin").await {
//!         Ok(src) => println!("opened {:?} bytes", src.size_hint()),
//!         Err(e) => eprintln!("Failed to open file: {}", e),
//!     }
//! }
//! ```

use async_trait::async_trait;
use bucketwire_core::{ByteSink, ByteSource, Error, FileOpen, Result};
use bytes::Bytes;
use bytes::BytesMut;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;

/// Tokio-based implementation of the `FileOpen` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileSystem;

#[async_trait]
impl FileOpen for TokioFileSystem {
    async fn open_read(&self, path: &str) -> Result<Box<dyn ByteSource>> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to open file {path}")).with_source(e))?;
        let len = file
            .metadata()
            .await
            .map_err(|e| Error::unexpected(format!("failed to stat file {path}")).with_source(e))?
            .len();

        Ok(Box::new(TokioReadSource::new(file).with_size(len)))
    }

    async fn open_write(&self, path: &str) -> Result<Box<dyn ByteSink>> {
        let file = tokio::fs::File::create(path).await.map_err(|e| {
            Error::unexpected(format!("failed to create file {path}")).with_source(e)
        })?;

        Ok(Box::new(TokioWriteSink::new(file)))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to remove file {path}")).with_source(e))
    }
}

/// Adapts an [`AsyncRead`] into a [`ByteSource`].
#[derive(Debug)]
pub struct TokioReadSource<R> {
    inner: R,
    remaining: Option<u64>,
}

impl<R> TokioReadSource<R> {
    /// Wrap a reader of unknown length.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            remaining: None,
        }
    }

    /// Declare the total number of bytes the reader will yield.
    pub fn with_size(mut self, size: u64) -> Self {
        self.remaining = Some(size);
        self
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send + 'static> ByteSource for TokioReadSource<R> {
    async fn read_chunk(&mut self, max: usize) -> Result<Option<Bytes>> {
        let mut buf = BytesMut::with_capacity(max);
        // A single read may return less than `max`, keep filling until the
        // chunk is full or the reader is exhausted.
        while buf.len() < max {
            let n = (&mut self.inner)
                .take((max - buf.len()) as u64)
                .read_buf(&mut buf)
                .await?;
            if n == 0 {
                break;
            }
        }

        if buf.is_empty() {
            return Ok(None);
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(buf.len() as u64);
        }
        Ok(Some(buf.freeze()))
    }

    fn size_hint(&self) -> Option<u64> {
        self.remaining
    }
}

/// Adapts an [`AsyncWrite`] into a [`ByteSink`].
#[derive(Debug)]
pub struct TokioWriteSink<W> {
    inner: W,
}

impl<W> TokioWriteSink<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Return the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ByteSink for TokioWriteSink<W> {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<()> {
        self.inner.write_all(&chunk).await?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.inner.flush().await?;
        Ok(())
    }
}

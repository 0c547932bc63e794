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

//! Request and response bodies, plus the byte source / sink capabilities.

use std::fmt::Debug;

use bytes::Bytes;
use bytes::BytesMut;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::Result;

/// Body of a request sent through, or a response returned by, [`crate::HttpSend`].
///
/// `Stream` bodies are forwarded chunk by chunk and never collected by the
/// transport implementation.
#[derive(Default)]
pub enum Body {
    /// No body at all.
    #[default]
    Empty,
    /// A fully buffered body.
    Bytes(Bytes),
    /// A body produced incrementally.
    Stream(BoxStream<'static, Result<Bytes>>),
}

impl Body {
    /// Build a streaming body.
    pub fn from_stream(
        stream: impl futures::Stream<Item = Result<Bytes>> + Send + 'static,
    ) -> Self {
        Body::Stream(stream.boxed())
    }

    /// Length of the body if it is known without consuming it.
    pub fn known_len(&self) -> Option<u64> {
        match self {
            Body::Empty => Some(0),
            Body::Bytes(bs) => Some(bs.len() as u64),
            Body::Stream(_) => None,
        }
    }

    /// Collect the whole body into memory.
    pub async fn collect(self) -> Result<Bytes> {
        match self {
            Body::Empty => Ok(Bytes::new()),
            Body::Bytes(bs) => Ok(bs),
            Body::Stream(mut s) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = s.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }

    /// Turn the body into a stream of chunks.
    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes>> {
        match self {
            Body::Empty => futures::stream::empty().boxed(),
            Body::Bytes(bs) => futures::stream::once(async move { Ok(bs) }).boxed(),
            Body::Stream(s) => s,
        }
    }
}

impl Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Bytes(bs) => write!(f, "Body::Bytes({} bytes)", bs.len()),
            Body::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        if value.is_empty() {
            Body::Empty
        } else {
            Body::Bytes(value)
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Bytes::from(value).into()
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Bytes::from(value).into()
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Bytes::from_static(value.as_bytes()).into()
    }
}

/// ByteSource is a readable stream of bytes: it yields chunks until exhausted.
///
/// Upload calls pull from a source in bounded chunks, so a source of unknown
/// length is never read into memory as a whole.
#[async_trait::async_trait]
pub trait ByteSource: Send + 'static {
    /// Read the next chunk of at most `max` bytes.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    async fn read_chunk(&mut self, max: usize) -> Result<Option<Bytes>>;

    /// Remaining length of the source if it is known up front.
    fn size_hint(&self) -> Option<u64> {
        None
    }
}

#[async_trait::async_trait]
impl ByteSource for Bytes {
    async fn read_chunk(&mut self, max: usize) -> Result<Option<Bytes>> {
        if self.is_empty() {
            return Ok(None);
        }
        let n = max.min(self.len());
        Ok(Some(self.split_to(n)))
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.len() as u64)
    }
}

#[async_trait::async_trait]
impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    async fn read_chunk(&mut self, max: usize) -> Result<Option<Bytes>> {
        (**self).read_chunk(max).await
    }

    fn size_hint(&self) -> Option<u64> {
        (**self).size_hint()
    }
}

/// ByteSink is a writable stream of bytes: it accepts chunks in order.
#[async_trait::async_trait]
pub trait ByteSink: Send {
    /// Write one chunk.
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<()>;

    /// Flush everything written so far.
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl ByteSink for Vec<u8> {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<()> {
        self.extend_from_slice(&chunk);
        Ok(())
    }
}

#[async_trait::async_trait]
impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<()> {
        (**self).write_chunk(chunk).await
    }

    async fn flush(&mut self) -> Result<()> {
        (**self).flush().await
    }
}

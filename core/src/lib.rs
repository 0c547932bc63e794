//! Core components for talking to S3-compatible object storage.
//!
//! This crate provides the foundational types and traits for the bucketwire ecosystem.
//! It owns nothing that performs I/O by itself: every side effect goes through a
//! capability stored in [`Context`].
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds implementations for HTTP sending, file access and environment access
//! - **Body**: Request and response bodies that may be buffered or streamed
//! - **Error**: A closed error taxonomy shared by every bucketwire crate
//! - **Traits**: Abstract interfaces for request signing (`SignRequest`) and byte streams (`ByteSource`, `ByteSink`)
//!
//! ## Example
//!
//! ```no_run
//! use bucketwire_core::{Body, Context, HttpSend, Result};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! struct AlwaysNotFound;
//!
//! #[async_trait]
//! impl HttpSend for AlwaysNotFound {
//!     async fn http_send(&self, _: http::Request<Body>) -> Result<http::Response<Body>> {
//!         Ok(http::Response::builder().status(404).body(Body::Empty)?)
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new().with_http_send(AlwaysNotFound);
//! let resp = ctx
//!     .http_send(http::Request::get("http://127.0.0.1:9000/bucket").body(Body::Empty)?)
//!     .await?;
//! assert_eq!(resp.status(), 404);
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! This crate defines several important traits:
//!
//! - [`HttpSend`]: For sending HTTP requests
//! - [`FileOpen`]: For opening local files as byte streams
//! - [`Env`]: For environment variable access
//! - [`ByteSource`] / [`ByteSink`]: For streamed uploads and downloads
//! - [`SignRequest`]: For authenticating requests
//! - [`SigningCredential`]: For validating credentials
//!
//! ## Utilities
//!
//! The crate also provides utility modules:
//!
//! - [`hash`]: Cryptographic hashing utilities, including incremental digests
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod body;
pub use body::{Body, ByteSink, ByteSource};
mod context;
pub use context::{Context, NoopFileOpen, NoopHttpSend};
mod file_open;
pub use file_open::FileOpen;
mod http_send;
pub use http_send::{HttpSend, RequestTimeout};
mod env;
pub use env::{Env, NoopEnv, OsEnv, StaticEnv};

mod api;
pub use api::{SignRequest, SigningCredential};
mod request;
pub use request::{SigningMethod, SigningRequest};

//! Talk to S3-compatible object storage.
//!
//! `bucketwire` bundles the protocol client from `bucketwire-s3` with the
//! capability traits of `bucketwire-core`. With the `default-context` feature
//! (on by default) it also wires reqwest, tokio file access and the process
//! environment together:
//!
//! ```no_run
//! use bucketwire::s3::{Config, PutOptions};
//!
//! # async fn example() -> bucketwire::Result<()> {
//! let client = bucketwire::default_client(Config {
//!     endpoint: Some("http://127.0.0.1:9000".to_string()),
//!     ..Default::default()
//! })?;
//! client
//!     .put_object("bkt", "hello.txt", "Hello, World!", PutOptions::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use bucketwire_core::*;

pub mod s3 {
    //! S3 protocol client.
    pub use bucketwire_s3::*;
}

#[cfg(all(feature = "default-context", not(target_arch = "wasm32")))]
mod context;
#[cfg(all(feature = "default-context", not(target_arch = "wasm32")))]
pub use context::{default_client, default_context};

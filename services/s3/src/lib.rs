//! Client for S3-compatible object storage.
//!
//! Requests are addressed path-style (`{endpoint}/{bucket}/{key}`) and signed
//! with AWS Signature Version 4. All I/O goes through the capabilities held by
//! a [`bucketwire_core::Context`], so the same client runs against a real
//! HTTP stack or an in-memory service in tests.
//!
//! ## Example
//!
//! ```no_run
//! use bucketwire_core::{Context, Result};
//! use bucketwire_s3::{Client, Config, PutOptions};
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! let config = Config {
//!     endpoint: Some("http://127.0.0.1:9000".to_string()),
//!     ..Default::default()
//! }
//! .from_env(&ctx);
//! let client = Client::new(ctx, config)?;
//!
//! client.create_bucket("photos").await?;
//! client
//!     .put_object("photos", "2024/cat.jpg", b"...".to_vec(), PutOptions::default())
//!     .await?;
//!
//! let mut lister = client.list_all_objects("photos", Default::default())?;
//! while let Some(entry) = lister.next().await? {
//!     println!("{} ({} bytes)", entry.key, entry.size);
//! }
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;

mod config;
pub use config::{Config, EndpointConfig};

mod credential;
pub use credential::Credential;

mod naming;
pub use naming::{normalize_key, validate_bucket_name, validate_key};

mod canonical;
pub use canonical::CanonicalRequest;

mod sign_request;
pub use sign_request::RequestSigner;

mod types;
pub use types::*;

mod classify;
pub use classify::classify_error_response;

mod codec;

mod client;
pub use client::Client;

mod paginate;
pub use paginate::ObjectLister;

mod presign;
pub use presign::{verify_presigned_expiry, PresignOptions, PresignedUrl};

mod multipart;
mod transfer;

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

use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// The error type for bucketwire operations.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    code: Option<String>,
    status: Option<StatusCode>,
    bucket: Option<String>,
    key: Option<String>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred.
///
/// This is a closed set: every failure surfaced by the client maps to exactly
/// one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response was received: DNS, connect, TLS or timeout failure.
    Connection,
    /// The server rejected the request signature or access key.
    InvalidCredentials,
    /// The signature is valid but the caller is not authorized.
    AccessDenied,
    /// The addressed bucket does not exist.
    BucketNotFound,
    /// The addressed object does not exist.
    ObjectNotFound,
    /// The bucket to create already exists.
    BucketAlreadyExists,
    /// The bucket to delete still contains objects.
    BucketNotEmpty,
    /// Caller input was rejected before any network call.
    Validation,
    /// Transferred content does not match its content hash.
    Integrity,
    /// Any protocol error not covered by a more specific kind.
    Protocol,
    /// A local capability (file, byte source, byte sink) failed.
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            status: None,
            bucket: None,
            key: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the protocol error code, e.g. `NoSuchKey`.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the HTTP status the error was derived from.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the bucket the failed operation addressed.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Attach the object key the failed operation addressed.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the protocol error code if the server returned one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Get the HTTP status if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Get the bucket this error is about.
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// Get the object key this error is about.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Check if this error reports a missing bucket or object.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::BucketNotFound | ErrorKind::ObjectNotFound
        )
    }
}

// Convenience constructors
impl Error {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    /// Create an invalid credentials error
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    /// Create an access denied error
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    /// Create a bucket not found error
    pub fn bucket_not_found(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        Self::new(
            ErrorKind::BucketNotFound,
            format!("bucket '{bucket}' not found"),
        )
        .with_bucket(bucket)
    }

    /// Create an object not found error
    pub fn object_not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        let (bucket, key) = (bucket.into(), key.into());
        Self::new(
            ErrorKind::ObjectNotFound,
            format!("object '{key}' not found in bucket '{bucket}'"),
        )
        .with_bucket(bucket)
        .with_key(key)
    }

    /// Create a bucket already exists error
    pub fn bucket_already_exists(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        Self::new(
            ErrorKind::BucketAlreadyExists,
            format!("bucket '{bucket}' already exists"),
        )
        .with_bucket(bucket)
    }

    /// Create a bucket not empty error
    pub fn bucket_not_empty(bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        Self::new(
            ErrorKind::BucketNotEmpty,
            format!("bucket '{bucket}' is not empty"),
        )
        .with_bucket(bucket)
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an integrity error
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Integrity, message)
    }

    /// Create a generic protocol error carrying the raw code.
    pub fn protocol(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message).with_code(code)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Connection => write!(f, "connection error"),
            ErrorKind::InvalidCredentials => write!(f, "invalid credentials"),
            ErrorKind::AccessDenied => write!(f, "access denied"),
            ErrorKind::BucketNotFound => write!(f, "bucket not found"),
            ErrorKind::ObjectNotFound => write!(f, "object not found"),
            ErrorKind::BucketAlreadyExists => write!(f, "bucket already exists"),
            ErrorKind::BucketNotEmpty => write!(f, "bucket not empty"),
            ErrorKind::Validation => write!(f, "validation error"),
            ErrorKind::Integrity => write!(f, "integrity error"),
            ErrorKind::Protocol => write!(f, "protocol error"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(err: http::uri::InvalidUriParts) -> Self {
        Self::validation(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

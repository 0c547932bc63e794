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

//! Map failed responses into the error taxonomy.

use bucketwire_core::{Error, ErrorKind};
use http::StatusCode;
use log::debug;
use quick_xml::de;
use serde::Deserialize;

/// Structured error payload returned by the service.
#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub(crate) struct ErrorBody {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

/// Parse an error payload, `None` if there is nothing usable.
pub(crate) fn parse_error_body(body: &[u8]) -> Option<ErrorBody> {
    if body.is_empty() {
        return None;
    }
    let text = std::str::from_utf8(body).ok()?;
    // Skip the xml declaration, the payload must be rooted at `<Error>`.
    let mut root = text.trim_start();
    if root.starts_with("<?") {
        let end = root.find("?>")?;
        root = root[end + 2..].trim_start();
    }
    if !root.starts_with("<Error>") && !root.starts_with("<Error ") {
        return None;
    }
    let parsed: ErrorBody = de::from_str(text).ok()?;
    if parsed.code.is_empty() {
        return None;
    }
    Some(parsed)
}

/// Classify a non-2xx response.
///
/// `bucket` and `key` are the call's context and are attached to the
/// returned error, so not-found errors always name what was missing.
pub fn classify_error_response(
    status: StatusCode,
    body: &[u8],
    bucket: Option<&str>,
    key: Option<&str>,
) -> Error {
    let parsed = parse_error_body(body);

    let err = match parsed {
        _ if status.is_redirection() => Error::protocol(
            status_code_name(status),
            format!("unexpected redirect with status {status}"),
        ),
        Some(eb) => {
            let message = if eb.message.is_empty() {
                eb.code.clone()
            } else {
                eb.message.clone()
            };
            let err = match eb.code.as_str() {
                "NoSuchBucket" => Error::new(ErrorKind::BucketNotFound, message),
                "NoSuchKey" => Error::new(ErrorKind::ObjectNotFound, message),
                "BucketAlreadyExists" | "BucketAlreadyOwnedByYou" => {
                    Error::new(ErrorKind::BucketAlreadyExists, message)
                }
                "BucketNotEmpty" => Error::new(ErrorKind::BucketNotEmpty, message),
                "AccessDenied" => Error::access_denied(message),
                "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "InvalidToken"
                | "ExpiredToken" | "TokenRefreshRequired" => Error::invalid_credentials(message),
                "NotFound" if status == StatusCode::NOT_FOUND => not_found(bucket, key, status),
                code => Error::protocol(code, message),
            };
            if let Some(rid) = &eb.request_id {
                debug!("request {rid} failed with {status}: {}", eb.code);
            }
            err.with_code(eb.code)
        }
        None if status == StatusCode::NOT_FOUND => not_found(bucket, key, status),
        None => Error::protocol(
            status_code_name(status),
            format!("request failed with status {status} and no error body"),
        ),
    };

    let mut err = err.with_status(status);
    if let Some(b) = bucket {
        err = err.with_bucket(b);
    }
    if let Some(k) = key {
        err = err.with_key(k);
    }
    err
}

/// A body-less 404 names whatever the call was about.
fn not_found(bucket: Option<&str>, key: Option<&str>, status: StatusCode) -> Error {
    match (bucket, key) {
        (Some(b), Some(k)) => Error::object_not_found(b, k),
        (Some(b), None) => Error::bucket_not_found(b),
        _ => Error::protocol(status_code_name(status), "resource not found"),
    }
}

/// `Not Found` -> `NotFound`, unknown statuses -> `Http599`.
fn status_code_name(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.split_whitespace().collect(),
        None => format!("Http{}", status.as_u16()),
    }
}

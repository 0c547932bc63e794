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

//! Presigned urls.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use bucketwire_core::time::{now, parse_iso8601, DateTime};
use bucketwire_core::{Error, Result, SigningMethod};
use http::{HeaderMap, Method, Uri};
use log::debug;

use crate::codec::Operation;
use crate::constants::*;
use crate::naming::{validate_bucket_name, validate_key};
use crate::Client;

/// A url that grants time-limited access to one operation.
///
/// Holds no secret: only the signature the protocol requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUrl {
    url: String,
    method: Method,
    signed_at: DateTime,
    expires_in: Duration,
}

impl PresignedUrl {
    /// Full url including the signature.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Method the url is valid for.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Time the url was signed at.
    pub fn signed_at(&self) -> DateTime {
        self.signed_at
    }

    /// Lifetime of the url.
    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// First instant at which the url is no longer accepted.
    pub fn expires_at(&self) -> DateTime {
        self.signed_at + chrono::Duration::seconds(self.expires_in.as_secs() as i64)
    }

    /// Whether the url is still valid at `t`.
    ///
    /// Valid strictly before [`PresignedUrl::expires_at`].
    pub fn is_valid_at(&self, t: DateTime) -> bool {
        t < self.expires_at()
    }
}

impl Display for PresignedUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Check the expiry embedded in a presigned url at time `t`.
///
/// Fails with a validation error if the url carries no signature, or if `t`
/// is at or after `X-Amz-Date + X-Amz-Expires`.
pub fn verify_presigned_expiry(url: &str, t: DateTime) -> Result<()> {
    let uri: Uri = url.parse()?;
    let query = uri
        .query()
        .ok_or_else(|| Error::validation("presigned url has no query"))?;

    let (mut date, mut expires, mut signature) = (None, None, None);
    for (k, v) in form_urlencoded::parse(query.as_bytes()) {
        match k.as_ref() {
            X_AMZ_DATE_QUERY => date = Some(v.into_owned()),
            X_AMZ_EXPIRES_QUERY => expires = Some(v.into_owned()),
            X_AMZ_SIGNATURE_QUERY => signature = Some(v.into_owned()),
            _ => {}
        }
    }

    let (Some(date), Some(expires), Some(_)) = (date, expires, signature) else {
        return Err(Error::validation(
            "presigned url must carry X-Amz-Date, X-Amz-Expires and X-Amz-Signature",
        ));
    };
    let signed_at = parse_iso8601(&date)?;
    let expires = expires
        .parse::<u64>()
        .ok()
        .filter(|v| (1..=MAX_PRESIGN_EXPIRES_SECS).contains(v))
        .ok_or_else(|| {
            Error::validation(format!(
                "X-Amz-Expires must be between 1 and {MAX_PRESIGN_EXPIRES_SECS} seconds, got {expires}"
            ))
        })?;

    let expires_at = signed_at + chrono::Duration::seconds(expires as i64);
    if t >= expires_at {
        return Err(Error::validation(format!(
            "presigned url expired at {expires_at}"
        )));
    }
    Ok(())
}

/// Options of [`Client::presign_get_object`].
#[derive(Debug, Clone, Default)]
pub struct PresignOptions {
    /// Lifetime of the url, default to the protocol maximum of 7 days.
    pub expires_in: Option<Duration>,
    /// Override `Content-Type` of the response.
    pub response_content_type: Option<String>,
    /// Override `Content-Disposition` of the response.
    pub response_content_disposition: Option<String>,
    /// Override `Cache-Control` of the response.
    pub response_cache_control: Option<String>,
    /// Override `Content-Language` of the response.
    pub response_content_language: Option<String>,
    /// Override `Content-Encoding` of the response.
    pub response_content_encoding: Option<String>,
    /// Override `Expires` of the response.
    pub response_expires: Option<String>,
    /// Read this version of the object.
    pub version_id: Option<String>,
    /// Extra query parameters to sign.
    pub extra_query: Vec<(String, String)>,
    /// Headers the caller will send and wants signed besides `host`.
    pub signed_headers: HeaderMap,
    /// Sign as if at this time instead of now.
    pub request_date: Option<DateTime>,
}

impl Client {
    /// Presign a `GET` of an object.
    pub async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<PresignedUrl> {
        self.presign_get_object(
            bucket,
            key,
            PresignOptions {
                expires_in: Some(expires_in),
                ..Default::default()
            },
        )
        .await
    }

    /// Presign a `PUT` of an object.
    pub async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<PresignedUrl> {
        validate_bucket_name(bucket)?;
        let key = validate_key(bucket, key)?;
        self.presign(
            Method::PUT,
            bucket,
            key,
            Vec::new(),
            HeaderMap::new(),
            expires_in,
            None,
        )
    }

    /// Presign a `GET` of an object with response overrides.
    pub async fn presign_get_object(
        &self,
        bucket: &str,
        key: &str,
        opts: PresignOptions,
    ) -> Result<PresignedUrl> {
        validate_bucket_name(bucket)?;
        let key = validate_key(bucket, key)?;

        let mut query = Vec::new();
        for (name, value) in [
            ("response-content-type", opts.response_content_type),
            (
                "response-content-disposition",
                opts.response_content_disposition,
            ),
            ("response-cache-control", opts.response_cache_control),
            ("response-content-language", opts.response_content_language),
            ("response-content-encoding", opts.response_content_encoding),
            ("response-expires", opts.response_expires),
            ("versionId", opts.version_id),
        ] {
            if let Some(v) = value {
                query.push((name.to_string(), v));
            }
        }
        query.extend(opts.extra_query);

        self.presign(
            Method::GET,
            bucket,
            key,
            query,
            opts.signed_headers,
            opts.expires_in
                .unwrap_or(Duration::from_secs(MAX_PRESIGN_EXPIRES_SECS)),
            opts.request_date,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn presign(
        &self,
        method: Method,
        bucket: &str,
        key: &str,
        query: Vec<(String, String)>,
        headers: HeaderMap,
        expires_in: Duration,
        request_date: Option<DateTime>,
    ) -> Result<PresignedUrl> {
        let signed_at = request_date.unwrap_or_else(now);

        let mut op = Operation::get_object(bucket, key);
        op.query = query;
        let url = op.url(&self.inner.endpoint);

        let mut req = http::Request::builder()
            .method(method.clone())
            .uri(url)
            .body(())?;
        *req.headers_mut() = headers;
        let (mut parts, _) = req.into_parts();

        self.inner.signer.clone().with_time(signed_at).sign(
            &mut parts,
            &self.inner.credential,
            SigningMethod::Query(expires_in),
        )?;
        debug!("presigned {method} of {bucket}/{key} for {expires_in:?}");

        Ok(PresignedUrl {
            url: parts.uri.to_string(),
            method,
            signed_at,
            expires_in,
        })
    }
}

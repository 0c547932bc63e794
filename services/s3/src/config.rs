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

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use bucketwire_core::utils::Redact;
use bucketwire_core::{Context, Error, Result};
use http::uri::Scheme;
use http::Uri;
use log::warn;

use crate::constants::*;
use crate::Credential;

/// Config for the s3 client.
///
/// Every field is optional; unset fields fall back to the environment
/// through [`Config::from_env`] and then to built-in defaults.
#[derive(Clone, Default)]
pub struct Config {
    /// Base url of the service, for example `http://127.0.0.1:9000`.
    pub endpoint: Option<String>,
    /// Signing region, default to `us-east-1`.
    pub region: Option<String>,
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Session token for temporary credentials.
    pub session_token: Option<String>,
    /// Timeout of a single request/response exchange, default to 30s.
    pub timeout: Option<Duration>,
    /// Verify the server's TLS certificate, default to true.
    pub verify_tls: Option<bool>,
    /// Size of each multipart upload part, default to 8 MiB.
    ///
    /// AWS S3 rejects non-final parts under 5 MiB at completion time. Smaller
    /// values are accepted with a warning for servers that don't enforce the
    /// minimum and for tests.
    pub part_size: Option<usize>,
    /// Streams larger than this (or of unknown length) are uploaded in parts,
    /// default to 64 MiB.
    pub multipart_threshold: Option<u64>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("timeout", &self.timeout)
            .field("verify_tls", &self.verify_tls)
            .field("part_size", &self.part_size)
            .field("multipart_threshold", &self.multipart_threshold)
            .finish()
    }
}

impl Config {
    /// Fill missing fields from the context's environment.
    ///
    /// Explicitly set fields always win. This is the only place env is
    /// consulted; the client never reads it after construction.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.endpoint.is_none() {
            self.endpoint = ctx.env_first(&[BUCKETWIRE_ENDPOINT]);
        }
        if self.region.is_none() {
            self.region = ctx.env_first(&[BUCKETWIRE_REGION, AWS_REGION]);
        }
        // Take keys in pairs so an access key never mixes with another
        // source's secret.
        if self.access_key_id.is_none() && self.secret_access_key.is_none() {
            let pair = |ak: &str, sk: &str| Some((ctx.env_first(&[ak])?, ctx.env_first(&[sk])?));
            if let Some((ak, sk)) = pair(BUCKETWIRE_ACCESS_KEY, BUCKETWIRE_SECRET_KEY) {
                self.access_key_id = Some(ak);
                self.secret_access_key = Some(sk);
            } else if let Some((ak, sk)) = pair(AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY) {
                self.access_key_id = Some(ak);
                self.secret_access_key = Some(sk);
                if self.session_token.is_none() {
                    self.session_token = ctx.env_first(&[AWS_SESSION_TOKEN]);
                }
            }
        }

        self
    }

    /// Validate the config and freeze it.
    pub fn build(self) -> Result<(EndpointConfig, Credential)> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| Error::validation("endpoint is required"))?;
        let uri: Uri = endpoint.trim_end_matches('/').parse().map_err(|e| {
            Error::validation(format!("endpoint {endpoint} is not a valid url")).with_source(e)
        })?;
        let scheme = uri
            .scheme()
            .cloned()
            .ok_or_else(|| Error::validation(format!("endpoint {endpoint} has no scheme")))?;
        if scheme != Scheme::HTTP && scheme != Scheme::HTTPS {
            return Err(Error::validation(format!(
                "endpoint {endpoint} must be http or https"
            )));
        }
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| Error::validation(format!("endpoint {endpoint} has no host")))?;
        let base_path = uri.path().trim_end_matches('/').to_string();

        let (Some(ak), Some(sk)) = (self.access_key_id, self.secret_access_key) else {
            return Err(Error::validation(
                "access key and secret key are required",
            ));
        };
        let credential = Credential {
            access_key_id: ak,
            secret_access_key: sk,
            session_token: self.session_token,
        };
        if credential.access_key_id.is_empty() || credential.secret_access_key.is_empty() {
            return Err(Error::validation(
                "access key and secret key must not be empty",
            ));
        }

        let part_size = self.part_size.unwrap_or(DEFAULT_PART_SIZE);
        if part_size == 0 {
            return Err(Error::validation("part size must be greater than zero"));
        }
        if part_size < MIN_PART_SIZE {
            warn!(
                "part size {part_size} is below the {MIN_PART_SIZE} bytes S3 requires for \
                 non-final parts, multipart uploads will fail with EntityTooSmall on servers \
                 that enforce it"
            );
        }

        Ok((
            EndpointConfig {
                scheme,
                authority,
                base_path,
                region: self.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
                timeout: self
                    .timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
                verify_tls: self.verify_tls.unwrap_or(true),
                part_size,
                multipart_threshold: self
                    .multipart_threshold
                    .unwrap_or(DEFAULT_MULTIPART_THRESHOLD),
            },
            credential,
        ))
    }
}

/// Resolved, immutable endpoint configuration.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub(crate) scheme: Scheme,
    pub(crate) authority: http::uri::Authority,
    pub(crate) base_path: String,
    pub(crate) region: String,
    pub(crate) timeout: Duration,
    pub(crate) verify_tls: bool,
    pub(crate) part_size: usize,
    pub(crate) multipart_threshold: u64,
}

impl EndpointConfig {
    /// Base url, without trailing slash.
    pub fn endpoint(&self) -> String {
        format!("{}://{}{}", self.scheme, self.authority, self.base_path)
    }

    /// Signing region.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Timeout of a single exchange.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the transport should verify TLS certificates.
    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    /// Size of each multipart part.
    pub fn part_size(&self) -> usize {
        self.part_size
    }

    /// Size above which streams are uploaded in parts.
    pub fn multipart_threshold(&self) -> u64 {
        self.multipart_threshold
    }
}

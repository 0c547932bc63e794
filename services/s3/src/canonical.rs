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

//! Canonical request construction.
//!
//! - [Create a canonical request](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html#create-canonical-request)

use std::fmt::{self, Display, Formatter};

use bucketwire_core::{Error, Result};
use http::header;
use http::HeaderMap;
use http::Method;
use percent_encoding::{percent_decode_str, utf8_percent_encode};

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET};

/// CanonicalRequest is the deterministic form of a request that gets signed.
///
/// Building one is a pure function of its inputs: parameter order and header
/// casing never change the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Canonicalize a request.
    ///
    /// - `path` is the raw (possibly percent encoded) request path.
    /// - `query` holds percent decoded pairs in any order.
    /// - every header in `headers` is signed; `host` must be present.
    pub fn new(
        method: &Method,
        path: &str,
        query: &[(String, String)],
        headers: &HeaderMap,
        payload_hash: &str,
    ) -> Result<Self> {
        if !headers.contains_key(header::HOST) {
            return Err(Error::validation(
                "host header is required to build a canonical request",
            ));
        }

        let path = {
            let decoded = percent_decode_str(path).decode_utf8().map_err(|e| {
                Error::validation("request path is not valid utf-8").with_source(e)
            })?;
            let encoded = utf8_percent_encode(&decoded, &AWS_URI_ENCODE_SET).to_string();
            if encoded.is_empty() {
                "/".to_string()
            } else {
                encoded
            }
        };

        let mut query: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| {
                (
                    utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                    utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
                )
            })
            .collect();
        query.sort();

        let mut names: Vec<&str> = headers.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        let mut canonical_headers = Vec::with_capacity(names.len());
        for name in names {
            let mut values = Vec::new();
            for value in headers.get_all(name) {
                let value = value.to_str().map_err(|e| {
                    Error::validation(format!("header {name} is not visible ascii")).with_source(e)
                })?;
                values.push(normalize_value(value));
            }
            // HeaderName is always lowercase already.
            canonical_headers.push((name.to_string(), values.join(",")));
        }

        Ok(Self {
            method: method.clone(),
            path,
            query,
            headers: canonical_headers,
            payload_hash: payload_hash.to_string(),
        })
    }

    /// Percent encoded path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Percent encoded query pairs, sorted by key then value.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Canonical query string: `a=1&b=2`.
    pub fn query_string(&self) -> String {
        let mut s = String::new();
        for (i, (k, v)) in self.query.iter().enumerate() {
            if i > 0 {
                s.push('&');
            }
            s.push_str(k);
            s.push('=');
            s.push_str(v);
        }
        s
    }

    /// Signed header names joined by `;`.
    pub fn signed_headers(&self) -> String {
        self.headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Hash of the payload that will be transmitted.
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.path)?;
        writeln!(f, "{}", self.query_string())?;
        for (k, v) in &self.headers {
            writeln!(f, "{k}:{v}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers())?;
        f.write_str(&self.payload_hash)
    }
}

/// Trim the value and collapse inner runs of whitespace into one space.
fn normalize_value(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    for (i, part) in v.split_ascii_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

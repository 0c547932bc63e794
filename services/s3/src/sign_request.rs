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

use std::time::Duration;

use async_trait::async_trait;
use bucketwire_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use bucketwire_core::time::{format_date, format_iso8601, now, DateTime};
use bucketwire_core::{
    Context, Error, Result, SignRequest, SigningCredential, SigningMethod, SigningRequest,
};
use http::request::Parts;
use http::{header, HeaderValue};
use log::debug;

use crate::canonical::CanonicalRequest;
use crate::constants::*;
use crate::Credential;

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Signing region.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Time used for the next signature.
    pub(crate) fn signing_time(&self) -> DateTime {
        self.time.unwrap_or_else(now)
    }

    /// Sign the request in place.
    ///
    /// With [`SigningMethod::Header`] an `Authorization` header is added;
    /// with [`SigningMethod::Query`] the signature travels in the query and
    /// stays valid for the given duration.
    pub fn sign(&self, req: &mut Parts, cred: &Credential, method: SigningMethod) -> Result<()> {
        if !cred.is_valid() {
            return Err(Error::validation(
                "access key and secret key are required for signing",
            ));
        }
        if let SigningMethod::Query(expire) = method {
            let secs = expire.as_secs();
            if secs == 0 || secs > MAX_PRESIGN_EXPIRES_SECS {
                return Err(Error::validation(format!(
                    "presign expiry must be between 1 and {MAX_PRESIGN_EXPIRES_SECS} seconds, got {secs}"
                )));
            }
        }

        let now = self.signing_time();
        let mut signed_req = SigningRequest::build(req)?;

        // canonicalize context
        canonicalize_header(&mut signed_req, cred, method, now)?;
        let scope = format!(
            "{}/{}/{}/aws4_request",
            format_date(now),
            self.region,
            self.service
        );
        if let SigningMethod::Query(expire) = method {
            signed_req.query_push(X_AMZ_ALGORITHM_QUERY, SIGNING_ALGORITHM);
            signed_req.query_push(
                X_AMZ_CREDENTIAL_QUERY,
                format!("{}/{}", cred.access_key_id, scope),
            );
            signed_req.query_push(X_AMZ_DATE_QUERY, format_iso8601(now));
            signed_req.query_push(X_AMZ_EXPIRES_QUERY, expire.as_secs().to_string());
            let signed_headers = signed_req.header_name_to_vec_sorted().join(";");
            signed_req.query_push(X_AMZ_SIGNED_HEADERS_QUERY, signed_headers);
            if let Some(token) = &cred.session_token {
                signed_req.query_push(X_AMZ_SECURITY_TOKEN_QUERY, token.as_str());
            }
        }

        let payload_hash = match signed_req.headers.get(X_AMZ_CONTENT_SHA_256) {
            Some(v) => v.to_str()?.to_string(),
            None => UNSIGNED_PAYLOAD.to_string(),
        };

        // build canonical request and string to sign.
        let creq = CanonicalRequest::new(
            &signed_req.method,
            &signed_req.path,
            &signed_req.query,
            &signed_req.headers,
            &payload_hash,
        )?;
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = format!(
            "{SIGNING_ALGORITHM}\n{}\n{scope}\n{}",
            format_iso8601(now),
            hex_sha256(creq.to_string().as_bytes())
        );
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        signed_req.query = creq.query().to_vec();
        match method {
            SigningMethod::Query(_) => {
                signed_req
                    .query
                    .push((X_AMZ_SIGNATURE_QUERY.to_string(), signature));
            }
            SigningMethod::Header => {
                let mut authorization = HeaderValue::from_str(&format!(
                    "{SIGNING_ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
                    cred.access_key_id,
                    scope,
                    creq.signed_headers(),
                    signature
                ))?;
                authorization.set_sensitive(true);

                signed_req
                    .headers
                    .insert(header::AUTHORIZATION, authorization);
            }
        }

        // Apply to the request.
        signed_req.apply(req)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::validation("credential is required for signing"));
        };
        let method = match expires_in {
            Some(d) => SigningMethod::Query(d),
            None => SigningMethod::Header,
        };
        self.sign(req, cred, method)
    }
}

fn canonicalize_header(
    req: &mut SigningRequest,
    cred: &Credential,
    method: SigningMethod,
    now: DateTime,
) -> Result<()> {
    for (_, value) in req.headers.iter_mut() {
        SigningRequest::header_value_normalize(value)?;
    }

    // Insert HOST header if not present.
    if req.headers.get(header::HOST).is_none() {
        req.headers
            .insert(header::HOST, req.authority.as_str().parse()?);
    }

    if method == SigningMethod::Header {
        if req.headers.get(X_AMZ_DATE).is_none() {
            req.headers
                .insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(now))?);
        }

        if req.headers.get(X_AMZ_CONTENT_SHA_256).is_none() {
            req.headers.insert(
                X_AMZ_CONTENT_SHA_256,
                HeaderValue::from_static(UNSIGNED_PAYLOAD),
            );
        }

        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token)?;
            value.set_sensitive(true);

            req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }
    }

    Ok(())
}

/// Derive the SigV4 signing key for one day, region and service.
pub(crate) fn generate_signing_key(
    secret: &str,
    time: DateTime,
    region: &str,
    service: &str,
) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}

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

//! Request shapes and response decoding for every operation.

use std::collections::HashMap;

use bucketwire_core::hash::{hex_sha256, EMPTY_STRING_SHA256};
use bucketwire_core::time::{parse_rfc2822, parse_rfc3339};
use bucketwire_core::utils::trim_etag;
use bucketwire_core::{Body, Error, Result};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use percent_encoding::utf8_percent_encode;
use quick_xml::{de, se};
use serde::{Deserialize, Serialize};

use crate::config::EndpointConfig;
use crate::constants::*;
use crate::types::*;

/// An unsigned request for one operation.
#[derive(Debug)]
pub(crate) struct Operation {
    pub method: Method,
    pub bucket: Option<String>,
    pub key: Option<String>,
    /// Query pairs, not encoded.
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Body,
    /// Hex SHA256 of the body, `None` to send `UNSIGNED-PAYLOAD`.
    pub payload_sha256: Option<String>,
}

impl Operation {
    fn new(method: Method, bucket: Option<&str>, key: Option<&str>) -> Self {
        Self {
            method,
            bucket: bucket.map(|v| v.to_string()),
            key: key.map(|v| v.to_string()),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Body::Empty,
            payload_sha256: Some(EMPTY_STRING_SHA256.to_string()),
        }
    }

    fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    fn with_bytes(mut self, content: Bytes) -> Self {
        self.payload_sha256 = Some(hex_sha256(&content));
        self.body = content.into();
        self
    }

    pub fn list_buckets() -> Self {
        Self::new(Method::GET, None, None)
    }

    pub fn create_bucket(bucket: &str, region: &str) -> Result<Self> {
        let op = Self::new(Method::PUT, Some(bucket), None);
        if region == DEFAULT_REGION {
            return Ok(op);
        }
        Ok(op.with_bytes(Bytes::from(encode_create_bucket(region)?)))
    }

    pub fn delete_bucket(bucket: &str) -> Self {
        Self::new(Method::DELETE, Some(bucket), None)
    }

    pub fn head_bucket(bucket: &str) -> Self {
        Self::new(Method::HEAD, Some(bucket), None)
    }

    /// Put with a fully buffered body.
    pub fn put_object(bucket: &str, key: &str, content: Bytes, opts: &PutOptions) -> Result<Self> {
        let mut op = Self::new(Method::PUT, Some(bucket), Some(key)).with_bytes(content);
        op.apply_put_options(key, opts)?;
        Ok(op)
    }

    /// Put with a streamed body of exactly `len` bytes.
    pub fn put_object_stream(
        bucket: &str,
        key: &str,
        body: Body,
        len: u64,
        opts: &PutOptions,
    ) -> Result<Self> {
        let mut op = Self::new(Method::PUT, Some(bucket), Some(key));
        op.body = body;
        op.payload_sha256 = opts.content_sha256.clone();
        op.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        op.apply_put_options(key, opts)?;
        Ok(op)
    }

    fn apply_put_options(&mut self, key: &str, opts: &PutOptions) -> Result<()> {
        let content_type = match &opts.content_type {
            Some(v) => v.clone(),
            None => guess_content_type(key),
        };
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
        for (k, v) in &opts.metadata {
            let name = HeaderName::from_bytes(format!("{X_AMZ_META_PREFIX}{k}").as_bytes())
                .map_err(|e| {
                    Error::validation(format!("metadata key '{k}' is not a valid header name"))
                        .with_source(e)
                })?;
            let value = HeaderValue::from_str(v).map_err(|e| {
                Error::validation(format!("metadata value of '{k}' is not visible ascii"))
                    .with_source(e)
            })?;
            self.headers.insert(name, value);
        }
        Ok(())
    }

    pub fn get_object(bucket: &str, key: &str) -> Self {
        Self::new(Method::GET, Some(bucket), Some(key))
    }

    pub fn head_object(bucket: &str, key: &str) -> Self {
        Self::new(Method::HEAD, Some(bucket), Some(key))
    }

    pub fn delete_object(bucket: &str, key: &str) -> Self {
        Self::new(Method::DELETE, Some(bucket), Some(key))
    }

    pub fn copy_object(
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<Self> {
        let mut op = Self::new(Method::PUT, Some(dst_bucket), Some(dst_key));
        op.headers.insert(
            X_AMZ_COPY_SOURCE,
            HeaderValue::from_str(&encode_copy_source(src_bucket, src_key))?,
        );
        Ok(op)
    }

    pub fn list_objects(
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        max_keys: Option<u32>,
        continuation_token: Option<&str>,
    ) -> Self {
        let mut op = Self::new(Method::GET, Some(bucket), None).with_query("list-type", "2");
        if let Some(v) = prefix {
            op = op.with_query("prefix", v);
        }
        if let Some(v) = delimiter {
            op = op.with_query("delimiter", v);
        }
        if let Some(v) = max_keys {
            op = op.with_query("max-keys", v.to_string());
        }
        if let Some(v) = continuation_token {
            op = op.with_query("continuation-token", v);
        }
        op
    }

    pub fn create_multipart_upload(bucket: &str, key: &str, opts: &PutOptions) -> Result<Self> {
        let mut op = Self::new(Method::POST, Some(bucket), Some(key)).with_query("uploads", "");
        op.apply_put_options(key, opts)?;
        Ok(op)
    }

    pub fn upload_part(upload: &MultipartUpload, part_number: u32, content: Bytes) -> Self {
        Self::new(Method::PUT, Some(&upload.bucket), Some(&upload.key))
            .with_query("partNumber", part_number.to_string())
            .with_query("uploadId", upload.upload_id.as_str())
            .with_bytes(content)
    }

    pub fn complete_multipart_upload(
        upload: &MultipartUpload,
        parts: &[CompletedPart],
    ) -> Result<Self> {
        Ok(
            Self::new(Method::POST, Some(&upload.bucket), Some(&upload.key))
                .with_query("uploadId", upload.upload_id.as_str())
                .with_bytes(Bytes::from(encode_complete_multipart(parts)?)),
        )
    }

    pub fn abort_multipart_upload(upload: &MultipartUpload) -> Self {
        Self::new(Method::DELETE, Some(&upload.bucket), Some(&upload.key))
            .with_query("uploadId", upload.upload_id.as_str())
    }

    /// Path-style url of this operation, query included.
    pub fn url(&self, endpoint: &EndpointConfig) -> String {
        let mut url = format!(
            "{}://{}{}/",
            endpoint.scheme, endpoint.authority, endpoint.base_path
        );
        if let Some(bucket) = &self.bucket {
            url.push_str(bucket);
            if let Some(key) = &self.key {
                url.push('/');
                url.extend(utf8_percent_encode(key, &AWS_URI_ENCODE_SET));
            }
        }
        for (i, (k, v)) in self.query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.extend(utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET));
            if !v.is_empty() {
                url.push('=');
                url.extend(utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET));
            }
        }
        url
    }

    /// Turn into an unsigned http request against `endpoint`.
    pub fn into_request(self, endpoint: &EndpointConfig) -> Result<http::Request<Body>> {
        let url = self.url(endpoint);
        let mut headers = self.headers;
        headers.insert(
            X_AMZ_CONTENT_SHA_256,
            HeaderValue::from_str(self.payload_sha256.as_deref().unwrap_or(UNSIGNED_PAYLOAD))?,
        );
        if !headers.contains_key(CONTENT_LENGTH) {
            if let (Some(len), true) = (
                self.body.known_len(),
                self.method == Method::PUT || self.method == Method::POST,
            ) {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
            }
        }

        let mut req = http::Request::builder()
            .method(self.method)
            .uri(url)
            .body(self.body)?;
        *req.headers_mut() = headers;
        Ok(req)
    }
}

/// Guess content type from the key's extension.
pub(crate) fn guess_content_type(key: &str) -> String {
    mime_guess::from_path(key)
        .first_raw()
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// `/{bucket}/{key}` with every `/` inside the key encoded.
pub(crate) fn encode_copy_source(bucket: &str, key: &str) -> String {
    format!(
        "/{bucket}/{}",
        utf8_percent_encode(key, &AWS_QUERY_ENCODE_SET)
    )
}

#[derive(Serialize)]
#[serde(rename = "CreateBucketConfiguration", rename_all = "PascalCase")]
struct CreateBucketConfiguration<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'a str,
    location_constraint: &'a str,
}

pub(crate) fn encode_create_bucket(region: &str) -> Result<String> {
    se::to_string(&CreateBucketConfiguration {
        xmlns: S3_XML_NAMESPACE,
        location_constraint: region,
    })
    .map_err(|e| Error::unexpected("failed to encode CreateBucketConfiguration").with_source(e))
}

#[derive(Serialize)]
#[serde(rename = "CompleteMultipartUpload")]
struct CompleteMultipartUploadXml<'a> {
    #[serde(rename = "Part")]
    parts: Vec<PartXml<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PartXml<'a> {
    part_number: u32,
    #[serde(rename = "ETag")]
    etag: &'a str,
}

pub(crate) fn encode_complete_multipart(parts: &[CompletedPart]) -> Result<String> {
    se::to_string(&CompleteMultipartUploadXml {
        parts: parts
            .iter()
            .map(|p| PartXml {
                part_number: p.part_number,
                etag: &p.etag,
            })
            .collect(),
    })
    .map_err(|e| Error::unexpected("failed to encode CompleteMultipartUpload").with_source(e))
}

fn decode<T: for<'de> Deserialize<'de>>(body: &[u8], what: &str) -> Result<T> {
    let text = std::str::from_utf8(body).map_err(|e| {
        Error::protocol("MalformedResponse", format!("{what} response is not utf-8"))
            .with_source(e)
    })?;
    de::from_str(text).map_err(|e| {
        Error::protocol(
            "MalformedResponse",
            format!("failed to parse {what} response of {} bytes", body.len()),
        )
        .with_source(e)
    })
}

/// Empty elements such as `<Prefix></Prefix>` mean "not set".
fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|v| !v.is_empty())
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ListAllMyBucketsResult {
    owner: Option<OwnerXml>,
    buckets: BucketsXml,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct OwnerXml {
    #[serde(rename = "ID")]
    id: String,
    display_name: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BucketsXml {
    bucket: Vec<BucketXml>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BucketXml {
    name: String,
    creation_date: String,
}

pub(crate) fn decode_list_buckets(body: &[u8]) -> Result<ListBucketsOutput> {
    let result: ListAllMyBucketsResult = decode(body, "ListBuckets")?;
    Ok(ListBucketsOutput {
        buckets: result
            .buckets
            .bucket
            .into_iter()
            .map(|b| BucketInfo {
                creation_date: parse_rfc3339(&b.creation_date).ok(),
                name: b.name,
            })
            .collect(),
        owner: result.owner.map(|o| Owner {
            id: o.id,
            display_name: non_empty(o.display_name),
        }),
    })
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ListBucketResult {
    prefix: Option<String>,
    delimiter: Option<String>,
    max_keys: Option<u32>,
    key_count: Option<u32>,
    is_truncated: bool,
    next_continuation_token: Option<String>,
    contents: Vec<ContentsXml>,
    common_prefixes: Vec<CommonPrefixXml>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ContentsXml {
    key: String,
    last_modified: String,
    #[serde(rename = "ETag")]
    etag: String,
    size: u64,
    storage_class: Option<String>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct CommonPrefixXml {
    prefix: String,
}

/// Decode a `ListObjectsV2` page.
///
/// The continuation token is bound to the arguments of the request that
/// produced it, not to what the server echoes back.
pub(crate) fn decode_list_objects(
    bucket: &str,
    prefix: Option<&str>,
    delimiter: Option<&str>,
    body: &[u8],
) -> Result<ListObjectsPage> {
    let result: ListBucketResult = decode(body, "ListObjectsV2")?;

    let next = match (result.is_truncated, non_empty(result.next_continuation_token)) {
        (true, Some(token)) => Some(ContinuationToken::new(token, bucket, prefix, delimiter)),
        _ => None,
    };

    Ok(ListObjectsPage {
        bucket: bucket.to_string(),
        objects: result
            .contents
            .into_iter()
            .map(|c| ObjectEntry {
                etag: trim_etag(&c.etag).to_string(),
                last_modified: parse_rfc3339(&c.last_modified).ok(),
                key: c.key,
                size: c.size,
                storage_class: non_empty(c.storage_class),
            })
            .collect(),
        common_prefixes: result
            .common_prefixes
            .into_iter()
            .map(|p| p.prefix)
            .collect(),
        is_truncated: result.is_truncated,
        next,
        prefix: non_empty(result.prefix),
        delimiter: non_empty(result.delimiter),
        max_keys: result.max_keys,
        key_count: result.key_count,
    })
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct CopyObjectResult {
    #[serde(rename = "ETag")]
    etag: String,
    last_modified: String,
}

pub(crate) fn decode_copy_object(body: &[u8]) -> Result<CopyObjectOutput> {
    let result: CopyObjectResult = decode(body, "CopyObject")?;
    Ok(CopyObjectOutput {
        etag: trim_etag(&result.etag).to_string(),
        last_modified: parse_rfc3339(&result.last_modified).ok(),
    })
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct InitiateMultipartUploadResult {
    upload_id: String,
}

pub(crate) fn decode_initiate_multipart(
    bucket: &str,
    key: &str,
    body: &[u8],
) -> Result<MultipartUpload> {
    let result: InitiateMultipartUploadResult = decode(body, "CreateMultipartUpload")?;
    if result.upload_id.is_empty() {
        return Err(Error::protocol(
            "MalformedResponse",
            "CreateMultipartUpload response has no UploadId",
        )
        .with_bucket(bucket)
        .with_key(key));
    }
    Ok(MultipartUpload {
        bucket: bucket.to_string(),
        key: key.to_string(),
        upload_id: result.upload_id,
    })
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct CompleteMultipartUploadResult {
    #[serde(rename = "ETag")]
    etag: String,
}

pub(crate) fn decode_complete_multipart(
    body: &[u8],
    headers: &HeaderMap,
) -> Result<CompleteMultipartOutput> {
    let result: CompleteMultipartUploadResult = decode(body, "CompleteMultipartUpload")?;
    Ok(CompleteMultipartOutput {
        etag: trim_etag(&result.etag).to_string(),
        version_id: header_string(headers, X_AMZ_VERSION_ID),
    })
}

fn header_string(headers: &HeaderMap, name: impl http::header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// ETag header of a response, quotes trimmed.
pub(crate) fn decode_etag(headers: &HeaderMap) -> String {
    header_string(headers, ETAG)
        .map(|v| trim_etag(&v).to_string())
        .unwrap_or_default()
}

/// Read object metadata from `HEAD`/`GET` response headers.
pub(crate) fn decode_object_info(key: &str, headers: &HeaderMap) -> ObjectInfo {
    let mut metadata = HashMap::new();
    for (name, value) in headers {
        if let Some(meta_key) = name.as_str().strip_prefix(X_AMZ_META_PREFIX) {
            if let Ok(v) = value.to_str() {
                metadata.insert(meta_key.to_string(), v.to_string());
            }
        }
    }

    ObjectInfo {
        key: key.to_string(),
        size: header_string(headers, CONTENT_LENGTH)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default(),
        etag: decode_etag(headers),
        content_type: header_string(headers, CONTENT_TYPE),
        last_modified: header_string(headers, LAST_MODIFIED).and_then(|v| parse_rfc2822(&v).ok()),
        metadata,
        version_id: header_string(headers, X_AMZ_VERSION_ID),
    }
}

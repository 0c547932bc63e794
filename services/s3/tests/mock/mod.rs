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

//! In-memory S3 speaking just enough of the protocol for the client.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bucketwire_core::hash::hex_md5;
use bucketwire_core::time::{format_http_date, format_rfc3339, now, DateTime};
use bucketwire_core::{Body, Error, HttpSend, Result};
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use http::{HeaderMap, Method, Response, StatusCode};
use log::debug;
use percent_encoding::percent_decode_str;
use serde::Deserialize;

pub const ACCESS_KEY: &str = "mock-access-key";
pub const SECRET_KEY: &str = "mock-secret-key";

/// Chunk size the mock streams large objects with.
pub const MOCK_CHUNK: usize = 256 * 1024;

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub bucket: String,
    pub key: Option<String>,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body_len: usize,
}

impl Recorded {
    pub fn has_query(&self, name: &str) -> bool {
        self.query.iter().any(|(k, _)| k == name)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What goes wrong when a rule fires.
#[derive(Debug, Clone)]
pub enum Fault {
    /// No response at all.
    Disconnect,
    /// A structured error body with this status and code.
    Error(u16, &'static str),
    /// A verbatim response.
    Reply(u16, String),
    /// Flip the first byte of the received body before storing it.
    CorruptUpload,
    /// Announce the full length but send only half of the object.
    TruncateDownload,
    /// Reply with this status and drop the connection inside the body.
    BrokenErrorBody(u16),
}

/// Which request a fault applies to.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    method: Option<Method>,
    query: Option<String>,
    skip: usize,
}

impl Rule {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn method(method: Method) -> Self {
        Self {
            method: Some(method),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, name: &str) -> Self {
        self.query = Some(name.to_string());
        self
    }

    /// Let the first `n` matching requests through.
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    fn matches(&self, req: &Recorded) -> bool {
        self.method.as_ref().map_or(true, |m| *m == req.method)
            && self.query.as_deref().map_or(true, |q| req.has_query(q))
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Bytes(Bytes),
    Repeat { byte: u8, len: u64 },
}

impl Payload {
    fn len(&self) -> u64 {
        match self {
            Payload::Bytes(bs) => bs.len() as u64,
            Payload::Repeat { len, .. } => *len,
        }
    }

    fn into_body(self, truncate: bool) -> Body {
        let len = if truncate { self.len() / 2 } else { self.len() };
        match self {
            Payload::Bytes(bs) => bs.slice(..len as usize).into(),
            Payload::Repeat { byte, .. } => {
                let block = Bytes::from(vec![byte; MOCK_CHUNK]);
                Body::from_stream(futures::stream::unfold(len, move |remaining| {
                    let block = block.clone();
                    async move {
                        if remaining == 0 {
                            return None;
                        }
                        let n = remaining.min(MOCK_CHUNK as u64) as usize;
                        Some((Ok::<_, Error>(block.slice(..n)), remaining - n as u64))
                    }
                }))
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Object {
    payload: Payload,
    etag: String,
    content_type: String,
    metadata: Vec<(String, String)>,
    last_modified: DateTime,
}

#[derive(Debug)]
struct Bucket {
    created: DateTime,
    objects: BTreeMap<String, Object>,
}

#[derive(Debug)]
struct Upload {
    bucket: String,
    key: String,
    content_type: String,
    metadata: Vec<(String, String)>,
    parts: BTreeMap<u32, (String, Bytes)>,
}

#[derive(Debug, Default)]
struct State {
    buckets: BTreeMap<String, Bucket>,
    uploads: HashMap<String, Upload>,
    upload_seq: u64,
    aborted: usize,
    requests: Vec<Recorded>,
    faults: Vec<(Rule, Fault)>,
}

/// In-memory S3 service usable as an [`HttpSend`].
#[derive(Debug, Clone, Default)]
pub struct MockS3 {
    state: Arc<Mutex<State>>,
}

impl MockS3 {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.state().buckets.insert(
            bucket.to_string(),
            Bucket {
                created: now(),
                objects: BTreeMap::new(),
            },
        );
    }

    pub fn insert_object(&self, bucket: &str, key: &str, content: impl Into<Bytes>) {
        let content = content.into();
        let object = Object {
            etag: hex_md5(&content),
            payload: Payload::Bytes(content),
            content_type: "application/octet-stream".to_string(),
            metadata: Vec::new(),
            last_modified: now(),
        };
        self.insert(bucket, key, object);
    }

    /// An object of `len` copies of `byte`, never materialized.
    pub fn insert_synthetic(&self, bucket: &str, key: &str, byte: u8, len: u64) {
        let object = Object {
            etag: format!("{len:032x}"),
            payload: Payload::Repeat { byte, len },
            content_type: "application/octet-stream".to_string(),
            metadata: Vec::new(),
            last_modified: now(),
        };
        self.insert(bucket, key, object);
    }

    fn insert(&self, bucket: &str, key: &str, object: Object) {
        self.state()
            .buckets
            .get_mut(bucket)
            .expect("bucket must exist")
            .objects
            .insert(key.to_string(), object);
    }

    /// Stored bytes of an in-memory object.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        let state = self.state();
        match &state.buckets.get(bucket)?.objects.get(key)?.payload {
            Payload::Bytes(bs) => Some(bs.clone()),
            Payload::Repeat { .. } => None,
        }
    }

    pub fn inject(&self, rule: Rule, fault: Fault) {
        self.state().faults.push((rule, fault));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state().requests.clone()
    }

    pub fn list_requests(&self) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.has_query("list-type"))
            .count()
    }

    pub fn open_uploads(&self) -> usize {
        self.state().uploads.len()
    }

    pub fn aborted_uploads(&self) -> usize {
        self.state().aborted
    }

    fn take_fault(&self, req: &Recorded) -> Option<Fault> {
        let mut state = self.state();
        let idx = state.faults.iter().position(|(rule, _)| rule.matches(req))?;
        if state.faults[idx].0.skip > 0 {
            state.faults[idx].0.skip -= 1;
            return None;
        }
        Some(state.faults.remove(idx).1)
    }
}

#[async_trait]
impl HttpSend for MockS3 {
    async fn http_send(&self, req: http::Request<Body>) -> Result<Response<Body>> {
        let (parts, body) = req.into_parts();
        // Always drain the body, streamed uploads finish only once consumed.
        let mut content = body.collect().await?;

        let path = percent_decode_str(parts.uri.path().trim_start_matches('/'))
            .decode_utf8_lossy()
            .into_owned();
        let (bucket, key) = match path.split_once('/') {
            Some((b, k)) if !k.is_empty() => (b.to_string(), Some(k.to_string())),
            Some((b, _)) => (b.to_string(), None),
            None => (path.clone(), None),
        };
        let query = parts
            .uri
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        let recorded = Recorded {
            method: parts.method.clone(),
            bucket,
            key,
            query,
            headers: parts.headers.clone(),
            body_len: content.len(),
        };
        debug!("mock s3 got {} {}", parts.method, parts.uri);
        self.state().requests.push(recorded.clone());

        let mut truncate = false;
        match self.take_fault(&recorded) {
            Some(Fault::Disconnect) => return Err(Error::connection("connection reset by peer")),
            Some(Fault::Error(status, code)) => return error(&recorded, status, code),
            Some(Fault::Reply(status, body)) => {
                return Ok(Response::builder()
                    .status(status)
                    .header(CONTENT_TYPE, "application/xml")
                    .body(body.into())?)
            }
            Some(Fault::CorruptUpload) => {
                let mut corrupted = content.to_vec();
                if let Some(b) = corrupted.first_mut() {
                    *b ^= 0xff;
                }
                content = corrupted.into();
            }
            Some(Fault::TruncateDownload) => truncate = true,
            Some(Fault::BrokenErrorBody(status)) => {
                let chunks: Vec<Result<Bytes>> = vec![
                    Ok(Bytes::from_static(b"<Error><Co")),
                    Err(Error::connection("connection reset by peer")),
                ];
                return Ok(Response::builder()
                    .status(status)
                    .header(CONTENT_TYPE, "application/xml")
                    .body(Body::from_stream(futures::stream::iter(chunks)))?);
            }
            None => {}
        }

        let authorized = recorded
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains(&format!("Credential={ACCESS_KEY}/")));
        if !authorized {
            return error(&recorded, 403, "InvalidAccessKeyId");
        }

        let mut state = self.state();
        state.route(&recorded, content, truncate)
    }
}

impl State {
    fn route(&mut self, req: &Recorded, content: Bytes, truncate: bool) -> Result<Response<Body>> {
        let m = &req.method;
        match (&req.key, m) {
            (None, _) if req.bucket.is_empty() && *m == Method::GET => self.list_buckets(),
            (None, &Method::PUT) => self.put_bucket(req),
            (None, &Method::DELETE) => self.delete_bucket(req),
            (None, &Method::HEAD) => match self.buckets.contains_key(&req.bucket) {
                true => empty(200),
                false => empty(404),
            },
            (None, &Method::GET) if req.query("list-type") == Some("2") => self.list_objects(req),
            (Some(_), &Method::POST) if req.has_query("uploads") => self.initiate(req),
            (Some(_), &Method::PUT) if req.has_query("partNumber") => self.upload_part(req, content),
            (Some(_), &Method::POST) if req.has_query("uploadId") => self.complete(req, &content),
            (Some(_), &Method::DELETE) if req.has_query("uploadId") => self.abort(req),
            (Some(_), &Method::PUT) if req.headers.contains_key("x-amz-copy-source") => {
                self.copy(req)
            }
            (Some(key), &Method::PUT) => self.put_object(req, key, content),
            (Some(key), &Method::GET) => self.get_object(req, key, truncate, true),
            (Some(key), &Method::HEAD) => self.get_object(req, key, false, false),
            (Some(key), &Method::DELETE) => {
                if let Some(bucket) = self.buckets.get_mut(&req.bucket) {
                    bucket.objects.remove(key);
                    empty(204)
                } else {
                    error(req, 404, "NoSuchBucket")
                }
            }
            _ => error(req, 405, "MethodNotAllowed"),
        }
    }

    fn list_buckets(&self) -> Result<Response<Body>> {
        let mut xml = String::from(
            "<ListAllMyBucketsResult><Owner><ID>mock-owner</ID><DisplayName>mock</DisplayName></Owner><Buckets>",
        );
        for (name, bucket) in &self.buckets {
            xml.push_str(&format!(
                "<Bucket><Name>{name}</Name><CreationDate>{}</CreationDate></Bucket>",
                format_rfc3339(bucket.created)
            ));
        }
        xml.push_str("</Buckets></ListAllMyBucketsResult>");
        xml_ok(xml)
    }

    fn put_bucket(&mut self, req: &Recorded) -> Result<Response<Body>> {
        if self.buckets.contains_key(&req.bucket) {
            return error(req, 409, "BucketAlreadyOwnedByYou");
        }
        self.buckets.insert(
            req.bucket.clone(),
            Bucket {
                created: now(),
                objects: BTreeMap::new(),
            },
        );
        empty(200)
    }

    fn delete_bucket(&mut self, req: &Recorded) -> Result<Response<Body>> {
        match self.buckets.get(&req.bucket) {
            None => error(req, 404, "NoSuchBucket"),
            Some(b) if !b.objects.is_empty() => error(req, 409, "BucketNotEmpty"),
            Some(_) => {
                self.buckets.remove(&req.bucket);
                empty(204)
            }
        }
    }

    /// ListObjectsV2. Tokens are `k:{last key}` or `p:{last common prefix}`.
    fn list_objects(&self, req: &Recorded) -> Result<Response<Body>> {
        let Some(bucket) = self.buckets.get(&req.bucket) else {
            return error(req, 404, "NoSuchBucket");
        };
        let prefix = req.query("prefix").unwrap_or("");
        let delimiter = req.query("delimiter").filter(|d| !d.is_empty());
        let max_keys: usize = req
            .query("max-keys")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);
        let marker = req.query("continuation-token");

        let mut contents = String::new();
        let mut prefixes = String::new();
        let mut last_prefix: Option<String> = None;
        let mut last_token: Option<String> = None;
        let mut count = 0;
        let mut next = None;
        for (key, object) in bucket.objects.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            let skipped = match marker.and_then(|m| m.split_at_checked(2)) {
                Some(("k:", last)) => key.as_str() <= last,
                Some(("p:", last)) => key.as_str() <= last || key.starts_with(last),
                _ => false,
            };
            if skipped {
                continue;
            }

            let common = delimiter.and_then(|d| {
                key[prefix.len()..]
                    .find(d)
                    .map(|idx| key[..prefix.len() + idx + d.len()].to_string())
            });
            if common.is_some() && common == last_prefix {
                continue;
            }
            if count == max_keys {
                next = last_token.take();
                break;
            }
            count += 1;
            match common {
                Some(cp) => {
                    prefixes.push_str(&format!(
                        "<CommonPrefixes><Prefix>{}</Prefix></CommonPrefixes>",
                        escape(&cp)
                    ));
                    last_token = Some(format!("p:{cp}"));
                    last_prefix = Some(cp);
                }
                None => {
                    contents.push_str(&format!(
                        "<Contents><Key>{}</Key><LastModified>{}</LastModified><ETag>\"{}\"</ETag><Size>{}</Size><StorageClass>STANDARD</StorageClass></Contents>",
                        escape(key),
                        format_rfc3339(object.last_modified),
                        object.etag,
                        object.payload.len()
                    ));
                    last_token = Some(format!("k:{key}"));
                }
            }
        }

        let token = match &next {
            Some(t) => format!("<NextContinuationToken>{}</NextContinuationToken>", escape(t)),
            None => String::new(),
        };
        xml_ok(format!(
            "<ListBucketResult><Name>{}</Name><Prefix>{}</Prefix><Delimiter>{}</Delimiter><MaxKeys>{max_keys}</MaxKeys><KeyCount>{count}</KeyCount><IsTruncated>{}</IsTruncated>{token}{contents}{prefixes}</ListBucketResult>",
            req.bucket,
            escape(prefix),
            escape(delimiter.unwrap_or("")),
            next.is_some(),
        ))
    }

    fn put_object(&mut self, req: &Recorded, key: &str, content: Bytes) -> Result<Response<Body>> {
        let Some(bucket) = self.buckets.get_mut(&req.bucket) else {
            return error(req, 404, "NoSuchBucket");
        };
        let etag = hex_md5(&content);
        bucket.objects.insert(
            key.to_string(),
            Object {
                payload: Payload::Bytes(content),
                etag: etag.clone(),
                content_type: content_type(&req.headers),
                metadata: metadata(&req.headers),
                last_modified: now(),
            },
        );
        Ok(Response::builder()
            .status(200)
            .header(ETAG, format!("\"{etag}\""))
            .body(Body::Empty)?)
    }

    fn get_object(
        &self,
        req: &Recorded,
        key: &str,
        truncate: bool,
        with_body: bool,
    ) -> Result<Response<Body>> {
        let object = self
            .buckets
            .get(&req.bucket)
            .map(|b| b.objects.get(key));
        let object = match object {
            None if with_body => return error(req, 404, "NoSuchBucket"),
            Some(None) if with_body => return error(req, 404, "NoSuchKey"),
            None | Some(None) => return empty(404),
            Some(Some(object)) => object.clone(),
        };

        let mut resp = Response::builder()
            .status(200)
            .header(CONTENT_LENGTH, object.payload.len())
            .header(CONTENT_TYPE, object.content_type.as_str())
            .header(ETAG, format!("\"{}\"", object.etag))
            .header(LAST_MODIFIED, format_http_date(object.last_modified));
        for (k, v) in &object.metadata {
            resp = resp.header(format!("x-amz-meta-{k}"), v.as_str());
        }
        let body = if with_body {
            object.payload.into_body(truncate)
        } else {
            Body::Empty
        };
        Ok(resp.body(body)?)
    }

    fn copy(&mut self, req: &Recorded) -> Result<Response<Body>> {
        let source = req
            .headers
            .get("x-amz-copy-source")
            .and_then(|v| v.to_str().ok())
            .map(|v| percent_decode_str(v).decode_utf8_lossy().into_owned())
            .unwrap_or_default();
        let Some((src_bucket, src_key)) = source.trim_start_matches('/').split_once('/') else {
            return error(req, 400, "InvalidArgument");
        };
        let Some(src) = self.buckets.get(src_bucket) else {
            return error(req, 404, "NoSuchBucket");
        };
        let Some(object) = src.objects.get(src_key).cloned() else {
            return error(req, 404, "NoSuchKey");
        };
        let Some(dst) = self.buckets.get_mut(&req.bucket) else {
            return error(req, 404, "NoSuchBucket");
        };
        let modified = now();
        let etag = object.etag.clone();
        dst.objects.insert(
            req.key.clone().unwrap_or_default(),
            Object {
                last_modified: modified,
                ..object
            },
        );
        xml_ok(format!(
            "<CopyObjectResult><LastModified>{}</LastModified><ETag>\"{etag}\"</ETag></CopyObjectResult>",
            format_rfc3339(modified)
        ))
    }

    fn initiate(&mut self, req: &Recorded) -> Result<Response<Body>> {
        if !self.buckets.contains_key(&req.bucket) {
            return error(req, 404, "NoSuchBucket");
        }
        self.upload_seq += 1;
        let upload_id = format!("upload-{}", self.upload_seq);
        let key = req.key.clone().unwrap_or_default();
        self.uploads.insert(
            upload_id.clone(),
            Upload {
                bucket: req.bucket.clone(),
                key: key.clone(),
                content_type: content_type(&req.headers),
                metadata: metadata(&req.headers),
                parts: BTreeMap::new(),
            },
        );
        xml_ok(format!(
            "<InitiateMultipartUploadResult><Bucket>{}</Bucket><Key>{}</Key><UploadId>{upload_id}</UploadId></InitiateMultipartUploadResult>",
            req.bucket,
            escape(&key)
        ))
    }

    fn upload_part(&mut self, req: &Recorded, content: Bytes) -> Result<Response<Body>> {
        let part_number: u32 = req
            .query("partNumber")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let Some(upload) = req.query("uploadId").and_then(|id| self.uploads.get_mut(id)) else {
            return error(req, 404, "NoSuchUpload");
        };
        let etag = hex_md5(&content);
        upload.parts.insert(part_number, (etag.clone(), content));
        Ok(Response::builder()
            .status(200)
            .header(ETAG, format!("\"{etag}\""))
            .body(Body::Empty)?)
    }

    fn complete(&mut self, req: &Recorded, content: &[u8]) -> Result<Response<Body>> {
        #[derive(Deserialize)]
        struct CompleteMultipartUpload {
            #[serde(rename = "Part", default)]
            parts: Vec<Part>,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "PascalCase")]
        struct Part {
            part_number: u32,
            #[serde(rename = "ETag")]
            etag: String,
        }

        let Some(upload_id) = req.query("uploadId") else {
            return error(req, 400, "InvalidRequest");
        };
        let Some(upload) = self.uploads.remove(upload_id) else {
            return error(req, 404, "NoSuchUpload");
        };
        let listed: CompleteMultipartUpload =
            match quick_xml::de::from_str(std::str::from_utf8(content).unwrap_or_default()) {
                Ok(v) => v,
                Err(_) => return error(req, 400, "MalformedXML"),
            };

        let mut assembled = Vec::new();
        let mut etags = String::new();
        for part in &listed.parts {
            match upload.parts.get(&part.part_number) {
                Some((etag, bytes)) if *etag == part.etag => {
                    assembled.extend_from_slice(bytes);
                    etags.push_str(etag);
                }
                _ => return error(req, 400, "InvalidPart"),
            }
        }
        let etag = format!("{}-{}", hex_md5(etags.as_bytes()), listed.parts.len());

        let Some(bucket) = self.buckets.get_mut(&upload.bucket) else {
            return error(req, 404, "NoSuchBucket");
        };
        bucket.objects.insert(
            upload.key.clone(),
            Object {
                payload: Payload::Bytes(assembled.into()),
                etag: etag.clone(),
                content_type: upload.content_type,
                metadata: upload.metadata,
                last_modified: now(),
            },
        );
        xml_ok(format!(
            "<CompleteMultipartUploadResult><Bucket>{}</Bucket><Key>{}</Key><ETag>\"{etag}\"</ETag></CompleteMultipartUploadResult>",
            upload.bucket,
            escape(&upload.key)
        ))
    }

    fn abort(&mut self, req: &Recorded) -> Result<Response<Body>> {
        match req.query("uploadId").and_then(|id| self.uploads.remove(id)) {
            Some(_) => {
                self.aborted += 1;
                empty(204)
            }
            None => error(req, 404, "NoSuchUpload"),
        }
    }
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("binary/octet-stream")
        .to_string()
}

fn metadata(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(k, v)| {
            let key = k.as_str().strip_prefix("x-amz-meta-")?;
            Some((key.to_string(), v.to_str().ok()?.to_string()))
        })
        .collect()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn empty(status: u16) -> Result<Response<Body>> {
    Ok(Response::builder().status(status).body(Body::Empty)?)
}

fn xml_ok(xml: String) -> Result<Response<Body>> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/xml")
        .body(format!(r#"<?xml version="1.0" encoding="UTF-8"?>{xml}"#).into())?)
}

fn error(req: &Recorded, status: u16, code: &str) -> Result<Response<Body>> {
    // HEAD responses never carry a body.
    if req.method == Method::HEAD {
        return empty(status);
    }
    let resource = match &req.key {
        Some(key) => format!("/{}/{}", req.bucket, escape(key)),
        None => format!("/{}", req.bucket),
    };
    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/xml")
        .body(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>{code}</Code><Message>{code} raised by mock s3</Message><Resource>{resource}</Resource><RequestId>mock-request-id</RequestId></Error>"#
            )
            .into(),
        )?)
}

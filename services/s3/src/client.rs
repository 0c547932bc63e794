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

use std::sync::Arc;

use bucketwire_core::hash::hex_md5;
use bucketwire_core::{
    Body, Context, Error, ErrorKind, RequestTimeout, Result, SigningMethod,
};
use bytes::Bytes;
use http::response::Parts;
use log::{debug, warn};

use crate::classify::{classify_error_response, parse_error_body};
use crate::codec::*;
use crate::config::{Config, EndpointConfig};
use crate::constants::*;
use crate::naming::{validate_bucket_name, validate_key};
use crate::paginate::ObjectLister;
use crate::sign_request::RequestSigner;
use crate::types::*;
use crate::Credential;

/// Client of an S3-compatible service.
///
/// Cloning is cheap and every clone shares the same immutable config, so a
/// client can be used from many tasks at once.
#[derive(Clone, Debug)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

#[derive(Debug)]
pub(crate) struct ClientInner {
    pub(crate) ctx: Context,
    pub(crate) endpoint: EndpointConfig,
    pub(crate) credential: Credential,
    pub(crate) signer: RequestSigner,
}

impl Client {
    /// Create a client from a context and config.
    ///
    /// The config is validated and frozen here. Call [`Config::from_env`]
    /// first to fall back to environment variables.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let (endpoint, credential) = config.build()?;
        let signer = RequestSigner::new(S3_SERVICE, endpoint.region());
        debug!(
            "created s3 client for {} in region {}",
            endpoint.endpoint(),
            endpoint.region()
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                ctx,
                endpoint,
                credential,
                signer,
            }),
        })
    }

    /// Resolved endpoint config.
    pub fn endpoint(&self) -> &EndpointConfig {
        &self.inner.endpoint
    }

    /// Context used for transport and file access.
    pub fn context(&self) -> &Context {
        &self.inner.ctx
    }

    /// Sign and send one operation.
    ///
    /// Non-2xx responses are collected and classified into an error.
    pub(crate) async fn send(&self, op: Operation) -> Result<http::Response<Body>> {
        let bucket = op.bucket.clone();
        let key = op.key.clone();

        let (mut parts, body) = op.into_request(&self.inner.endpoint)?.into_parts();
        self.inner
            .signer
            .sign(&mut parts, &self.inner.credential, SigningMethod::Header)?;
        parts
            .extensions
            .insert(RequestTimeout(self.inner.endpoint.timeout));

        let method = parts.method.clone();
        let uri = parts.uri.clone();
        let resp = self
            .inner
            .ctx
            .http_send(http::Request::from_parts(parts, body))
            .await?;
        let status = resp.status();
        debug!("{method} {uri} -> {status}");

        if status.is_success() {
            return Ok(resp);
        }

        match resp.into_body().collect().await {
            Ok(body) => Err(classify_error_response(
                status,
                &body,
                bucket.as_deref(),
                key.as_deref(),
            )),
            Err(err) => {
                warn!("failed to read error body of {method} {uri}: {err}");
                Err(classify_error_response(status, &[], bucket.as_deref(), key.as_deref())
                    .with_source(err))
            }
        }
    }

    /// Send and collect the whole response body.
    ///
    /// Some operations report failures inside a 200 response; those are
    /// classified like any other error body.
    pub(crate) async fn send_collected(&self, op: Operation) -> Result<(Parts, Bytes)> {
        let bucket = op.bucket.clone();
        let key = op.key.clone();

        let (parts, body) = self.send(op).await?.into_parts();
        let body = body.collect().await?;
        if parse_error_body(&body).is_some() {
            return Err(classify_error_response(
                parts.status,
                &body,
                bucket.as_deref(),
                key.as_deref(),
            ));
        }
        Ok((parts, body))
    }

    /// List all buckets owned by the caller.
    pub async fn list_buckets(&self) -> Result<ListBucketsOutput> {
        let (_, body) = self.send_collected(Operation::list_buckets()).await?;
        decode_list_buckets(&body)
    }

    /// Create a bucket in the client's region.
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        validate_bucket_name(bucket)?;
        self.send(Operation::create_bucket(
            bucket,
            self.inner.endpoint.region(),
        )?)
        .await?;
        Ok(())
    }

    /// Delete an empty bucket.
    pub async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        validate_bucket_name(bucket)?;
        self.send(Operation::delete_bucket(bucket)).await?;
        Ok(())
    }

    /// Check whether a bucket exists.
    ///
    /// A missing bucket is `Ok(false)`; every other failure is returned.
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        validate_bucket_name(bucket)?;
        match self.send(Operation::head_bucket(bucket)).await {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::BucketNotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Upload an in-memory object.
    ///
    /// The ETag reported by the server is checked against the MD5 of `content`.
    pub async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content: impl Into<Bytes>,
        opts: PutOptions,
    ) -> Result<PutObjectOutput> {
        validate_bucket_name(bucket)?;
        let key = validate_key(bucket, key)?;
        let content = content.into();
        let size = content.len() as u64;
        let content_md5 = hex_md5(&content);

        let resp = self
            .send(Operation::put_object(bucket, key, content, &opts)?)
            .await?;
        let etag = decode_etag(resp.headers());
        verify_etag(bucket, key, &etag, &content_md5)?;

        Ok(PutObjectOutput {
            version_id: resp
                .headers()
                .get(X_AMZ_VERSION_ID)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string()),
            etag,
            size,
            content_md5,
        })
    }

    /// Download a whole object into memory.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectOutput> {
        validate_bucket_name(bucket)?;
        let key = validate_key(bucket, key)?;

        let (parts, body) = self
            .send(Operation::get_object(bucket, key))
            .await?
            .into_parts();
        let info = decode_object_info(key, &parts.headers);
        let content = body.collect().await?;
        if parts.headers.contains_key(http::header::CONTENT_LENGTH)
            && content.len() as u64 != info.size
        {
            return Err(Error::connection(format!(
                "incomplete body: received {} of {} bytes",
                content.len(),
                info.size
            ))
            .with_bucket(bucket)
            .with_key(key));
        }

        Ok(GetObjectOutput { content, info })
    }

    /// Fetch object metadata.
    pub async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectInfo> {
        validate_bucket_name(bucket)?;
        let key = validate_key(bucket, key)?;

        let resp = self.send(Operation::head_object(bucket, key)).await?;
        Ok(decode_object_info(key, resp.headers()))
    }

    /// Check whether an object exists.
    ///
    /// A missing object (or bucket) is `Ok(false)`; every other failure is
    /// returned.
    pub async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.head_object(bucket, key).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Delete an object.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<DeleteObjectOutput> {
        validate_bucket_name(bucket)?;
        let key = validate_key(bucket, key)?;

        let resp = self.send(Operation::delete_object(bucket, key)).await?;
        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };
        Ok(DeleteObjectOutput {
            deleted: key.to_string(),
            version_id: header(X_AMZ_VERSION_ID),
            delete_marker: header(X_AMZ_DELETE_MARKER).as_deref() == Some("true"),
        })
    }

    /// Server-side copy of an object.
    pub async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> Result<CopyObjectOutput> {
        validate_bucket_name(src_bucket)?;
        validate_bucket_name(dst_bucket)?;
        let src_key = validate_key(src_bucket, src_key)?;
        let dst_key = validate_key(dst_bucket, dst_key)?;

        let (_, body) = self
            .send_collected(Operation::copy_object(
                src_bucket, src_key, dst_bucket, dst_key,
            )?)
            .await?;
        decode_copy_object(&body)
    }

    /// Fetch one page of a listing.
    ///
    /// `opts.continuation` must come from a page of the same bucket, prefix
    /// and delimiter.
    pub async fn list_objects(&self, bucket: &str, opts: ListOptions) -> Result<ListObjectsPage> {
        validate_list_options(bucket, &opts)?;
        self.fetch_page(
            bucket,
            opts.prefix.as_deref(),
            opts.delimiter.as_deref(),
            opts.max_keys,
            opts.continuation.as_ref(),
        )
        .await
    }

    pub(crate) async fn fetch_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
        max_keys: Option<u32>,
        continuation: Option<&ContinuationToken>,
    ) -> Result<ListObjectsPage> {
        let (_, body) = self
            .send_collected(Operation::list_objects(
                bucket,
                prefix,
                delimiter,
                max_keys,
                continuation.map(|t| t.as_str()),
            ))
            .await?;
        let page = decode_list_objects(bucket, prefix, delimiter, &body)?;
        debug!(
            "listed {} objects and {} prefixes in {bucket}, truncated: {}",
            page.objects.len(),
            page.common_prefixes.len(),
            page.is_truncated
        );
        Ok(page)
    }

    /// Lazily list every object matching `opts`.
    ///
    /// Arguments are validated now; no request is sent until the lister is
    /// advanced.
    pub fn list_all_objects(&self, bucket: &str, opts: ListOptions) -> Result<ObjectLister> {
        validate_list_options(bucket, &opts)?;
        Ok(ObjectLister::new(self.clone(), bucket, opts))
    }

    /// Release the client.
    ///
    /// The client owns no connection itself, so this only exists to give
    /// callers an explicit end of use. Calling it more than once is fine.
    pub async fn close(&self) -> Result<()> {
        debug!("closing s3 client for {}", self.inner.endpoint.endpoint());
        Ok(())
    }
}

fn validate_list_options(bucket: &str, opts: &ListOptions) -> Result<()> {
    validate_bucket_name(bucket)?;
    if opts.max_keys == Some(0) {
        return Err(Error::validation("max_keys must be at least 1").with_bucket(bucket));
    }
    if let Some(token) = &opts.continuation {
        token.check(bucket, opts.prefix.as_deref(), opts.delimiter.as_deref())?;
    }
    Ok(())
}

/// Compare a single-part ETag with the MD5 of what was sent.
///
/// Composite (multipart) and missing ETags can't be compared and pass.
pub(crate) fn verify_etag(bucket: &str, key: &str, etag: &str, md5: &str) -> Result<()> {
    if etag.is_empty() || etag.contains('-') {
        return Ok(());
    }
    if etag.eq_ignore_ascii_case(md5) {
        return Ok(());
    }
    Err(Error::integrity(format!(
        "etag {etag} reported by server does not match content md5 {md5}"
    ))
    .with_bucket(bucket)
    .with_key(key))
}

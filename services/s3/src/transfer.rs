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

//! Streamed uploads and downloads.
//!
//! Bodies move in chunks of at most [`STREAM_CHUNK_SIZE`] bytes and are
//! hashed as they pass, so an object is never held in memory as a whole.
//! Multipart uploads buffer one part at a time.

use bucketwire_core::hash::{hex_md5, ContentDigest};
use bucketwire_core::{Body, ByteSink, ByteSource, Error, Result};
use bytes::{Bytes, BytesMut};
use futures::channel::oneshot;
use futures::StreamExt;
use http::header::CONTENT_LENGTH;
use log::{debug, warn};

use crate::client::verify_etag;
use crate::codec::{decode_etag, decode_object_info, guess_content_type, Operation};
use crate::constants::*;
use crate::naming::{validate_bucket_name, validate_key};
use crate::types::*;
use crate::Client;

impl Client {
    /// Upload everything `source` yields.
    ///
    /// Sources of known length up to the multipart threshold go out as one
    /// streamed `PUT`. Larger sources, and sources of unknown length, are
    /// uploaded in parts; a failed multipart upload is aborted.
    pub async fn upload_stream(
        &self,
        bucket: &str,
        key: &str,
        source: impl ByteSource,
        opts: PutOptions,
    ) -> Result<PutObjectOutput> {
        validate_bucket_name(bucket)?;
        let key = validate_key(bucket, key)?;

        match source.size_hint() {
            Some(size) if size <= self.inner.endpoint.multipart_threshold => {
                self.put_streamed(bucket, key, source, size, &opts).await
            }
            _ => self.put_multipart(bucket, key, source, opts).await,
        }
    }

    /// Upload a local file.
    ///
    /// The content type is guessed from `path` unless set in `opts`.
    pub async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &str,
        mut opts: PutOptions,
    ) -> Result<PutObjectOutput> {
        let path = self.expand_path(path)?;
        if opts.content_type.is_none() {
            opts.content_type = Some(guess_content_type(&path));
        }
        let source = self.inner.ctx.file_open_read(&path).await?;
        self.upload_stream(bucket, key, source, opts).await
    }

    /// Download an object into `sink`, chunk by chunk.
    ///
    /// A body that ends early is reported as a connection error; whatever
    /// reached the sink by then must be treated as incomplete.
    pub async fn download_stream<S: ByteSink + ?Sized>(
        &self,
        bucket: &str,
        key: &str,
        sink: &mut S,
    ) -> Result<DownloadOutput> {
        validate_bucket_name(bucket)?;
        let key = validate_key(bucket, key)?;

        let (parts, body) = self
            .send(Operation::get_object(bucket, key))
            .await?
            .into_parts();
        let info = decode_object_info(key, &parts.headers);

        let mut stream = body.into_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let mut chunk = chunk.map_err(|err| {
                Error::new(
                    err.kind(),
                    format!("download interrupted after {written} bytes"),
                )
                .with_bucket(bucket)
                .with_key(key)
                .with_source(err)
            })?;
            while !chunk.is_empty() {
                let piece = chunk.split_to(STREAM_CHUNK_SIZE.min(chunk.len()));
                written += piece.len() as u64;
                sink.write_chunk(piece).await?;
            }
        }
        sink.flush().await?;

        if parts.headers.contains_key(CONTENT_LENGTH) && written != info.size {
            return Err(Error::connection(format!(
                "incomplete download: received {written} of {} bytes",
                info.size
            ))
            .with_bucket(bucket)
            .with_key(key));
        }
        debug!("downloaded {written} bytes of {bucket}/{key}");

        Ok(DownloadOutput {
            info,
            bytes_written: written,
        })
    }

    /// Download an object into a local file.
    ///
    /// On failure the partially written file is removed.
    pub async fn download_file(&self, bucket: &str, key: &str, path: &str) -> Result<DownloadOutput> {
        let path = self.expand_path(path)?;
        let mut sink = self.inner.ctx.file_open_write(&path).await?;

        match self.download_stream(bucket, key, &mut sink).await {
            Ok(out) => Ok(out),
            Err(err) => {
                drop(sink);
                if let Err(e) = self.inner.ctx.file_remove(&path).await {
                    warn!("failed to remove partial download {path}: {e}");
                }
                Err(err)
            }
        }
    }

    fn expand_path(&self, path: &str) -> Result<String> {
        self.inner
            .ctx
            .expand_home_dir(path)
            .ok_or_else(|| Error::validation(format!("can't expand home dir of {path}")))
    }

    /// Single `PUT` whose body is pulled from `source` while it is sent.
    async fn put_streamed(
        &self,
        bucket: &str,
        key: &str,
        source: impl ByteSource,
        size: u64,
        opts: &PutOptions,
    ) -> Result<PutObjectOutput> {
        let (tx, mut rx) = oneshot::channel::<Result<ContentDigest>>();
        let body = Body::from_stream(futures::stream::try_unfold(
            (source, ContentDigest::new(), size, Some(tx)),
            move |(mut source, mut digest, remaining, tx)| async move {
                if remaining == 0 {
                    // A source longer than announced fails the upload.
                    if let Some(extra) = source.read_chunk(1).await? {
                        if !extra.is_empty() {
                            let overflow = || {
                                Error::integrity(format!(
                                    "source yielded more than the announced {size} bytes"
                                ))
                            };
                            if let Some(tx) = tx {
                                let _ = tx.send(Err(overflow()));
                            }
                            return Err(overflow());
                        }
                    }
                    if let Some(tx) = tx {
                        let _ = tx.send(Ok(digest));
                    }
                    return Ok::<_, Error>(None);
                }

                let max = STREAM_CHUNK_SIZE.min(usize::try_from(remaining).unwrap_or(usize::MAX));
                match source.read_chunk(max).await? {
                    Some(chunk) => {
                        digest.update(&chunk);
                        let remaining = remaining.saturating_sub(chunk.len() as u64);
                        Ok(Some((chunk, (source, digest, remaining, tx))))
                    }
                    None => {
                        if let Some(tx) = tx {
                            let _ = tx.send(Ok(digest));
                        }
                        Ok(None)
                    }
                }
            },
        ));

        let resp = match self
            .send(Operation::put_object_stream(bucket, key, body, size, opts)?)
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                // Prefer our own verdict on the body over however the
                // transport reported the aborted stream.
                return match rx.try_recv() {
                    Ok(Some(Err(source_err))) => Err(source_err.with_bucket(bucket).with_key(key)),
                    _ => Err(err),
                };
            }
        };
        let hashes = rx
            .await
            .map_err(|_| {
                Error::integrity("upload body was not fully consumed by the transport")
                    .with_bucket(bucket)
                    .with_key(key)
            })??
            .finish();
        if hashes.len != size {
            return Err(Error::integrity(format!(
                "source yielded {} bytes but announced {size}",
                hashes.len
            ))
            .with_bucket(bucket)
            .with_key(key));
        }

        let etag = decode_etag(resp.headers());
        verify_etag(bucket, key, &etag, &hashes.md5)?;
        Ok(PutObjectOutput {
            version_id: resp
                .headers()
                .get(X_AMZ_VERSION_ID)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string()),
            etag,
            size,
            content_md5: hashes.md5,
        })
    }

    async fn put_multipart(
        &self,
        bucket: &str,
        key: &str,
        mut source: impl ByteSource,
        opts: PutOptions,
    ) -> Result<PutObjectOutput> {
        let part_size = self.inner.endpoint.part_size;
        let first = read_part(&mut source, part_size).await?;
        if first.len() < part_size {
            // Everything fits in one part.
            return self.put_object(bucket, key, first, opts).await;
        }

        let upload = self.create_multipart_upload(bucket, key, opts).await?;
        let mut digest = ContentDigest::new();
        let result = async {
            let mut parts = Vec::new();
            let mut content = first;
            loop {
                let part_number = parts.len() as u32 + 1;
                if part_number > MAX_UPLOAD_PARTS {
                    return Err(Error::validation(format!(
                        "upload needs more than {MAX_UPLOAD_PARTS} parts of {part_size} bytes"
                    ))
                    .with_bucket(bucket)
                    .with_key(key));
                }

                digest.update(&content);
                let last = content.len() < part_size;
                parts.push(
                    self.upload_part_verified(&upload, part_number, content)
                        .await?,
                );
                if last {
                    break;
                }
                content = read_part(&mut source, part_size).await?;
                if content.is_empty() {
                    break;
                }
            }
            self.complete_multipart_upload(&upload, &parts).await
        }
        .await;

        match result {
            Ok(out) => {
                let hashes = digest.finish();
                Ok(PutObjectOutput {
                    etag: out.etag,
                    version_id: out.version_id,
                    size: hashes.len,
                    content_md5: hashes.md5,
                })
            }
            Err(err) => {
                warn!(
                    "multipart upload {} of {bucket}/{key} failed, aborting: {err}",
                    upload.upload_id
                );
                if let Err(e) = self.abort_multipart_upload(&upload).await {
                    warn!("failed to abort multipart upload {}: {e}", upload.upload_id);
                }
                Err(err)
            }
        }
    }

    /// Upload one part and check its ETag against the part's MD5.
    pub(crate) async fn upload_part_verified(
        &self,
        upload: &MultipartUpload,
        part_number: u32,
        content: Bytes,
    ) -> Result<CompletedPart> {
        let md5 = hex_md5(&content);
        let len = content.len();
        let resp = self
            .send(Operation::upload_part(upload, part_number, content))
            .await?;
        let etag = decode_etag(resp.headers());
        verify_etag(&upload.bucket, &upload.key, &etag, &md5)?;
        debug!(
            "uploaded part {part_number} ({len} bytes) of {}",
            upload.upload_id
        );
        Ok(CompletedPart { part_number, etag })
    }
}

/// Read up to `part_size` bytes, less only at the end of the source.
async fn read_part(source: &mut impl ByteSource, part_size: usize) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(part_size.min(DEFAULT_PART_SIZE));
    while buf.len() < part_size {
        let max = STREAM_CHUNK_SIZE.min(part_size - buf.len());
        match source.read_chunk(max).await? {
            Some(chunk) => buf.extend_from_slice(&chunk),
            None => break,
        }
    }
    Ok(buf.freeze())
}

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

//! Low level multipart upload calls.
//!
//! [`Client::upload_stream`] drives these for large sources. They are public
//! for callers that produce parts themselves.

use bucketwire_core::{Error, Result};
use bytes::Bytes;
use log::debug;

use crate::codec::{decode_complete_multipart, decode_initiate_multipart, Operation};
use crate::constants::MAX_UPLOAD_PARTS;
use crate::naming::{validate_bucket_name, validate_key};
use crate::types::*;
use crate::Client;

impl Client {
    /// Start a multipart upload.
    pub async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        opts: PutOptions,
    ) -> Result<MultipartUpload> {
        validate_bucket_name(bucket)?;
        let key = validate_key(bucket, key)?;

        let (_, body) = self
            .send_collected(Operation::create_multipart_upload(bucket, key, &opts)?)
            .await?;
        let upload = decode_initiate_multipart(bucket, key, &body)?;
        debug!("started multipart upload {} of {bucket}/{key}", upload.upload_id);
        Ok(upload)
    }

    /// Upload one part. `part_number` starts at 1.
    pub async fn upload_part(
        &self,
        upload: &MultipartUpload,
        part_number: u32,
        content: impl Into<Bytes>,
    ) -> Result<CompletedPart> {
        check_part_number(upload, part_number)?;
        self.upload_part_verified(upload, part_number, content.into())
            .await
    }

    /// Assemble uploaded parts into the final object.
    ///
    /// `parts` must be non-empty and in ascending part number order.
    pub async fn complete_multipart_upload(
        &self,
        upload: &MultipartUpload,
        parts: &[CompletedPart],
    ) -> Result<CompleteMultipartOutput> {
        if parts.is_empty() {
            return Err(Error::validation("multipart upload needs at least one part")
                .with_bucket(&upload.bucket)
                .with_key(&upload.key));
        }
        let mut previous = 0;
        for part in parts {
            check_part_number(upload, part.part_number)?;
            if part.part_number <= previous {
                return Err(Error::validation(format!(
                    "part {} is out of order",
                    part.part_number
                ))
                .with_bucket(&upload.bucket)
                .with_key(&upload.key));
            }
            previous = part.part_number;
        }

        let (parts, body) = self
            .send_collected(Operation::complete_multipart_upload(upload, parts)?)
            .await?;
        let out = decode_complete_multipart(&body, &parts.headers)?;
        debug!(
            "completed multipart upload {} of {}/{}",
            upload.upload_id, upload.bucket, upload.key
        );
        Ok(out)
    }

    /// Abort a multipart upload and drop its parts.
    pub async fn abort_multipart_upload(&self, upload: &MultipartUpload) -> Result<()> {
        self.send(Operation::abort_multipart_upload(upload)).await?;
        debug!("aborted multipart upload {}", upload.upload_id);
        Ok(())
    }
}

fn check_part_number(upload: &MultipartUpload, part_number: u32) -> Result<()> {
    if (1..=MAX_UPLOAD_PARTS).contains(&part_number) {
        return Ok(());
    }
    Err(Error::validation(format!(
        "part number {part_number} is outside 1..={MAX_UPLOAD_PARTS}"
    ))
    .with_bucket(&upload.bucket)
    .with_key(&upload.key))
}

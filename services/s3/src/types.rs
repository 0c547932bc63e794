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

//! Typed results and options of client operations.
//!
//! Every value here is a fresh snapshot returned by one call.

use std::collections::HashMap;

use bucketwire_core::time::DateTime;
use bucketwire_core::{Error, Result};
use bytes::Bytes;

/// Owner of buckets, as reported by `ListBuckets`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Owner {
    /// Canonical user id.
    pub id: String,
    /// Display name, not every server reports it.
    pub display_name: Option<String>,
}

/// One bucket of a `ListBuckets` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    /// Bucket name.
    pub name: String,
    /// Creation time, `None` when the server sent something unparsable.
    pub creation_date: Option<DateTime>,
}

/// Result of `list_buckets`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBucketsOutput {
    /// Buckets in server order.
    pub buckets: Vec<BucketInfo>,
    /// Owner of the buckets.
    pub owner: Option<Owner>,
}

/// One object of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// ETag without surrounding quotes.
    pub etag: String,
    /// Last modified time.
    pub last_modified: Option<DateTime>,
    /// Storage class reported by the server.
    pub storage_class: Option<String>,
}

/// Object metadata returned by `head_object` and `get_object`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Content length in bytes.
    pub size: u64,
    /// ETag without surrounding quotes.
    pub etag: String,
    /// Content type.
    pub content_type: Option<String>,
    /// Last modified time.
    pub last_modified: Option<DateTime>,
    /// User metadata with the header prefix stripped.
    pub metadata: HashMap<String, String>,
    /// Version id on versioned buckets.
    pub version_id: Option<String>,
}

/// Opaque cursor that resumes a listing.
///
/// A token is bound to the bucket, prefix and delimiter of the listing that
/// produced it and is rejected for any other combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken {
    token: String,
    bucket: String,
    prefix: Option<String>,
    delimiter: Option<String>,
}

impl ContinuationToken {
    pub(crate) fn new(
        token: String,
        bucket: &str,
        prefix: Option<&str>,
        delimiter: Option<&str>,
    ) -> Self {
        Self {
            token,
            bucket: bucket.to_string(),
            prefix: prefix.map(|v| v.to_string()),
            delimiter: delimiter.map(|v| v.to_string()),
        }
    }

    /// Raw token as sent by the server.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Fail unless the token was produced by a listing with the same arguments.
    pub fn check(&self, bucket: &str, prefix: Option<&str>, delimiter: Option<&str>) -> Result<()> {
        if self.bucket == bucket
            && self.prefix.as_deref() == prefix
            && self.delimiter.as_deref() == delimiter
        {
            return Ok(());
        }

        Err(Error::validation(format!(
            "continuation token was issued for bucket={} prefix={:?} delimiter={:?}, \
             not bucket={bucket} prefix={prefix:?} delimiter={delimiter:?}",
            self.bucket, self.prefix, self.delimiter
        ))
        .with_bucket(bucket))
    }
}

/// One page of `list_objects`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListObjectsPage {
    /// Bucket that was listed.
    pub bucket: String,
    /// Objects in server order.
    pub objects: Vec<ObjectEntry>,
    /// Common prefixes, only present when a delimiter was given.
    pub common_prefixes: Vec<String>,
    /// Whether more pages remain.
    pub is_truncated: bool,
    /// Cursor of the next page, set iff `is_truncated`.
    pub next: Option<ContinuationToken>,
    /// Prefix echoed by the server.
    pub prefix: Option<String>,
    /// Delimiter echoed by the server.
    pub delimiter: Option<String>,
    /// Page size limit echoed by the server.
    pub max_keys: Option<u32>,
    /// Number of keys and prefixes in this page.
    pub key_count: Option<u32>,
}

/// Options of `list_objects` and `list_all_objects`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Only list keys starting with this prefix.
    pub prefix: Option<String>,
    /// Group keys sharing a prefix up to this delimiter.
    pub delimiter: Option<String>,
    /// Page size, at least 1.
    pub max_keys: Option<u32>,
    /// Resume from this cursor.
    pub continuation: Option<ContinuationToken>,
}

impl ListOptions {
    /// Options listing everything under `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Default::default()
        }
    }
}

/// Options of uploads.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Content type, inferred from the key when unset.
    pub content_type: Option<String>,
    /// User metadata.
    pub metadata: HashMap<String, String>,
    /// Precomputed hex SHA256 of a streamed body.
    ///
    /// Streams are sent as `UNSIGNED-PAYLOAD` without it. In-memory bodies
    /// are always hashed and ignore this field.
    pub content_sha256: Option<String>,
}

/// Result of a single part or in-memory upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectOutput {
    /// ETag without surrounding quotes.
    pub etag: String,
    /// Version id on versioned buckets.
    pub version_id: Option<String>,
    /// Number of bytes uploaded.
    pub size: u64,
    /// Hex MD5 computed over the uploaded bytes.
    pub content_md5: String,
}

/// Result of `get_object`.
#[derive(Debug, Clone)]
pub struct GetObjectOutput {
    /// Full object body.
    pub content: Bytes,
    /// Object metadata.
    pub info: ObjectInfo,
}

/// Result of a streamed download.
#[derive(Debug, Clone)]
pub struct DownloadOutput {
    /// Object metadata.
    pub info: ObjectInfo,
    /// Bytes handed to the sink.
    pub bytes_written: u64,
}

/// Result of `copy_object`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyObjectOutput {
    /// ETag of the new object.
    pub etag: String,
    /// Last modified time of the new object.
    pub last_modified: Option<DateTime>,
}

/// Result of `delete_object`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteObjectOutput {
    /// Key that was deleted.
    pub deleted: String,
    /// Version id of the delete marker or deleted version.
    pub version_id: Option<String>,
    /// Whether a delete marker was created.
    pub delete_marker: bool,
}

/// An in-progress multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUpload {
    /// Target bucket.
    pub bucket: String,
    /// Target key.
    pub key: String,
    /// Upload id assigned by the server.
    pub upload_id: String,
}

/// A part that has been uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// 1-based part number.
    pub part_number: u32,
    /// ETag returned for the part.
    pub etag: String,
}

/// Result of `complete_multipart_upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteMultipartOutput {
    /// Composite ETag of the object.
    pub etag: String,
    /// Version id on versioned buckets.
    pub version_id: Option<String>,
}

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

//! Bucket name and object key rules.

use std::net::Ipv4Addr;

use bucketwire_core::{Error, Result};

use crate::constants::MAX_KEY_LEN;

/// Check a bucket name against the protocol naming rules.
///
/// - 3 to 63 characters
/// - only lowercase letters, digits, `.` and `-`
/// - starts and ends with a letter or digit
/// - no consecutive periods
/// - not formatted as an IPv4 address
pub fn validate_bucket_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(Error::validation(format!("invalid bucket name '{name}': {reason}")).with_bucket(name))
    };

    if name.len() < 3 {
        return invalid("must be at least 3 characters");
    }
    if name.len() > 63 {
        return invalid("must be at most 63 characters");
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'.' || b == b'-')
    {
        return invalid("can only contain lowercase letters, numbers, hyphens, and periods");
    }
    let alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let bs = name.as_bytes();
    if !alnum(bs[0]) || !alnum(bs[bs.len() - 1]) {
        return invalid("must start and end with a lowercase letter or number");
    }
    if name.contains("..") {
        return invalid("cannot contain consecutive periods");
    }
    if name.parse::<Ipv4Addr>().is_ok() {
        return invalid("cannot be formatted as an IP address");
    }

    Ok(())
}

/// Strip the leading slashes callers often put in front of keys.
pub fn normalize_key(key: &str) -> &str {
    key.trim_start_matches('/')
}

/// Normalize and check an object key.
pub fn validate_key<'a>(bucket: &str, key: &'a str) -> Result<&'a str> {
    let normalized = normalize_key(key);
    if normalized.is_empty() {
        return Err(Error::validation("object key must not be empty")
            .with_bucket(bucket)
            .with_key(key));
    }
    if normalized.len() > MAX_KEY_LEN {
        return Err(Error::validation(format!(
            "object key is {} bytes, longer than {MAX_KEY_LEN}",
            normalized.len()
        ))
        .with_bucket(bucket)
        .with_key(key));
    }
    Ok(normalized)
}

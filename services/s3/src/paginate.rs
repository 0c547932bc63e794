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

use std::collections::VecDeque;

use bucketwire_core::{Error, Result};
use futures::stream::BoxStream;
use futures::StreamExt;
use log::{debug, warn};

use crate::types::{ContinuationToken, ListOptions, ObjectEntry};
use crate::Client;

/// Lazy, forward-only listing over every page of a bucket.
///
/// At most one page is held in memory and the next page is requested only
/// once every entry of the current one has been handed out. Entries are
/// yielded in the order the server returned them.
///
/// ```no_run
/// # async fn example(client: bucketwire_s3::Client) -> bucketwire_core::Result<()> {
/// let mut lister = client.list_all_objects("bucket", Default::default())?;
/// while let Some(entry) = lister.next().await? {
///     println!("{} {}", entry.key, entry.size);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ObjectLister {
    client: Client,
    bucket: String,
    prefix: Option<String>,
    delimiter: Option<String>,
    max_keys: Option<u32>,
    start: Option<ContinuationToken>,

    buffer: VecDeque<ObjectEntry>,
    common_prefixes: Vec<String>,
    next: Option<ContinuationToken>,
    done: bool,
    pages_fetched: usize,
}

impl ObjectLister {
    /// `opts` must already be validated against `bucket`.
    pub(crate) fn new(client: Client, bucket: &str, opts: ListOptions) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            prefix: opts.prefix,
            delimiter: opts.delimiter,
            max_keys: opts.max_keys,
            start: opts.continuation.clone(),

            buffer: VecDeque::new(),
            common_prefixes: Vec::new(),
            next: opts.continuation,
            done: false,
            pages_fetched: 0,
        }
    }

    /// Advance to the next entry.
    ///
    /// Returns `Ok(None)` once the last page is drained. The first failed
    /// page fetch is returned as is and ends the listing.
    pub async fn next(&mut self) -> Result<Option<ObjectEntry>> {
        loop {
            if let Some(entry) = self.buffer.pop_front() {
                return Ok(Some(entry));
            }
            if self.done {
                return Ok(None);
            }
            self.fetch_next_page().await?;
        }
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let page = match self
            .client
            .fetch_page(
                &self.bucket,
                self.prefix.as_deref(),
                self.delimiter.as_deref(),
                self.max_keys,
                self.next.as_ref(),
            )
            .await
        {
            Ok(page) => page,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };
        self.pages_fetched += 1;
        debug!(
            "fetched page {} of {} with {} entries",
            self.pages_fetched,
            self.bucket,
            page.objects.len()
        );

        self.buffer.extend(page.objects);
        self.common_prefixes.extend(page.common_prefixes);

        match (page.is_truncated, page.next) {
            (false, _) => {
                self.done = true;
                self.next = None;
            }
            (true, None) => {
                warn!(
                    "listing of {} is truncated but has no continuation token, stopping",
                    self.bucket
                );
                self.done = true;
                self.next = None;
            }
            (true, Some(token)) => {
                if self.next.as_ref().map(|t| t.as_str()) == Some(token.as_str()) {
                    self.done = true;
                    return Err(Error::protocol(
                        "RepeatedContinuationToken",
                        "server returned the same continuation token twice",
                    )
                    .with_bucket(&self.bucket));
                }
                self.next = Some(token);
            }
        }
        Ok(())
    }

    /// Common prefixes seen in the pages fetched so far.
    pub fn common_prefixes(&self) -> &[String] {
        &self.common_prefixes
    }

    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// A fresh lister over the same arguments, starting from the beginning.
    pub fn restart(&self) -> Self {
        Self::new(
            self.client.clone(),
            &self.bucket,
            ListOptions {
                prefix: self.prefix.clone(),
                delimiter: self.delimiter.clone(),
                max_keys: self.max_keys,
                continuation: self.start.clone(),
            },
        )
    }

    /// Turn the lister into a stream of entries.
    pub fn into_stream(self) -> BoxStream<'static, Result<ObjectEntry>> {
        futures::stream::try_unfold(self, |mut lister| async move {
            Ok::<_, Error>(lister.next().await?.map(|entry| (entry, lister)))
        })
        .boxed()
    }
}

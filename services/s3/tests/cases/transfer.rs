use anyhow::Result;
use async_trait::async_trait;
use bucketwire_core::hash::hex_md5;
use bucketwire_core::{ByteSink, ByteSource, ErrorKind};
use bucketwire_s3::{Config, PutOptions};
use bytes::Bytes;
use http::Method;
use pretty_assertions::assert_eq;

use crate::mock::{Fault, Rule};
use crate::{init, init_with};

const CHUNK_LIMIT: usize = 64 * 1024;

/// A source that hides its length.
struct Unsized(Bytes);

#[async_trait]
impl ByteSource for Unsized {
    async fn read_chunk(&mut self, max: usize) -> bucketwire_core::Result<Option<Bytes>> {
        self.0.read_chunk(max).await
    }
}

/// A source that announces fewer bytes than it holds.
struct Undercounted(Bytes, u64);

#[async_trait]
impl ByteSource for Undercounted {
    async fn read_chunk(&mut self, max: usize) -> bucketwire_core::Result<Option<Bytes>> {
        self.0.read_chunk(max).await
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.1)
    }
}

/// Counts bytes without keeping them and remembers the largest chunk.
#[derive(Default)]
struct CountingSink {
    total: u64,
    largest_chunk: usize,
    flushed: bool,
}

#[async_trait]
impl ByteSink for CountingSink {
    async fn write_chunk(&mut self, chunk: Bytes) -> bucketwire_core::Result<()> {
        assert!(chunk.iter().all(|b| *b == 7));
        self.total += chunk.len() as u64;
        self.largest_chunk = self.largest_chunk.max(chunk.len());
        Ok(())
    }

    async fn flush(&mut self) -> bucketwire_core::Result<()> {
        self.flushed = true;
        Ok(())
    }
}

fn small_parts() -> Config {
    Config {
        part_size: Some(8),
        multipart_threshold: Some(16),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_hello_world_hash() -> Result<()> {
    let (mock, client) = init();
    let out = client
        .upload_stream(
            "bkt",
            "hello.txt",
            Bytes::from_static(b"Hello, World!"),
            PutOptions::default(),
        )
        .await?;
    assert_eq!(out.content_md5, "65a8e27d8879283831b664bd8b7f0ad4");
    assert_eq!(out.etag, out.content_md5);
    assert_eq!(out.size, 13);

    let req = mock.requests().pop().unwrap();
    assert_eq!(req.method, Method::PUT);
    assert_eq!(req.headers["content-length"], "13");
    assert_eq!(req.headers["x-amz-content-sha256"], "UNSIGNED-PAYLOAD");
    Ok(())
}

#[tokio::test]
async fn test_corrupted_upload_is_detected() -> Result<()> {
    let (mock, client) = init();

    mock.inject(Rule::method(Method::PUT), Fault::CorruptUpload);
    let err = client
        .put_object("bkt", "a.txt", "Hello, World!", PutOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert_eq!(err.key(), Some("a.txt"));

    mock.inject(Rule::method(Method::PUT), Fault::CorruptUpload);
    let err = client
        .upload_stream(
            "bkt",
            "b.txt",
            Bytes::from_static(b"Hello, World!"),
            PutOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    Ok(())
}

#[tokio::test]
async fn test_source_longer_than_announced_fails() -> Result<()> {
    let (mock, client) = init();

    let err = client
        .upload_stream(
            "bkt",
            "grown.txt",
            Undercounted(Bytes::from_static(b"Hello, World!"), 5),
            PutOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert_eq!(err.key(), Some("grown.txt"));
    assert_eq!(mock.object("bkt", "grown.txt"), None);

    // An exact announcement still goes through.
    let out = client
        .upload_stream(
            "bkt",
            "exact.txt",
            Undercounted(Bytes::from_static(b"Hello"), 5),
            PutOptions::default(),
        )
        .await?;
    assert_eq!(out.size, 5);
    assert_eq!(mock.object("bkt", "exact.txt").unwrap(), Bytes::from_static(b"Hello"));
    Ok(())
}

#[tokio::test]
async fn test_multipart_upload() -> Result<()> {
    let (mock, client) = init_with(small_parts());
    let data: Vec<u8> = (0..30u8).collect();

    let out = client
        .upload_stream(
            "bkt",
            "big.bin",
            Unsized(Bytes::from(data.clone())),
            PutOptions::default(),
        )
        .await?;
    assert_eq!(out.size, 30);
    assert_eq!(out.content_md5, hex_md5(&data));
    assert!(out.etag.ends_with("-4"), "{}", out.etag);
    assert_eq!(mock.object("bkt", "big.bin").as_deref(), Some(&data[..]));

    let reqs = mock.requests();
    assert!(reqs[0].has_query("uploads"));
    let part_sizes: Vec<_> = reqs
        .iter()
        .filter(|r| r.has_query("partNumber"))
        .map(|r| r.body_len)
        .collect();
    assert_eq!(part_sizes, vec![8, 8, 8, 6]);
    assert!(reqs.last().unwrap().has_query("uploadId"));
    assert_eq!(mock.open_uploads(), 0);
    Ok(())
}

#[tokio::test]
async fn test_large_known_length_uses_multipart() -> Result<()> {
    let (mock, client) = init_with(small_parts());
    let data = Bytes::from(vec![1u8; 24]);

    client
        .upload_stream("bkt", "exact.bin", data.clone(), PutOptions::default())
        .await?;
    assert_eq!(mock.object("bkt", "exact.bin"), Some(data));
    let parts = mock
        .requests()
        .iter()
        .filter(|r| r.has_query("partNumber"))
        .count();
    assert_eq!(parts, 3);
    Ok(())
}

#[tokio::test]
async fn test_short_unsized_source_is_one_put() -> Result<()> {
    let (mock, client) = init_with(small_parts());
    client
        .upload_stream(
            "bkt",
            "small.bin",
            Unsized(Bytes::from_static(b"tiny")),
            PutOptions::default(),
        )
        .await?;
    let reqs = mock.requests();
    assert_eq!(reqs.len(), 1);
    assert!(!reqs[0].has_query("uploads"));
    assert_eq!(mock.object("bkt", "small.bin").as_deref(), Some(&b"tiny"[..]));
    Ok(())
}

#[tokio::test]
async fn test_failed_multipart_upload_is_aborted() -> Result<()> {
    let (mock, client) = init_with(small_parts());
    mock.inject(
        Rule::method(Method::PUT).with_query("partNumber").skip(1),
        Fault::Disconnect,
    );

    let err = client
        .upload_stream(
            "bkt",
            "broken.bin",
            Unsized(Bytes::from(vec![0u8; 30])),
            PutOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(mock.aborted_uploads(), 1);
    assert_eq!(mock.open_uploads(), 0);
    assert!(!client.object_exists("bkt", "broken.bin").await?);
    Ok(())
}

#[tokio::test]
async fn test_corrupted_part_is_aborted() -> Result<()> {
    let (mock, client) = init_with(small_parts());
    mock.inject(
        Rule::method(Method::PUT).with_query("partNumber"),
        Fault::CorruptUpload,
    );

    let err = client
        .upload_stream(
            "bkt",
            "corrupt.bin",
            Unsized(Bytes::from(vec![3u8; 20])),
            PutOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert_eq!(mock.aborted_uploads(), 1);
    Ok(())
}

#[tokio::test]
async fn test_manual_multipart() -> Result<()> {
    let (mock, client) = init();
    let upload = client
        .create_multipart_upload("bkt", "manual.bin", PutOptions::default())
        .await?;
    let first = client.upload_part(&upload, 1, vec![b'a'; 5]).await?;
    let second = client.upload_part(&upload, 2, vec![b'b'; 3]).await?;
    let out = client
        .complete_multipart_upload(&upload, &[first, second])
        .await?;
    assert!(out.etag.ends_with("-2"));
    assert_eq!(
        mock.object("bkt", "manual.bin").as_deref(),
        Some(&b"aaaaabbb"[..])
    );

    let upload = client
        .create_multipart_upload("bkt", "dropped.bin", PutOptions::default())
        .await?;
    client.abort_multipart_upload(&upload).await?;
    assert_eq!(mock.aborted_uploads(), 1);

    let err = client.abort_multipart_upload(&upload).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(err.code(), Some("NoSuchUpload"));
    Ok(())
}

#[tokio::test]
async fn test_download_stays_chunked() -> Result<()> {
    let (mock, client) = init();
    let len = 64 * 1024 * 1024 + 123;
    mock.insert_synthetic("bkt", "huge.bin", 7, len);

    let mut sink = CountingSink::default();
    let out = client
        .download_stream("bkt", "huge.bin", &mut sink)
        .await?;
    assert_eq!(out.bytes_written, len);
    assert_eq!(out.info.size, len);
    assert_eq!(sink.total, len);
    assert!(sink.flushed);
    assert!(sink.largest_chunk <= CHUNK_LIMIT, "{}", sink.largest_chunk);
    Ok(())
}

#[tokio::test]
async fn test_truncated_download_is_incomplete() -> Result<()> {
    let (mock, client) = init();
    mock.insert_object("bkt", "a.bin", vec![9u8; 1000]);

    mock.inject(Rule::method(Method::GET), Fault::TruncateDownload);
    let mut sink = Vec::new();
    let err = client
        .download_stream("bkt", "a.bin", &mut sink)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);

    mock.inject(Rule::method(Method::GET), Fault::TruncateDownload);
    let err = client.get_object("bkt", "a.bin").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    Ok(())
}

#[tokio::test]
async fn test_upload_and_download_file() -> Result<()> {
    let (mock, client) = init();
    let dir = tempfile::tempdir()?;
    let src = dir.path().join("hello.txt");
    tokio::fs::write(&src, b"Hello, World!").await?;

    let out = client
        .upload_file("bkt", "files/hello.txt", src.to_str().unwrap(), PutOptions::default())
        .await?;
    assert_eq!(out.content_md5, "65a8e27d8879283831b664bd8b7f0ad4");
    let req = mock.requests().pop().unwrap();
    assert_eq!(req.headers["content-type"], "text/plain");

    let dst = dir.path().join("copy.txt");
    let out = client
        .download_file("bkt", "files/hello.txt", dst.to_str().unwrap())
        .await?;
    assert_eq!(out.bytes_written, 13);
    assert_eq!(tokio::fs::read(&dst).await?, b"Hello, World!");
    Ok(())
}

#[tokio::test]
async fn test_failed_download_leaves_no_file() -> Result<()> {
    let (mock, client) = init();
    let dir = tempfile::tempdir()?;
    mock.insert_object("bkt", "a.bin", vec![1u8; 100]);

    let missing = dir.path().join("missing.bin");
    let err = client
        .download_file("bkt", "nope.bin", missing.to_str().unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ObjectNotFound);
    assert!(!missing.exists());

    mock.inject(Rule::method(Method::GET), Fault::TruncateDownload);
    let partial = dir.path().join("partial.bin");
    let err = client
        .download_file("bkt", "a.bin", partial.to_str().unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(!partial.exists());
    Ok(())
}

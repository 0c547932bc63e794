use std::fmt::Debug;

use crate::ByteSink;
use crate::ByteSource;
use crate::Result;

/// FileOpen is used to open local files as byte streams.
///
/// It is only used by the file oriented transfer calls. The client never
/// inspects filesystem semantics beyond obtaining a source or a sink.
#[async_trait::async_trait]
pub trait FileOpen: Debug + Send + Sync + 'static {
    /// Open the file at `path` for reading.
    ///
    /// The returned source should report the file size through
    /// [`ByteSource::size_hint`] when it is known.
    async fn open_read(&self, path: &str) -> Result<Box<dyn ByteSource>>;

    /// Create (or truncate) the file at `path` for writing.
    async fn open_write(&self, path: &str) -> Result<Box<dyn ByteSink>>;

    /// Remove the file at `path`.
    async fn remove(&self, path: &str) -> Result<()>;
}

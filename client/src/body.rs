//! Request body and upload source models.

use std::fmt::{self, Debug};
use std::path::PathBuf;

use bytes::Bytes;
use netstorage_core::{Error, Result};
use tokio::io::AsyncRead;

/// Boxed async reader for streamed request bodies.
pub type BoxReader = Box<dyn AsyncRead + Send + Sync + Unpin + 'static>;

/// Body of one outbound request attempt.
pub enum Body {
    /// No body.
    Empty,
    /// Fully buffered body of known length.
    Bytes(Bytes),
    /// Streamed body. With a known `len` the engine sets `Content-Length`
    /// explicitly; without one the transport falls back to chunked
    /// transfer encoding.
    Stream {
        /// The byte source, read exactly once, sequentially.
        reader: BoxReader,
        /// Total length, when the source exposes one.
        len: Option<u64>,
    },
}

impl Body {
    /// Body length, when known up front.
    pub fn len(&self) -> Option<u64> {
        match self {
            Body::Empty => Some(0),
            Body::Bytes(b) => Some(b.len() as u64),
            Body::Stream { len, .. } => *len,
        }
    }

    /// Whether this body carries no bytes.
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty) || self.len() == Some(0)
    }
}

impl Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Bytes(b) => write!(f, "Body::Bytes({} bytes)", b.len()),
            Body::Stream { len, .. } => write!(f, "Body::Stream(len: {len:?})"),
        }
    }
}

/// Content source for an upload.
///
/// The source is exclusively owned by the call for the duration of the
/// request. `Bytes` and `File` sources can back any number of retry
/// attempts; a `Stream` source is consumed by the first attempt and is
/// never retried.
pub enum UploadSource {
    /// In-memory content.
    Bytes(Bytes),
    /// A local file, opened (and closed) by the engine once per attempt.
    File(PathBuf),
    /// An arbitrary reader positioned at the start of unread data.
    Stream(BoxReader),
}

impl UploadSource {
    /// Wrap an async reader as a non-replayable streaming source.
    pub fn from_reader(reader: impl AsyncRead + Send + Sync + Unpin + 'static) -> Self {
        UploadSource::Stream(Box::new(reader))
    }

    /// Whether the source can produce its bytes again for another attempt.
    pub fn replayable(&self) -> bool {
        !matches!(self, UploadSource::Stream(_))
    }

    /// Produce the request body for one attempt.
    ///
    /// Takes the source out of the option for `Stream`, which can only be
    /// read once. A local file that cannot be opened fails with
    /// `LocalFileNotFound` before anything is sent.
    pub(crate) async fn body_for_attempt(source: &mut Option<UploadSource>) -> Result<Body> {
        match source {
            None => Ok(Body::Empty),
            Some(UploadSource::Bytes(b)) => Ok(Body::Bytes(b.clone())),
            Some(UploadSource::File(path)) => {
                let file = tokio::fs::File::open(&path).await.map_err(|e| {
                    Error::local_file_not_found(format!(
                        "upload source {} is not accessible",
                        path.display()
                    ))
                    .with_source(e)
                })?;
                let len = file.metadata().await.ok().map(|m| m.len());
                Ok(Body::Stream {
                    reader: Box::new(file),
                    len,
                })
            }
            Some(UploadSource::Stream(_)) => {
                let Some(UploadSource::Stream(reader)) = source.take() else {
                    unreachable!("matched as stream above")
                };
                Ok(Body::Stream { reader, len: None })
            }
        }
    }
}

impl From<Bytes> for UploadSource {
    fn from(value: Bytes) -> Self {
        UploadSource::Bytes(value)
    }
}

impl From<Vec<u8>> for UploadSource {
    fn from(value: Vec<u8>) -> Self {
        UploadSource::Bytes(value.into())
    }
}

impl From<PathBuf> for UploadSource {
    fn from(value: PathBuf) -> Self {
        UploadSource::File(value)
    }
}

impl Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadSource::Bytes(b) => write!(f, "UploadSource::Bytes({} bytes)", b.len()),
            UploadSource::File(p) => write!(f, "UploadSource::File({})", p.display()),
            UploadSource::Stream(_) => f.write_str("UploadSource::Stream"),
        }
    }
}

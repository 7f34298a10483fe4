//! The NetStorage client and its retry-driven execution engine.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{HeaderValue, Method, StatusCode, Uri};
use log::{debug, warn};
use netstorage_core::time::{now, DateTime};
use netstorage_core::{
    classify_failure, sign_headers, ApiParams, Credential, Error, Result, RetryPolicy,
    SignAlgorithm,
};
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::body::UploadSource;
use crate::send::HttpSend;

/// Client for one NetStorage storage group.
///
/// Holds only immutable state (credential, algorithm, retry budgets) plus
/// the shared transport, so concurrent calls on the same instance are
/// independent; one call's backoff never serializes another call.
///
/// Each operation runs as a single sequential pipeline: sign, send,
/// classify, retry. Dropping the returned future aborts the in-flight
/// attempt and suppresses any further retries.
#[derive(Debug, Clone)]
pub struct Client {
    http: Arc<dyn HttpSend>,
    credential: Arc<Credential>,
    algorithm: SignAlgorithm,
    read_retry: RetryPolicy,
    write_retry: RetryPolicy,
}

impl Client {
    /// Create a new client from a credential and a transport.
    pub fn new(credential: Credential, http: impl HttpSend) -> Self {
        Self {
            http: Arc::new(http),
            credential: Arc::new(credential),
            algorithm: SignAlgorithm::default(),
            read_retry: RetryPolicy::read(),
            write_retry: RetryPolicy::write(),
        }
    }

    /// Select the signing algorithm. Defaults to HMAC-SHA256.
    pub fn with_algorithm(mut self, algorithm: SignAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Override the retry budget for read-style actions.
    pub fn with_read_retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = policy;
        self
    }

    /// Override the retry budget for write-style actions.
    pub fn with_write_retry(mut self, policy: RetryPolicy) -> Self {
        self.write_retry = policy;
        self
    }

    fn build_uri(&self, path: &str) -> Result<Uri> {
        let scheme = if self.credential.use_ssl {
            "https"
        } else {
            "http"
        };
        Ok(Uri::builder()
            .scheme(scheme)
            .authority(self.credential.host.as_str())
            .path_and_query(path)
            .build()?)
    }

    /// Execute one signed request against `path`.
    ///
    /// The retry budget is selected by action class: GET requests are
    /// read-style, everything else mutates. A non-replayable upload source
    /// caps the call at a single attempt regardless of policy.
    pub async fn execute(
        &self,
        path: &str,
        params: &ApiParams,
        method: Method,
        mut source: Option<UploadSource>,
    ) -> Result<http::Response<Bytes>> {
        let path = absolute(path);
        let uri = self.build_uri(&path)?;

        let read_class = method == Method::GET;
        let replayable = source.as_ref().map_or(true, UploadSource::replayable);
        let policy = if !replayable {
            RetryPolicy::none()
        } else if read_class {
            self.read_retry
        } else {
            self.write_retry
        };

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self
                .attempt(&uri, &path, params, &method, &mut source, read_class)
                .await
            {
                Ok(resp) => {
                    debug!(
                        "{method} {path} succeeded with {} after {attempts} attempt(s)",
                        resp.status()
                    );
                    return Ok(resp);
                }
                Err(err) => match policy.next_delay(attempts, &err) {
                    Some(delay) => {
                        warn!(
                            "{method} {path} attempt {attempts}/{} failed: {err}, \
                             retrying in {delay:?}",
                            policy.max_attempts
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(err),
                },
            }
        }
    }

    /// One signed attempt: derive headers, attach body, send, classify.
    async fn attempt(
        &self,
        uri: &Uri,
        path: &str,
        params: &ApiParams,
        method: &Method,
        source: &mut Option<UploadSource>,
        read_class: bool,
    ) -> Result<http::Response<Bytes>> {
        // The signature covers the absolute path only, never scheme or host.
        let signed = sign_headers(
            &self.credential,
            self.algorithm,
            path,
            params,
            now(),
            rand::random::<u32>(),
        )?;

        let body = UploadSource::body_for_attempt(source).await?;
        // Sized bodies advertise their length up front; an unsized stream
        // goes out chunked. Bodyless requests are left to the transport.
        let body_len = match &body {
            crate::body::Body::Empty => None,
            other => other.len(),
        };

        let mut request = http::Request::builder()
            .method(method.clone())
            .uri(uri.clone())
            .body(body)?;
        signed.apply(request.headers_mut())?;
        if let Some(len) = body_len {
            request
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(len));
        }

        let resp = self.http.http_send(request).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if status == StatusCode::NOT_FOUND && read_class {
            return Err(Error::resource_not_found(format!(
                "{method} {path} returned 404, the resource does not exist"
            )));
        }

        let (parts, _) = resp.into_parts();
        Err(classify_failure(&parts, now()))
    }

    async fn read(&self, path: &str, params: ApiParams) -> Result<Bytes> {
        let resp = self.execute(path, &params, Method::GET, None).await?;
        Ok(resp.into_body())
    }

    async fn write(&self, path: &str, params: ApiParams, method: Method) -> Result<()> {
        self.execute(path, &params, method, None).await.map(|_| ())
    }

    /// List the objects directly within `path`, like `ls`.
    pub async fn dir(&self, path: &str) -> Result<Bytes> {
        self.read(path, ApiParams::dir()).await
    }

    /// Download the file at `path`.
    pub async fn download(&self, path: &str) -> Result<Bytes> {
        self.read(path, ApiParams::download()).await
    }

    /// Disk usage information for the directory at `path`.
    pub async fn du(&self, path: &str) -> Result<Bytes> {
        self.read(path, ApiParams::du()).await
    }

    /// Recursively list all objects under `path`.
    pub async fn list(&self, path: &str) -> Result<Bytes> {
        self.read(path, ApiParams::list()).await
    }

    /// Stat structure for the file, symlink or directory at `path`.
    pub async fn stat(&self, path: &str) -> Result<Bytes> {
        self.read(path, ApiParams::stat()).await
    }

    /// Delete the object at `path`.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.write(path, ApiParams::delete(), Method::PUT).await
    }

    /// Create a new explicit directory at `path`.
    pub async fn mkdir(&self, path: &str) -> Result<()> {
        self.write(path, ApiParams::mkdir(), Method::PUT).await
    }

    /// Change the modification time of the file at `path` ("touch").
    /// Defaults to the current time.
    pub async fn mtime(&self, path: &str, mtime: Option<DateTime>) -> Result<()> {
        let params = ApiParams::mtime(mtime.unwrap_or_else(now));
        self.write(path, params, Method::POST).await
    }

    /// Delete the directory at `path` including all contents.
    pub async fn quick_delete(&self, path: &str) -> Result<()> {
        self.write(path, ApiParams::quick_delete(), Method::POST)
            .await
    }

    /// Rename the file or symlink at `path` to `destination`, which must be
    /// a fully escaped path within the same storage group.
    pub async fn rename(&self, path: &str, destination: &str) -> Result<()> {
        self.write(path, ApiParams::rename(destination), Method::POST)
            .await
    }

    /// Delete the empty directory at `path`.
    pub async fn rmdir(&self, path: &str) -> Result<()> {
        self.write(path, ApiParams::rmdir(), Method::POST).await
    }

    /// Create a symbolic link at `path` pointing to `target`.
    pub async fn symlink(&self, path: &str, target: &str) -> Result<()> {
        self.write(path, ApiParams::symlink(target), Method::POST)
            .await
    }

    /// Upload content to `path`.
    ///
    /// The size parameter is derived from the source when it exposes one;
    /// `index_zip` is subject to the archive-extension policy and clears
    /// the size parameter when it survives.
    pub async fn upload(
        &self,
        path: &str,
        source: impl Into<UploadSource>,
        mtime: Option<DateTime>,
        index_zip: bool,
    ) -> Result<()> {
        let source = source.into();
        let size = match &source {
            UploadSource::Bytes(b) => Some(b.len() as u64),
            UploadSource::File(p) => Some(file_metadata(p).await?.len()),
            UploadSource::Stream(_) => None,
        };

        let mut params = ApiParams::upload(mtime, size, None, index_zip);
        params.normalize_for_path(path);

        self.execute(path, &params, Method::PUT, Some(source))
            .await
            .map(|_| ())
    }

    /// Upload a local file to `path`, deriving size and modification time
    /// from its metadata and attaching a SHA256 checksum.
    ///
    /// Fails with `LocalFileNotFound` before any network attempt when the
    /// file is not accessible.
    pub async fn upload_file(
        &self,
        path: &str,
        file: impl AsRef<Path>,
        index_zip: bool,
    ) -> Result<()> {
        let file = file.as_ref();
        let meta = file_metadata(file).await?;
        let mtime = meta.modified().ok().map(DateTime::from);
        let checksum = sha256_file(file).await?;

        let mut params = ApiParams::upload(mtime, Some(meta.len()), Some(checksum), index_zip);
        params.normalize_for_path(path);

        self.execute(
            path,
            &params,
            Method::PUT,
            Some(UploadSource::File(file.to_path_buf())),
        )
        .await
        .map(|_| ())
    }
}

fn absolute(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

async fn file_metadata(path: &Path) -> Result<std::fs::Metadata> {
    tokio::fs::metadata(path).await.map_err(|e| {
        Error::local_file_not_found(format!("upload source {} is not accessible", path.display()))
            .with_source(e)
    })
}

async fn sha256_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await.map_err(|e| {
        Error::local_file_not_found(format!("upload source {} is not accessible", path.display()))
            .with_source(e)
    })?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).await.map_err(|e| {
            Error::local_file_not_found(format!(
                "failed reading upload source {}",
                path.display()
            ))
            .with_source(e)
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hasher.finalize().to_vec())
}

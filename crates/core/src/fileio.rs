//! Retrying async file I/O used by the index.
//!
//! The index never touches `std::fs` directly for entry and persistence work;
//! it goes through a [`FileSystem`] so that tests can inject failures and so
//! that a missing file (`FsErrorCode::NotFound`) stays distinguishable from
//! every other I/O problem.

use std::io;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Classification of an I/O failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorCode {
    /// The path does not exist (`ENOENT`).
    NotFound,
    PermissionDenied,
    /// Content could not be decoded (e.g. not UTF-8).
    InvalidData,
    Other,
}

impl FsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "ENOENT",
            Self::PermissionDenied => "EACCES",
            Self::InvalidData => "EINVAL",
            Self::Other => "EIO",
        }
    }
}

/// Structured error returned by every [`FileSystem`] operation.
#[derive(Debug, Clone, Error)]
#[error("{} ({})", message, code.as_str())]
pub struct FsError {
    pub code: FsErrorCode,
    pub message: String,
}

impl FsError {
    pub fn new(code: FsErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        self.code == FsErrorCode::NotFound
    }

    fn from_io(path: &Path, err: &io::Error) -> Self {
        let code = match err.kind() {
            io::ErrorKind::NotFound => FsErrorCode::NotFound,
            io::ErrorKind::PermissionDenied => FsErrorCode::PermissionDenied,
            io::ErrorKind::InvalidData => FsErrorCode::InvalidData,
            _ => FsErrorCode::Other,
        };
        Self::new(code, format!("{}: {}", path.display(), err))
    }
}

/// Subset of file metadata the index cares about.
#[derive(Debug, Clone)]
pub struct FileStat {
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    /// Birth time; not every platform or filesystem reports it.
    pub created: Option<DateTime<Utc>>,
    pub is_file: bool,
    pub is_dir: bool,
}

/// File operations consumed by the index.
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn stat(&self, path: &Path) -> Result<FileStat, FsError>;

    async fn read_file(&self, path: &Path) -> Result<String, FsError>;

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), FsError>;

    async fn mkdir(&self, path: &Path, recursive: bool) -> Result<(), FsError>;
}

/// How often and how patiently to retry a failing operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Delay before retry `n` is `delay * n`.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 3, delay: Duration::from_millis(50) }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self { attempts: 1, delay: Duration::ZERO }
    }
}

/// [`FileSystem`] backed by `tokio::fs`.
#[derive(Debug, Clone, Default)]
pub struct TokioFileSystem {
    retry: RetryPolicy,
}

impl TokioFileSystem {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    async fn with_retry<T, F, Fut>(&self, path: &Path, op: F) -> Result<T, FsError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = io::Result<T>>,
    {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let err = FsError::from_io(path, &e);
                    if err.is_not_found()
                        || err.code == FsErrorCode::InvalidData
                        || attempt >= attempts
                    {
                        return Err(err);
                    }
                    tracing::debug!(
                        "I/O on {} failed (attempt {}/{}): {}",
                        path.display(),
                        attempt,
                        attempts,
                        e
                    );
                    tokio::time::sleep(self.retry.delay * attempt).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn stat(&self, path: &Path) -> Result<FileStat, FsError> {
        let meta = self.with_retry(path, || tokio::fs::metadata(path)).await?;
        Ok(FileStat {
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            created: meta.created().ok().map(DateTime::<Utc>::from),
            is_file: meta.is_file(),
            is_dir: meta.is_dir(),
        })
    }

    async fn read_file(&self, path: &Path) -> Result<String, FsError> {
        self.with_retry(path, || tokio::fs::read_to_string(path)).await
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), FsError> {
        self.with_retry(path, || tokio::fs::write(path, content.as_bytes())).await
    }

    async fn mkdir(&self, path: &Path, recursive: bool) -> Result<(), FsError> {
        if recursive {
            self.with_retry(path, || tokio::fs::create_dir_all(path)).await
        } else {
            self.with_retry(path, || tokio::fs::create_dir(path)).await
        }
    }
}

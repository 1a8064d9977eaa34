//! Artifact transfer into scratch temp files.
//!
//! A `FetchResult` owns its temp file: dropping it deletes the file, so every
//! exit path of the pipeline (commit, verification failure, abort) cleans up.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::error::PrecacheError;
use crate::package::FileType;

/// Default bound on a whole artifact transfer. Large archives on slow links
/// legitimately take minutes.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// One transfer to perform.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Duration,
    /// Scratch directory the temp file is created in.
    pub destination_dir: PathBuf,
}

impl DownloadRequest {
    /// Request with the registry's expected `Accept` header and default timeout.
    pub fn new(url: impl Into<String>, destination_dir: impl Into<PathBuf>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        Self {
            url: url.into(),
            headers,
            timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            destination_dir: destination_dir.into(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Creates the uniquely named temp file this request downloads into.
    pub fn create_temp_file(&self) -> Result<NamedTempFile, PrecacheError> {
        std::fs::create_dir_all(&self.destination_dir)
            .map_err(|e| PrecacheError::io(&self.destination_dir, e))?;
        let suffix = format!(".{}", FileType::from_url(&self.url).extension());
        tempfile::Builder::new()
            .prefix("precache-")
            .suffix(&suffix)
            .tempfile_in(&self.destination_dir)
            .map_err(|e| PrecacheError::io(&self.destination_dir, e))
    }
}

/// A completed transfer. The temp file lives as long as this value.
#[derive(Debug)]
pub struct FetchResult {
    file: NamedTempFile,
    status_code: u32,
}

impl FetchResult {
    pub fn new(file: NamedTempFile, status_code: u32) -> Self {
        Self { file, status_code }
    }

    pub fn local_path(&self) -> &Path {
        self.file.path()
    }

    pub fn status_code(&self) -> u32 {
        self.status_code
    }

    /// Size of the downloaded file in bytes.
    pub fn len(&self) -> Result<u64, PrecacheError> {
        self.file
            .as_file()
            .metadata()
            .map(|m| m.len())
            .map_err(|e| PrecacheError::io(self.file.path(), e))
    }

    pub fn is_empty(&self) -> Result<bool, PrecacheError> {
        Ok(self.len()? == 0)
    }

    /// Deletes the temp file now, reporting failures instead of ignoring them.
    pub fn discard(self) -> Result<(), PrecacheError> {
        let path = self.file.path().to_path_buf();
        self.file.close().map_err(|e| PrecacheError::io(path, e))
    }
}

/// Transfers artifacts to local temp files.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, request: &DownloadRequest) -> Result<FetchResult, PrecacheError>;
}

/// Maps a final HTTP status to the fetch outcome.
pub fn check_status(url: &str, status: u32) -> Result<(), PrecacheError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(PrecacheError::DownloadNotFound {
            url: url.to_string(),
            status,
        }),
        _ => Err(PrecacheError::DownloadFailed {
            url: url.to_string(),
            status,
            reason: "unexpected status".to_string(),
        }),
    }
}

/// `Fetcher` that streams the body to disk with a single libcurl GET.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlFetcher;

impl Fetcher for CurlFetcher {
    fn fetch(&self, request: &DownloadRequest) -> Result<FetchResult, PrecacheError> {
        let mut file = request.create_temp_file()?;
        let url = request.url.as_str();
        let curl_err = |e: curl::Error, status: u32| PrecacheError::DownloadFailed {
            url: url.to_string(),
            status,
            reason: e.to_string(),
        };

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(|e| curl_err(e, 0))?;
        let setup = (|| -> Result<(), curl::Error> {
            easy.follow_location(true)?;
            easy.max_redirections(10)?;
            easy.connect_timeout(Duration::from_secs(30))?;
            easy.timeout(request.timeout)?;
            easy.useragent(crate::http::user_agent())?;
            let mut list = curl::easy::List::new();
            for (k, v) in &request.headers {
                list.append(&format!("{}: {}", k.trim(), v.trim()))?;
            }
            if !request.headers.is_empty() {
                easy.http_headers(list)?;
            }
            Ok(())
        })();
        setup.map_err(|e| curl_err(e, 0))?;

        let mut write_error: Option<std::io::Error> = None;
        let performed = {
            let sink = file.as_file_mut();
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match sink.write_all(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        tracing::warn!("temp file write failed: {}", e);
                        write_error = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(|e| curl_err(e, 0))?;
            transfer.perform()
        };

        let status = easy.response_code().unwrap_or(0);
        if let Some(e) = write_error {
            return Err(PrecacheError::io(file.path(), e));
        }
        if let Err(e) = performed {
            return Err(curl_err(e, status));
        }
        check_status(url, status)?;

        file.as_file_mut()
            .flush()
            .map_err(|e| PrecacheError::io(file.path(), e))?;
        tracing::debug!(url, status, path = %file.path().display(), "download complete");
        Ok(FetchResult::new(file, status))
    }
}

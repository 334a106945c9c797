//! Binary content retrieval from the content-serving host.
//!
//! Two contracts live side by side here:
//!
//! - [`Client::fetch_as_bytes`] is strict. It behaves like every other
//!   dispatched call and returns an [`Error`] on timeout or non-2xx status.
//! - [`Client::fetch_and_store`] is best-effort. Every failure (transport
//!   error, non-2xx status, missing or unsupported content type, disk I/O)
//!   is reported as `None`, and no partial file is left behind.

use crate::{
    content::{self, Extension},
    metadata::RequestMetadata,
    Client, Error, Response, Result,
};
use futures_util::StreamExt;
use http::{header::CONTENT_TYPE, HeaderMap, Method};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Why a best-effort download produced no file.
#[derive(Debug, thiserror::Error)]
enum StoreFailure {
    #[error(transparent)]
    Request(#[from] Error),

    #[error("filename {0:?} is empty or contains a path component")]
    InvalidFilename(String),

    #[error("unsupported content type {0:?}")]
    UnsupportedContentType(Option<String>),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreFailure {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreFailure::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Client {
    /// Downloads content and returns its bytes.
    ///
    /// # Errors
    ///
    /// Same as any dispatched call: [`Error::Timeout`], [`Error::Api`],
    /// [`Error::Http`], [`Error::Network`].
    pub async fn fetch_as_bytes(&self, path: impl Into<String>) -> Result<Vec<u8>> {
        let metadata = RequestMetadata::new(Method::GET, path).on_data_host();
        self.call_bytes(metadata).await.map(Response::into_data)
    }

    /// Downloads content into `dir`, naming the file `<filename><extension>`
    /// with the extension derived from the response's `Content-Type`.
    ///
    /// Returns the path of the written file, or `None` if anything went wrong.
    /// An existing file at the destination is replaced. The body is streamed
    /// to a `.part` file that is renamed into place only once complete; each
    /// call uses its own `.part` file, so concurrent stores of the same name
    /// never interleave (the last rename wins).
    ///
    /// `filename` must be a bare name: an empty name, `.`, `..`, or one
    /// containing a path separator yields `None` without sending a request.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), line_messaging::Error> {
    /// let client = line_messaging::Client::new("channel-access-token")?;
    ///
    /// match client
    ///     .fetch_and_store("/v2/bot/message/325708/content", "/tmp/line", "325708")
    ///     .await
    /// {
    ///     Some(path) => println!("saved to {}", path.display()),
    ///     None => println!("content unavailable"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_and_store(
        &self,
        path: &str,
        dir: impl AsRef<Path>,
        filename: &str,
    ) -> Option<PathBuf> {
        match self.try_fetch_and_store(path, dir.as_ref(), filename).await {
            Ok(stored) => {
                tracing::debug!(path = %path, file = %stored.display(), "Stored content");
                Some(stored)
            }
            Err(reason) => {
                tracing::debug!(path = %path, reason = %reason, "Content not stored");
                None
            }
        }
    }

    async fn try_fetch_and_store(
        &self,
        path: &str,
        dir: &Path,
        filename: &str,
    ) -> std::result::Result<PathBuf, StoreFailure> {
        if !is_bare_filename(filename) {
            return Err(StoreFailure::InvalidFilename(filename.to_string()));
        }

        let metadata = RequestMetadata::new(Method::GET, path).on_data_host();
        let response = self.dispatch(&metadata).await?;

        let extension = content::classify_headers(response.headers())
            .ok_or_else(|| StoreFailure::UnsupportedContentType(content_type(response.headers())))?;

        let target = destination(dir, filename, extension);
        let partial = target.with_extension(partial_extension(extension, next_store_id()));

        let written = self
            .cancellable(path, stream_to_file(path, response, &partial))
            .await
            .map_err(StoreFailure::from)
            .and_then(|streamed| streamed);

        let bytes_written = match written {
            Ok(bytes_written) => bytes_written,
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(e);
            }
        };
        tracing::debug!(file = %partial.display(), bytes = bytes_written, "Content streamed");

        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(StoreFailure::io(&target, e));
        }

        Ok(target)
    }
}

fn destination(dir: &Path, filename: &str, extension: Extension) -> PathBuf {
    dir.join(format!("{filename}{extension}"))
}

static STORE_ID: AtomicU64 = AtomicU64::new(0);

fn next_store_id() -> u64 {
    STORE_ID.fetch_add(1, Ordering::Relaxed)
}

fn is_bare_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\'])
}

/// `(png, 7)` -> `png.7.part`, so `name.png` becomes `name.png.7.part`.
fn partial_extension(extension: Extension, store_id: u64) -> String {
    format!("{}.{store_id}.part", extension.as_str().trim_start_matches('.'))
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Streams the response body into a freshly created file.
async fn stream_to_file(
    path: &str,
    response: reqwest::Response,
    file_path: &Path,
) -> std::result::Result<u64, StoreFailure> {
    let file = File::create(file_path)
        .await
        .map_err(|e| StoreFailure::io(file_path, e))?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::from_transport(path, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| StoreFailure::io(file_path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| StoreFailure::io(file_path, e))?;

    Ok(bytes_written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_and_partial_names() {
        let dir = Path::new("/tmp/content");
        let target = destination(dir, "325708", Extension::Png);
        assert_eq!(target, Path::new("/tmp/content/325708.png"));

        let partial = target.with_extension(partial_extension(Extension::Png, 3));
        assert_eq!(partial, Path::new("/tmp/content/325708.png.3.part"));
    }

    #[test]
    fn test_dotted_filename_keeps_its_stem() {
        let dir = Path::new("/tmp");
        let target = destination(dir, "report.v2", Extension::Pdf);
        assert_eq!(target, Path::new("/tmp/report.v2.pdf"));
        assert_eq!(
            target.with_extension(partial_extension(Extension::Pdf, 0)),
            Path::new("/tmp/report.v2.pdf.0.part")
        );
    }

    #[test]
    fn test_store_ids_are_unique() {
        let first = next_store_id();
        let second = next_store_id();
        assert_ne!(first, second);
    }

    #[test]
    fn test_bare_filename() {
        assert!(is_bare_filename("325708"));
        assert!(is_bare_filename("report.v2"));
        for name in ["", ".", "..", "../x", "a/b", "a\\b", "/abs"] {
            assert!(!is_bare_filename(name), "{name:?}");
        }
    }
}

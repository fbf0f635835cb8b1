//! HTTP adapters for the remote ports.
//!
//! None of these clients retries. Timeouts come from the shared
//! `reqwest::Client` built by [`ServiceConfig`](crate::config::ServiceConfig).

mod attachment_fetcher;
mod background_remover;
mod url_shortener;

pub use attachment_fetcher::HttpAttachmentFetcher;
pub use background_remover::HttpBackgroundRemover;
pub use url_shortener::HttpUrlShortener;

use bk_core::{BinaryFile, MimeType, NetworkError};
use reqwest::header::CONTENT_TYPE;

pub(crate) fn transport_error(url: &str, err: reqwest::Error) -> NetworkError {
    NetworkError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    }
}

pub(crate) fn ensure_success(url: &str, response: &reqwest::Response) -> Result<(), NetworkError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(NetworkError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Wrap a successful response body as a file typed from its content type.
pub(crate) async fn file_from_response(
    url: &str,
    response: reqwest::Response,
    name: &str,
) -> Result<BinaryFile, NetworkError> {
    ensure_success(url, &response)?;

    let mime = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(MimeType::from)
        .unwrap_or_else(MimeType::octet_stream);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| NetworkError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    Ok(BinaryFile::new(name, mime, bytes))
}

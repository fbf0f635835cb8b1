use thiserror::Error;

/// Failure of a remote HTTP call (attachment download, background removal,
/// URL shortening).
///
/// 远程 HTTP 调用失败。没有重试，调用方自行决定如何处理。
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The server answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The response arrived but its body could not be used.
    #[error("malformed response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl NetworkError {
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            NetworkError::Status { url, .. }
            | NetworkError::Transport { url, .. }
            | NetworkError::Decode { url, .. } => url,
        }
    }
}

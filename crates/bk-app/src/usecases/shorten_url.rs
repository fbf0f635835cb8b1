//! 生成短链接的用例

use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use bk_core::ports::UrlShortenerPort;
use bk_core::NetworkError;

/// Error type for URL shortening failures.
#[derive(Debug, thiserror::Error)]
pub enum ShortenUrlError {
    #[error("URL to shorten is empty")]
    EmptyUrl,

    #[error("Failed to shorten URL: {0}")]
    Network(#[from] NetworkError),
}

/// Use case for shortening a URL through the backend.
pub struct ShortenUrlUseCase {
    shortener: Arc<dyn UrlShortenerPort>,
}

impl ShortenUrlUseCase {
    pub fn new(shortener: Arc<dyn UrlShortenerPort>) -> Self {
        Self { shortener }
    }

    /// Execute the use case.
    ///
    /// # Returns / 返回值
    /// - `Ok(short_url)` on success
    /// - `Err(ShortenUrlError::EmptyUrl)` for blank input, without calling the backend
    pub async fn execute(&self, long_url: &str) -> Result<String, ShortenUrlError> {
        let span = info_span!("usecase.shorten_url.execute");

        async {
            let long_url = long_url.trim();
            if long_url.is_empty() {
                return Err(ShortenUrlError::EmptyUrl);
            }

            let short_url = self.shortener.shorten(long_url).await?;
            info!(short_url = %short_url, "URL shortened");
            Ok(short_url)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockShortener {
        calls: AtomicUsize,
        should_fail: bool,
    }

    #[async_trait]
    impl UrlShortenerPort for MockShortener {
        async fn shorten(&self, long_url: &str) -> Result<String, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                return Err(NetworkError::Status {
                    url: "http://svc/api/shorten_url".to_string(),
                    status: 503,
                });
            }
            Ok(format!("https://s.ly/{}", long_url.len()))
        }
    }

    #[tokio::test]
    async fn test_shorten_trims_and_returns_short_url() {
        let shortener = Arc::new(MockShortener {
            calls: AtomicUsize::new(0),
            should_fail: false,
        });
        let uc = ShortenUrlUseCase::new(shortener.clone());

        let short = uc.execute("  https://example.com  ").await.unwrap();

        assert_eq!(short, "https://s.ly/19");
        assert_eq!(shortener.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_url_is_rejected_without_calling_backend() {
        let shortener = Arc::new(MockShortener {
            calls: AtomicUsize::new(0),
            should_fail: false,
        });
        let uc = ShortenUrlUseCase::new(shortener.clone());

        let err = uc.execute("   ").await.unwrap_err();

        assert!(matches!(err, ShortenUrlError::EmptyUrl));
        assert_eq!(shortener.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_network_error_propagates() {
        let uc = ShortenUrlUseCase::new(Arc::new(MockShortener {
            calls: AtomicUsize::new(0),
            should_fail: true,
        }));

        let err = uc.execute("https://example.com").await.unwrap_err();

        assert!(matches!(err, ShortenUrlError::Network(_)));
    }
}

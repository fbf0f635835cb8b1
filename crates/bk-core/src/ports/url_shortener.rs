use crate::errors::NetworkError;

#[async_trait::async_trait]
pub trait UrlShortenerPort: Send + Sync {
    async fn shorten(&self, long_url: &str) -> Result<String, NetworkError>;
}

use tracing::debug;

use bk_core::ports::AttachmentFetcherPort;
use bk_core::{BinaryFile, NetworkError};

use super::{file_from_response, transport_error};

/// Downloads attachments from the host's time-limited URLs.
pub struct HttpAttachmentFetcher {
    client: reqwest::Client,
}

impl HttpAttachmentFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl AttachmentFetcherPort for HttpAttachmentFetcher {
    async fn fetch(&self, url: &str, name: &str) -> Result<BinaryFile, NetworkError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let file = file_from_response(url, response, name).await?;
        debug!(name, mime = %file.mime(), size = file.size(), "Attachment downloaded");
        Ok(file)
    }
}

use reqwest::multipart::{Form, Part};
use reqwest::Url;
use tracing::debug;

use bk_core::ports::BackgroundRemoverPort;
use bk_core::{BinaryFile, NetworkError};

use super::{file_from_response, transport_error};

/// Client for `POST /api/remove_image_bg` (multipart field `image`).
pub struct HttpBackgroundRemover {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpBackgroundRemover {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    fn image_part(file: &BinaryFile) -> Part {
        let part = || Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string());
        // reqwest rejects unparsable MIME strings; send the part untyped then.
        part().mime_str(file.mime().as_str()).unwrap_or_else(|_| part())
    }
}

#[async_trait::async_trait]
impl BackgroundRemoverPort for HttpBackgroundRemover {
    async fn remove_background(
        &self,
        file: &BinaryFile,
        name: &str,
    ) -> Result<BinaryFile, NetworkError> {
        let url = self.endpoint.as_str();
        let form = Form::new().part("image", Self::image_part(file));

        debug!(name, size = file.size(), "Uploading image for background removal");
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        file_from_response(url, response, name).await
    }
}

use crate::errors::NetworkError;
use crate::file::BinaryFile;

/// Downloads attachment bytes from a host-issued, time-limited URL.
///
/// 通过宿主提供的临时地址下载附件内容。
#[async_trait::async_trait]
pub trait AttachmentFetcherPort: Send + Sync {
    /// GET `url` and wrap the body as a file called `name`, typed from the
    /// response content type.
    async fn fetch(&self, url: &str, name: &str) -> Result<BinaryFile, NetworkError>;
}

use crate::errors::NetworkError;
use crate::file::BinaryFile;

/// Remote image service that strips the background from one image.
///
/// 远程去背景服务。
#[async_trait::async_trait]
pub trait BackgroundRemoverPort: Send + Sync {
    /// Upload `file` and return the processed payload, named `name`.
    async fn remove_background(&self, file: &BinaryFile, name: &str)
        -> Result<BinaryFile, NetworkError>;
}

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MimeType(pub String);

impl MimeType {
    pub fn octet_stream() -> Self {
        Self("application/octet-stream".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `image/*` check used to filter host attachments.
    pub fn is_image(&self) -> bool {
        self.0.starts_with("image")
    }

    /// Part after the first `/`, without parameters (`image/png; q=1` -> `png`).
    pub fn subtype(&self) -> Option<&str> {
        self.0
            .split_once('/')
            .map(|(_, rest)| rest.split(';').next().unwrap_or(rest).trim())
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MimeType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MimeType(s.to_string()))
    }
}

impl From<&str> for MimeType {
    fn from(s: &str) -> Self {
        MimeType(s.to_string())
    }
}

/// A named, typed binary payload.
///
/// 带名称和 MIME 类型的二进制文件，既用于预览也用于重新上传。
///
/// The byte size is always derived from the buffer, so size and content can
/// never drift apart. Cloning shares the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFile {
    name: String,
    mime: MimeType,
    bytes: Bytes,
}

impl BinaryFile {
    pub fn new(name: impl Into<String>, mime: MimeType, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &MimeType {
        &self.mime
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Same content under a different name and type.
    pub fn renamed(&self, name: impl Into<String>, mime: MimeType) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes: self.bytes.clone(),
        }
    }
}

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Human readable size shown under each preview (`512 B`, `1.50 KB`, ...).
pub fn format_file_size(size_in_bytes: u64) -> String {
    if size_in_bytes < KB {
        format!("{} B", size_in_bytes)
    } else if size_in_bytes < MB {
        format!("{:.2} KB", size_in_bytes as f64 / KB as f64)
    } else if size_in_bytes < GB {
        format!("{:.2} MB", size_in_bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", size_in_bytes as f64 / GB as f64)
    }
}

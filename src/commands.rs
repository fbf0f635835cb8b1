//! Stand-alone commands run by the `basekit` binary.
//! 命令行子命令实现

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use image::ImageFormat;
use tracing::info;

use bk_app::usecases::ShortenUrlUseCase;
use bk_core::config::AppConfig;
use bk_core::{BinaryFile, MimeType, BACKGROUND_REMOVAL_SUBTYPES};

use crate::bootstrap::wiring::{build_background_remover, build_url_shortener};

/// Shorten `long_url` through the configured backend.
pub async fn shorten(config: &AppConfig, long_url: &str) -> anyhow::Result<String> {
    let use_case = ShortenUrlUseCase::new(build_url_shortener(config)?);
    Ok(use_case.execute(long_url).await?)
}

/// Remove the background of a local image file.
///
/// The MIME type is derived from the file extension. The result is written to
/// `output`, or next to the input as `<stem>.nobg.<ext>` where `<ext>` follows
/// the type the service returned.
///
/// 去除本地图片背景，返回输出文件路径。
pub async fn remove_background(
    config: &AppConfig,
    input: &Path,
    output: Option<PathBuf>,
) -> anyhow::Result<PathBuf> {
    let format = ImageFormat::from_path(input)
        .with_context(|| format!("Cannot determine image type of {}", input.display()))?;
    let mime = MimeType::from(format.to_mime_type());
    if !mime
        .subtype()
        .is_some_and(|subtype| BACKGROUND_REMOVAL_SUBTYPES.contains(&subtype))
    {
        bail!("{} images are not supported for background removal", mime);
    }

    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    let file = BinaryFile::new(name.clone(), mime, bytes);

    let remover = build_background_remover(config)?;
    let result = remover.remove_background(&file, &name).await?;

    let output = output.unwrap_or_else(|| default_output_path(input, result.mime()));
    tokio::fs::write(&output, result.bytes())
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(output = %output.display(), size = result.size(), "Background removed");
    Ok(output)
}

/// `<dir>/<stem>.nobg.<ext>`; the extension comes from `mime` when it names a
/// known image format, otherwise from the input file.
pub fn default_output_path(input: &Path, mime: &MimeType) -> PathBuf {
    let ext = ImageFormat::from_mime_type(mime.as_str())
        .and_then(|format| format.extensions_str().first().copied())
        .or_else(|| input.extension().and_then(|e| e.to_str()))
        .unwrap_or("png");
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    input.with_file_name(format!("{stem}.nobg.{ext}"))
}

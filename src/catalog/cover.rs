use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// File extension for a cover image `Content-Type`.
pub fn extension_for(content_type: &str) -> &'static str {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("png") {
        "png"
    } else if ct.contains("webp") {
        "webp"
    } else {
        "jpg"
    }
}

/// Download `url` to `dir/cover_square.<ext>`.
#[tracing::instrument(skip(http, dir), fields(dir = %dir.display()))]
pub async fn download_cover(http: &reqwest::Client, url: &str, dir: &Path) -> ReelResult<PathBuf> {
    let resp = http.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(ReelError::adapter(
            "deezer",
            format!("cover download returned HTTP {}", resp.status()),
        ));
    }
    let ext = extension_for(
        resp.headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default(),
    );
    let bytes = resp.bytes().await?;
    let path = dir.join(format!("cover_square.{ext}"));
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("write cover '{}'", path.display()))?;
    Ok(path)
}

/// Shrink to fit within `size`x`size`, keeping aspect, into `<stem>_resized.jpg`.
///
/// Smaller images keep their dimensions.
pub fn resize_cover(path: &Path, size: u32) -> ReelResult<PathBuf> {
    if size == 0 {
        return Err(ReelError::validation("cover size must be > 0"));
    }
    let img = image::open(path).with_context(|| format!("open cover '{}'", path.display()))?;
    let img = if img.width() > size || img.height() > size {
        img.resize(size, size, image::imageops::FilterType::Lanczos3)
    } else {
        img
    };
    let rgb = img.to_rgb8();

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cover");
    let out = path.with_file_name(format!("{stem}_resized.jpg"));
    let file = std::fs::File::create(&out)
        .with_context(|| format!("create '{}'", out.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, 95);
    rgb.write_with_encoder(encoder)
        .with_context(|| format!("encode '{}'", out.display()))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/cover.rs"]
mod tests;

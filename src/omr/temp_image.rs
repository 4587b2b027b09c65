// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-request temporary image files
//!
//! Uploaded bytes are materialised on disk because engines consume a file
//! path. Each upload gets its own uniquely named file that lives exactly as long
//! as the request handling it.

use bytes::Bytes;
use image::ImageFormat;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// Prefix for temp files created by the node
const TEMP_PREFIX: &str = "omr-upload-";

/// Suffix used when the upload's format cannot be recognised
const FALLBACK_SUFFIX: &str = ".jpg";

/// Detect image format from magic bytes
///
/// Returns `None` for content that does not look like a supported image.
/// Nothing is rejected on this basis; the result only names the temp file.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.len() < 4 {
        return None;
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => {
            Some(ImageFormat::WebP)
        }

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Some(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Some(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Some(ImageFormat::Tiff),

        _ => None,
    }
}

/// File suffix (with leading dot) for the given upload bytes
pub fn suffix_for(bytes: &[u8]) -> &'static str {
    match detect_format(bytes) {
        Some(ImageFormat::Png) => ".png",
        Some(ImageFormat::Jpeg) => ".jpg",
        Some(ImageFormat::WebP) => ".webp",
        Some(ImageFormat::Gif) => ".gif",
        Some(ImageFormat::Bmp) => ".bmp",
        Some(ImageFormat::Tiff) => ".tiff",
        _ => FALLBACK_SUFFIX,
    }
}

/// Temporary copy of an uploaded image, removed when the request completes
///
/// Call [`ScopedTempImage::close`] on the normal path so deletion errors can be
/// reported. If the value is dropped instead (early return, panic, or the
/// request future being cancelled on client disconnect) the file is still
/// removed, with any error ignored.
#[derive(Debug)]
pub struct ScopedTempImage {
    file: NamedTempFile,
}

impl ScopedTempImage {
    /// Write `bytes` to a fresh temp file inside `dir` (system temp dir if `None`)
    pub fn create(dir: Option<&Path>, bytes: &[u8]) -> io::Result<Self> {
        let mut builder = Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(suffix_for(bytes));

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        file.write_all(bytes)?;
        file.flush()?;

        debug!(
            "Wrote {} byte upload to {}",
            bytes.len(),
            file.path().display()
        );

        Ok(Self { file })
    }

    /// [`ScopedTempImage::create`] on the blocking pool
    pub async fn create_async(dir: Option<PathBuf>, bytes: Bytes) -> io::Result<Self> {
        tokio::task::spawn_blocking(move || Self::create(dir.as_deref(), &bytes))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }

    /// Location handed to the engine
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file, reporting failure
    pub fn close(self) -> io::Result<()> {
        let path = self.file.path().to_path_buf();
        self.file.close()?;
        debug!("Removed temp upload {}", path.display());
        Ok(())
    }

    /// [`ScopedTempImage::close`] on the blocking pool
    pub async fn close_async(self) -> io::Result<()> {
        tokio::task::spawn_blocking(move || self.close())
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }
}

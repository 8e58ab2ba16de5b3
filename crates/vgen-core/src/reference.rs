//! Reference image preparation.
//!
//! The service rejects reference images whose dimensions differ from the
//! requested frame size, so the image is scaled to cover the frame and
//! center-cropped before upload. PNG input stays PNG; every other format is
//! re-encoded as JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageFormat;
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

use crate::job::FrameSize;

const JPEG_QUALITY: u8 = 95;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to read reference image {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode reference image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode reference image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("target size {0}x{1} is empty")]
    EmptyTarget(u32, u32),
}

/// A reference image ready for upload: already sized to the request's frame.
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ReferenceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceImage")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ReferenceImage {
    /// Read `path` and fit it to `size`.
    pub fn load(path: &Path, size: FrameSize) -> Result<Self, ReferenceError> {
        let raw = fs::read(path).map_err(|source| ReferenceError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let (width, height) = size.dimensions();
        let bytes = prepare_reference(&raw, width, height)?;
        let content_type = match image::guess_format(&bytes) {
            Ok(ImageFormat::Png) => "image/png",
            _ => "image/jpeg",
        };
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reference".to_string());
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }
}

/// Scale `image_bytes` to cover `target_width` x `target_height` and crop the
/// excess evenly from both sides. Pure: no retries, no state.
pub fn prepare_reference(
    image_bytes: &[u8],
    target_width: u32,
    target_height: u32,
) -> Result<Vec<u8>, ReferenceError> {
    if target_width == 0 || target_height == 0 {
        return Err(ReferenceError::EmptyTarget(target_width, target_height));
    }
    let format = image::guess_format(image_bytes).map_err(ReferenceError::Decode)?;
    let img = image::load_from_memory_with_format(image_bytes, format)
        .map_err(ReferenceError::Decode)?;
    let filled = img.resize_to_fill(target_width, target_height, FilterType::Triangle);

    let mut out = Cursor::new(Vec::new());
    if format == ImageFormat::Png {
        filled
            .write_to(&mut out, ImageFormat::Png)
            .map_err(ReferenceError::Encode)?;
    } else {
        let rgb = filled.to_rgb8();
        JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
            .encode_image(&rgb)
            .map_err(ReferenceError::Encode)?;
    }
    Ok(out.into_inner())
}

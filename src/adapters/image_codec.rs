use crate::domain::InlineImage;
use crate::utils::error::Result;
use base64::{engine::general_purpose, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

pub const JPEG_MIME: &str = "image/jpeg";

/// Downscales photos to a bounded width and re-encodes them as JPEG.
#[derive(Debug, Clone, Copy)]
pub struct ImageCompressor {
    max_width: u32,
    quality: u8,
}

impl ImageCompressor {
    pub fn new(max_width: u32, quality: u8) -> Self {
        Self {
            max_width: max_width.max(1),
            quality: quality.clamp(1, 100),
        }
    }

    /// Narrow images keep their size; only the encoding changes.
    pub fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(bytes)?;
        let (width, height) = (decoded.width(), decoded.height());

        let resized = if width > self.max_width {
            let scaled_height = ((height as u64 * self.max_width as u64) / width as u64).max(1);
            decoded.resize_exact(self.max_width, scaled_height as u32, FilterType::Triangle)
        } else {
            decoded
        };

        // JPEG 不支援 alpha，先轉 RGB
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
        let mut encoded = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut encoded, self.quality))?;

        tracing::debug!(
            "Compressed {}x{} image ({} bytes) to {}x{} ({} bytes)",
            width,
            height,
            bytes.len(),
            rgb.width(),
            rgb.height(),
            encoded.len()
        );

        Ok(encoded)
    }

    /// Compresses and base64-encodes for embedding in a JSON request.
    pub fn to_inline(&self, bytes: &[u8]) -> Result<InlineImage> {
        let jpeg = self.compress(bytes)?;
        Ok(InlineImage {
            mime_type: JPEG_MIME,
            base64_data: general_purpose::STANDARD.encode(&jpeg),
        })
    }
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::new(800, 70)
    }
}

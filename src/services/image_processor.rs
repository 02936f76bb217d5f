// src/services/image_processor.rs
use crate::errors::BrandforgeError;
use crate::models::EncodedImage;
use base64::{Engine as _, engine::general_purpose};
use image::{GenericImageView, ImageFormat as ImgFormat};

// Reference images ride inside the generation request as base64, so they are
// capped well below the upstream inline-data limit.
const MAX_SOURCE_DIMENSION: u32 = 4096;
const MAX_REFERENCE_DIMENSION: u32 = 1024;

pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_image(&self, data: &[u8]) -> Result<(u32, u32), BrandforgeError> {
        let img = image::load_from_memory(data)
            .map_err(|e| BrandforgeError::ImageProcessing(format!("Invalid image format: {}", e)))?;

        let (width, height) = img.dimensions();

        if width > MAX_SOURCE_DIMENSION || height > MAX_SOURCE_DIMENSION {
            return Err(BrandforgeError::ImageProcessing(format!(
                "Image dimensions exceed {}x{}",
                MAX_SOURCE_DIMENSION, MAX_SOURCE_DIMENSION
            )));
        }

        Ok((width, height))
    }

    /// Turns an uploaded reference image into the transport shape the brief
    /// embeds: validated, downscaled to at most 1024 px on the long edge, and
    /// re-encoded as PNG so the payload is predictable.
    pub fn prepare_reference(&self, data: &[u8]) -> Result<EncodedImage, BrandforgeError> {
        self.validate_image(data)?;

        let img = image::load_from_memory(data)
            .map_err(|e| BrandforgeError::ImageProcessing(format!("Failed to load image: {}", e)))?;

        let (width, height) = img.dimensions();
        let img = if width > MAX_REFERENCE_DIMENSION || height > MAX_REFERENCE_DIMENSION {
            let ratio = MAX_REFERENCE_DIMENSION as f32 / width.max(height) as f32;
            let new_width = ((width as f32 * ratio) as u32).max(1);
            let new_height = ((height as f32 * ratio) as u32).max(1);
            img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
        } else {
            img
        };

        let mut output = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut output), ImgFormat::Png)
            .map_err(|e| {
                BrandforgeError::ImageProcessing(format!("Failed to encode reference image: {}", e))
            })?;

        Ok(EncodedImage {
            mime_type: "image/png".to_string(),
            data: general_purpose::STANDARD.encode(&output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([120, 40, 200]),
        ));
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), ImgFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_validate_image_accepts_png() {
        let processor = ImageProcessor::new();
        let (w, h) = processor.validate_image(&png_bytes(64, 48)).unwrap();
        assert_eq!((w, h), (64, 48));
    }

    #[test]
    fn test_validate_image_rejects_garbage() {
        let processor = ImageProcessor::new();
        assert!(processor.validate_image(b"not an image").is_err());
    }

    #[test]
    fn test_prepare_reference_keeps_small_images() {
        let processor = ImageProcessor::new();
        let encoded = processor.prepare_reference(&png_bytes(200, 100)).unwrap();
        assert_eq!(encoded.mime_type, "image/png");

        let bytes = general_purpose::STANDARD.decode(&encoded.data).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.dimensions(), (200, 100));
    }

    #[test]
    fn test_prepare_reference_downscales_large_images() {
        let processor = ImageProcessor::new();
        let encoded = processor.prepare_reference(&png_bytes(2048, 1024)).unwrap();

        let bytes = general_purpose::STANDARD.decode(&encoded.data).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        let (w, h) = img.dimensions();
        assert!(w <= 1024 && h <= 1024, "still {}x{}", w, h);
    }
}

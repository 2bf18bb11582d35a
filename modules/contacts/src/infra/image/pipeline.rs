use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};

use crate::domain::ports::{ImageError, ImageProcessor};

/// [`ImageProcessor`] over the `image` crate.
///
/// Orientation correction keeps the picture lossless (PNG); the resize step
/// produces the final JPEG.
#[derive(Debug, Clone)]
pub struct ImagePipeline {
    jpeg_quality: u8,
}

impl ImagePipeline {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }

    fn encode_jpeg(&self, image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
        let mut out = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut out, self.jpeg_quality);
        DynamicImage::ImageRgb8(image.to_rgb8())
            .write_with_encoder(encoder)
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(out)
    }
}

impl Default for ImagePipeline {
    fn default() -> Self {
        Self::new(80)
    }
}

/// Target size when the longer side becomes `max`. A square maps to
/// `max x max`. Neither side drops below one pixel.
pub fn scaled_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (max.max(1), max.max(1));
    }
    let ratio = width as f64 / height as f64;
    let (w, h) = if ratio > 1.0 {
        (max as f64, max as f64 / ratio)
    } else {
        (max as f64 * ratio, max as f64)
    };
    ((w as u32).max(1), (h as u32).max(1))
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))
}

impl ImageProcessor for ImagePipeline {
    fn correct_orientation(&self, bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageError::Io(e.to_string()))?
            .into_decoder()
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
        let mut image =
            DynamicImage::from_decoder(decoder).map_err(|e| ImageError::Decode(e.to_string()))?;
        image.apply_orientation(orientation);
        Self::encode_png(&image)
    }

    fn resize(&self, bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, ImageError> {
        let image = decode(bytes)?;
        let (w, h) = scaled_dimensions(image.width(), image.height(), max_dimension);
        let resized = image.resize_exact(w, h, FilterType::Triangle);
        self.encode_jpeg(&resized)
    }

    fn encode_inline(&self, bytes: &[u8]) -> String {
        BASE64_STANDARD.encode(bytes)
    }

    /// Line breaks and other whitespace inside `data` are ignored.
    fn decode_inline(&self, data: &str) -> Result<Vec<u8>, ImageError> {
        let filtered: String = data.chars().filter(|c| !c.is_whitespace()).collect();
        BASE64_STANDARD
            .decode(filtered)
            .map_err(|e| ImageError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        ImagePipeline::encode_png(&DynamicImage::new_rgb8(width, height)).unwrap()
    }

    #[test]
    fn scaling_keeps_aspect_ratio() {
        assert_eq!(scaled_dimensions(1000, 500, 500), (500, 250));
        assert_eq!(scaled_dimensions(300, 600, 500), (250, 500));
        assert_eq!(scaled_dimensions(640, 640, 500), (500, 500));
        assert_eq!(scaled_dimensions(100, 50, 500), (500, 250));
        assert_eq!(scaled_dimensions(5000, 1, 500), (500, 1));
    }

    #[test]
    fn resize_produces_jpeg_of_target_size() {
        let pipeline = ImagePipeline::default();
        let out = pipeline.resize(&png(800, 400), 500).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (500, 250));
    }

    #[test]
    fn orientation_without_metadata_is_identity() {
        let pipeline = ImagePipeline::default();
        let out = pipeline.correct_orientation(&png(30, 20)).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 20));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let pipeline = ImagePipeline::default();
        assert!(matches!(
            pipeline.resize(b"definitely not a picture", 500),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn inline_data_tolerates_line_breaks() {
        let pipeline = ImagePipeline::default();
        let encoded = pipeline.encode_inline(b"hello picture");
        assert!(!encoded.contains('\n'));
        let wrapped = format!("{}\n{}", &encoded[..8], &encoded[8..]);
        assert_eq!(pipeline.decode_inline(&wrapped).unwrap(), b"hello picture");
    }
}

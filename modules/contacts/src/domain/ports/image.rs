use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no picture was taken")]
    Cancelled,

    #[error("could not read image: {0}")]
    Io(String),

    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not encode image: {0}")]
    Encode(String),
}

/// Device camera (or any other picture source).
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn capture_image(&self) -> Result<Vec<u8>, ImageError>;
}

/// Picture utilities used before a photo is stored inline in a contact.
pub trait ImageProcessor: Send + Sync {
    /// Apply the EXIF orientation so the pixels are upright.
    fn correct_orientation(&self, bytes: &[u8]) -> Result<Vec<u8>, ImageError>;

    /// Scale so the longer side equals `max_dimension`, keeping the aspect ratio.
    fn resize(&self, bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, ImageError>;

    fn encode_inline(&self, bytes: &[u8]) -> String;

    fn decode_inline(&self, data: &str) -> Result<Vec<u8>, ImageError>;
}

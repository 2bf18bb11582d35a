use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::ports::{ImageError, ImageSource};

/// Stands in for the device camera by reading a picture file.
///
/// With no file selected a capture is [`ImageError::Cancelled`]; an
/// unreadable file maps to [`ImageError::PermissionDenied`] or
/// [`ImageError::Io`].
#[derive(Default)]
pub struct FileImageSource {
    path: RwLock<Option<PathBuf>>,
}

impl FileImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the file returned by the next captures; `None` clears it.
    pub fn point_at(&self, path: Option<PathBuf>) {
        *self.path.write() = path;
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn capture_image(&self) -> Result<Vec<u8>, ImageError> {
        let path = self.path.read().clone().ok_or(ImageError::Cancelled)?;
        debug!(path = %path.display(), "Reading picture");
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => ImageError::PermissionDenied,
            _ => ImageError::Io(e.to_string()),
        })
    }
}

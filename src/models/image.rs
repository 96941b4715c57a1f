//! Image payloads submitted for verification.

use crate::{Error, Result};
use std::path::Path;

/// Content type used when the format cannot be determined.
const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// One image of a verification pair.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name sent in the multipart part.
    pub file_name: String,
    /// MIME content type.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Creates an image from raw parts.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads an image from disk, detecting its content type.
    ///
    /// The type comes from the file extension, falling back to sniffing the
    /// leading bytes. Files of unknown type are still returned so the
    /// verification client can reject them with the usual message.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::OperationFailed {
                operation: "read_image".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        let content_type = detect_content_type(path, &bytes);

        tracing::debug!(file = %file_name, content_type = %content_type, size = bytes.len(), "Loaded image");

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Size of the image in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Returns true when the content type indicates an image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type
            .trim()
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

fn detect_content_type(path: &Path, bytes: &[u8]) -> String {
    image::ImageFormat::from_path(path)
        .or_else(|_| image::guess_format(bytes))
        .map_or_else(
            |_| UNKNOWN_CONTENT_TYPE.to_string(),
            |format| format.to_mime_type().to_string(),
        )
}

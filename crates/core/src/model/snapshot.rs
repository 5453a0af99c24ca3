use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::SessionId;

/// Prefix of the data URL carried in `Snapshot::image_data`.
pub const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FrameError {
    #[error("frame has zero width or height")]
    EmptyGeometry,

    #[error("frame dimensions overflow")]
    Overflow,

    #[error("invalid frame shape: expected {expected} bytes, got {actual}")]
    Shape { expected: usize, actual: usize },
}

/// One RGB frame grabbed from a live video feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl VideoFrame {
    /// # Errors
    ///
    /// Returns `FrameError` when the buffer is not exactly `width * height * 3` bytes.
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyGeometry);
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or(FrameError::Overflow)?;
        if rgb.len() != expected {
            return Err(FrameError::Shape {
                expected,
                actual: rgb.len(),
            });
        }

        Ok(Self { width, height, rgb })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }
}

/// A compressed webcam snapshot ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub session_id: SessionId,
    pub captured_at: DateTime<Utc>,
    /// `data:image/jpeg;base64,...`
    pub image_data: String,
}

// Image payloads are large and sensitive; keep them out of debug output.
impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("session_id", &self.session_id)
            .field("captured_at", &self.captured_at)
            .field("image_bytes", &self.image_data.len())
            .finish()
    }
}

//! Camera capability exposed by the environment.

use async_trait::async_trait;
use exam_core::model::VideoFrame;

use crate::error::CameraError;

/// Grants or refuses access to a live video feed.
#[async_trait]
pub trait CameraSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `CameraError::Denied` when the user refuses access and
    /// `CameraError::Unavailable` when no device can be opened.
    async fn request_access(&self) -> Result<Box<dyn VideoFeed>, CameraError>;
}

/// A granted, live video feed.
pub trait VideoFeed: Send {
    /// Grabs the current frame at the feed's native size.
    ///
    /// # Errors
    ///
    /// Returns `CameraError` if the frame cannot be read.
    fn grab_frame(&mut self) -> Result<VideoFrame, CameraError>;
}

/// Camera that always grants access and yields a moving gradient.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticCamera {
    width: u32,
    height: u32,
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(320, 240)
    }
}

impl SyntheticCamera {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[async_trait]
impl CameraSource for SyntheticCamera {
    async fn request_access(&self) -> Result<Box<dyn VideoFeed>, CameraError> {
        Ok(Box::new(GradientFeed {
            width: self.width,
            height: self.height,
            frame: 0,
        }))
    }
}

struct GradientFeed {
    width: u32,
    height: u32,
    frame: u32,
}

impl VideoFeed for GradientFeed {
    fn grab_frame(&mut self) -> Result<VideoFrame, CameraError> {
        self.frame = self.frame.wrapping_add(1);
        let shift = self.frame;
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                rgb.push((x.wrapping_add(shift) & 0xff) as u8);
                rgb.push((y & 0xff) as u8);
                rgb.push((x ^ y) as u8);
            }
        }
        VideoFrame::new(self.width, self.height, rgb)
            .map_err(|err| CameraError::Unavailable(err.to_string()))
    }
}

/// Camera whose access request is always refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedCamera;

#[async_trait]
impl CameraSource for DeniedCamera {
    async fn request_access(&self) -> Result<Box<dyn VideoFeed>, CameraError> {
        Err(CameraError::Denied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn synthetic_frames_have_native_geometry() {
        let mut feed = SyntheticCamera::new(4, 3).request_access().await.unwrap();
        let frame = feed.grab_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (4, 3));
        assert_ne!(feed.grab_frame().unwrap(), frame);
    }

    #[tokio::test]
    async fn denied_camera_refuses() {
        assert!(matches!(
            DeniedCamera.request_access().await,
            Err(CameraError::Denied)
        ));
    }
}

use derive_more::Display;
use image::DynamicImage;

#[derive(Debug, Display, Clone, PartialEq)]
pub enum CameraError {
    #[display(fmt = "camera permission denied")]
    PermissionDenied,
    #[display(fmt = "camera unavailable: {}", _0)]
    Unavailable(String),
}

impl std::error::Error for CameraError {}

/// A capture device owned by the kiosk session. `start` is called when a
/// worker has been identified and `stop` on every way out of confirmation.
pub trait Camera {
    fn start(&mut self) -> Result<(), CameraError>;
    fn is_ready(&self) -> bool;
    /// Current still frame, if the live feed has produced one.
    fn grab_frame(&mut self) -> Option<DynamicImage>;
    fn stop(&mut self);
}

/// Camera whose frames are streamed in by the kiosk browser.
#[derive(Default)]
pub struct BrowserCamera {
    live: bool,
    latest: Option<DynamicImage>,
}

impl BrowserCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a frame from the browser feed. Returns false while the camera
    /// is released; such frames are dropped.
    pub fn push_frame(&mut self, frame: DynamicImage) -> bool {
        if !self.live {
            return false;
        }
        self.latest = Some(frame);
        true
    }

    #[cfg(test)]
    pub fn is_live(&self) -> bool {
        self.live
    }
}

impl Camera for BrowserCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        self.live = true;
        self.latest = None;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.live && self.latest.is_some()
    }

    fn grab_frame(&mut self) -> Option<DynamicImage> {
        self.latest.clone()
    }

    fn stop(&mut self) {
        self.live = false;
        self.latest = None;
    }
}

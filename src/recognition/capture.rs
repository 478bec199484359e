//! Screen capture seam.
//!
//! The platform capture primitive lives behind [`ScreenSource`]; failure is
//! reported as an empty frame, never a panic, so a dropped capture costs one
//! detection cycle at most.

use std::path::Path;

use image::RgbImage;
use log::warn;

use crate::error::{PickerError, PickerResult};
use crate::recognition::region::Region;

/// Pixel buffer handed to the recognition pipeline.
pub type Frame = RgbImage;

/// On-demand pixel snapshots of the screen.
pub trait ScreenSource: Send {
    /// Capture one region. An empty (zero-area) frame signals failure.
    fn capture(&mut self, region: &Region) -> Frame;

    /// Capture the whole screen. An empty frame signals failure.
    fn capture_full(&mut self) -> Frame;

    /// Screen extents in pixels.
    fn size(&self) -> (u32, u32);
}

/// Serves crops of a single decoded screenshot.
///
/// Stands in for the live capture primitive in the CLI dry-run modes and in
/// tests; the "screen" is whatever image it was built from.
pub struct StillImageSource {
    frame: Frame,
}

impl StillImageSource {
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }

    pub fn from_file(path: &Path) -> PickerResult<Self> {
        let image = image::open(path).map_err(|source| PickerError::ScreenshotLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(image.to_rgb8()))
    }
}

impl ScreenSource for StillImageSource {
    fn capture(&mut self, region: &Region) -> Frame {
        if region.is_empty() || !region.fits_within(self.frame.width(), self.frame.height()) {
            warn!(
                "capture region {}x{}+{}+{} outside {}x{} frame",
                region.width,
                region.height,
                region.left,
                region.top,
                self.frame.width(),
                self.frame.height()
            );
            return Frame::new(0, 0);
        }
        image::imageops::crop_imm(&self.frame, region.left, region.top, region.width, region.height)
            .to_image()
    }

    fn capture_full(&mut self) -> Frame {
        self.frame.clone()
    }

    fn size(&self) -> (u32, u32) {
        self.frame.dimensions()
    }
}

/// Collaborator contracts: the live camera and the edge extractor
///
/// Both are injected at construction. The core never talks to real
/// hardware or a vision library directly; it only consumes these traits.

use chrono::{DateTime, Utc};
use image::{DynamicImage, GrayImage};

use crate::error::Result;

/// One still frame captured from the live source.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Encoded still image (typically JPEG), stored as-is
    pub bytes: Vec<u8>,
    /// Pixel width of the capture
    pub width: u32,
    /// Pixel height of the capture
    pub height: u32,
    /// When the frame was captured
    pub captured_at: DateTime<Utc>,
}

/// Supplies live frames and camera metadata.
///
/// `current_frame_size` returns `None` until the source has produced a
/// first frame; the overlay defers rendering until a size is known.
pub trait CaptureSource {
    /// Intrinsic size of the live preview, or None if not yet streaming
    fn current_frame_size(&self) -> Option<(u32, u32)>;

    /// Whether the currently selected camera faces the user. Only used
    /// to stamp new captures; overlay mirroring reads the flag stored
    /// with the reference photo instead.
    fn is_front_facing(&self) -> bool;

    /// Capture the current frame as an encoded still.
    fn snapshot(&self) -> Result<Snapshot>;
}

/// A binary/greyscale image marking detected boundaries in a source
/// photo. Same pixel dimensions as the photo it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMask(GrayImage);

impl EdgeMask {
    pub fn new(mask: GrayImage) -> Self {
        EdgeMask(mask)
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    /// True when no pixel is marked; the engine treats an all-black
    /// mask like a failed extraction.
    pub fn is_blank(&self) -> bool {
        self.0.pixels().all(|p| p.0[0] == 0)
    }
}

/// Pure image → edge-mask capability, stateless between calls.
///
/// Implementations may take arbitrarily long; the overlay engine bounds
/// the wait and proceeds without a guide on timeout.
#[allow(async_fn_in_trait)]
pub trait EdgeExtractor {
    async fn extract(&self, image: &DynamicImage) -> Result<EdgeMask>;
}

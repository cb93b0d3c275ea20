/// Aspect-fit geometry for the overlay
///
/// The live preview is letterboxed or pillarboxed inside its display
/// container; the overlay must draw inside the rectangle the camera is
/// actually filling, not the raw container. These are pure functions so
/// the placement math can be tested without any pixels involved.

use cgmath::Vector2;

/// The largest rectangle with the video's aspect ratio that fits inside
/// the container, centered. All coordinates are in container pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub origin: Vector2<f32>,
    pub width: f32,
    pub height: f32,
}

impl FitRect {
    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    /// Map an x coordinate to its mirror image around this rectangle's
    /// own vertical centerline. Used when the reference photo came from
    /// a front camera and the preview is mirrored by the UI.
    pub fn mirror_x(&self, x: f32) -> f32 {
        2.0 * self.origin.x + self.width - x
    }
}

/// Compute where the video content actually sits inside the container.
///
/// Returns None when either video dimension is zero (the source has not
/// produced a frame yet); callers defer and retry later. A degenerate
/// container yields a zero-area rectangle rather than None, since the
/// video itself is fine.
pub fn aspect_fit(video: (u32, u32), container: (u32, u32)) -> Option<FitRect> {
    let (vw, vh) = (video.0 as f32, video.1 as f32);
    let (cw, ch) = (container.0 as f32, container.1 as f32);

    if vw <= 0.0 || vh <= 0.0 {
        return None;
    }
    if cw <= 0.0 || ch <= 0.0 {
        return Some(FitRect {
            origin: Vector2::new(0.0, 0.0),
            width: 0.0,
            height: 0.0,
        });
    }

    let video_aspect = vw / vh;
    let container_aspect = cw / ch;

    let (width, height) = if video_aspect > container_aspect {
        // Video is wider: fit to width, letterbox top/bottom
        (cw, cw / video_aspect)
    } else {
        // Video is taller: fit to height, pillarbox left/right
        (ch * video_aspect, ch)
    };

    Some(FitRect {
        origin: Vector2::new((cw - width) / 2.0, (ch - height) / 2.0),
        width,
        height,
    })
}

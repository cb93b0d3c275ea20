use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::geometry::FitRect;
use crate::capture::EdgeMask;

/// The overlay drawing surface.
///
/// A straight-alpha RGBA buffer the host composites over its live
/// preview, owned exclusively by the overlay engine. Mirrors what the
/// original did with a transparent 2D canvas stacked on the video
/// element: a dashed capture-bounds outline plus the edge mask blended
/// in `screen` mode at reduced opacity.
pub struct OverlayCanvas {
    surface: RgbaImage,
}

impl OverlayCanvas {
    pub fn new() -> Self {
        OverlayCanvas {
            surface: RgbaImage::new(0, 0),
        }
    }

    /// Resize to the container and wipe to fully transparent.
    pub fn reset(&mut self, width: u32, height: u32) {
        if self.surface.dimensions() != (width, height) {
            self.surface = RgbaImage::new(width, height);
        } else {
            self.clear();
        }
    }

    /// Wipe to fully transparent without resizing.
    pub fn clear(&mut self) {
        for pixel in self.surface.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// True when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.surface.pixels().all(|p| p.0[3] == 0)
    }

    /// Stroke a dashed rectangle marking the capture bounds.
    pub fn stroke_dashed_rect(
        &mut self,
        rect: &FitRect,
        color: [u8; 3],
        line_width: u32,
        dash: [u32; 2],
    ) {
        let x0 = rect.x().round() as i64;
        let y0 = rect.y().round() as i64;
        let w = rect.width.round() as i64;
        let h = rect.height.round() as i64;
        let lw = line_width as i64;
        if w <= 0 || h <= 0 {
            return;
        }

        let rgba = Rgba([color[0], color[1], color[2], 255]);

        // Top and bottom edges, dash phase measured along x
        for dx in 0..w {
            if !dash_on(dx, dash) {
                continue;
            }
            for t in 0..lw {
                self.put(x0 + dx, y0 + t, rgba);
                self.put(x0 + dx, y0 + h - 1 - t, rgba);
            }
        }

        // Left and right edges, dash phase measured along y
        for dy in 0..h {
            if !dash_on(dy, dash) {
                continue;
            }
            for t in 0..lw {
                self.put(x0 + t, y0 + dy, rgba);
                self.put(x0 + w - 1 - t, y0 + dy, rgba);
            }
        }
    }

    /// Composite the edge mask into the fit rectangle.
    ///
    /// The mask is scaled to the rectangle, optionally mirrored about
    /// the rectangle's own vertical centerline, and blended in `screen`
    /// mode at the given opacity so edges stay visible against both
    /// bright and dark live backgrounds.
    pub fn draw_mask(&mut self, mask: &EdgeMask, rect: &FitRect, mirrored: bool, opacity: f32) {
        let target_w = rect.width.round() as u32;
        let target_h = rect.height.round() as u32;
        if target_w == 0 || target_h == 0 {
            return;
        }

        let scaled = imageops::resize(mask.as_image(), target_w, target_h, FilterType::Triangle);
        let opacity = opacity.clamp(0.0, 1.0);

        for (mx, my, pixel) in scaled.enumerate_pixels() {
            // Map through the pixel center so the mirrored mapping stays
            // exact for integer rectangle origins
            let cx = rect.x() + mx as f32 + 0.5;
            let fx = if mirrored { rect.mirror_x(cx) } else { cx };
            let px = fx.floor() as i64;
            let py = (rect.y() + my as f32).floor() as i64;

            self.blend_screen(px, py, pixel.0[0], opacity);
        }
    }

    /// One pixel of `screen` blending with straight-alpha compositing,
    /// the same math a 2D canvas applies for
    /// `globalCompositeOperation = "screen"` with `globalAlpha` set.
    fn blend_screen(&mut self, x: i64, y: i64, value: u8, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let (x, y) = (x as u32, y as u32);

        let dst = self.surface.get_pixel(x, y).0;
        let da = dst[3] as f32 / 255.0;
        let sa = alpha;
        let sc = value as f32 / 255.0;

        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }

        let mut out = [0u8; 4];
        for c in 0..3 {
            let dc = dst[c] as f32 / 255.0;
            let blended = 1.0 - (1.0 - dc) * (1.0 - sc); // screen
            let co = sa * (1.0 - da) * sc + sa * da * blended + (1.0 - sa) * da * dc;
            out[c] = ((co / out_a) * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;

        self.surface.put_pixel(x, y, Rgba(out));
    }

    fn put(&mut self, x: i64, y: i64, pixel: Rgba<u8>) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        self.surface.put_pixel(x as u32, y as u32, pixel);
    }
}

impl Default for OverlayCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn dash_on(pos: i64, dash: [u32; 2]) -> bool {
    let period = (dash[0] + dash[1]) as i64;
    if period == 0 {
        return true;
    }
    pos % period < dash[0] as i64
}

use image::{imageops, DynamicImage, GrayImage, Luma};

use crate::capture::{EdgeExtractor, EdgeMask};
use crate::error::Result;

/// A self-contained edge extractor: grayscale, Gaussian blur, Sobel
/// gradient magnitude, threshold.
///
/// The engine treats extraction as a black box and most deployments will
/// inject something stronger (the original used Canny), but this keeps
/// the crate usable with no external vision dependency. Thresholds
/// default to the original's Canny pair.
#[derive(Debug, Clone, Copy)]
pub struct SobelExtractor {
    /// Blur radius applied before differentiation, to suppress noise
    pub blur_sigma: f32,
    /// Gradient magnitudes at or above this are edges
    pub threshold: f32,
}

impl Default for SobelExtractor {
    fn default() -> Self {
        SobelExtractor {
            blur_sigma: 1.4,
            threshold: 150.0,
        }
    }
}

impl SobelExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    fn gradient_mask(&self, gray: &GrayImage) -> GrayImage {
        let (w, h) = gray.dimensions();
        let mut mask = GrayImage::new(w, h);
        if w < 3 || h < 3 {
            return mask;
        }

        let at = |x: u32, y: u32| gray.get_pixel(x, y).0[0] as f32;

        // 3x3 Sobel, border pixels left unmarked
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
                let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                    - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));

                let magnitude = (gx * gx + gy * gy).sqrt();
                if magnitude >= self.threshold {
                    mask.put_pixel(x, y, Luma([255]));
                }
            }
        }
        mask
    }
}

impl EdgeExtractor for SobelExtractor {
    async fn extract(&self, image: &DynamicImage) -> Result<EdgeMask> {
        let gray = image.to_luma8();
        let blurred = imageops::blur(&gray, self.blur_sigma);
        Ok(EdgeMask::new(self.gradient_mask(&blurred)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Half black, half white, split at `split_x`.
    fn step_image(w: u32, h: u32, split_x: u32) -> DynamicImage {
        let mut img = GrayImage::new(w, h);
        for (x, _, p) in img.enumerate_pixels_mut() {
            p.0[0] = if x < split_x { 0 } else { 255 };
        }
        DynamicImage::ImageLuma8(img)
    }

    #[tokio::test]
    async fn test_step_edge_is_detected() {
        let mask = SobelExtractor::new()
            .extract(&step_image(64, 64, 32))
            .await
            .unwrap();

        assert_eq!((mask.width(), mask.height()), (64, 64));
        assert!(!mask.is_blank());
        // Edge pixels cluster around the step column
        assert_eq!(mask.as_image().get_pixel(32, 32).0[0], 255);
        // Flat regions away from the step stay unmarked
        assert_eq!(mask.as_image().get_pixel(8, 32).0[0], 0);
        assert_eq!(mask.as_image().get_pixel(56, 32).0[0], 0);
    }

    #[tokio::test]
    async fn test_flat_image_yields_blank_mask() {
        let flat = DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 32, Luma([90])));
        let mask = SobelExtractor::new().extract(&flat).await.unwrap();
        assert!(mask.is_blank());
    }

    #[tokio::test]
    async fn test_tiny_image_does_not_panic() {
        let tiny = DynamicImage::ImageLuma8(GrayImage::new(2, 2));
        let mask = SobelExtractor::new().extract(&tiny).await.unwrap();
        assert!(mask.is_blank());
    }
}

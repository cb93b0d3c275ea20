use std::time::Duration;

use super::canvas::OverlayCanvas;
use super::geometry::aspect_fit;
use crate::capture::{EdgeExtractor, EdgeMask};
use crate::state::data::Photo;
use crate::state::settings::Settings;

/// Where the engine is in the reference-mask lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    /// No reference mask, nothing drawn.
    Idle,
    /// Edge extraction is in flight for the current reference.
    MaskPending,
    /// A mask is held and drawn on render.
    MaskReady,
    /// User toggled the overlay off. The canvas is cleared but a held
    /// mask is retained so toggling back on needs no recomputation.
    Disabled,
}

/// The overlay alignment engine.
///
/// Takes a reference photo, derives an edge mask from it through the
/// injected extractor, and projects that mask onto the live preview
/// geometry. The engine owns the overlay canvas exclusively.
///
/// Mirroring is decided solely by the flag stored with the reference
/// photo at capture time. Switching the live camera afterwards must not
/// flip the overlay, because the preview the user sees is mirrored (or
/// not) according to how the reference was shot.
pub struct OverlayEngine {
    settings: Settings,
    phase: OverlayPhase,
    mask: Option<EdgeMask>,
    reference_front_camera: bool,
    /// Generation counter for extraction requests. A completion only
    /// installs its mask if no newer request has been issued since.
    request_seq: u64,
    canvas: OverlayCanvas,
}

impl OverlayEngine {
    pub fn new(settings: Settings) -> Self {
        OverlayEngine {
            settings,
            phase: OverlayPhase::Idle,
            mask: None,
            reference_front_camera: false,
            request_seq: 0,
            canvas: OverlayCanvas::new(),
        }
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    pub fn is_enabled(&self) -> bool {
        self.phase != OverlayPhase::Disabled
    }

    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    pub fn canvas(&self) -> &OverlayCanvas {
        &self.canvas
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Flip the overlay on or off. Returns the new enabled state.
    ///
    /// Disabling clears the visible canvas but keeps the mask; enabling
    /// with a held mask goes straight back to ready (the caller should
    /// render; nothing is recomputed).
    pub fn toggle(&mut self) -> bool {
        if self.phase == OverlayPhase::Disabled {
            self.phase = if self.mask.is_some() {
                OverlayPhase::MaskReady
            } else {
                OverlayPhase::Idle
            };
            true
        } else {
            self.phase = OverlayPhase::Disabled;
            self.canvas.clear();
            false
        }
    }

    /// Point the overlay at a new reference photo (or at nothing).
    ///
    /// With a photo, the stored bytes are decoded and handed to the
    /// extractor under the configured time bound. Failure, timeout, or a
    /// blank mask are recoverable: the overlay is simply left without a
    /// guide (logged, never surfaced as a hard error), matching the rule
    /// that alignment trouble must not block capture.
    ///
    /// A request that is superseded by a newer `set_reference` before it
    /// completes has its result discarded.
    pub async fn set_reference<E: EdgeExtractor>(&mut self, photo: Option<&Photo>, extractor: &E) {
        let token = self.next_token();

        let Some(photo) = photo else {
            // Explicitly no reference: drop the mask and clear
            self.mask = None;
            self.canvas.clear();
            if self.phase != OverlayPhase::Disabled {
                self.phase = OverlayPhase::Idle;
            }
            return;
        };

        if self.phase != OverlayPhase::Disabled {
            self.phase = OverlayPhase::MaskPending;
        }

        let image = match image::load_from_memory(&photo.image_bytes) {
            Ok(image) => image,
            Err(e) => {
                eprintln!("⚠️  Could not decode reference photo {}: {e}", photo.id);
                self.extraction_failed(token);
                return;
            }
        };

        let bound = Duration::from_secs(self.settings.extraction_timeout_secs);
        match tokio::time::timeout(bound, extractor.extract(&image)).await {
            Ok(Ok(mask)) if !mask.is_blank() => {
                self.install_mask(token, mask, photo.from_front_camera);
            }
            Ok(Ok(_)) => {
                eprintln!("⚠️  No edges detected in reference photo {}", photo.id);
                self.extraction_failed(token);
            }
            Ok(Err(e)) => {
                eprintln!("⚠️  Edge extraction failed for photo {}: {e}", photo.id);
                self.extraction_failed(token);
            }
            Err(_) => {
                let e = crate::error::SnapError::ExtractionTimeout(
                    self.settings.extraction_timeout_secs,
                );
                eprintln!("⚠️  {e}; continuing without a guide");
                self.extraction_failed(token);
            }
        }
    }

    /// Re-derive the screen-space transform and redraw.
    ///
    /// `live` is the intrinsic size of the preview (None until the
    /// source streams) and `container` the display surface size. Returns
    /// true if something was drawn; false means the call was deferred
    /// (no mask, disabled, or geometry not ready) and the caller should
    /// simply retry on the next layout change or tick.
    ///
    /// The mask and mirroring flag are read at render time, not at
    /// trigger time, so a reference switch between trigger and render
    /// can never paint a stale mask.
    pub fn render(&mut self, live: Option<(u32, u32)>, container: (u32, u32)) -> bool {
        if self.phase != OverlayPhase::MaskReady {
            return false;
        }
        let Some(mask) = &self.mask else {
            return false;
        };
        let Some(rect) = live.and_then(|video| aspect_fit(video, container)) else {
            return false;
        };

        self.canvas.reset(container.0, container.1);
        self.canvas.stroke_dashed_rect(
            &rect,
            self.settings.outline_color,
            self.settings.outline_width,
            self.settings.outline_dash,
        );
        self.canvas.draw_mask(
            mask,
            &rect,
            self.reference_front_camera,
            self.settings.overlay_opacity,
        );
        true
    }

    /// Wipe the visible canvas without touching the held mask.
    pub fn clear_canvas(&mut self) {
        self.canvas.clear();
    }

    // ========== Internals ==========

    fn next_token(&mut self) -> u64 {
        self.request_seq += 1;
        self.request_seq
    }

    /// Accept an extraction result if it is still the latest request.
    /// Returns false when the result was discarded as stale.
    fn install_mask(&mut self, token: u64, mask: EdgeMask, from_front_camera: bool) -> bool {
        if token != self.request_seq {
            println!("↩️  Discarding stale edge mask (request {token} superseded)");
            return false;
        }
        self.mask = Some(mask);
        self.reference_front_camera = from_front_camera;
        if self.phase != OverlayPhase::Disabled {
            self.phase = OverlayPhase::MaskReady;
        }
        true
    }

    /// Failure path shared by decode errors, extractor errors, blank
    /// masks, and timeouts: back to no-guide unless superseded.
    fn extraction_failed(&mut self, token: u64) {
        if token != self.request_seq {
            return;
        }
        self.mask = None;
        self.canvas.clear();
        if self.phase != OverlayPhase::Disabled {
            self.phase = OverlayPhase::Idle;
        }
    }
}

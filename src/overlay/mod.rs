/// Overlay alignment module
///
/// Everything needed to project a reference photo's edges onto the live
/// preview:
/// - Aspect-fit placement math (geometry.rs)
/// - The CPU drawing surface and blending (canvas.rs)
/// - The reference/mask state machine (engine.rs)
/// - A built-in Sobel extractor for hosts without their own (sobel.rs)

pub mod canvas;
pub mod engine;
pub mod geometry;
pub mod sobel;

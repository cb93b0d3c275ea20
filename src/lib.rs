//! EdgySnapper core: rephotograph the same subject over time.
//!
//! Shots are organized into named projects as ordered photo series, and
//! the detected edges of a reference frame are projected onto the live
//! viewfinder so a new photo can be lined up with previous ones.
//!
//! The crate is UI-free. A host supplies the camera and the edge
//! detector through the [`capture::CaptureSource`] and
//! [`capture::EdgeExtractor`] traits, hands [`app::SnapperApp`] user
//! actions, and composites the overlay canvas over its preview.
//! Persistence is an SQLite catalog ([`state::store::PhotoStore`]).

pub mod app;
pub mod bus;
pub mod capture;
pub mod error;
pub mod overlay;
pub mod state;

pub use app::SnapperApp;
pub use bus::{Notification, NotificationBus};
pub use capture::{CaptureSource, EdgeExtractor, EdgeMask, Snapshot};
pub use error::{Result, SnapError};
pub use overlay::engine::{OverlayEngine, OverlayPhase};
pub use overlay::sobel::SobelExtractor;
pub use state::data::{Photo, Project};
pub use state::series::{Direction, SeriesController};
pub use state::settings::{Settings, WrapPolicy};
pub use state::store::PhotoStore;

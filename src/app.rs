use std::rc::Rc;

use crate::bus::{Notification, NotificationBus};
use crate::capture::{CaptureSource, EdgeExtractor};
use crate::error::{Result, SnapError};
use crate::overlay::engine::OverlayEngine;
use crate::state::data::{Photo, Project};
use crate::state::series::{Direction, SeriesController};
use crate::state::settings::Settings;
use crate::state::store::PhotoStore;

/// Name of the project created on first run (or when the last project
/// is deleted), so capture always has somewhere to land.
pub const DEFAULT_PROJECT_NAME: &str = "Default Project";

/// The application coordinator.
///
/// Owns the series controller, the overlay engine and the injected
/// collaborators, and wires them together the way the UI tier expects:
/// adding a photo makes it the new alignment reference, navigating
/// re-references whatever the cursor lands on, switching projects
/// reloads the series and re-derives (or clears) the overlay.
///
/// A host drives it with user actions plus two periodic inputs:
/// `set_container_size` whenever the preview layout changes, and `tick`
/// to tolerate late-arriving layout changes while a mask is shown.
pub struct SnapperApp<C: CaptureSource, E: EdgeExtractor> {
    store: Rc<PhotoStore>,
    bus: Rc<NotificationBus>,
    series: SeriesController,
    overlay: OverlayEngine,
    capture: C,
    extractor: E,
    /// Display container size, in pixels
    container: (u32, u32),
}

impl<C: CaptureSource, E: EdgeExtractor> SnapperApp<C, E> {
    pub fn new(store: PhotoStore, capture: C, extractor: E, settings: Settings) -> Self {
        let store = Rc::new(store);
        let bus = Rc::new(NotificationBus::new());
        let series =
            SeriesController::new(Rc::clone(&store), Rc::clone(&bus), settings.wrap_policy);

        SnapperApp {
            store,
            bus,
            series,
            overlay: OverlayEngine::new(settings),
            capture,
            extractor,
            container: (0, 0),
        }
    }

    /// Select the most recently used project, creating the default one
    /// on first run.
    pub async fn init(&mut self) -> Result<()> {
        let projects = self.projects()?;
        match projects.first() {
            Some(project) => {
                let id = project.id;
                self.select_project(Some(id)).await?;
            }
            None => {
                self.create_project(DEFAULT_PROJECT_NAME).await?;
            }
        }
        println!(
            "📷 EdgySnapper core ready: {} project(s), \"{}\" active",
            self.projects()?.len(),
            self.series
                .active_project()
                .map(|p| p.name.as_str())
                .unwrap_or("none")
        );
        Ok(())
    }

    // ========== Projects ==========

    /// All projects, most recently modified first.
    pub fn projects(&self) -> Result<Vec<Project>> {
        let mut projects = self.store.list_projects()?;
        projects.sort_by(|a, b| b.last_modified_at.cmp(&a.last_modified_at));
        Ok(projects)
    }

    /// Create a project and make it active. Its series is empty, so the
    /// overlay clears.
    pub async fn create_project(&mut self, name: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SnapError::EmptyName);
        }

        let id = self.store.create_project(name)?;
        self.select_project(Some(id)).await?;
        println!("✅ Project \"{name}\" created");
        Ok(id)
    }

    /// Switch the active project (or clear the selection). Reloads the
    /// series and points the overlay at the new current photo, if any.
    pub async fn select_project(&mut self, project_id: Option<i64>) -> Result<()> {
        let project = match project_id {
            Some(id) => Some(self.store.get_project(id)?),
            None => None,
        };

        self.bus.publish(&Notification::ProjectChanged {
            project: project.clone(),
        });
        self.series.set_active_project(project);
        self.refresh_reference().await;
        Ok(())
    }

    /// Delete the active project and everything in it, then fall back to
    /// the most recent remaining project (or recreate the default).
    pub async fn delete_current_project(&mut self) -> Result<()> {
        let project = self
            .series
            .active_project()
            .cloned()
            .ok_or(SnapError::NoActiveProject)?;

        self.store.delete_project(project.id)?;
        println!("🗑️  Deleted project \"{}\" and its photos", project.name);

        match self.projects()?.first() {
            Some(next) => {
                let id = next.id;
                self.select_project(Some(id)).await?;
            }
            None => {
                self.create_project(DEFAULT_PROJECT_NAME).await?;
            }
        }
        Ok(())
    }

    // ========== Capture & navigation ==========

    /// Grab the current frame, persist it into the active project, and
    /// make it the new alignment reference.
    pub async fn capture_photo(&mut self) -> Result<Photo> {
        if self.series.active_project().is_none() {
            return Err(SnapError::NoActiveProject);
        }

        let snapshot = self.capture.snapshot()?;
        let photo = self
            .series
            .add_photo(&snapshot, self.capture.is_front_facing())?;

        // "Added" means this exact photo is the new reference
        self.overlay
            .set_reference(Some(&photo), &self.extractor)
            .await;
        self.render_overlay();
        Ok(photo)
    }

    /// Step the series cursor and re-reference the photo it lands on.
    pub async fn navigate(&mut self, direction: Direction) {
        self.series.navigate(direction);
        self.refresh_reference().await;
    }

    /// Jump to a photo by index (out of range is ignored).
    pub async fn select_photo(&mut self, index: usize) {
        self.series.select_index(index);
        self.refresh_reference().await;
    }

    /// Delete the photo at an index and re-reference the cursor photo.
    pub async fn delete_photo_at(&mut self, index: usize) -> Result<()> {
        self.series.delete_at(index)?;
        self.refresh_reference().await;
        Ok(())
    }

    /// Delete the photo under the cursor.
    pub async fn delete_current_photo(&mut self) -> Result<()> {
        self.series.delete_current()?;
        self.refresh_reference().await;
        Ok(())
    }

    // ========== Overlay ==========

    /// Flip the overlay on/off. Returns the new enabled state.
    pub fn toggle_overlay(&mut self) -> bool {
        let enabled = self.overlay.toggle();
        if enabled {
            self.render_overlay();
        }
        enabled
    }

    /// The host's display surface changed size.
    pub fn set_container_size(&mut self, width: u32, height: u32) {
        self.container = (width, height);
        self.bus.publish(&Notification::LayoutChanged);
        self.render_overlay();
    }

    /// Periodic redraw while a mask is held, to pick up late layout
    /// changes (the original redrew ten times a second).
    pub fn tick(&mut self) {
        if self.overlay.has_mask() {
            self.render_overlay();
        }
    }

    fn render_overlay(&mut self) -> bool {
        let drawn = self
            .overlay
            .render(self.capture.current_frame_size(), self.container);
        if drawn {
            self.bus.publish(&Notification::OverlayRenderRequested);
        }
        drawn
    }

    /// Re-derive the overlay reference from series state: the cursor
    /// photo if one is selected, else the most recent photo, else none.
    async fn refresh_reference(&mut self) {
        let reference = self
            .series
            .current_photo()
            .cloned()
            .or_else(|| self.series.all_photos().pop());

        self.overlay
            .set_reference(reference.as_ref(), &self.extractor)
            .await;
        if reference.is_none() {
            self.bus.publish(&Notification::OverlayCleared);
        }
        self.render_overlay();
    }

    // ========== Accessors ==========

    pub fn series(&self) -> &SeriesController {
        &self.series
    }

    pub fn overlay(&self) -> &OverlayEngine {
        &self.overlay
    }

    pub fn bus(&self) -> &Rc<NotificationBus> {
        &self.bus
    }

    pub fn store(&self) -> &PhotoStore {
        &self.store
    }

    pub fn capture_source(&self) -> &C {
        &self.capture
    }

    pub fn capture_source_mut(&mut self) -> &mut C {
        &mut self.capture
    }
}

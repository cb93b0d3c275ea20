use std::rc::Rc;

use crate::bus::{Notification, NotificationBus};
use crate::capture::Snapshot;
use crate::error::{Result, SnapError};
use crate::state::data::{Photo, Project};
use crate::state::settings::WrapPolicy;
use crate::state::store::PhotoStore;

/// Navigation direction through the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// The SeriesController owns the in-memory ordered photo list for the
/// active project and the navigation cursor. It is the single writer of
/// the cursor; every other component reads via accessors or reacts to
/// bus notifications.
///
/// Every mutation persists through the store first, then reloads the
/// list and treats the reloaded rows as authoritative, so the in-memory
/// view can never drift from what is on disk.
pub struct SeriesController {
    store: Rc<PhotoStore>,
    bus: Rc<NotificationBus>,
    wrap_policy: WrapPolicy,
    active_project: Option<Project>,
    photos: Vec<Photo>,
    cursor: Option<usize>,
}

impl SeriesController {
    pub fn new(
        store: Rc<PhotoStore>,
        bus: Rc<NotificationBus>,
        wrap_policy: WrapPolicy,
    ) -> Self {
        SeriesController {
            store,
            bus,
            wrap_policy,
            active_project: None,
            photos: Vec::new(),
            cursor: None,
        }
    }

    /// Switch to another project (or to none) and reload its photos.
    /// The cursor starts at the most recent photo.
    pub fn set_active_project(&mut self, project: Option<Project>) {
        self.active_project = project;
        self.reload();
        self.emit_series_changed();
    }

    /// Persist a freshly captured photo into the active project and move
    /// the cursor onto it. Emits `SeriesChanged` followed by `PhotoAdded`.
    pub fn add_photo(&mut self, snapshot: &Snapshot, from_front_camera: bool) -> Result<Photo> {
        let project = self
            .active_project
            .clone()
            .ok_or(SnapError::NoActiveProject)?;

        self.store.add_photo(
            project.id,
            &snapshot.bytes,
            snapshot.width,
            snapshot.height,
            from_front_camera,
            snapshot.captured_at,
        )?;

        // Reload and land on the newest photo (seq is increasing, so it
        // is always the last element)
        self.reload();
        self.emit_series_changed();

        let photo = self
            .current_photo()
            .cloned()
            .ok_or(SnapError::NotFound("photo"))?;
        self.bus.publish(&Notification::PhotoAdded {
            photo: photo.clone(),
            project,
        });
        Ok(photo)
    }

    /// Move the cursor one step. No-op on an empty series; end-of-list
    /// behavior follows the configured wrap policy.
    pub fn navigate(&mut self, direction: Direction) {
        let n = self.photos.len();
        if n == 0 {
            return;
        }
        let cursor = self.cursor.unwrap_or(0);

        let target = match (self.wrap_policy, direction) {
            (WrapPolicy::Circular, Direction::Previous) => (cursor + n - 1) % n,
            (WrapPolicy::Circular, Direction::Next) => (cursor + 1) % n,
            (WrapPolicy::Clamp, Direction::Previous) => cursor.saturating_sub(1),
            (WrapPolicy::Clamp, Direction::Next) => (cursor + 1).min(n - 1),
        };
        self.select_index(target);
    }

    /// Jump the cursor to an index. Out-of-range indexes are ignored.
    pub fn select_index(&mut self, index: usize) {
        if index >= self.photos.len() {
            return;
        }
        self.cursor = Some(index);
        self.emit_series_changed();
    }

    /// Delete the photo at `index`. Out-of-range indexes are ignored.
    ///
    /// Cursor policy: deleting at or before the cursor shifts the cursor
    /// down by one so it keeps pointing at the same logical photo;
    /// deleting past the end of the new list clamps to the last element.
    pub fn delete_at(&mut self, index: usize) -> Result<()> {
        let Some(photo) = self.photos.get(index) else {
            return Ok(());
        };
        self.store.delete_photo(photo.id)?;

        let old_cursor = self.cursor.unwrap_or(0);
        self.reload_photos_only();

        self.cursor = if self.photos.is_empty() {
            None
        } else if old_cursor >= self.photos.len() {
            Some(self.photos.len() - 1)
        } else if index <= old_cursor && old_cursor > 0 {
            Some(old_cursor - 1)
        } else {
            Some(old_cursor)
        };

        self.emit_series_changed();
        Ok(())
    }

    /// Delete whatever the cursor points at.
    pub fn delete_current(&mut self) -> Result<()> {
        match self.cursor {
            Some(index) => self.delete_at(index),
            None => Ok(()),
        }
    }

    // ========== Accessors ==========

    pub fn active_project(&self) -> Option<&Project> {
        self.active_project.as_ref()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The photo the cursor points at, if any.
    pub fn current_photo(&self) -> Option<&Photo> {
        self.cursor.and_then(|i| self.photos.get(i))
    }

    /// The second-to-last photo of the series, independent of the
    /// cursor. Used as the fallback alignment reference before the user
    /// has navigated anywhere.
    pub fn previous_photo(&self) -> Option<&Photo> {
        if self.photos.len() < 2 {
            return None;
        }
        self.photos.get(self.photos.len() - 2)
    }

    /// Defensive copy of the whole series, in ascending `seq` order.
    pub fn all_photos(&self) -> Vec<Photo> {
        self.photos.clone()
    }

    pub fn count(&self) -> usize {
        self.photos.len()
    }

    pub fn has_photos(&self) -> bool {
        !self.photos.is_empty()
    }

    pub fn wrap_policy(&self) -> WrapPolicy {
        self.wrap_policy
    }

    pub fn set_wrap_policy(&mut self, policy: WrapPolicy) {
        self.wrap_policy = policy;
    }

    // ========== Internals ==========

    /// Reload from the store and reset the cursor to the newest photo.
    fn reload(&mut self) {
        self.reload_photos_only();
        self.cursor = if self.photos.is_empty() {
            None
        } else {
            Some(self.photos.len() - 1)
        };
    }

    /// Reload the list without touching the cursor; callers fix it up.
    fn reload_photos_only(&mut self) {
        self.photos = match &self.active_project {
            Some(project) => match self.store.list_photos(project.id) {
                Ok(photos) => photos,
                Err(e) => {
                    // Recoverable: fall back to an empty series rather
                    // than keeping a view the store no longer backs
                    eprintln!("⚠️  Error loading photos: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
    }

    fn emit_series_changed(&self) {
        self.bus.publish(&Notification::SeriesChanged {
            photos: self.photos.clone(),
            cursor: self.cursor,
            current: self.current_photo().cloned(),
            previous: self.previous_photo().cloned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::cell::RefCell;

    fn snapshot(w: u32, h: u32) -> Snapshot {
        Snapshot {
            bytes: b"jpeg".to_vec(),
            width: w,
            height: h,
            captured_at: Utc::now(),
        }
    }

    fn fixture() -> (SeriesController, Rc<PhotoStore>, Rc<NotificationBus>) {
        let store = Rc::new(PhotoStore::open_in_memory().unwrap());
        let bus = Rc::new(NotificationBus::new());
        let controller =
            SeriesController::new(Rc::clone(&store), Rc::clone(&bus), WrapPolicy::Circular);
        (controller, store, bus)
    }

    fn with_project(name: &str) -> (SeriesController, Rc<PhotoStore>, Rc<NotificationBus>) {
        let (mut controller, store, bus) = fixture();
        let id = store.create_project(name).unwrap();
        let project = store.get_project(id).unwrap();
        controller.set_active_project(Some(project));
        (controller, store, bus)
    }

    fn assert_cursor_invariant(c: &SeriesController) {
        match c.cursor() {
            None => assert_eq!(c.count(), 0),
            Some(i) => assert!(i < c.count()),
        }
    }

    #[test]
    fn test_add_first_photo() {
        let (mut c, _store, _bus) = with_project("A");
        let p1 = c.add_photo(&snapshot(800, 600), false).unwrap();

        assert_eq!(p1.seq, 1);
        assert_eq!(c.count(), 1);
        assert_eq!(c.current_photo(), Some(&p1));
        assert_eq!(c.previous_photo(), None);
        assert_cursor_invariant(&c);
    }

    #[test]
    fn test_add_moves_cursor_to_newest() {
        let (mut c, _store, _bus) = with_project("A");
        let p1 = c.add_photo(&snapshot(800, 600), false).unwrap();
        c.select_index(0);
        let p2 = c.add_photo(&snapshot(800, 600), false).unwrap();

        assert_eq!(p2.seq, p1.seq + 1);
        assert_eq!(c.cursor(), Some(1));
        assert_eq!(c.current_photo(), Some(&p2));
        assert_eq!(c.previous_photo(), Some(&p1));
    }

    #[test]
    fn test_add_without_project_fails() {
        let (mut c, _store, _bus) = fixture();
        let err = c.add_photo(&snapshot(1, 1), false).unwrap_err();
        assert!(matches!(err, SnapError::NoActiveProject));
    }

    #[test]
    fn test_circular_navigation() {
        let (mut c, _store, _bus) = with_project("A");
        for _ in 0..3 {
            c.add_photo(&snapshot(1, 1), false).unwrap();
        }
        assert_eq!(c.cursor(), Some(2));

        c.navigate(Direction::Next); // wraps to the first
        assert_eq!(c.cursor(), Some(0));
        c.navigate(Direction::Previous); // wraps back to the last
        assert_eq!(c.cursor(), Some(2));
    }

    #[test]
    fn test_clamped_navigation() {
        let (mut c, _store, _bus) = with_project("A");
        c.set_wrap_policy(WrapPolicy::Clamp);
        for _ in 0..3 {
            c.add_photo(&snapshot(1, 1), false).unwrap();
        }

        c.navigate(Direction::Next); // already at the end
        assert_eq!(c.cursor(), Some(2));
        c.select_index(0);
        c.navigate(Direction::Previous); // already at the start
        assert_eq!(c.cursor(), Some(0));
    }

    #[test]
    fn test_navigate_empty_is_noop() {
        let (mut c, _store, _bus) = with_project("A");
        c.navigate(Direction::Previous);
        c.navigate(Direction::Next);
        assert_eq!(c.cursor(), None);
    }

    #[test]
    fn test_select_out_of_range_is_noop() {
        let (mut c, _store, _bus) = with_project("A");
        c.add_photo(&snapshot(1, 1), false).unwrap();
        c.select_index(5);
        assert_eq!(c.cursor(), Some(0));
    }

    #[test]
    fn test_delete_before_cursor_keeps_logical_position() {
        let (mut c, _store, _bus) = with_project("A");
        let _p1 = c.add_photo(&snapshot(1, 1), false).unwrap();
        let p2 = c.add_photo(&snapshot(1, 1), false).unwrap();

        // Cursor at P2 (index 1); deleting P1 shifts the list left
        c.delete_at(0).unwrap();
        assert_eq!(c.count(), 1);
        assert_eq!(c.cursor(), Some(0));
        assert_eq!(c.current_photo(), Some(&p2));
        assert_cursor_invariant(&c);
    }

    #[test]
    fn test_delete_last_remaining_photo() {
        let (mut c, _store, _bus) = with_project("A");
        c.add_photo(&snapshot(1, 1), false).unwrap();
        c.delete_current().unwrap();

        assert_eq!(c.count(), 0);
        assert_eq!(c.cursor(), None);
        assert_eq!(c.current_photo(), None);
    }

    #[test]
    fn test_delete_past_cursor_clamps() {
        let (mut c, _store, _bus) = with_project("A");
        for _ in 0..3 {
            c.add_photo(&snapshot(1, 1), false).unwrap();
        }
        // Cursor on the last element; delete it
        c.delete_at(2).unwrap();
        assert_eq!(c.cursor(), Some(1));
        assert_cursor_invariant(&c);
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let (mut c, _store, _bus) = with_project("A");
        c.add_photo(&snapshot(1, 1), false).unwrap();
        c.delete_at(9).unwrap();
        assert_eq!(c.count(), 1);
    }

    #[test]
    fn test_cursor_invariant_across_mixed_operations() {
        let (mut c, _store, _bus) = with_project("A");
        c.add_photo(&snapshot(1, 1), false).unwrap();
        c.add_photo(&snapshot(1, 1), false).unwrap();
        c.navigate(Direction::Previous);
        c.add_photo(&snapshot(1, 1), false).unwrap();
        assert_cursor_invariant(&c);
        c.delete_at(0).unwrap();
        assert_cursor_invariant(&c);
        c.navigate(Direction::Next);
        assert_cursor_invariant(&c);
        c.delete_current().unwrap();
        assert_cursor_invariant(&c);
        c.delete_current().unwrap();
        assert_cursor_invariant(&c);
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn test_switching_project_reloads_and_resets_cursor() {
        let (mut c, store, _bus) = with_project("A");
        c.add_photo(&snapshot(1, 1), false).unwrap();
        c.add_photo(&snapshot(1, 1), false).unwrap();

        let b = store.create_project("B").unwrap();
        let b = store.get_project(b).unwrap();
        c.set_active_project(Some(b));

        assert_eq!(c.count(), 0);
        assert_eq!(c.cursor(), None);

        // And switching back restores the series with the cursor on the
        // most recent photo
        let a = store
            .list_projects()
            .unwrap()
            .into_iter()
            .find(|p| p.name == "A")
            .unwrap();
        c.set_active_project(Some(a));
        assert_eq!(c.count(), 2);
        assert_eq!(c.cursor(), Some(1));
    }

    #[test]
    fn test_series_changed_payload() {
        let (mut c, _store, bus) = with_project("A");

        let seen: Rc<RefCell<Vec<Notification>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(move |n| sink.borrow_mut().push(n.clone()));

        c.add_photo(&snapshot(1, 1), false).unwrap();
        c.add_photo(&snapshot(1, 1), false).unwrap();

        let events = seen.borrow();
        // Each add: SeriesChanged then PhotoAdded
        assert_eq!(events.len(), 4);
        match &events[2] {
            Notification::SeriesChanged {
                photos,
                cursor,
                current,
                previous,
            } => {
                assert_eq!(photos.len(), 2);
                assert_eq!(*cursor, Some(1));
                assert_eq!(current.as_ref().map(|p| p.seq), Some(2));
                assert_eq!(previous.as_ref().map(|p| p.seq), Some(1));
            }
            other => panic!("expected SeriesChanged, got {other:?}"),
        }
        match &events[3] {
            Notification::PhotoAdded { photo, project } => {
                assert_eq!(photo.seq, 2);
                assert_eq!(project.name, "A");
            }
            other => panic!("expected PhotoAdded, got {other:?}"),
        }
    }

    #[test]
    fn test_all_photos_is_a_copy() {
        let (mut c, _store, _bus) = with_project("A");
        c.add_photo(&snapshot(1, 1), false).unwrap();
        let mut copy = c.all_photos();
        copy.clear();
        assert_eq!(c.count(), 1);
    }
}

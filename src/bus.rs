/// Notification bus
///
/// The original UI decoupled its components with `document`-level custom
/// events; this is the same idea as an explicit, typed publish/subscribe
/// mechanism. Handlers run synchronously, in subscription order, on the
/// publishing call stack. Handlers must not re-enter the operation that
/// emitted the notification (e.g. a `SeriesChanged` handler calling back
/// into `SeriesController::add_photo`).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::state::data::{Photo, Project};

/// Everything the core announces to the outside world.
#[derive(Debug, Clone)]
pub enum Notification {
    /// The photo list or cursor changed (load, add, navigate, select,
    /// delete). `previous` is the second-to-last photo of the series,
    /// the fallback alignment reference before any explicit navigation.
    SeriesChanged {
        photos: Vec<Photo>,
        cursor: Option<usize>,
        current: Option<Photo>,
        previous: Option<Photo>,
    },
    /// A photo was just captured and persisted. Distinct from
    /// `SeriesChanged`: "added" means this exact photo becomes the new
    /// alignment reference, whereas navigation means "whatever is now
    /// at the cursor".
    PhotoAdded { photo: Photo, project: Project },
    /// The active project changed (or was cleared).
    ProjectChanged { project: Option<Project> },
    /// The live preview's intrinsic size or container size changed;
    /// the overlay should re-derive its transform.
    LayoutChanged,
    /// The overlay canvas was cleared (new empty project, reference
    /// removed).
    OverlayCleared,
    /// The overlay canvas has fresh content; the host should
    /// re-composite it over the preview.
    OverlayRenderRequested,
}

/// Handle returned by [`NotificationBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Notification)>;

/// Process-internal synchronous pub/sub.
#[derive(Default)]
pub struct NotificationBus {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(u64, Handler)>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Handlers are invoked in subscription order.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Notification) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(handler)));
        SubscriptionId(id)
    }

    /// Remove a handler. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id.0);
    }

    /// Deliver a notification to every subscriber, synchronously.
    ///
    /// The subscriber list is snapshotted first, so a handler may
    /// subscribe or unsubscribe without corrupting the dispatch.
    pub fn publish(&self, notification: &Notification) {
        let handlers: Vec<Handler> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();

        for handler in handlers {
            handler(notification);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = NotificationBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(move |_| seen.borrow_mut().push(tag));
        }

        bus.publish(&Notification::LayoutChanged);
        assert_eq!(*seen.borrow(), ["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = NotificationBus::new();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        let id = bus.subscribe(move |_| c.set(c.get() + 1));

        bus.publish(&Notification::LayoutChanged);
        bus.unsubscribe(id);
        bus.publish(&Notification::LayoutChanged);

        assert_eq!(count.get(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself_during_dispatch() {
        let bus = Rc::new(NotificationBus::new());
        let fired = Rc::new(Cell::new(0));

        let slot: Rc<RefCell<Option<SubscriptionId>>> = Rc::new(RefCell::new(None));
        let id = {
            let bus = Rc::clone(&bus);
            let slot = Rc::clone(&slot);
            let fired = Rc::clone(&fired);
            bus.clone().subscribe(move |_| {
                fired.set(fired.get() + 1);
                if let Some(id) = *slot.borrow() {
                    bus.unsubscribe(id);
                }
            })
        };
        *slot.borrow_mut() = Some(id);

        bus.publish(&Notification::LayoutChanged);
        bus.publish(&Notification::LayoutChanged);
        assert_eq!(fired.get(), 1);
    }
}

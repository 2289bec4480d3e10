use std::fmt;

use super::types::{ContainerData, ContainerId};

/// Notifications delivered to every subscriber of a
/// [`super::DragContext`]'s bus.
#[derive(Debug)]
pub enum DragEvent<T> {
    /// A drag began on `channel`. Fired before any state is captured.
    DragStart { channel: String },

    /// The drag on `channel` finished (completed or cancelled). Fired
    /// synchronously at release, before the deferred [`Self::ElementMoved`].
    DragEnd { channel: String },

    /// An item changed container or index. Fired at most once per completed
    /// drag, from the deferred cleanup step, and only when the destination
    /// differs from the source (container or index). A drag that ends
    /// exactly where it started produces no such event.
    ///
    /// `from_data`/`to_data` are the sequence handles themselves, so
    /// subscribers can identify sequences by `Rc::ptr_eq` even if the
    /// containers were detached in the meantime.
    ElementMoved {
        channel: String,
        from: ContainerId,
        from_index: usize,
        from_data: ContainerData<T>,
        to: ContainerId,
        to_index: usize,
        to_data: ContainerData<T>,
    },
}

/// Handle returned by [`super::DragContext::subscribe`]; pass it to
/// `unsubscribe` to stop receiving events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscriber list for one context. Subscribers are plain closures; they run
/// synchronously, in subscription order, on the thread delivering the
/// pointer event.
pub(crate) struct EventBus<T> {
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&DragEvent<T>)>)>,
    next_serial: u64,
}

impl<T> EventBus<T> {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_serial: 1,
        }
    }

    pub(crate) fn subscribe(
        &mut self,
        subscriber: impl FnMut(&DragEvent<T>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_serial);
        self.next_serial = self.next_serial.saturating_add(1);
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub(crate) fn emit(&mut self, event: &DragEvent<T>) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

//! The drag engine: sessions, registries, dispatch and initiation.
//!
//! Everything is driven through [`DragContext`], an explicitly constructed
//! service (no ambient globals): the host attaches its drop surfaces, routes
//! normalized pointer events in, and drains the deferred-cleanup queue once
//! per event-loop turn with [`DragContext::apply_pending`].

use std::collections::BTreeMap;
use std::rc::Rc;

use ahash::AHashMap;
use emath::Pos2;

mod detector;
mod events;
mod geometry;
mod host;
mod integrity;
mod options;
mod registry;
mod session;
mod types;

#[cfg(test)]
mod model_tests;

pub use detector::DragDetector;
pub use events::{DragEvent, SubscriptionId};
pub use geometry::{document_point, rect_distance};
pub use host::DragHost;
pub use options::DragOptions;
pub use types::{BackgroundId, ContainerData, ContainerId, ElementId, NodeId, PointerButton};

use events::EventBus;
use registry::Registry;
use session::Session;
use types::PendingCleanup;

/// Drag-and-drop dispatcher for any number of drag channels.
///
/// A channel (a plain string key) scopes which surfaces can interact: drags
/// started on one channel only see that channel's containers and elements.
/// Registry and session pairs are created lazily per channel and reused
/// across drags. At most one drag is active system-wide at a time; a second
/// `start_drag` while one is in flight is silently ignored, whatever its
/// channel.
///
/// The context is meant to be owned by whatever owns the top-level pointer
/// subscription and passed around explicitly, together with a
/// [`DragHost`] implementation for the visual tree.
#[derive(Debug)]
pub struct DragContext<T> {
    pub options: DragOptions,

    channels: BTreeMap<String, Channel<T>>,
    /// Channel of the drag currently in flight, if any.
    active: Option<String>,
    events: EventBus<T>,
    /// Deferred tails of finished drags, drained by [`Self::apply_pending`].
    pending: Vec<PendingCleanup<T>>,
    /// Lookup-only side map; iteration stays on the `BTreeMap` above.
    container_channels: AHashMap<ContainerId, String>,
    next_serial: u64,
}

#[derive(Debug)]
struct Channel<T> {
    registry: Registry<T>,
    session: Session<T>,
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
            session: Session::default(),
        }
    }
}

impl<T> Default for DragContext<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DragContext<T> {
    pub fn new() -> Self {
        Self::with_options(DragOptions::default())
    }

    pub fn with_options(options: DragOptions) -> Self {
        Self {
            options,
            channels: BTreeMap::new(),
            active: None,
            events: EventBus::new(),
            pending: Vec::new(),
            container_channels: AHashMap::new(),
            next_serial: 1,
        }
    }

    fn alloc_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial = serial.saturating_add(1);
        serial
    }

    fn channel_entry(&mut self, channel: &str) -> &mut Channel<T> {
        self.channels.entry(channel.to_owned()).or_default()
    }

    fn maybe_check_integrity(&self) {
        if !self.options.debug_integrity {
            return;
        }
        for issue in self.integrity_issues() {
            log::warn!("registry integrity: {issue}");
        }
    }

    // --- events ------------------------------------------------------------

    /// Subscribe to [`DragEvent`]s from every channel. Subscribers run
    /// synchronously, in subscription order.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&DragEvent<T>) + 'static) -> SubscriptionId {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // --- attachment --------------------------------------------------------

    /// Attach an empty-space drop zone to `channel`.
    pub fn attach_background(&mut self, channel: &str, node: NodeId) -> BackgroundId {
        let id = BackgroundId(self.alloc_serial());
        self.channel_entry(channel).registry.add_background(id, node);
        self.maybe_check_integrity();
        id
    }

    pub fn detach_background(&mut self, id: BackgroundId) -> bool {
        let removed = self
            .channels
            .values_mut()
            .any(|entry| entry.registry.remove_background(id));
        self.maybe_check_integrity();
        removed
    }

    /// Attach an ordered container to `channel`. `data` is the caller-owned
    /// item sequence the engine will splice on drops; `horizontal` overrides
    /// [`DragOptions::horizontal`] for this container when set.
    pub fn attach_container(
        &mut self,
        channel: &str,
        node: NodeId,
        data: ContainerData<T>,
        horizontal: Option<bool>,
    ) -> ContainerId {
        let id = ContainerId(self.alloc_serial());
        self.channel_entry(channel)
            .registry
            .add_container(id, node, data, horizontal);
        self.container_channels.insert(id, channel.to_owned());
        self.maybe_check_integrity();
        id
    }

    /// Detach a container and its whole child list. Safe mid-drag: an
    /// in-flight session falls back per [`Self::pointer_released`].
    pub fn detach_container(&mut self, id: ContainerId) -> bool {
        let Some(channel) = self.container_channels.remove(&id) else {
            return false;
        };
        let removed = self
            .channels
            .get_mut(&channel)
            .is_some_and(|entry| entry.registry.remove_container(id));
        self.maybe_check_integrity();
        removed
    }

    /// Attach a draggable element as the last child of `container`.
    ///
    /// Panics if the container is not attached: that means the binding
    /// layer is out of sync with the registry.
    pub fn attach_element(&mut self, container: ContainerId, node: NodeId) -> ElementId {
        self.attach_element_impl(container, node, None)
    }

    /// Attach a draggable element at an explicit child index (clamped). For
    /// granular bindings that create a single node mid-list instead of
    /// re-rendering the whole container.
    pub fn attach_element_at(
        &mut self,
        container: ContainerId,
        node: NodeId,
        index: usize,
    ) -> ElementId {
        self.attach_element_impl(container, node, Some(index))
    }

    fn attach_element_impl(
        &mut self,
        container: ContainerId,
        node: NodeId,
        index: Option<usize>,
    ) -> ElementId {
        let id = ElementId(self.alloc_serial());
        let Some(channel) = self.container_channels.get(&container) else {
            panic!("attach_element: container is not attached (binding layer out of sync)");
        };
        let attached = self
            .channels
            .get_mut(channel)
            .is_some_and(|entry| entry.registry.add_element(container, id, node, index));
        assert!(
            attached,
            "attach_element: container is not attached (binding layer out of sync)"
        );
        self.maybe_check_integrity();
        id
    }

    /// Detach an element by handle. Idempotent: unknown or already-removed
    /// handles (e.g. the binding layer cleaning up behind an in-flight drag)
    /// are a `false` no-op.
    pub fn detach_element(&mut self, id: ElementId) -> bool {
        let removed = self
            .channels
            .values_mut()
            .any(|entry| entry.registry.remove_element(id));
        self.maybe_check_integrity();
        removed
    }

    // --- drag lifecycle ----------------------------------------------------

    /// Begin dragging `element` out of `container` on `channel`, with the
    /// pointer at `point`. Entry point for [`DragDetector`]; silently
    /// ignored while any drag is in flight (first drag wins, across all
    /// channels).
    pub fn start_drag(
        &mut self,
        host: &mut dyn DragHost,
        channel: &str,
        point: Pos2,
        container: ContainerId,
        element: ElementId,
    ) {
        if let Some(active) = &self.active {
            log::debug!("start_drag ignored: drag already active on channel {active:?}");
            return;
        }
        let entry = self.channels.entry(channel.to_owned()).or_default();
        if entry.session.start(
            &mut entry.registry,
            &mut self.events,
            host,
            channel,
            point,
            container,
            element,
        ) {
            self.active = Some(channel.to_owned());
        }
        self.maybe_check_integrity();
    }

    /// Route a pointer move to the active drag, if any.
    pub fn pointer_moved(&mut self, host: &mut dyn DragHost, point: Pos2) {
        let Some(channel) = &self.active else {
            return;
        };
        let Some(entry) = self.channels.get_mut(channel) else {
            return;
        };
        entry
            .session
            .drag(&entry.registry, host, &self.options, point);
    }

    /// Finish the active drag on primary-button release. Other buttons, and
    /// releases with no drag in flight, are ignored. The ghost removal and
    /// the `ElementMoved` notification are staged for [`Self::apply_pending`].
    pub fn pointer_released(&mut self, host: &mut dyn DragHost, button: PointerButton) {
        if button != PointerButton::Primary {
            return;
        }
        let Some(channel) = self.active.take() else {
            return;
        };
        if let Some(entry) = self.channels.get_mut(&channel) {
            if let Some(cleanup) =
                entry
                    .session
                    .end(&entry.registry, &mut self.events, host, &channel)
            {
                self.pending.push(cleanup);
            }
        }
        self.maybe_check_integrity();
    }

    /// Abort the active drag, restoring the item to its source position.
    /// No-op when idle.
    pub fn cancel_drag(&mut self, host: &mut dyn DragHost) {
        let Some(channel) = self.active.take() else {
            return;
        };
        if let Some(entry) = self.channels.get_mut(&channel) {
            if let Some(cleanup) =
                entry
                    .session
                    .cancel(&entry.registry, &mut self.events, host, &channel)
            {
                self.pending.push(cleanup);
            }
        }
        self.maybe_check_integrity();
    }

    /// Run the deferred tail of any finished drags: destroy ghost nodes and
    /// publish `ElementMoved` notifications. Call once per event-loop turn,
    /// after the host has reacted to `data_changed`. This ordering is what
    /// keeps the destination's re-render from racing the ghost removal.
    pub fn apply_pending(&mut self, host: &mut dyn DragHost) {
        for cleanup in std::mem::take(&mut self.pending) {
            host.remove_node(cleanup.ghost_node);
            if let Some(event) = cleanup.moved {
                self.events.emit(&event);
            }
        }
    }

    // --- queries -----------------------------------------------------------

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Channel of the drag currently in flight, if any.
    pub fn active_channel(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Shared handle to an attached container's item sequence.
    pub fn container_data(&self, id: ContainerId) -> Option<ContainerData<T>> {
        let channel = self.container_channels.get(&id)?;
        let slot = self.channels.get(channel)?.registry.container(id)?;
        Some(Rc::clone(&slot.data))
    }

    /// First attached background on `channel` containing `point`, in attach
    /// order. Backgrounds take no part in ghost placement; hosts use this to
    /// implement drop-on-empty-space semantics themselves.
    pub fn background_under(
        &self,
        host: &dyn DragHost,
        channel: &str,
        point: Pos2,
    ) -> Option<BackgroundId> {
        let entry = self.channels.get(channel)?;
        entry
            .registry
            .backgrounds()
            .iter()
            .find(|slot| host.node_rect(slot.node).contains(point))
            .map(|slot| slot.id)
    }

    /// Consistency report over every channel's registry; empty means
    /// healthy. Also logged after each mutation when
    /// [`DragOptions::debug_integrity`] is set.
    pub fn integrity_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (channel, entry) in &self.channels {
            for issue in integrity::registry_integrity_issues(&entry.registry) {
                issues.push(format!("{channel}: {issue}"));
            }
        }
        issues
    }
}

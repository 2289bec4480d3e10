use std::rc::Rc;

use emath::{Pos2, Vec2};
use itertools::Itertools as _;

use super::events::{DragEvent, EventBus};
use super::geometry::rect_distance;
use super::host::DragHost;
use super::options::DragOptions;
use super::registry::Registry;
use super::types::{ContainerData, ContainerId, ElementId, NodeId, PendingCleanup};

/// State machine for one drag channel: Idle → Dragging → Idle, one cycle per
/// drag. Re-entrant calls are no-ops (`start` while dragging, `drag`/`end`
/// while idle), so mis-routed pointer events degrade to nothing happening.
///
/// Sessions are created lazily per channel and reused across drags; all
/// per-drag state lives in [`ActiveDrag`].
#[derive(Debug)]
pub(crate) struct Session<T> {
    active: Option<ActiveDrag<T>>,
}

#[derive(Debug)]
struct ActiveDrag<T> {
    /// The item in flight, removed from its source sequence at start and
    /// spliced into the destination at end. While this exists, no container
    /// sequence holds the item.
    payload: T,
    source_container: ContainerId,
    source_index: usize,
    /// Handle to the source sequence, captured at start so the item can be
    /// restored even if the source container is detached mid-drag.
    source_data: ContainerData<T>,
    /// Vector from the pointer to the dragged node's top-left at start;
    /// keeps the original grab point under the cursor while the clone moves.
    pointer_offset: Vec2,
    clone_node: NodeId,
    ghost: GhostSlot,
}

/// Where the ghost currently sits: inside `container`, immediately before
/// `before`, or at the container end when `before` is `None`. This is the
/// index the drop would produce if the drag ended now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct GhostSlot {
    node: NodeId,
    container: ContainerId,
    before: Option<ElementId>,
}

impl<T> Default for Session<T> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<T> Session<T> {
    /// Begin a drag of `element` out of `container`. Returns `false` (and
    /// does nothing) if a drag is already in flight on this session.
    ///
    /// Panics if `element` is not attached to `container` or the child list
    /// disagrees with the data sequence: that means the host's binding layer
    /// is out of sync with the registry, which is a programming error rather
    /// than a runtime condition to paper over.
    pub(crate) fn start(
        &mut self,
        registry: &mut Registry<T>,
        events: &mut EventBus<T>,
        host: &mut dyn DragHost,
        channel: &str,
        point: Pos2,
        container: ContainerId,
        element: ElementId,
    ) -> bool {
        if self.active.is_some() {
            log::debug!("start ignored: session on channel {channel:?} already dragging");
            return false;
        }

        events.emit(&DragEvent::DragStart {
            channel: channel.to_owned(),
        });

        let Some(slot) = registry.container(container) else {
            panic!("drag start: source container is not attached (binding layer out of sync)");
        };
        let Some(source_index) = registry.element_index(container, element) else {
            panic!("drag start: element is not attached to its source container (binding layer out of sync)");
        };
        let container_node = slot.node;
        let element_node = slot.children[source_index].node;
        let source_data = Rc::clone(&slot.data);

        let rect = host.node_rect(element_node);
        let pointer_offset = rect.min - point;
        let clone_node = host.create_clone(element_node, rect);

        // The ghost takes the slot the dragged node is about to vacate. Its
        // bookkeeping anchor is the *next* sibling, so the recorded position
        // survives the dragged node leaving the layout.
        let ghost_node = host.create_ghost(element_node);
        host.place_ghost(ghost_node, container_node, Some(element_node));
        let before = registry.element_after(container, element).map(|next| next.id);

        let payload = {
            let mut sequence = source_data.borrow_mut();
            assert!(
                source_index < sequence.len(),
                "drag start: data sequence shorter than the child list (binding layer out of sync)"
            );
            sequence.remove(source_index)
        };
        host.data_changed(container_node);

        // Take the element out of the child list ourselves: candidate
        // searches must not see the in-flight item, and the binding layer's
        // own detach (reacting to the data removal) stays an idempotent no-op.
        registry.remove_element(element);

        log::debug!(
            "drag started: channel={channel:?} container={container:?} index={source_index}"
        );

        self.active = Some(ActiveDrag {
            payload,
            source_container: container,
            source_index,
            source_data,
            pointer_offset,
            clone_node,
            ghost: GhostSlot {
                node: ghost_node,
                container,
                before,
            },
        });
        true
    }

    /// Track a pointer move: reposition the clone, then re-place the ghost
    /// inside the hovered container next to the geometrically closest
    /// candidate. No-op when idle; when no attached container is under the
    /// pointer the ghost keeps its last valid slot.
    pub(crate) fn drag(
        &mut self,
        registry: &Registry<T>,
        host: &mut dyn DragHost,
        options: &DragOptions,
        point: Pos2,
    ) {
        let Some(active) = &mut self.active else {
            return;
        };

        host.move_clone(active.clone_node, point + active.pointer_offset);

        // First attached container under the pointer wins, in attach order.
        let Some(hover) = registry
            .containers()
            .iter()
            .find(|slot| host.node_rect(slot.node).contains(point))
        else {
            return;
        };

        let before = if hover.children.is_empty() {
            None
        } else {
            // Closest candidate by axis-clamped distance; equal distances
            // resolve to the first in list order (incidental, not a contract).
            let closest = hover
                .children
                .iter()
                .map(|child| rect_distance(host.node_rect(child.node), point))
                .position_min_by(f32::total_cmp)
                .unwrap_or(0);
            let candidate = hover.children[closest];

            let rect = host.node_rect(candidate.node);
            let (coord, midpoint) = if options.container_is_horizontal(hover.horizontal) {
                (point.x, rect.center().x)
            } else {
                (point.y, rect.center().y)
            };
            if coord < midpoint {
                Some(candidate.id)
            } else {
                hover.children.get(closest + 1).map(|next| next.id)
            }
        };

        let slot = GhostSlot {
            node: active.ghost.node,
            container: hover.id,
            before,
        };
        if slot == active.ghost {
            return;
        }

        let before_node = before.and_then(|id| {
            hover
                .children
                .iter()
                .find(|child| child.id == id)
                .map(|child| child.node)
        });
        host.place_ghost(slot.node, hover.node, before_node);
        log::trace!(
            "ghost moved: container={:?} before={:?}",
            slot.container,
            slot.before
        );
        active.ghost = slot;
    }

    /// Finish the drag at the ghost's current slot. Destroys the clone
    /// immediately, splices the payload into the destination sequence, and
    /// returns the deferred tail (ghost removal + move notification) for the
    /// context's pending queue. `DragEnd` is emitted synchronously here;
    /// `ElementMoved` waits for the deferred step. No-op when idle.
    pub(crate) fn end(
        &mut self,
        registry: &Registry<T>,
        events: &mut EventBus<T>,
        host: &mut dyn DragHost,
        channel: &str,
    ) -> Option<PendingCleanup<T>> {
        let active = self.active.take()?;
        let ActiveDrag {
            payload,
            source_container,
            source_index,
            source_data,
            clone_node,
            ghost,
            ..
        } = active;

        host.remove_node(clone_node);

        let (to, to_index, to_data) = match registry.container(ghost.container) {
            Some(slot) => {
                // Children before the ghost = the index of its anchor; a
                // detached anchor falls back to the container end.
                let raw = ghost
                    .before
                    .and_then(|anchor| registry.element_index(ghost.container, anchor))
                    .unwrap_or(slot.children.len());
                let index = {
                    let mut sequence = slot.data.borrow_mut();
                    let index = raw.min(sequence.len());
                    sequence.insert(index, payload);
                    index
                };
                host.data_changed(slot.node);
                (slot.id, index, Rc::clone(&slot.data))
            }
            None => {
                // Drop target detached mid-drag: restore into the captured
                // source sequence so the item is never lost.
                log::warn!(
                    "drop container {:?} detached mid-drag, restoring item to its source sequence",
                    ghost.container
                );
                let index = {
                    let mut sequence = source_data.borrow_mut();
                    let index = source_index.min(sequence.len());
                    sequence.insert(index, payload);
                    index
                };
                if let Some(slot) = registry.container(source_container) {
                    host.data_changed(slot.node);
                }
                (source_container, index, Rc::clone(&source_data))
            }
        };

        log::debug!(
            "drag ended: channel={channel:?} from={source_container:?}@{source_index} to={to:?}@{to_index}"
        );

        let moved = (to != source_container || to_index != source_index).then(|| {
            DragEvent::ElementMoved {
                channel: channel.to_owned(),
                from: source_container,
                from_index: source_index,
                from_data: source_data,
                to,
                to_index,
                to_data,
            }
        });

        events.emit(&DragEvent::DragEnd {
            channel: channel.to_owned(),
        });

        Some(PendingCleanup {
            ghost_node: ghost.node,
            moved,
        })
    }

    /// Abort the drag: the item goes back to its captured source position
    /// and no `ElementMoved` is published. Otherwise shaped like
    /// [`Self::end`]: clone destroyed now, ghost removal deferred, `DragEnd`
    /// emitted synchronously. No-op when idle.
    pub(crate) fn cancel(
        &mut self,
        registry: &Registry<T>,
        events: &mut EventBus<T>,
        host: &mut dyn DragHost,
        channel: &str,
    ) -> Option<PendingCleanup<T>> {
        let active = self.active.take()?;
        let ActiveDrag {
            payload,
            source_container,
            source_index,
            source_data,
            clone_node,
            ghost,
            ..
        } = active;

        host.remove_node(clone_node);

        {
            let mut sequence = source_data.borrow_mut();
            let index = source_index.min(sequence.len());
            sequence.insert(index, payload);
        }
        if let Some(slot) = registry.container(source_container) {
            host.data_changed(slot.node);
        }

        log::debug!("drag cancelled: channel={channel:?} restored to {source_container:?}@{source_index}");

        events.emit(&DragEvent::DragEnd {
            channel: channel.to_owned(),
        });

        Some(PendingCleanup {
            ghost_node: ghost.node,
            moved: None,
        })
    }
}

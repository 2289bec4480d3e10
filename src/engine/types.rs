use std::cell::RefCell;
use std::rc::Rc;

use super::events::DragEvent;

/// Shared handle to a container's ordered item sequence.
///
/// The caller owns the sequence and keeps reading it through its own handle;
/// the engine only removes an item at drag start and inserts it back at drag
/// end. Handles compare by identity (`Rc::ptr_eq`), which is how sequences
/// are told apart in [`DragEvent::ElementMoved`].
pub type ContainerData<T> = Rc<RefCell<Vec<T>>>;

/// Opaque name for a host visual node.
///
/// Allocated and interpreted by the host; the engine only stores and passes
/// these through [`super::DragHost`] calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

/// Identity handle for an attached background, returned by
/// [`super::DragContext::attach_background`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackgroundId(pub(crate) u64);

/// Identity handle for an attached container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerId(pub(crate) u64);

/// Identity handle for an attached element.
///
/// Identity is the handle itself, never the item value: two elements may
/// carry equal data and still be distinct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub(crate) u64);

/// Pointer button reported to [`super::DragContext::pointer_released`] and
/// [`super::DragDetector::pointer_down`]. Only `Primary` drives drags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Deferred tail of a finished drag: the ghost node to destroy and the move
/// notification to publish, staged until the host drains the queue with
/// [`super::DragContext::apply_pending`]. The delay lets the destination
/// re-render (triggered by `data_changed`) before the ghost leaves the tree.
#[derive(Debug)]
pub(crate) struct PendingCleanup<T> {
    pub(crate) ghost_node: NodeId,
    pub(crate) moved: Option<DragEvent<T>>,
}

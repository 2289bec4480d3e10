use emath::{Pos2, Rect};

use super::types::NodeId;

/// Visual-tree adapter the engine drives during a drag.
///
/// The engine owns no rendering and no widget tree; hosts implement this
/// trait over whatever they render with and pass it into every
/// [`super::DragContext`] call (mirroring how the context itself is an
/// injected service rather than ambient state). All coordinates are
/// document-relative.
pub trait DragHost {
    /// Current bounding rectangle of a live node.
    ///
    /// Queried fresh on every pointer update: the engine never caches
    /// rectangles across events, since nodes may reflow at any time.
    fn node_rect(&self, node: NodeId) -> Rect;

    /// Create the floating clone of `source`: a detached visual duplicate,
    /// absolutely positioned at `rect`, attached at the root of the visual
    /// tree so it renders above everything and is unaffected by container
    /// layout changes. Hosts style it as "in flight" (reduced opacity).
    fn create_clone(&mut self, source: NodeId, rect: Rect) -> NodeId;

    /// Move the floating clone so its top-left sits at `to`.
    fn move_clone(&mut self, clone: NodeId, to: Pos2);

    /// Create the ghost placeholder for `source`: a lightweight duplicate
    /// without deep content, styled distinctly (e.g. dashed border). It is
    /// positioned separately via [`Self::place_ghost`].
    fn create_ghost(&mut self, source: NodeId) -> NodeId;

    /// Insert `ghost` into `container`'s visual subtree immediately before
    /// `before`, or as the last child when `before` is `None`. Called again
    /// whenever the insertion point changes; the previous placement is
    /// superseded.
    fn place_ghost(&mut self, ghost: NodeId, container: NodeId, before: Option<NodeId>);

    /// Destroy a node the engine created (clone or ghost).
    fn remove_node(&mut self, node: NodeId);

    /// The engine just mutated the data sequence of the container rendered
    /// by `container`. The host decides when and how to re-render; the
    /// engine guarantees this fires before the deferred ghost removal for
    /// the same drag.
    fn data_changed(&mut self, container: NodeId);
}

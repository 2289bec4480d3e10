#![forbid(unsafe_code)]

//! Headless drag-and-drop: move items between and within ordered containers
//! with geometric ghost placement, behind a host-supplied visual-tree
//! adapter. See [`DragContext`] for the entry point and [`DragHost`] for
//! what a host has to provide.

pub mod engine;

pub use engine::{
    document_point, rect_distance, BackgroundId, ContainerData, ContainerId, DragContext,
    DragDetector, DragEvent, DragHost, DragOptions, ElementId, NodeId, PointerButton,
    SubscriptionId,
};

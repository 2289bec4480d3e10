use emath::Pos2;

use super::host::DragHost;
use super::types::{ContainerId, ElementId, PointerButton};
use super::DragContext;

/// Watches pointer events on one draggable handle and promotes a press into
/// a drag once movement passes [`super::DragOptions::drag_threshold`].
///
/// One detector per handle; the host wires its pointer callbacks straight
/// through. A press fires at most one drag: the buffered start point is
/// cleared the moment the drag begins. Leaving the handle with a press still
/// pending force-starts the drag immediately, so fast flicks off the handle
/// register instead of being lost.
#[derive(Debug)]
pub struct DragDetector {
    channel: String,
    container: ContainerId,
    element: ElementId,
    pressed_at: Option<Pos2>,
}

impl DragDetector {
    pub fn new(channel: impl Into<String>, container: ContainerId, element: ElementId) -> Self {
        Self {
            channel: channel.into(),
            container,
            element,
            pressed_at: None,
        }
    }

    /// Buffer a primary-button press; other buttons are ignored.
    pub fn pointer_down(&mut self, button: PointerButton, point: Pos2) {
        if button == PointerButton::Primary {
            self.pressed_at = Some(point);
        }
    }

    /// Track movement after a press. Once the pointer has travelled more
    /// than the threshold from the press point on either axis independently,
    /// the press is consumed and the drag starts at the current point.
    pub fn pointer_move<T>(
        &mut self,
        ctx: &mut DragContext<T>,
        host: &mut dyn DragHost,
        point: Pos2,
    ) {
        let Some(start) = self.pressed_at else {
            return;
        };
        let threshold = ctx.options.drag_threshold;
        if (point.x - start.x).abs() > threshold || (point.y - start.y).abs() > threshold {
            self.pressed_at = None;
            ctx.start_drag(host, &self.channel, point, self.container, self.element);
        }
    }

    /// A release before the threshold is reached cancels the pending press.
    pub fn pointer_up(&mut self) {
        self.pressed_at = None;
    }

    /// The pointer left the handle. With a press still pending this starts
    /// the drag right away rather than waiting for the threshold.
    pub fn pointer_leave<T>(
        &mut self,
        ctx: &mut DragContext<T>,
        host: &mut dyn DragHost,
        point: Pos2,
    ) {
        if self.pressed_at.take().is_some() {
            ctx.start_drag(host, &self.channel, point, self.container, self.element);
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }
}

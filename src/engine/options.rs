/// Options for [`super::DragContext`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragOptions {
    /// Default flow axis for ghost placement inside a container.
    ///
    /// `false` (the default) treats containers as vertical lists: the
    /// before/after decision compares the pointer's y coordinate against the
    /// candidate's vertical midpoint. `true` compares on x instead.
    /// Individual containers can override this at attach time.
    pub horizontal: bool,

    /// Pointer travel (in points, on either axis independently) a pressed
    /// handle must accumulate before [`super::DragDetector`] starts a drag.
    pub drag_threshold: f32,

    /// If true, run registry consistency checks after every mutation and log
    /// any issues (debug aid; see [`super::DragContext::integrity_issues`]).
    pub debug_integrity: bool,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            horizontal: false,
            drag_threshold: 8.0,
            debug_integrity: false,
        }
    }
}

impl DragOptions {
    /// Resolve a container's flow axis: its own override when present, else
    /// the global default.
    pub(crate) fn container_is_horizontal(&self, override_axis: Option<bool>) -> bool {
        override_axis.unwrap_or(self.horizontal)
    }
}

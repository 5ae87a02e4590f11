#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapperLifecycle {
    /// No drawing surface attached yet, or it was released on unmount.
    #[default]
    Uninitialized,
    /// Surface sized to the displayed image and pre-filled areas painted.
    Ready,
}

impl MapperLifecycle {
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

pub fn can_transition(from: MapperLifecycle, to: MapperLifecycle) -> bool {
    matches!(
        (from, to),
        (MapperLifecycle::Uninitialized, MapperLifecycle::Ready)
            | (MapperLifecycle::Ready, MapperLifecycle::Ready)
            | (MapperLifecycle::Ready, MapperLifecycle::Uninitialized)
    )
}

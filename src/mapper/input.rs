use crate::mapper::model::Shape;
use eframe::egui::{Modifiers, PointerButton, Pos2};

/// Low-level pointer event forwarded to host callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Position relative to the top-left corner of the displayed image.
    pub pos: Pos2,
    pub button: Option<PointerButton>,
    pub modifiers: Modifiers,
    /// Shape of the area element under the pointer, if the event targets one.
    pub target_shape: Option<Shape>,
    default_prevented: bool,
}

impl PointerEvent {
    pub fn new(pos: Pos2) -> Self {
        Self {
            pos,
            button: None,
            modifiers: Modifiers::default(),
            target_shape: None,
            default_prevented: false,
        }
    }

    pub fn with_target(mut self, shape: Shape) -> Self {
        self.target_shape = Some(shape);
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Stops the default action (following the area's href) after dispatch.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// What the pointer did during one frame, already hit-tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerSample {
    /// Index of the first area under the pointer.
    pub hit: Option<usize>,
    pub over_image: bool,
    pub moved: bool,
    pub clicked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTransition {
    Enter(usize),
    Leave(usize),
    Move(usize),
    Click(usize),
    ImageMove,
    ImageClick,
}

/// Remembers which area the pointer was over on the previous frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerTracker {
    hovered: Option<usize>,
}

impl PointerTracker {
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Turns a frame sample into events in delivery order: leave, enter,
    /// move, click. Areas sit above the image, so the image only hears about
    /// pointer activity outside every area.
    pub fn update(&mut self, sample: PointerSample) -> Vec<PointerTransition> {
        let mut out = Vec::new();
        let hit = if sample.over_image { sample.hit } else { None };

        if hit != self.hovered {
            if let Some(previous) = self.hovered {
                out.push(PointerTransition::Leave(previous));
            }
            if let Some(next) = hit {
                out.push(PointerTransition::Enter(next));
            }
            self.hovered = hit;
        }

        if sample.over_image && sample.moved {
            out.push(match hit {
                Some(index) => PointerTransition::Move(index),
                None => PointerTransition::ImageMove,
            });
        }

        if sample.over_image && sample.clicked {
            out.push(match hit {
                Some(index) => PointerTransition::Click(index),
                None => PointerTransition::ImageClick,
            });
        }

        out
    }

    /// Forgets the hovered area, reporting a leave for it.
    pub fn reset(&mut self) -> Option<PointerTransition> {
        self.hovered.take().map(PointerTransition::Leave)
    }
}

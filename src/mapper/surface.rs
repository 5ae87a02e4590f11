use crate::mapper::model::Color;
use eframe::egui::{Pos2, Rect, Vec2};

/// Outline handed to a surface for stroking or filling.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfacePath {
    Rect(Rect),
    Circle { center: Pos2, radius: f32 },
    /// Closed back to the first vertex.
    Polygon(Vec<Pos2>),
}

/// The highlight layer stacked over the image.
///
/// Mirrors the small part of a 2D canvas context the widget needs: a current
/// fill color, a current stroke, and stroke/fill/clear calls.
pub trait DrawingSurface {
    fn size(&self) -> Vec2;

    /// Resizing wipes the contents.
    fn resize(&mut self, size: Vec2);

    fn fill_color(&self) -> Color;

    fn set_fill_color(&mut self, color: Color);

    fn set_stroke(&mut self, color: Color, width: f32);

    fn stroke_path(&mut self, path: &SurfacePath);

    fn fill_path(&mut self, path: &SurfacePath);

    fn clear(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Stroke {
        path: SurfacePath,
        color: Color,
        width: f32,
    },
    Fill {
        path: SurfacePath,
        color: Color,
    },
}

impl DrawOp {
    pub fn path(&self) -> &SurfacePath {
        match self {
            DrawOp::Stroke { path, .. } | DrawOp::Fill { path, .. } => path,
        }
    }
}

/// Retained surface that keeps every operation since the last clear.
///
/// The egui widget replays it each frame; tests read it back directly.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    size: Vec2,
    fill: Color,
    stroke: Color,
    line_width: f32,
    ops: Vec<DrawOp>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self {
            size: Vec2::ZERO,
            fill: Color::rgb(0, 0, 0),
            stroke: Color::rgb(0, 0, 0),
            line_width: 1.0,
            ops: Vec::new(),
        }
    }
}

impl DisplayList {
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Filled paths in paint order.
    pub fn fills(&self) -> impl Iterator<Item = (&SurfacePath, Color)> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Fill { path, color } => Some((path, *color)),
            DrawOp::Stroke { .. } => None,
        })
    }
}

impl DrawingSurface for DisplayList {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn resize(&mut self, size: Vec2) {
        self.size = size;
        self.ops.clear();
    }

    fn fill_color(&self) -> Color {
        self.fill
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn set_stroke(&mut self, color: Color, width: f32) {
        self.stroke = color;
        self.line_width = width;
    }

    fn stroke_path(&mut self, path: &SurfacePath) {
        self.ops.push(DrawOp::Stroke {
            path: path.clone(),
            color: self.stroke,
            width: self.line_width,
        });
    }

    fn fill_path(&mut self, path: &SurfacePath) {
        self.ops.push(DrawOp::Fill {
            path: path.clone(),
            color: self.fill,
        });
    }

    fn clear(&mut self) {
        self.ops.clear();
    }
}

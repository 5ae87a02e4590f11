use crate::mapper::geometry::coord_pairs;
use crate::mapper::model::{Color, Shape};
use crate::mapper::surface::{DrawingSurface, SurfacePath};
use eframe::egui::{pos2, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStyle {
    pub fill: Color,
    pub line_width: f32,
    pub stroke: Color,
}

fn begin<S: DrawingSurface + ?Sized>(surface: &mut S, style: &PaintStyle) {
    surface.set_fill_color(style.fill);
    surface.set_stroke(style.stroke, style.line_width);
}

fn stroke_then_fill<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    path: &SurfacePath,
    style: &PaintStyle,
) {
    begin(surface, style);
    surface.stroke_path(path);
    surface.fill_path(path);
    // Callers observe the area's fill as the surface's active fill afterwards.
    surface.set_fill_color(style.fill);
}

pub fn draw_rect<S: DrawingSurface + ?Sized>(surface: &mut S, coords: &[f32], style: &PaintStyle) {
    let [left, top, right, bottom] = match coords {
        [l, t, r, b, ..] => [*l, *t, *r, *b],
        _ => {
            tracing::warn!(len = coords.len(), "rect needs 4 coordinates; skipping");
            return;
        }
    };
    let rect = Rect::from_two_pos(pos2(left, top), pos2(right, bottom));
    stroke_then_fill(surface, &SurfacePath::Rect(rect), style);
}

pub fn draw_circle<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    coords: &[f32],
    style: &PaintStyle,
) {
    let [x, y, radius] = match coords {
        [x, y, r, ..] => [*x, *y, *r],
        _ => {
            tracing::warn!(len = coords.len(), "circle needs 3 coordinates; skipping");
            return;
        }
    };
    let path = SurfacePath::Circle {
        center: pos2(x, y),
        radius,
    };
    stroke_then_fill(surface, &path, style);
}

pub fn draw_poly<S: DrawingSurface + ?Sized>(surface: &mut S, coords: &[f32], style: &PaintStyle) {
    let points = coord_pairs(coords);
    if points.is_empty() {
        tracing::warn!(len = coords.len(), "poly has no complete vertex; skipping");
        return;
    }
    stroke_then_fill(surface, &SurfacePath::Polygon(points), style);
}

/// Paints one area from its scaled coordinates.
pub fn draw_shape<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    shape: Shape,
    scaled_coords: &[f32],
    style: &PaintStyle,
) {
    match shape {
        Shape::Rect => draw_rect(surface, scaled_coords, style),
        Shape::Circle => draw_circle(surface, scaled_coords, style),
        Shape::Poly => draw_poly(surface, scaled_coords, style),
    }
}

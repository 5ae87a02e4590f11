//! Coordinate scaling, center points and point containment for areas.
//!
//! All coordinates here are flat lists whose meaning depends on the shape:
//! `rect` is `[left, top, right, bottom]`, `circle` is `[x, y, radius]` and
//! `poly` is `[x0, y0, x1, y1, ...]`.

use crate::mapper::model::{Area, Shape};
use eframe::egui::{pos2, Pos2};

/// Uniform scale from original image pixels to displayed pixels.
///
/// Only the horizontal ratio is used; it applies to both axes even when the
/// display height was set on its own.
pub fn scale_factor(display_width: Option<f32>, original_width: Option<f32>) -> f32 {
    match (display_width, original_width) {
        (Some(width), Some(original)) if width.is_finite() && width != 0.0 && original > 0.0 => {
            width / original
        }
        _ => 1.0,
    }
}

pub fn scale_coords(
    coords: &[f32],
    display_width: Option<f32>,
    original_width: Option<f32>,
) -> Vec<f32> {
    let scale = scale_factor(display_width, original_width);
    coords.iter().map(|c| c * scale).collect()
}

/// Visual center of an area given its already scaled coordinates.
///
/// Circles report their own center. Everything else reports the mean of the
/// x values and the mean of the y values, which is the vertex centroid for
/// polygons rather than the area centroid. `None` yields the origin.
pub fn compute_center(area: Option<&Area>, scaled_coords: &[f32]) -> Pos2 {
    let Some(area) = area else {
        return Pos2::ZERO;
    };

    match area.shape {
        Shape::Circle => pos2(
            scaled_coords.first().copied().unwrap_or(0.0),
            scaled_coords.get(1).copied().unwrap_or(0.0),
        ),
        Shape::Rect | Shape::Poly => {
            let n = scaled_coords.len() as f32 / 2.0;
            let (x, y) = scaled_coords
                .iter()
                .enumerate()
                .fold((0.0, 0.0), |(x, y), (idx, val)| {
                    if idx % 2 == 0 {
                        (x + val / n, y)
                    } else {
                        (x, y + val / n)
                    }
                });
            pos2(x, y)
        }
    }
}

/// Complete `(x, y)` pairs of a flat coordinate list; a trailing odd value is dropped.
pub fn coord_pairs(coords: &[f32]) -> Vec<Pos2> {
    coords
        .chunks_exact(2)
        .map(|pair| pos2(pair[0], pair[1]))
        .collect()
}

/// Whether `point` falls inside the shape described by `coords`.
///
/// Edges count as inside. Malformed coordinate lists never contain anything.
pub fn contains_point(shape: Shape, coords: &[f32], point: Pos2) -> bool {
    match shape {
        Shape::Rect => {
            let [left, top, right, bottom] = match coords {
                [l, t, r, b, ..] => [*l, *t, *r, *b],
                _ => return false,
            };
            let (x0, x1) = (left.min(right), left.max(right));
            let (y0, y1) = (top.min(bottom), top.max(bottom));
            point.x >= x0 && point.x <= x1 && point.y >= y0 && point.y <= y1
        }
        Shape::Circle => {
            let [x, y, radius] = match coords {
                [x, y, r, ..] => [*x, *y, *r],
                _ => return false,
            };
            point.distance_sq(pos2(x, y)) <= radius * radius
        }
        Shape::Poly => point_in_polygon(&coord_pairs(coords), point),
    }
}

/// Even-odd rule.
pub fn point_in_polygon(vertices: &[Pos2], point: Pos2) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (a, b) = (vertices[i], vertices[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_reference_width_disables_scaling() {
        assert_eq!(scale_factor(Some(200.0), Some(-10.0)), 1.0);
        assert_eq!(scale_factor(None, Some(100.0)), 1.0);
        assert_eq!(scale_factor(Some(0.0), Some(100.0)), 1.0);
    }

    #[test]
    fn odd_coordinate_count_divides_by_fractional_half() {
        let area = Area::poly(vec![3.0, 4.0, 3.0]);
        let center = compute_center(Some(&area), &area.coords);
        assert_eq!(center, pos2(4.0, 4.0 / 1.5));
    }

    #[test]
    fn empty_coords_center_at_origin() {
        let area = Area::poly(Vec::new());
        assert_eq!(compute_center(Some(&area), &[]), Pos2::ZERO);
    }

    #[test]
    fn rect_contains_edges_and_handles_swapped_corners() {
        let coords = [10.0, 10.0, 0.0, 0.0];
        assert!(contains_point(Shape::Rect, &coords, pos2(0.0, 5.0)));
        assert!(contains_point(Shape::Rect, &coords, pos2(10.0, 10.0)));
        assert!(!contains_point(Shape::Rect, &coords, pos2(10.5, 5.0)));
    }

    #[test]
    fn concave_polygon_notch_is_outside() {
        // U shape, notch spans x in 1..2 below y = 1.
        let coords = [
            0.0, 0.0, 3.0, 0.0, 3.0, 3.0, 2.0, 3.0, 2.0, 1.0, 1.0, 1.0, 1.0, 3.0, 0.0, 3.0,
        ];
        assert!(contains_point(Shape::Poly, &coords, pos2(0.5, 2.0)));
        assert!(!contains_point(Shape::Poly, &coords, pos2(1.5, 2.0)));
    }

    #[test]
    fn malformed_coords_contain_nothing() {
        assert!(!contains_point(Shape::Rect, &[0.0, 0.0, 5.0], pos2(1.0, 1.0)));
        assert!(!contains_point(Shape::Circle, &[0.0, 0.0], pos2(0.0, 0.0)));
        assert!(!contains_point(Shape::Poly, &[0.0, 0.0, 5.0, 5.0], pos2(1.0, 1.0)));
    }
}

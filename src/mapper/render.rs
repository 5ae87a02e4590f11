use crate::mapper::geometry::point_in_polygon;
use crate::mapper::model::Color;
use crate::mapper::surface::{DisplayList, DrawOp, DrawingSurface, SurfacePath};
use anyhow::{anyhow, Context, Result};
use eframe::egui;
use eframe::egui::{pos2, Pos2, Vec2};
use lyon::math::point;
use lyon::path::Path as FillPath;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};
use std::path::Path;

/// Pixel span of a shape, already clipped to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Pixels touched by the box `min..=max` grown by `pad`, clipped to a
    /// `width` x `height` canvas. Clipping happens before the integer cast so
    /// huge or non-finite coordinates cannot overflow.
    pub fn around(min: Pos2, max: Pos2, pad: f32, width: u32, height: u32) -> Option<Self> {
        let clip = |v: f32, limit: u32| v.max(0.0).min(limit as f32) as u32;
        let x0 = clip((min.x - pad).floor(), width);
        let y0 = clip((min.y - pad).floor(), height);
        let x1 = clip((max.x + pad).ceil() + 1.0, width);
        let y1 = clip((max.y + pad).ceil() + 1.0, height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Software drawing surface backed by a straight-alpha RGBA buffer.
///
/// Used for headless export; shapes are rasterised at pixel centers and
/// blended source-over.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    fill: Color,
    stroke: Color,
    line_width: f32,
}

impl Default for PixelCanvas {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        Self {
            width,
            height,
            rgba: vec![0; len],
            fill: Color::rgb(0, 0, 0),
            stroke: Color::rgb(0, 0, 0),
            line_width: 1.0,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn rgba_pixels(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }
        let idx = self.offset(x, y);
        Color::rgba(
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        )
    }

    pub fn to_rgba_image(&self) -> Result<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba.clone())
            .ok_or_else(|| anyhow!("pixel buffer does not match {}x{}", self.width, self.height))
    }

    /// Lays this layer over `base` (scaled to the same size beforehand) and writes a PNG.
    pub fn save_composited_png(&self, base: &image::RgbaImage, path: &Path) -> Result<()> {
        let mut composed = if base.dimensions() == (self.width, self.height) {
            base.clone()
        } else {
            image::imageops::resize(
                base,
                self.width,
                self.height,
                image::imageops::FilterType::Triangle,
            )
        };
        let overlay = self.to_rgba_image()?;
        image::imageops::overlay(&mut composed, &overlay, 0, 0);
        composed
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write {}", path.display()))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    fn blend_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.offset(x, y);
        let dst = &mut self.rgba[idx..idx + 4];

        let src_a = f32::from(color.a) / 255.0;
        let dst_a = f32::from(dst[3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= f32::EPSILON {
            dst.copy_from_slice(&[0, 0, 0, 0]);
            return;
        }
        let src = [color.r, color.g, color.b];
        for channel in 0..3 {
            let s = f32::from(src[channel]);
            let d = f32::from(dst[channel]);
            let out = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            dst[channel] = out.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    fn cover<F>(&mut self, (min, max): (Pos2, Pos2), pad: f32, color: Color, inside: F)
    where
        F: Fn(Pos2) -> bool,
    {
        let Some(clip) = PixelRect::around(min, max, pad, self.width, self.height) else {
            return;
        };
        for y in clip.y..(clip.y + clip.height) {
            for x in clip.x..(clip.x + clip.width) {
                if inside(pos2(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }
}

fn path_bounds(path: &SurfacePath) -> Option<(Pos2, Pos2)> {
    match path {
        SurfacePath::Rect(rect) => Some((rect.min, rect.max)),
        SurfacePath::Circle { center, radius } => {
            let r = radius.abs();
            Some((
                pos2(center.x - r, center.y - r),
                pos2(center.x + r, center.y + r),
            ))
        }
        SurfacePath::Polygon(points) => {
            let first = *points.first()?;
            Some(points.iter().fold((first, first), |(min, max), p| {
                (min.min(*p), max.max(*p))
            }))
        }
    }
}

fn point_segment_distance_sq(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let v = end - start;
    let w = point - start;
    let len_sq = v.length_sq();
    if len_sq <= f32::EPSILON {
        return w.length_sq();
    }
    let t = (w.dot(v) / len_sq).clamp(0.0, 1.0);
    point.distance_sq(start + v * t)
}

fn closed_edges(path: &SurfacePath) -> Vec<(Pos2, Pos2)> {
    let corners = match path {
        SurfacePath::Rect(rect) => vec![
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
        ],
        SurfacePath::Polygon(points) => points.clone(),
        SurfacePath::Circle { .. } => return Vec::new(),
    };
    if corners.is_empty() {
        return Vec::new();
    }
    (0..corners.len())
        .map(|i| (corners[i], corners[(i + 1) % corners.len()]))
        .collect()
}

impl DrawingSurface for PixelCanvas {
    fn size(&self) -> Vec2 {
        egui::vec2(self.width as f32, self.height as f32)
    }

    fn resize(&mut self, size: Vec2) {
        let fill = self.fill;
        *self = Self::new(size.x.max(0.0).round() as u32, size.y.max(0.0).round() as u32);
        self.fill = fill;
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
        let Some(bounds) = path_bounds(path) else {
            return;
        };
        let half = self.line_width.max(0.0) / 2.0;
        if half <= 0.0 {
            return;
        }
        let color = self.stroke;
        match path {
            SurfacePath::Circle { center, radius } => {
                let (center, radius) = (*center, radius.abs());
                self.cover(bounds, half, color, |p| {
                    (p.distance(center) - radius).abs() <= half
                });
            }
            _ => {
                let edges = closed_edges(path);
                let half_sq = half * half;
                self.cover(bounds, half, color, |p| {
                    edges
                        .iter()
                        .any(|(a, b)| point_segment_distance_sq(p, *a, *b) <= half_sq)
                });
            }
        }
    }

    fn fill_path(&mut self, path: &SurfacePath) {
        let Some(bounds) = path_bounds(path) else {
            return;
        };
        let color = self.fill;
        match path {
            SurfacePath::Rect(rect) => {
                let rect = *rect;
                self.cover(bounds, 0.0, color, |p| rect.contains(p));
            }
            SurfacePath::Circle { center, radius } => {
                let (center, radius_sq) = (*center, radius * radius);
                self.cover(bounds, 0.0, color, |p| p.distance_sq(center) <= radius_sq);
            }
            SurfacePath::Polygon(points) => {
                let points = points.clone();
                self.cover(bounds, 0.0, color, |p| point_in_polygon(&points, p));
            }
        }
    }

    fn clear(&mut self) {
        self.rgba.fill(0);
    }
}

/// Triangulates the closed path through `points` with the even-odd rule.
///
/// Returns an empty mesh for fewer than three points or when tessellation fails.
pub fn polygon_fill_mesh(points: &[Pos2], color: egui::Color32) -> egui::Mesh {
    let mut mesh = egui::Mesh::default();
    let [first, rest @ ..] = points else {
        return mesh;
    };
    if rest.len() < 2 {
        return mesh;
    }

    let mut builder = FillPath::builder();
    builder.begin(point(first.x, first.y));
    for p in rest {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(true);
    let path = builder.build();

    let mut buffers: VertexBuffers<Pos2, u32> = VertexBuffers::new();
    let options = FillOptions::default().with_fill_rule(FillRule::EvenOdd);
    let result = FillTessellator::new().tessellate_path(
        &path,
        &options,
        &mut BuffersBuilder::new(&mut buffers, |vertex: FillVertex| {
            let p = vertex.position();
            pos2(p.x, p.y)
        }),
    );
    if let Err(err) = result {
        tracing::warn!(?err, points = points.len(), "polygon fill tessellation failed");
        return mesh;
    }

    for vertex in buffers.vertices {
        mesh.colored_vertex(vertex, color);
    }
    mesh.indices = buffers.indices;
    mesh
}

/// Replays a display list into an egui painter with its origin at `origin`.
pub fn paint_display_list(painter: &egui::Painter, list: &DisplayList, origin: Pos2) {
    let offset = origin.to_vec2();
    for op in list.ops() {
        let shape = match op {
            DrawOp::Stroke { path, color, width } => {
                let stroke = egui::Stroke::new(*width, egui::Color32::from(*color));
                match path {
                    SurfacePath::Rect(rect) => {
                        egui::Shape::rect_stroke(rect.translate(offset), 0.0, stroke)
                    }
                    SurfacePath::Circle { center, radius } => {
                        egui::Shape::circle_stroke(*center + offset, *radius, stroke)
                    }
                    SurfacePath::Polygon(points) => egui::Shape::closed_line(
                        points.iter().map(|p| *p + offset).collect(),
                        stroke,
                    ),
                }
            }
            DrawOp::Fill { path, color } => {
                let fill = egui::Color32::from(*color);
                match path {
                    SurfacePath::Rect(rect) => {
                        egui::Shape::rect_filled(rect.translate(offset), 0.0, fill)
                    }
                    SurfacePath::Circle { center, radius } => {
                        egui::Shape::circle_filled(*center + offset, *radius, fill)
                    }
                    SurfacePath::Polygon(points) => {
                        let moved: Vec<Pos2> = points.iter().map(|p| *p + offset).collect();
                        egui::Shape::mesh(polygon_fill_mesh(&moved, fill))
                    }
                }
            }
        };
        painter.add(shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::draw::{draw_circle, draw_poly, draw_rect, PaintStyle};

    fn opaque(fill: Color) -> PaintStyle {
        PaintStyle {
            fill,
            line_width: 1.0,
            stroke: Color::rgb(0, 0, 0),
        }
    }

    #[test]
    fn rect_fill_covers_interior_only() {
        let mut canvas = PixelCanvas::new(20, 20);
        draw_rect(&mut canvas, &[4.0, 4.0, 12.0, 12.0], &opaque(Color::rgb(255, 0, 0)));
        assert_eq!(canvas.pixel(8, 8), Color::rgb(255, 0, 0));
        assert_eq!(canvas.pixel(16, 16), Color::TRANSPARENT);
        assert_eq!(canvas.pixel(1, 1), Color::TRANSPARENT);
    }

    #[test]
    fn circle_fill_leaves_corners_of_its_box_untouched() {
        let mut canvas = PixelCanvas::new(20, 20);
        draw_circle(&mut canvas, &[10.0, 10.0, 6.0], &opaque(Color::rgb(0, 0, 255)));
        assert_eq!(canvas.pixel(10, 10), Color::rgb(0, 0, 255));
        assert_eq!(canvas.pixel(4, 4), Color::TRANSPARENT);
    }

    #[test]
    fn stroke_is_drawn_under_the_fill() {
        let mut canvas = PixelCanvas::new(20, 20);
        let style = PaintStyle {
            fill: Color::rgba(255, 255, 255, 128),
            line_width: 2.0,
            stroke: Color::rgb(0, 0, 0),
        };
        draw_rect(&mut canvas, &[4.0, 4.0, 12.0, 12.0], &style);
        // Inner half of the stroke is overlaid by the translucent fill.
        let edge = canvas.pixel(4, 8);
        assert_eq!(edge.a, 255);
        assert!(edge.r > 100 && edge.r < 160, "{edge:?}");
        // Outer half is pure stroke.
        assert_eq!(canvas.pixel(3, 8), Color::rgb(0, 0, 0));
    }

    #[test]
    fn translucent_fill_blends_over_transparent_as_is() {
        let mut canvas = PixelCanvas::new(8, 8);
        draw_poly(
            &mut canvas,
            &[0.0, 0.0, 8.0, 0.0, 8.0, 8.0, 0.0, 8.0],
            &PaintStyle {
                fill: Color::rgba(10, 20, 30, 128),
                line_width: 0.0,
                stroke: Color::rgb(0, 0, 0),
            },
        );
        assert_eq!(canvas.pixel(4, 4), Color::rgba(10, 20, 30, 128));
    }

    #[test]
    fn resize_clears_but_keeps_fill_color() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.set_fill_color(Color::rgb(1, 1, 1));
        canvas.fill_path(&SurfacePath::Rect(egui::Rect::from_min_max(
            pos2(0.0, 0.0),
            pos2(4.0, 4.0),
        )));
        canvas.resize(egui::vec2(6.0, 2.0));
        assert_eq!(canvas.dimensions(), (6, 2));
        assert!(canvas.rgba_pixels().iter().all(|b| *b == 0));
        assert_eq!(canvas.fill_color(), Color::rgb(1, 1, 1));
    }

    #[test]
    fn pixel_span_is_clipped_before_casting() {
        let span = PixelRect::around(pos2(-1.2e9, 2.0), pos2(1.2e9, 4.0), 0.5, 20, 10);
        assert_eq!(
            span,
            Some(PixelRect {
                x: 0,
                y: 1,
                width: 20,
                height: 5
            })
        );
        assert_eq!(PixelRect::around(pos2(30.0, 0.0), pos2(40.0, 5.0), 0.0, 20, 10), None);
        assert_eq!(
            PixelRect::around(pos2(f32::NAN, 0.0), pos2(f32::NAN, 5.0), 0.0, 20, 10),
            None
        );
    }

    #[test]
    fn areas_far_larger_than_the_canvas_still_fill_it() {
        let mut canvas = PixelCanvas::new(20, 20);
        draw_rect(
            &mut canvas,
            &[-1.2e9, 0.0, 1.2e9, 10.0],
            &opaque(Color::rgb(255, 0, 0)),
        );
        assert_eq!(canvas.pixel(10, 5), Color::rgb(255, 0, 0));
        assert_eq!(canvas.pixel(10, 15), Color::TRANSPARENT);

        draw_circle(&mut canvas, &[10.0, 10.0, 2e9], &opaque(Color::rgb(0, 0, 255)));
        assert_eq!(canvas.pixel(0, 19), Color::rgb(0, 0, 255));
    }

    fn triangle_contains(tri: [Pos2; 3], p: Pos2) -> bool {
        let side = |a: Pos2, b: Pos2| (b - a).x * (p - a).y - (b - a).y * (p - a).x;
        let (d0, d1, d2) = (side(tri[0], tri[1]), side(tri[1], tri[2]), side(tri[2], tri[0]));
        let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
        let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
        !(has_neg && has_pos)
    }

    fn mesh_triangles(mesh: &egui::Mesh) -> Vec<[Pos2; 3]> {
        mesh.indices
            .chunks_exact(3)
            .map(|t| {
                [
                    mesh.vertices[t[0] as usize].pos,
                    mesh.vertices[t[1] as usize].pos,
                    mesh.vertices[t[2] as usize].pos,
                ]
            })
            .collect()
    }

    #[test]
    fn concave_polygon_mesh_leaves_the_notch_open() {
        // U shape: 3x3 square minus the 1x2 notch at x in 1..2, y in 1..3.
        let points: Vec<Pos2> = [
            (0.0, 0.0),
            (3.0, 0.0),
            (3.0, 3.0),
            (2.0, 3.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 3.0),
            (0.0, 3.0),
        ]
        .into_iter()
        .map(|(x, y)| pos2(x, y))
        .collect();
        let mesh = polygon_fill_mesh(&points, egui::Color32::RED);
        let triangles = mesh_triangles(&mesh);
        assert!(!triangles.is_empty());

        let notch = pos2(1.5, 2.0);
        assert!(triangles.iter().all(|t| !triangle_contains(*t, notch)));
        assert!(triangles.iter().any(|t| triangle_contains(*t, pos2(0.5, 2.0))));

        // No overlapping triangles: their areas add up to the U's area.
        let covered: f32 = triangles
            .iter()
            .map(|[a, b, c]| ((*b - *a).x * (*c - *a).y - (*b - *a).y * (*c - *a).x).abs() / 2.0)
            .sum();
        assert!((covered - 7.0).abs() < 1e-3, "{covered}");
    }

    #[test]
    fn degenerate_polygon_mesh_is_empty() {
        let mesh = polygon_fill_mesh(&[pos2(0.0, 0.0), pos2(1.0, 1.0)], egui::Color32::RED);
        assert!(mesh.indices.is_empty());
    }
}

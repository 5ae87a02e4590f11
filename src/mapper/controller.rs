use crate::mapper::draw::{draw_shape, PaintStyle};
use crate::mapper::geometry::{compute_center, contains_point, scale_coords, scale_factor};
use crate::mapper::input::{PointerEvent, PointerTracker};
use crate::mapper::model::{
    Area, Color, Map, ScaledArea, DEFAULT_FILL_COLOR, DEFAULT_LINE_WIDTH, DEFAULT_STROKE_COLOR,
};
use crate::mapper::state::{can_transition, MapperLifecycle};
use crate::mapper::surface::{DisplayList, DrawingSurface};
use eframe::egui::{vec2, Pos2, Vec2};

/// Per-render configuration supplied by the host.
///
/// Any change to these values re-initializes the drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMapperProps {
    /// Opaque image reference; only compared for change detection.
    pub src: String,
    pub map: Map,
    pub fill_color: Color,
    pub stroke_color: Color,
    pub line_width: f32,
    /// Explicit display width; intrinsic width when `None`.
    pub width: Option<f32>,
    /// Explicit display height; intrinsic height when `None`.
    pub height: Option<f32>,
    /// Hover-highlight mode.
    pub active: bool,
    /// Width of the image the area coordinates were authored against.
    pub img_width: Option<f32>,
}

impl ImageMapperProps {
    pub fn new(src: impl Into<String>, map: Map) -> Self {
        Self {
            src: src.into(),
            map,
            fill_color: DEFAULT_FILL_COLOR,
            stroke_color: DEFAULT_STROKE_COLOR,
            line_width: DEFAULT_LINE_WIDTH,
            width: None,
            height: None,
            active: false,
            img_width: None,
        }
    }
}

/// Payload handed to per-area callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaEvent {
    pub area: ScaledArea,
    pub index: usize,
    pub event: PointerEvent,
}

pub type LoadCallback = Box<dyn FnMut()>;
pub type AreaCallback = Box<dyn FnMut(&AreaEvent)>;
pub type ImageCallback = Box<dyn FnMut(&PointerEvent)>;

#[derive(Default)]
pub struct MapperHandlers {
    pub on_load: Option<LoadCallback>,
    pub on_click: Option<AreaCallback>,
    pub on_mouse_enter: Option<AreaCallback>,
    pub on_mouse_leave: Option<AreaCallback>,
    pub on_mouse_move: Option<AreaCallback>,
    pub on_image_click: Option<ImageCallback>,
    pub on_image_mouse_move: Option<ImageCallback>,
}

impl std::fmt::Debug for MapperHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperHandlers")
            .field("on_load", &self.on_load.is_some())
            .field("on_click", &self.on_click.is_some())
            .field("on_mouse_enter", &self.on_mouse_enter.is_some())
            .field("on_mouse_leave", &self.on_mouse_leave.is_some())
            .field("on_mouse_move", &self.on_mouse_move.is_some())
            .field("on_image_click", &self.on_image_click.is_some())
            .field("on_image_mouse_move", &self.on_image_mouse_move.is_some())
            .finish()
    }
}

/// Image map state: the host's props and callbacks plus the owned
/// highlight surface.
///
/// Every operation that paints is a no-op until a surface is mounted.
#[derive(Debug)]
pub struct ImageMapper<S: DrawingSurface = DisplayList> {
    props: ImageMapperProps,
    handlers: MapperHandlers,
    surface: Option<S>,
    intrinsic_size: Vec2,
    lifecycle: MapperLifecycle,
    tracker: PointerTracker,
}

impl<S: DrawingSurface> ImageMapper<S> {
    pub fn new(props: ImageMapperProps) -> Self {
        Self {
            props,
            handlers: MapperHandlers::default(),
            surface: None,
            intrinsic_size: Vec2::ZERO,
            lifecycle: MapperLifecycle::Uninitialized,
            tracker: PointerTracker::default(),
        }
    }

    pub fn on_load(mut self, f: impl FnMut() + 'static) -> Self {
        self.handlers.on_load = Some(Box::new(f));
        self
    }

    pub fn on_click(mut self, f: impl FnMut(&AreaEvent) + 'static) -> Self {
        self.handlers.on_click = Some(Box::new(f));
        self
    }

    pub fn on_mouse_enter(mut self, f: impl FnMut(&AreaEvent) + 'static) -> Self {
        self.handlers.on_mouse_enter = Some(Box::new(f));
        self
    }

    pub fn on_mouse_leave(mut self, f: impl FnMut(&AreaEvent) + 'static) -> Self {
        self.handlers.on_mouse_leave = Some(Box::new(f));
        self
    }

    pub fn on_mouse_move(mut self, f: impl FnMut(&AreaEvent) + 'static) -> Self {
        self.handlers.on_mouse_move = Some(Box::new(f));
        self
    }

    pub fn on_image_click(mut self, f: impl FnMut(&PointerEvent) + 'static) -> Self {
        self.handlers.on_image_click = Some(Box::new(f));
        self
    }

    pub fn on_image_mouse_move(mut self, f: impl FnMut(&PointerEvent) + 'static) -> Self {
        self.handlers.on_image_mouse_move = Some(Box::new(f));
        self
    }

    pub fn handlers_mut(&mut self) -> &mut MapperHandlers {
        &mut self.handlers
    }

    pub fn props(&self) -> &ImageMapperProps {
        &self.props
    }

    pub fn lifecycle(&self) -> MapperLifecycle {
        self.lifecycle
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn intrinsic_size(&self) -> Vec2 {
        self.intrinsic_size
    }

    /// Area the pointer was over when the widget last handled input.
    pub fn hovered_area(&self) -> Option<usize> {
        self.tracker.hovered()
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut PointerTracker {
        &mut self.tracker
    }

    /// Attaches the drawing surface for an image of `intrinsic_size` and
    /// initializes it.
    pub fn mount(&mut self, surface: S, intrinsic_size: Vec2) {
        self.surface = Some(surface);
        self.intrinsic_size = intrinsic_size;
        self.init_canvas();
    }

    /// Releases the drawing surface; the mapper goes back to uninitialized.
    pub fn unmount(&mut self) -> Option<S> {
        if can_transition(self.lifecycle, MapperLifecycle::Uninitialized) {
            self.lifecycle = MapperLifecycle::Uninitialized;
        }
        self.tracker = PointerTracker::default();
        tracing::debug!(map = %self.props.map.name, "image mapper unmounted");
        self.surface.take()
    }

    /// Replaces the props, re-initializing only when something changed.
    pub fn set_props(&mut self, props: ImageMapperProps) {
        if props == self.props {
            return;
        }
        self.props = props;
        self.init_canvas();
    }

    /// Records the loaded image's natural size, re-initializing on change.
    pub fn set_intrinsic_size(&mut self, size: Vec2) {
        if size == self.intrinsic_size {
            return;
        }
        self.intrinsic_size = size;
        self.init_canvas();
    }

    /// Size the image and the surface are displayed at.
    ///
    /// A single explicit dimension keeps the image's aspect ratio.
    pub fn display_size(&self) -> Vec2 {
        let natural = self.intrinsic_size;
        let aspect = |num: f32, den: f32| if den > 0.0 { num / den } else { 0.0 };
        match (self.props.width, self.props.height) {
            (Some(w), Some(h)) => vec2(w, h),
            (Some(w), None) => vec2(w, w * aspect(natural.y, natural.x)),
            (None, Some(h)) => vec2(h * aspect(natural.x, natural.y), h),
            (None, None) => natural,
        }
    }

    pub fn scale(&self) -> f32 {
        scale_factor(self.props.width, self.props.img_width)
    }

    pub fn scaled_coords(&self, area: &Area) -> Vec<f32> {
        scale_coords(&area.coords, self.props.width, self.props.img_width)
    }

    /// Extended copy of the area at `index` with display coordinates and center.
    pub fn scaled_area(&self, index: usize) -> Option<ScaledArea> {
        let area = self.props.map.areas.get(index)?;
        let scaled_coords = self.scaled_coords(area);
        let center = compute_center(Some(area), &scaled_coords);
        Some(ScaledArea {
            area: area.clone(),
            scaled_coords,
            center,
        })
    }

    /// First area, in collection order, containing `pos` (display coordinates).
    pub fn hit_test(&self, pos: Pos2) -> Option<usize> {
        self.props
            .map
            .areas
            .iter()
            .position(|area| contains_point(area.shape, &self.scaled_coords(area), pos))
    }

    pub fn has_click_handler(&self) -> bool {
        self.handlers.on_click.is_some()
    }

    /// Sizes the surface to the displayed image, resets its fill color,
    /// notifies `on_load` and paints the pre-filled areas.
    pub fn init_canvas(&mut self) {
        let size = self.display_size();
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.resize(size);
        surface.set_fill_color(self.props.fill_color);

        if can_transition(self.lifecycle, MapperLifecycle::Ready) {
            self.lifecycle = MapperLifecycle::Ready;
        }
        tracing::debug!(
            map = %self.props.map.name,
            width = size.x,
            height = size.y,
            scale = self.scale(),
            "image mapper initialized"
        );

        if let Some(on_load) = self.handlers.on_load.as_mut() {
            on_load();
        }
        self.render_prefilled_areas();
    }

    fn area_style(&self, area: &Area, fill: Color) -> PaintStyle {
        PaintStyle {
            fill,
            line_width: area
                .line_width
                .filter(|w| *w > 0.0)
                .unwrap_or(self.props.line_width),
            stroke: area.stroke_color.unwrap_or(self.props.stroke_color),
        }
    }

    fn paint_area(&mut self, area: &Area, fill: Color) {
        let style = self.area_style(area, fill);
        let coords = self.scaled_coords(area);
        if let Some(surface) = self.surface.as_mut() {
            draw_shape(surface, area.shape, &coords, &style);
        }
    }

    /// Paints every area with a pre-fill color, in collection order.
    pub fn render_prefilled_areas(&mut self) {
        if self.surface.is_none() {
            return;
        }
        let areas = self.props.map.areas.clone();
        let mut painted = 0usize;
        for area in &areas {
            let Some(fill) = area.pre_fill_color else {
                continue;
            };
            self.paint_area(area, fill);
            painted += 1;
        }
        tracing::debug!(painted, "pre-filled areas rendered");
    }

    fn highlight_fill(&self, area: &Area) -> Color {
        area.fill_color
            .or(area.pre_fill_color)
            .unwrap_or(self.props.fill_color)
    }

    fn area_event(&self, index: usize, event: PointerEvent) -> Option<AreaEvent> {
        Some(AreaEvent {
            area: self.scaled_area(index)?,
            index,
            event,
        })
    }

    pub fn hover_on(&mut self, index: usize, event: PointerEvent) {
        if event.target_shape.is_none() {
            tracing::trace!(index, "hover target has no shape; ignoring");
            return;
        }
        let Some(payload) = self.area_event(index, event) else {
            return;
        };
        tracing::trace!(index, "pointer entered area");

        if self.props.active {
            let fill = self.highlight_fill(&payload.area);
            self.paint_area(&payload.area.area, fill);
        }
        if let Some(cb) = self.handlers.on_mouse_enter.as_mut() {
            cb(&payload);
        }
    }

    /// With hover highlighting on, the whole surface is cleared and the
    /// pre-filled areas repainted; there is no per-area un-highlight.
    pub fn hover_off(&mut self, index: usize, event: PointerEvent) {
        let Some(payload) = self.area_event(index, event) else {
            return;
        };
        tracing::trace!(index, "pointer left area");

        if self.props.active {
            if let Some(surface) = self.surface.as_mut() {
                surface.clear();
                self.render_prefilled_areas();
            }
        }
        if let Some(cb) = self.handlers.on_mouse_leave.as_mut() {
            cb(&payload);
        }
    }

    pub fn mouse_move(&mut self, index: usize, event: PointerEvent) {
        if self.handlers.on_mouse_move.is_none() {
            return;
        }
        let Some(payload) = self.area_event(index, event) else {
            return;
        };
        if let Some(cb) = self.handlers.on_mouse_move.as_mut() {
            cb(&payload);
        }
    }

    /// Returns the event as dispatched; a registered click handler always
    /// prevents the default navigation.
    pub fn click(&mut self, index: usize, mut event: PointerEvent) -> PointerEvent {
        if self.handlers.on_click.is_none() {
            return event;
        }
        event.prevent_default();
        let Some(payload) = self.area_event(index, event) else {
            return event;
        };
        tracing::debug!(index, area = ?payload.area.name, "area clicked");
        if let Some(cb) = self.handlers.on_click.as_mut() {
            cb(&payload);
        }
        event
    }

    /// Target to follow when a click on `index` was not default-prevented.
    pub fn navigation_target(&self, index: usize, event: &PointerEvent) -> Option<&str> {
        if event.default_prevented() {
            return None;
        }
        self.props.map.areas.get(index)?.href.as_deref()
    }

    pub fn image_click(&mut self, mut event: PointerEvent) -> PointerEvent {
        if let Some(cb) = self.handlers.on_image_click.as_mut() {
            event.prevent_default();
            cb(&event);
        }
        event
    }

    pub fn image_mouse_move(&mut self, event: PointerEvent) {
        if let Some(cb) = self.handlers.on_image_mouse_move.as_mut() {
            cb(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::model::Shape;
    use eframe::egui::pos2;

    fn props(width: Option<f32>, height: Option<f32>) -> ImageMapperProps {
        ImageMapperProps {
            width,
            height,
            ..ImageMapperProps::new("img.png", Map::new("m", Vec::new()))
        }
    }

    #[test]
    fn single_explicit_dimension_keeps_aspect_ratio() {
        let mut mapper: ImageMapper = ImageMapper::new(props(Some(100.0), None));
        mapper.mount(DisplayList::default(), vec2(200.0, 50.0));
        assert_eq!(mapper.display_size(), vec2(100.0, 25.0));

        mapper.set_props(props(None, Some(100.0)));
        assert_eq!(mapper.display_size(), vec2(400.0, 100.0));
        assert_eq!(mapper.surface().unwrap().size(), vec2(400.0, 100.0));
    }

    #[test]
    fn zero_area_line_width_falls_back_to_default() {
        let mapper: ImageMapper = ImageMapper::new(props(None, None));
        let mut area = Area::rect(0.0, 0.0, 1.0, 1.0);
        area.line_width = Some(0.0);
        assert_eq!(mapper.area_style(&area, Color::TRANSPARENT).line_width, 1.0);
        area.line_width = Some(4.0);
        assert_eq!(mapper.area_style(&area, Color::TRANSPARENT).line_width, 4.0);
    }

    #[test]
    fn hit_test_prefers_earlier_area_on_overlap() {
        let map = Map::new(
            "m",
            vec![
                Area::circle(10.0, 10.0, 10.0),
                Area::rect(0.0, 0.0, 40.0, 40.0),
            ],
        );
        let mapper: ImageMapper = ImageMapper::new(ImageMapperProps::new("i", map));
        assert_eq!(mapper.hit_test(pos2(10.0, 10.0)), Some(0));
        assert_eq!(mapper.hit_test(pos2(35.0, 35.0)), Some(1));
        assert_eq!(mapper.hit_test(pos2(50.0, 50.0)), None);
    }

    #[test]
    fn unmount_releases_surface() {
        let mut mapper: ImageMapper =
            ImageMapper::new(ImageMapperProps::new("i", Map::new("m", Vec::new())));
        mapper.mount(DisplayList::default(), vec2(10.0, 10.0));
        assert!(mapper.lifecycle().is_ready());
        assert!(mapper.unmount().is_some());
        assert_eq!(mapper.lifecycle(), MapperLifecycle::Uninitialized);
        assert!(mapper.surface().is_none());
    }

    #[test]
    fn scaled_area_carries_shape_through() {
        let map = Map::new("m", vec![Area::circle(20.0, 40.0, 8.0)]);
        let props = ImageMapperProps {
            width: Some(50.0),
            img_width: Some(100.0),
            ..ImageMapperProps::new("i", map)
        };
        let mapper: ImageMapper = ImageMapper::new(props);
        let scaled = mapper.scaled_area(0).unwrap();
        assert_eq!(scaled.shape, Shape::Circle);
        assert_eq!(scaled.scaled_coords, vec![10.0, 20.0, 4.0]);
        assert_eq!(scaled.center, pos2(10.0, 20.0));
    }
}

use crate::mapper::controller::ImageMapper;
use crate::mapper::input::{PointerEvent, PointerSample, PointerTransition};
use crate::mapper::render::paint_display_list;
use crate::mapper::surface::DisplayList;
use eframe::egui;

fn targeted(mapper: &ImageMapper<DisplayList>, base: PointerEvent, index: usize) -> PointerEvent {
    let mut event = base;
    event.target_shape = mapper.props().map.areas.get(index).map(|a| a.shape);
    event
}

/// What happened to the image map during this frame.
#[derive(Debug)]
pub struct MapperResponse {
    pub response: egui::Response,
    /// Area under the pointer after this frame's events.
    pub hovered: Option<usize>,
    /// Href followed because a click was left to its default action.
    pub navigated: Option<String>,
}

/// Shows an [`ImageMapper`] over a loaded texture.
///
/// The first call mounts a [`DisplayList`] surface sized from the texture.
pub struct ImageMapperView<'a> {
    mapper: &'a mut ImageMapper<DisplayList>,
    texture: &'a egui::TextureHandle,
    follow_links: bool,
}

impl<'a> ImageMapperView<'a> {
    pub fn new(
        mapper: &'a mut ImageMapper<DisplayList>,
        texture: &'a egui::TextureHandle,
    ) -> Self {
        Self {
            mapper,
            texture,
            follow_links: true,
        }
    }

    /// When off, hrefs of un-prevented clicks are reported but not opened.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> MapperResponse {
        let Self {
            mapper,
            texture,
            follow_links,
        } = self;

        let natural = texture.size_vec2();
        if mapper.lifecycle().is_ready() {
            mapper.set_intrinsic_size(natural);
        } else {
            mapper.mount(DisplayList::default(), natural);
        }

        let size = mapper.display_size();
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());

        let painter = ui.painter_at(rect);
        painter.image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let (hover_pos, delta, clicked, modifiers) = ui.input(|i| {
            (
                i.pointer.hover_pos(),
                i.pointer.delta(),
                i.pointer.primary_clicked(),
                i.modifiers,
            )
        });
        let visible = ui.clip_rect().intersect(rect);
        let pointer = hover_pos.filter(|p| visible.contains(*p));
        let local = pointer.map(|p| (p - rect.min).to_pos2());

        let sample = PointerSample {
            hit: local.and_then(|p| mapper.hit_test(p)),
            over_image: local.is_some(),
            moved: delta != egui::Vec2::ZERO,
            clicked,
        };
        let transitions = mapper.tracker_mut().update(sample);

        let base_event =
            PointerEvent::new(local.unwrap_or(egui::Pos2::ZERO)).with_modifiers(modifiers);

        let mut navigated = None;
        for transition in transitions {
            tracing::trace!(?transition, "image map pointer transition");
            match transition {
                PointerTransition::Enter(index) => {
                    let event = targeted(mapper, base_event, index);
                    mapper.hover_on(index, event);
                }
                PointerTransition::Leave(index) => {
                    let event = targeted(mapper, base_event, index);
                    mapper.hover_off(index, event);
                }
                PointerTransition::Move(index) => {
                    let event = targeted(mapper, base_event, index);
                    mapper.mouse_move(index, event);
                }
                PointerTransition::Click(index) => {
                    let event = targeted(mapper, base_event, index);
                    let event = event.with_button(egui::PointerButton::Primary);
                    let event = mapper.click(index, event);
                    if let Some(href) = mapper.navigation_target(index, &event) {
                        if follow_links {
                            ui.ctx().open_url(egui::OpenUrl::same_tab(href));
                        }
                        navigated = Some(href.to_owned());
                    }
                }
                PointerTransition::ImageMove => mapper.image_mouse_move(base_event),
                PointerTransition::ImageClick => {
                    mapper.image_click(base_event.with_button(egui::PointerButton::Primary));
                }
            }
        }

        let hovered = mapper.hovered_area();
        if hovered.is_some() && mapper.has_click_handler() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        if let Some(list) = mapper.surface() {
            paint_display_list(&painter, list, rect.min);
        }

        MapperResponse {
            response,
            hovered,
            navigated,
        }
    }
}

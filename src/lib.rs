pub mod logging;
pub mod mapper;
pub mod settings;

pub use mapper::{
    Area, AreaEvent, Color, DisplayList, DrawingSurface, ImageMapper, ImageMapperProps,
    ImageMapperView, Map, MapperResponse, ScaledArea, Shape,
};
pub use settings::MapperSettings;

/// Loads settings from `path`, starts logging as they ask, then repairs
/// invalid values so the warnings land in the configured log.
pub fn init_from_settings(path: &std::path::Path) -> anyhow::Result<MapperSettings> {
    let mut settings = MapperSettings::load_unchecked(path)?;
    logging::init(settings.debug_logging, settings.log_file.as_deref());
    settings.sanitize();
    Ok(settings)
}

/// Decodes an image file into an egui color image.
pub fn load_color_image(path: &std::path::Path) -> anyhow::Result<eframe::egui::ColorImage> {
    use anyhow::Context;

    let img = image::open(path).with_context(|| format!("open image {}", path.display()))?;
    let size = [img.width() as usize, img.height() as usize];
    let rgba = img.to_rgba8();
    Ok(eframe::egui::ColorImage::from_rgba_unmultiplied(
        size,
        rgba.as_raw(),
    ))
}

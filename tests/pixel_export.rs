use eframe::egui::vec2;
use image_mapper::mapper::render::PixelCanvas;
use image_mapper::{Area, Color, ImageMapper, ImageMapperProps, Map};
use tempfile::tempdir;

fn mapper_over(width: Option<f32>) -> ImageMapper<PixelCanvas> {
    let map = Map::new(
        "export",
        vec![
            Area::rect(10.0, 10.0, 30.0, 30.0).with_pre_fill(Color::rgb(255, 0, 0)),
            Area::circle(60.0, 60.0, 10.0),
        ],
    );
    let props = ImageMapperProps {
        width,
        img_width: Some(80.0),
        line_width: 0.5,
        ..ImageMapperProps::new("base.png", map)
    };
    let mut mapper = ImageMapper::new(props);
    mapper.mount(PixelCanvas::default(), vec2(80.0, 80.0));
    mapper
}

#[test]
fn pixel_surface_holds_only_prefilled_areas() {
    let mapper = mapper_over(None);
    let canvas = mapper.surface().unwrap();
    assert_eq!(canvas.dimensions(), (80, 80));
    assert_eq!(canvas.pixel(20, 20), Color::rgb(255, 0, 0));
    assert_eq!(canvas.pixel(60, 60), Color::TRANSPARENT);
}

#[test]
fn pixel_surface_follows_display_scale() {
    let mapper = mapper_over(Some(40.0));
    let canvas = mapper.surface().unwrap();
    assert_eq!(canvas.dimensions(), (40, 40));
    assert_eq!(canvas.pixel(10, 10), Color::rgb(255, 0, 0));
    assert_eq!(canvas.pixel(20, 20), Color::TRANSPARENT);
}

#[test]
fn composited_png_has_highlight_over_base_image() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.png");
    let base = image::RgbaImage::from_pixel(80, 80, image::Rgba([0, 0, 255, 255]));

    let mapper = mapper_over(None);
    mapper
        .surface()
        .unwrap()
        .save_composited_png(&base, &out)
        .unwrap();

    let written = image::open(&out).unwrap().to_rgba8();
    assert_eq!(written.dimensions(), (80, 80));
    assert_eq!(written.get_pixel(20, 20).0, [255, 0, 0, 255]);
    assert_eq!(written.get_pixel(70, 5).0, [0, 0, 255, 255]);
}

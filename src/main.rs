use anyhow::{bail, Context};
use eframe::egui;
use image_mapper::mapper::render::PixelCanvas;
use image_mapper::{ImageMapper, ImageMapperView, Map};
use std::path::{Path, PathBuf};

const USAGE: &str =
    "usage: image_mapper <image> <map.json> [--settings <settings.json>] [--export <out.png>]";

struct Args {
    image: PathBuf,
    map: PathBuf,
    settings: PathBuf,
    export: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut settings = PathBuf::from("image_mapper.json");
    let mut export = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => settings = args.next().context(USAGE)?.into(),
            "--export" => export = Some(args.next().context(USAGE)?.into()),
            "-h" | "--help" => bail!(USAGE),
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let [image, map]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| anyhow::anyhow!(USAGE))?;
    Ok(Args {
        image,
        map,
        settings,
        export,
    })
}

struct MapperApp {
    image_path: PathBuf,
    mapper: ImageMapper,
    texture: Option<egui::TextureHandle>,
    load_error: Option<String>,
}

impl eframe::App for MapperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.texture.is_none() && self.load_error.is_none() {
            match image_mapper::load_color_image(&self.image_path) {
                Ok(img) => {
                    let name = self.image_path.to_string_lossy().into_owned();
                    self.texture = Some(ctx.load_texture(name, img, egui::TextureOptions::LINEAR));
                }
                Err(err) => {
                    tracing::error!("{err:#}");
                    self.load_error = Some(format!("{err:#}"));
                }
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| match &self.texture {
            Some(texture) => {
                egui::ScrollArea::both().show(ui, |ui| {
                    ImageMapperView::new(&mut self.mapper, texture).show(ui);
                });
            }
            None => {
                let reason = self.load_error.as_deref().unwrap_or("unknown error");
                ui.label(format!("Failed to load image: {reason}"));
            }
        });
    }
}

fn build_mapper(props: image_mapper::ImageMapperProps) -> ImageMapper {
    ImageMapper::new(props)
        .on_load(|| tracing::info!("image map ready"))
        .on_click(|e| {
            tracing::info!(index = e.index, name = ?e.area.name, center = ?e.area.center, "click")
        })
        .on_mouse_enter(|e| tracing::info!(index = e.index, "enter"))
        .on_mouse_leave(|e| tracing::info!(index = e.index, "leave"))
        .on_image_click(|e| tracing::info!(pos = ?e.pos, "image click"))
}

fn export(args: &Args, props: image_mapper::ImageMapperProps, out: &Path) -> anyhow::Result<()> {
    let base = image::open(&args.image)
        .with_context(|| format!("open image {}", args.image.display()))?
        .to_rgba8();
    let mut mapper: ImageMapper<PixelCanvas> = ImageMapper::new(props);
    mapper.mount(
        PixelCanvas::default(),
        egui::vec2(base.width() as f32, base.height() as f32),
    );
    let canvas = mapper
        .surface()
        .context("highlight surface missing after mount")?;
    canvas.save_composited_png(&base, out)?;
    tracing::info!(path = %out.display(), "exported highlighted image");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let settings = image_mapper::init_from_settings(&args.settings)?;

    let map = Map::load(&args.map)?;
    let props = settings.to_props(args.image.to_string_lossy(), map);

    if let Some(out) = &args.export {
        return export(&args, props, out);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    let app = MapperApp {
        image_path: args.image.clone(),
        mapper: build_mapper(props),
        texture: None,
        load_error: None,
    };
    eframe::run_native("Image Mapper", native_options, Box::new(move |_cc| Box::new(app)))
        .map_err(|e| anyhow::anyhow!("run viewer: {e}"))
}

use criterion::{criterion_group, criterion_main, Criterion};
use eframe::egui::{pos2, vec2};
use image_mapper::mapper::render::PixelCanvas;
use image_mapper::{Area, Color, ImageMapper, ImageMapperProps, Map};

fn grid_map() -> Map {
    let areas = (0..400)
        .map(|i| {
            let x = (i % 20) as f32 * 50.0;
            let y = (i / 20) as f32 * 50.0;
            let area = match i % 3 {
                0 => Area::rect(x, y, x + 40.0, y + 40.0),
                1 => Area::circle(x + 20.0, y + 20.0, 18.0),
                _ => Area::poly(vec![x, y, x + 40.0, y + 5.0, x + 20.0, y + 40.0]),
            };
            area.with_pre_fill(Color::rgba(255, 0, 0, 96))
        })
        .collect();
    Map::new("grid", areas)
}

fn bench_prefill(c: &mut Criterion) {
    let props = ImageMapperProps {
        active: true,
        width: Some(500.0),
        img_width: Some(1000.0),
        ..ImageMapperProps::new("grid.png", grid_map())
    };
    let mut mapper: ImageMapper<PixelCanvas> = ImageMapper::new(props);
    mapper.mount(PixelCanvas::default(), vec2(1000.0, 1000.0));
    c.bench_function("prefill_400_areas", |b| b.iter(|| mapper.init_canvas()));
}

fn bench_hit_test(c: &mut Criterion) {
    let mapper: ImageMapper = ImageMapper::new(ImageMapperProps::new("grid.png", grid_map()));
    c.bench_function("hit_test_last_row", |b| {
        b.iter(|| mapper.hit_test(pos2(990.0, 990.0)))
    });
}

criterion_group!(benches, bench_prefill, bench_hit_test);
criterion_main!(benches);

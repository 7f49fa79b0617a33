use std::collections::HashMap;

use blockraster::assets::InMemoryAssets;
use blockraster::material::{BlendMode, CullMode};
use blockraster::math::{Color, Vec2, Vec3};
use blockraster::model::{Element, ModelDefinition};
use blockraster::render::{EdgeFunctionRasterizer, FrameBuffer, ScreenVertex};
use blockraster::texture::Texture;
use blockraster::{Engine, EngineConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const BUFFER_WIDTH: u32 = 800;
const BUFFER_HEIGHT: u32 = 600;

fn vertex(x: f32, y: f32) -> ScreenVertex {
    ScreenVertex {
        position: Vec3::new(x, y, 0.0),
        inv_w: 1.0,
        color: Color::WHITE,
        tex_coord: Vec2::new(x / BUFFER_WIDTH as f32, y / BUFFER_HEIGHT as f32),
    }
}

// Counter-clockwise on screen (y down), so front-facing.
fn triangle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> [ScreenVertex; 3] {
    [vertex(a.0, a.1), vertex(c.0, c.1), vertex(b.0, b.1)]
}

fn small_triangle() -> [ScreenVertex; 3] {
    triangle((100.0, 100.0), (120.0, 100.0), (110.0, 120.0))
}

fn medium_triangle() -> [ScreenVertex; 3] {
    triangle((100.0, 100.0), (300.0, 100.0), (200.0, 300.0))
}

fn large_triangle() -> [ScreenVertex; 3] {
    triangle((50.0, 50.0), (750.0, 100.0), (400.0, 550.0))
}

fn front_facing(tri: [ScreenVertex; 3]) -> [ScreenVertex; 3] {
    if EdgeFunctionRasterizer::signed_area(&tri) < 0.0 {
        [tri[0], tri[2], tri[1]]
    } else {
        tri
    }
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");
    let rasterizer = EdgeFunctionRasterizer::new();

    for (name, tri) in [
        ("small", small_triangle()),
        ("medium", medium_triangle()),
        ("large", large_triangle()),
    ] {
        let tri = front_facing(tri);
        group.bench_with_input(BenchmarkId::new("edge_function", name), &tri, |b, tri| {
            let mut fb = FrameBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
            b.iter(|| {
                fb.clear(Color::TRANSPARENT);
                rasterizer.fill_triangle(black_box(tri), &mut fb, CullMode::Back, BlendMode::Opaque, |f| {
                    Some(f.color)
                })
            });
        });
    }

    group.finish();
}

fn benchmark_many_triangles(c: &mut Criterion) {
    let rasterizer = EdgeFunctionRasterizer::new();

    // Generate a grid of small triangles
    let triangles: Vec<[ScreenVertex; 3]> = (0..20)
        .flat_map(|row| {
            (0..20).map(move |col| {
                let x = col as f32 * 40.0;
                let y = row as f32 * 30.0;
                front_facing(triangle((x, y), (x + 35.0, y), (x + 17.5, y + 25.0)))
            })
        })
        .collect();

    c.bench_function("edge_function_400_triangles", |b| {
        let mut fb = FrameBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT);
        b.iter(|| {
            fb.clear(Color::TRANSPARENT);
            for tri in &triangles {
                rasterizer.fill_triangle(black_box(tri), &mut fb, CullMode::Back, BlendMode::Opaque, |f| {
                    Some(f.color)
                });
            }
        });
    });
}

fn bench_assets() -> InMemoryAssets {
    InMemoryAssets::new()
        .with_model(
            "block/stone",
            ModelDefinition::new()
                .with_texture("all", "block/stone")
                .with_element(Element::cube([0.0; 3], [16.0; 3], "#all")),
        )
        .with_texture("block/stone", Texture::solid("stone", 16, 16, Color::gray(0.6)))
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let config = EngineConfig::default().with_size(256, 256);

    group.bench_function("block_icon", |b| {
        let mut engine = Engine::with_config(bench_assets(), config.clone());
        b.iter(|| engine.render_block(black_box("stone")));
    });

    let layer: Vec<String> = vec!["SSSS".to_string(); 4];
    let pattern = vec![layer; 4];
    let mapping = HashMap::from([('S', "stone".to_string())]);
    group.bench_function("multiblock_4x4x4", |b| {
        let mut engine = Engine::with_config(bench_assets(), config.clone());
        b.iter(|| engine.render_multiblock(black_box(&pattern), &mapping));
    });

    group.finish();
}

criterion_group!(benches, benchmark_single_triangle, benchmark_many_triangles, benchmark_pipeline);
criterion_main!(benches);

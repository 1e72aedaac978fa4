//! Tick benchmarks for the worms arena simulation
//!
//! Measures one engine tick at several worm counts while every worm holds
//! fire, so bullets, explosions and decorations pile up as in a real game.
//!
//! Run with: cargo bench --bench tick

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use worms_arena_server::game::engine::SimulationEngine;
use worms_arena_server::game::input::Controls;
use worms_arena_server::game::state::GameRules;
use worms_arena_server::game::terrain::TerrainParams;
use worms_arena_server::util::vec2::Vec2;

/// Engine on a 64x32 map with `count` worms firing at random points
fn create_engine_with_worms(count: usize) -> SimulationEngine {
    let params = TerrainParams {
        width: 64,
        height: 32,
        wall_percent: 40,
        stone_percent: 15,
        water_percent: 40,
    };
    let mut engine = SimulationEngine::new(&params, GameRules::default(), count, 1);
    let mut rng = StdRng::seed_from_u64(2);
    let (width, height) = (
        engine.terrain().pixel_width() as f32,
        engine.terrain().pixel_height() as f32,
    );

    for i in 0..count {
        let Ok(slot) = engine.join(&format!("Worm{}", i), (i % 8) as u8) else {
            break;
        };
        let controls = Controls {
            fire: true,
            left: i % 3 == 0,
            right: i % 3 == 1,
            ..Controls::default()
        };
        let aim = Vec2::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
        if engine.set_controls(slot, controls, aim).is_err() {
            break;
        }
        let _ = engine.select_weapon(slot, i % 7);
    }

    // Let projectiles and debris build up before measuring
    for _ in 0..120 {
        engine.tick();
    }
    engine
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    group.sample_size(50);

    for count in [2, 8, 16, 32, 64] {
        let mut engine = create_engine_with_worms(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("worms", count), &count, |b, _| {
            b.iter(|| black_box(engine.tick()));
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    use worms_arena_server::server::snapshot::{encode, DrawingSnapshot, SessionStatus};

    let mut group = c.benchmark_group("snapshot");
    for count in [8, 64] {
        let engine = create_engine_with_worms(count);
        group.bench_with_input(BenchmarkId::new("capture_encode", count), &count, |b, _| {
            b.iter(|| {
                let snapshot = DrawingSnapshot::capture(&engine, SessionStatus::default());
                black_box(encode(&snapshot))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick, bench_snapshot);
criterion_main!(benches);

//! Measure a composite ray through a crowded arena
//!
//! Arena is 32 tiles by 32 tiles, open apart from the outer wall, with a grid of 100 actors standing in it
//!

use bevy::prelude::*;
use bevy_arena_sim_plugin::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Create the arena and populate it before benchmarking
fn prepare_map(size: usize) -> ArenaMap {
	let rows: Vec<String> = (0..size)
		.map(|y| {
			(0..size)
				.map(|x| {
					if x == 0 || y == 0 || x == size - 1 || y == size - 1 {
						'#'
					} else {
						'.'
					}
				})
				.collect()
		})
		.collect();
	let row_refs: Vec<&str> = rows.iter().map(|r| r.as_str()).collect();
	let mut spawn_infos = Vec::new();
	for i in 0..10 {
		for j in 0..10 {
			let position = Vec3::new(4.5 + 2.5 * i as f32, 4.5 + 2.5 * j as f32, 0.0);
			spawn_infos.push(SpawnInfo::new("Pillar", position, 0.0));
		}
	}
	let definition = MapDefinition::from_rows("crowd", &row_refs, spawn_infos);
	let definitions = ActorDefinitions::new(vec![ActorDefinition {
		name: "Pillar".to_string(),
		health: 100.0,
		faction: Faction::Demon,
		collision: CollisionDefinition {
			radius: 0.3,
			height: 0.8,
			collides_with_actors: true,
			..default()
		},
		..default()
	}]);
	ArenaMap::new(&definition, definitions, 0).unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
	let mut group = c.benchmark_group("algorithm_use");
	group.significance_level(0.05).sample_size(100);
	let map = prepare_map(32);
	// grazes the crowd diagonally and ends in the far wall
	let start = Vec3::new(1.5, 2.0, 0.5);
	let direction = Vec3::new(1.0, 0.9, -0.01).normalize();
	group.bench_function("raycast_all", |b| {
		b.iter(|| {
			map.raycast_all(
				black_box(start),
				black_box(direction),
				black_box(64.0),
				black_box(None),
			)
		})
	});
	group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

//! Ray queries against the arena.
//!
//! Three independent tests are unioned by nearest impact:
//!
//! - [TileGrid::raycast_xy] walks the tile grid with a digital differential analyser. For a ray leaving `S` it
//!   compares the distance to the next vertical boundary (`x`) with the next horizontal one (`y`) and always steps
//!   across the closer one, so each tile the ray passes through is visited exactly once:
//!
//! ```text
//!  _______________ _______________
//! |               |               |
//! |               |          /    |
//! |               |        /      |
//! |               |      /        |
//! |_______________|____y/_________|
//! |               |   /           |
//! |               | /             |
//! |              x/               |
//! |            /  |               |
//! |      S   /    |               |
//! |_______________|_______________|
//! ```
//!
//! - [TileGrid::raycast_z] tests the floor and ceiling planes
//! - [ArenaMap::raycast_world_actors] tests the vertical cylinder of every live actor
//!
//! A ray that misses reports its full length as the impact distance.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Outcome of a ray query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastResult {
	/// Where the ray was cast from
	ray_start: Vec3,
	/// Unit direction of the ray
	ray_forward: Vec3,
	/// Maximum length of the ray
	ray_length: f32,
	/// Whether anything was hit
	did_impact: bool,
	/// Distance along the ray to the hit, the ray length on a miss
	impact_dist: f32,
	/// World position of the hit
	impact_pos: Vec3,
	/// Surface normal at the hit
	impact_normal: Vec3,
	/// Actor that was hit, [ActorHandle::INVALID] for the world
	hit_actor: ActorHandle,
}

impl RaycastResult {
	/// A ray that reached its full length
	pub fn miss(start: Vec3, forward: Vec3, length: f32) -> Self {
		RaycastResult {
			ray_start: start,
			ray_forward: forward,
			ray_length: length,
			did_impact: false,
			impact_dist: length,
			impact_pos: start + forward * length,
			impact_normal: Vec3::ZERO,
			hit_actor: ActorHandle::INVALID,
		}
	}
	/// A ray stopped `dist` along its length by a surface facing `normal`
	pub fn hit(start: Vec3, forward: Vec3, length: f32, dist: f32, normal: Vec3) -> Self {
		RaycastResult {
			ray_start: start,
			ray_forward: forward,
			ray_length: length,
			did_impact: true,
			impact_dist: dist,
			impact_pos: start + forward * dist,
			impact_normal: normal,
			hit_actor: ActorHandle::INVALID,
		}
	}
	/// Attribute the hit to an actor
	fn with_actor(mut self, handle: ActorHandle) -> Self {
		self.hit_actor = handle;
		self
	}
	/// Whether `self` impacts strictly nearer than `other`
	fn is_nearer_than(&self, other: &RaycastResult) -> bool {
		self.did_impact && (!other.did_impact || self.impact_dist < other.impact_dist)
	}
	pub fn get_ray_start(&self) -> Vec3 {
		self.ray_start
	}
	pub fn get_ray_forward(&self) -> Vec3 {
		self.ray_forward
	}
	pub fn get_ray_length(&self) -> f32 {
		self.ray_length
	}
	pub fn did_impact(&self) -> bool {
		self.did_impact
	}
	pub fn get_impact_dist(&self) -> f32 {
		self.impact_dist
	}
	pub fn get_impact_pos(&self) -> Vec3 {
		self.impact_pos
	}
	pub fn get_impact_normal(&self) -> Vec3 {
		self.impact_normal
	}
	/// Handle of the actor struck, invalid when the ray hit the world or nothing
	pub fn get_hit_actor(&self) -> ActorHandle {
		self.hit_actor
	}
}

/// Per axis stepping of the DDA: the tile step, the ray distance between two boundaries and the ray distance to
/// the first boundary. An axis the ray runs parallel to never crosses a boundary
fn dda_axis(start: f32, direction: f32, tile: i32) -> (i32, f32, f32) {
	if direction == 0.0 {
		return (0, f32::INFINITY, f32::INFINITY);
	}
	let step = if direction > 0.0 { 1 } else { -1 };
	let per_boundary = 1.0 / direction.abs();
	let first_boundary = tile as f32 + (step as f32 + 1.0) * 0.5;
	(step, per_boundary, (first_boundary - start).abs() * per_boundary)
}

impl TileGrid {
	/// Walk the tiles crossed by a ray in the horizontal plane until a solid tile is entered or `distance` is
	/// exceeded. `direction` must be normalised, its `z` only scales the distances. Tiles outside the grid are
	/// solid so a ray leaving the map strikes its boundary
	pub fn raycast_xy(&self, start: Vec3, direction: Vec3, distance: f32) -> RaycastResult {
		let mut tile = self.get_coords_for_world_pos(start.truncate());
		if self.is_tile_solid(tile) && self.is_position_in_bounds(start) {
			return RaycastResult::hit(start, direction, distance, 0.0, -direction);
		}
		let miss = RaycastResult::miss(start, direction, distance);
		if direction.x == 0.0 && direction.y == 0.0 {
			return miss;
		}
		let (step_x, per_x, mut next_x) = dda_axis(start.x, direction.x, tile.x);
		let (step_y, per_y, mut next_y) = dda_axis(start.y, direction.y, tile.y);
		loop {
			if next_x <= next_y {
				if next_x > distance {
					return miss;
				}
				tile.x += step_x;
				let crossing = start + direction * next_x;
				if self.is_position_in_bounds(crossing) && self.is_tile_solid(tile) {
					let normal = Vec3::new(-step_x as f32, 0.0, 0.0);
					return RaycastResult::hit(start, direction, distance, next_x, normal);
				}
				next_x += per_x;
			} else {
				if next_y > distance {
					return miss;
				}
				tile.y += step_y;
				let crossing = start + direction * next_y;
				if self.is_position_in_bounds(crossing) && self.is_tile_solid(tile) {
					let normal = Vec3::new(0.0, -step_y as f32, 0.0);
					return RaycastResult::hit(start, direction, distance, next_y, normal);
				}
				next_y += per_y;
			}
		}
	}
	/// Intersect a ray with the ceiling when heading up or the floor when heading down
	pub fn raycast_z(&self, start: Vec3, direction: Vec3, distance: f32) -> RaycastResult {
		let miss = RaycastResult::miss(start, direction, distance);
		if direction.z == 0.0 || distance <= 0.0 {
			return miss;
		}
		let (plane, normal) = if direction.z > 0.0 {
			(CEILING_Z, Vec3::NEG_Z)
		} else {
			(FLOOR_Z, Vec3::Z)
		};
		let fraction = (plane - start.z) / (direction.z * distance);
		if !(0.0..1.0).contains(&fraction) {
			return miss;
		}
		let dist = fraction * distance;
		if !self.is_position_in_bounds(start + direction * dist) {
			return miss;
		}
		RaycastResult::hit(start, direction, distance, dist, normal)
	}
}

/// Intersect a ray with a vertical cylinder standing on `center` and spanning `z_range`. Returns the distance
/// along the ray and the surface normal of the nearest hit. A ray starting inside the cylinder hits immediately
pub fn raycast_vs_cylinder_z(
	start: Vec3,
	direction: Vec3,
	distance: f32,
	center: Vec2,
	z_range: FloatRange,
	radius: f32,
) -> Option<(f32, Vec3)> {
	let offset = start.truncate() - center;
	let radius_sq = radius * radius;
	if offset.length_squared() <= radius_sq && start.z >= z_range.min && start.z <= z_range.max {
		return Some((0.0, -direction));
	}
	let mut nearest: Option<(f32, Vec3)> = None;
	let mut consider = |dist: f32, normal: Vec3| {
		if nearest.map(|(d, _)| dist < d).unwrap_or(true) {
			nearest = Some((dist, normal));
		}
	};
	// caps
	if direction.z != 0.0 {
		for (cap, normal) in [(z_range.min, Vec3::NEG_Z), (z_range.max, Vec3::Z)] {
			let dist = (cap - start.z) / direction.z;
			if dist < 0.0 || dist > distance {
				continue;
			}
			let point = start + direction * dist;
			if (point.truncate() - center).length_squared() <= radius_sq {
				consider(dist, normal);
			}
		}
	}
	// side
	let planar = direction.truncate();
	let a = planar.length_squared();
	if a > 0.0 {
		let b = 2.0 * offset.dot(planar);
		let c = offset.length_squared() - radius_sq;
		let discriminant = b * b - 4.0 * a * c;
		if discriminant >= 0.0 {
			let dist = (-b - discriminant.sqrt()) / (2.0 * a);
			if (0.0..=distance).contains(&dist) {
				let point = start + direction * dist;
				if point.z >= z_range.min && point.z <= z_range.max {
					let normal = (point.truncate() - center).normalize_or_zero().extend(0.0);
					consider(dist, normal);
				}
			}
		}
	}
	nearest
}

impl ArenaMap {
	/// Nearest live actor struck by a ray. With an `owner` the owner itself and anything it owns are ignored.
	/// Actors that collide with neither world nor actors are never struck
	pub fn raycast_world_actors(
		&self,
		start: Vec3,
		direction: Vec3,
		distance: f32,
		owner: Option<ActorHandle>,
	) -> RaycastResult {
		let mut nearest = RaycastResult::miss(start, direction, distance);
		for actor in self.get_registry().iter() {
			if actor.is_dead() {
				continue;
			}
			if let Some(owner) = owner {
				if actor.get_handle() == owner || (owner.is_valid() && actor.get_owner() == owner) {
					continue;
				}
			}
			let collision = &actor.get_definition().collision;
			if !collision.collides_with_actors && !collision.collides_with_world {
				continue;
			}
			let position = actor.get_position();
			let Some((dist, normal)) = raycast_vs_cylinder_z(
				start,
				direction,
				distance,
				position.truncate(),
				actor.get_z_range(),
				actor.get_radius(),
			) else {
				continue;
			};
			let candidate = RaycastResult::hit(start, direction, distance, dist, normal)
				.with_actor(actor.get_handle());
			if candidate.is_nearer_than(&nearest) {
				nearest = candidate;
			}
		}
		nearest
	}
	/// Nearest impact among tiles, floor and ceiling, and actors. On an exact tie the earlier test wins
	pub fn raycast_all(
		&self,
		start: Vec3,
		direction: Vec3,
		distance: f32,
		owner: Option<ActorHandle>,
	) -> RaycastResult {
		let tiles = self.get_tile_grid();
		let mut nearest = tiles.raycast_xy(start, direction, distance);
		let planes = tiles.raycast_z(start, direction, distance);
		if planes.is_nearer_than(&nearest) {
			nearest = planes;
		}
		let actors = self.raycast_world_actors(start, direction, distance, owner);
		if actors.is_nearer_than(&nearest) {
			nearest = actors;
		}
		nearest
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn grid(rows: &[&str]) -> TileGrid {
		MapDefinition::from_rows("test", rows, vec![])
			.build_tile_grid()
			.unwrap()
	}
	#[test]
	fn strikes_centre_tile() {
		let tiles = grid(&["...", ".#.", "..."]);
		let result = tiles.raycast_xy(Vec3::new(0.0, 1.5, 0.5), Vec3::X, 3.0);
		assert!(result.did_impact());
		assert_eq!(1.0, result.get_impact_dist());
		assert_eq!(Vec3::NEG_X, result.get_impact_normal());
		assert_eq!(Vec3::new(1.0, 1.5, 0.5), result.get_impact_pos());
	}
	#[test]
	fn short_ray_falls_short() {
		let tiles = grid(&["...", ".#.", "..."]);
		let result = tiles.raycast_xy(Vec3::new(0.5, 1.5, 0.5), Vec3::X, 0.4);
		assert!(!result.did_impact());
		assert_eq!(0.4, result.get_impact_dist());
	}
	#[test]
	fn strikes_from_above() {
		let tiles = grid(&["...", ".#.", "..."]);
		let result = tiles.raycast_xy(Vec3::new(1.5, 2.5, 0.5), Vec3::NEG_Y, 3.0);
		assert!(result.did_impact());
		assert_eq!(0.5, result.get_impact_dist());
		assert_eq!(Vec3::Y, result.get_impact_normal());
	}
	#[test]
	fn leaving_the_map_hits_its_edge() {
		let tiles = grid(&["...", "...", "..."]);
		let result = tiles.raycast_xy(Vec3::new(0.5, 0.5, 0.5), Vec3::X, 10.0);
		assert!(result.did_impact());
		assert_eq!(2.5, result.get_impact_dist());
		assert_eq!(Vec3::NEG_X, result.get_impact_normal());
	}
	#[test]
	fn diagonal_ray() {
		let tiles = grid(&["..#", "...", "..."]);
		let direction = Vec3::new(1.0, 1.0, 0.0).normalize();
		let result = tiles.raycast_xy(Vec3::new(0.5, 0.25, 0.5), direction, 10.0);
		assert!(result.did_impact());
		// enters the solid tile through its bottom face at (2.25, 2.0)
		assert_eq!(Vec3::NEG_Y, result.get_impact_normal());
		assert!((result.get_impact_pos() - Vec3::new(2.25, 2.0, 0.5)).length() < 1e-4);
	}
	#[test]
	fn starting_inside_a_wall() {
		let tiles = grid(&["...", ".#.", "..."]);
		let result = tiles.raycast_xy(Vec3::new(1.5, 1.5, 0.5), Vec3::X, 3.0);
		assert!(result.did_impact());
		assert_eq!(0.0, result.get_impact_dist());
		assert_eq!(Vec3::NEG_X, result.get_impact_normal());
	}
	#[test]
	fn vertical_ray_misses_tiles() {
		let tiles = grid(&["...", "...", "..."]);
		let result = tiles.raycast_xy(Vec3::new(1.5, 1.5, 0.5), Vec3::Z, 3.0);
		assert!(!result.did_impact());
		assert_eq!(3.0, result.get_impact_dist());
	}
	#[test]
	fn floor_and_ceiling() {
		let tiles = grid(&["...", "...", "..."]);
		let down = tiles.raycast_z(Vec3::new(1.5, 1.5, 0.75), Vec3::NEG_Z, 2.0);
		assert!(down.did_impact());
		assert_eq!(0.75, down.get_impact_dist());
		assert_eq!(Vec3::Z, down.get_impact_normal());
		let up = tiles.raycast_z(Vec3::new(1.5, 1.5, 0.75), Vec3::Z, 2.0);
		assert!(up.did_impact());
		assert_eq!(0.25, up.get_impact_dist());
		assert_eq!(Vec3::NEG_Z, up.get_impact_normal());
		let short = tiles.raycast_z(Vec3::new(1.5, 1.5, 0.75), Vec3::Z, 0.2);
		assert!(!short.did_impact());
		let flat = tiles.raycast_z(Vec3::new(1.5, 1.5, 0.75), Vec3::X, 2.0);
		assert!(!flat.did_impact());
	}
	#[test]
	fn floor_outside_the_map_is_missed() {
		let tiles = grid(&["...", "...", "..."]);
		let direction = Vec3::new(1.0, 0.0, -1.0).normalize();
		let result = tiles.raycast_z(Vec3::new(2.5, 1.5, 1.0), direction, 5.0);
		assert!(!result.did_impact());
	}
	#[test]
	fn cylinder_side_hit() {
		let hit = raycast_vs_cylinder_z(
			Vec3::new(0.0, 0.0, 0.5),
			Vec3::X,
			10.0,
			Vec2::new(3.0, 0.0),
			FloatRange::new(0.0, 1.0),
			0.5,
		);
		let (dist, normal) = hit.unwrap();
		assert!((dist - 2.5).abs() < 1e-5);
		assert!((normal - Vec3::NEG_X).length() < 1e-5);
	}
	#[test]
	fn cylinder_cap_hit() {
		let hit = raycast_vs_cylinder_z(
			Vec3::new(3.0, 0.0, 2.0),
			Vec3::NEG_Z,
			10.0,
			Vec2::new(3.0, 0.0),
			FloatRange::new(0.0, 1.0),
			0.5,
		);
		let (dist, normal) = hit.unwrap();
		assert!((dist - 1.0).abs() < 1e-5);
		assert_eq!(Vec3::Z, normal);
	}
	#[test]
	fn cylinder_passed_over() {
		let hit = raycast_vs_cylinder_z(
			Vec3::new(0.0, 0.0, 1.5),
			Vec3::X,
			10.0,
			Vec2::new(3.0, 0.0),
			FloatRange::new(0.0, 1.0),
			0.5,
		);
		assert!(hit.is_none());
	}
	#[test]
	fn cylinder_start_inside() {
		let hit = raycast_vs_cylinder_z(
			Vec3::new(3.1, 0.0, 0.5),
			Vec3::Y,
			10.0,
			Vec2::new(3.0, 0.0),
			FloatRange::new(0.0, 1.0),
			0.5,
		);
		assert_eq!(Some((0.0, Vec3::NEG_Y)), hit);
	}

	fn arena_with_imp() -> (ArenaMap, ActorHandle) {
		let definitions = ActorDefinitions::new(vec![ActorDefinition {
			name: "Imp".to_string(),
			faction: Faction::Demon,
			collision: CollisionDefinition {
				radius: 0.5,
				height: 0.75,
				collides_with_actors: true,
				collides_with_world: true,
				..default()
			},
			..default()
		}]);
		let definition = MapDefinition::from_rows("test", &[".....", ".....", "....."], vec![]);
		let mut map = ArenaMap::new(&definition, definitions, 7).unwrap();
		let imp = map
			.spawn_actor(&SpawnInfo::new("Imp", Vec3::new(3.5, 1.5, 0.0), 0.0))
			.unwrap();
		(map, imp)
	}
	#[test]
	fn composite_prefers_actor() {
		let (map, imp) = arena_with_imp();
		let result = map.raycast_all(Vec3::new(0.5, 1.5, 0.5), Vec3::X, 10.0, None);
		assert!(result.did_impact());
		assert_eq!(imp, result.get_hit_actor());
		assert!((result.get_impact_dist() - 2.5).abs() < 1e-5);
	}
	#[test]
	fn composite_ignores_owner() {
		let (map, imp) = arena_with_imp();
		let result = map.raycast_all(Vec3::new(0.5, 1.5, 0.5), Vec3::X, 10.0, Some(imp));
		assert!(result.did_impact());
		assert_eq!(ActorHandle::INVALID, result.get_hit_actor());
		assert_eq!(4.5, result.get_impact_dist());
	}
	#[test]
	fn composite_prefers_floor() {
		let (map, _) = arena_with_imp();
		let direction = Vec3::new(1.0, 0.0, -1.0).normalize();
		let result = map.raycast_all(Vec3::new(0.5, 1.5, 0.5), direction, 10.0, None);
		assert!(result.did_impact());
		assert_eq!(Vec3::Z, result.get_impact_normal());
		assert!((result.get_impact_dist() - 0.5 * 2.0_f32.sqrt()).abs() < 1e-5);
	}
}

//! A [FlowField] stores one [Ordinal] per tile: the neighbour with the steepest descent of the exposure map.
//!
//! For each reachable tile the 4 orthogonal neighbours are inspected first, then the 4 diagonals. A diagonal is
//! ignored when both orthogonals either side of it are unreachable, otherwise actors would be steered through the
//! corner of a wall:
//!
//! ```text
//!  _____ _____
//! |     |#####|
//! |  x  |#####|
//! |_____|#####|
//! |#####|     |
//! |#####|  o  |
//! |#####|_____|
//! ```
//!
//! Here `o` may not flow diagonally to `x`. A tile with no lower neighbour points nowhere ([Ordinal::Zero]), and
//! so does every unreachable tile, so nothing diffuses into sealed pockets.
//!
//! Actors don't read the field tile by tile, [FlowField::get_steering_direction] bilinearly blends the four
//! tiles surrounding a world position into a smooth direction.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Per tile direction of travel
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
	/// Size of the grid
	dimensions: MapDimensions,
	/// One direction per tile, row-major
	directions: Vec<Ordinal>,
}

impl Field<Ordinal> for FlowField {
	/// Get a reference to the field array
	fn get(&self) -> &[Ordinal] {
		&self.directions
	}
	fn get_dimensions(&self) -> MapDimensions {
		self.dimensions
	}
	/// Retrieve a tile direction
	fn get_field_cell_value(&self, coords: IVec2) -> Option<Ordinal> {
		self.dimensions.get_index(coords).map(|i| self.directions[i])
	}
	/// Set a tile direction
	fn set_field_cell_value(&mut self, value: Ordinal, coords: IVec2) {
		if let Some(i) = self.dimensions.get_index(coords) {
			self.directions[i] = value;
		}
	}
}

/// Position of an orthogonal within [Ordinal::ORTHOGONAL]
fn orthogonal_slot(ordinal: Ordinal) -> Option<usize> {
	Ordinal::ORTHOGONAL.iter().position(|o| *o == ordinal)
}

impl FlowField {
	/// Create a new [FlowField] pointing nowhere
	pub fn new(dimensions: MapDimensions) -> Self {
		FlowField {
			dimensions,
			directions: vec![Ordinal::Zero; dimensions.get_tile_count()],
		}
	}
	/// Rebuild every tile from the exposure map
	pub fn calculate(&mut self, exposure: &ExposureMap, reachability: &ReachabilityMap) {
		for index in 0..self.dimensions.get_tile_count() {
			let coords = self.dimensions.get_coords(index);
			self.directions[index] = if reachability.is_tile_unreachable(coords) {
				Ordinal::Zero
			} else {
				steepest_descent(coords, exposure, reachability)
			};
		}
	}
	/// Unit vector of a tile, `None` outside the grid
	pub fn get_vector(&self, coords: IVec2) -> Option<Vec2> {
		self.get_field_cell_value(coords).map(|o| o.get_direction())
	}
	/// Vector of a tile, tiles in the ring just outside the grid point back in and the corners of that ring point
	/// diagonally in
	fn get_safe_vector(&self, coords: IVec2) -> Vec2 {
		if let Some(v) = self.get_vector(coords) {
			return v;
		}
		let w = self.dimensions.get_width() as i32;
		let h = self.dimensions.get_height() as i32;
		match (coords.x, coords.y) {
			(-1, -1) => Vec2::new(1.0, 1.0).normalize(),
			(-1, y) if y == h => Vec2::new(1.0, -1.0).normalize(),
			(x, -1) if x == w => Vec2::new(-1.0, 1.0).normalize(),
			(x, y) if x == w && y == h => Vec2::new(-1.0, -1.0).normalize(),
			(-1, _) => Vec2::X,
			(x, _) if x == w => -Vec2::X,
			(_, -1) => Vec2::Y,
			(_, y) if y == h => -Vec2::Y,
			_ => Vec2::ZERO,
		}
	}
	/// Smooth steering direction at a world position, blended from the four tiles whose centres surround it.
	/// Returns [Vec2::ZERO] when the blend cancels out
	pub fn get_steering_direction(&self, world_position: Vec2) -> Vec2 {
		let bottom_left_position = world_position - Vec2::splat(0.5);
		let bottom_left = bottom_left_position.floor().as_ivec2();
		let weight = bottom_left_position - bottom_left_position.floor();

		let v00 = self.get_safe_vector(bottom_left);
		let v01 = self.get_safe_vector(bottom_left + IVec2::Y);
		let v10 = self.get_safe_vector(bottom_left + IVec2::X);
		let v11 = self.get_safe_vector(bottom_left + IVec2::ONE);

		let bottom = v00.lerp(v10, weight.x);
		let top = v01.lerp(v11, weight.x);
		bottom.lerp(top, weight.y).normalize_or_zero()
	}
}

/// Find the neighbour of a reachable tile with the largest drop in exposure
fn steepest_descent(
	coords: IVec2,
	exposure: &ExposureMap,
	reachability: &ReachabilityMap,
) -> Ordinal {
	let Some(current) = exposure.get_value(coords) else {
		return Ordinal::Zero;
	};
	let mut best = Ordinal::Zero;
	let mut min_delta = 0.0;
	let mut is_impassable = [false; 4];
	for (slot, ordinal) in Ordinal::ORTHOGONAL.into_iter().enumerate() {
		let neighbour = coords + ordinal.get_offset();
		if reachability.is_tile_unreachable(neighbour) {
			is_impassable[slot] = true;
			continue;
		}
		let Some(value) = exposure.get_value(neighbour) else {
			continue;
		};
		let delta = value - current;
		if delta < min_delta {
			best = ordinal;
			min_delta = delta;
		}
	}
	for ordinal in Ordinal::DIAGONAL {
		if let Some((a, b)) = ordinal.get_flanking() {
			let blocked_a = orthogonal_slot(a).map(|s| is_impassable[s]).unwrap_or(true);
			let blocked_b = orthogonal_slot(b).map(|s| is_impassable[s]).unwrap_or(true);
			// cannot cut through the corner
			if blocked_a && blocked_b {
				continue;
			}
		}
		let Some(value) = exposure.get_value(coords + ordinal.get_offset()) else {
			continue;
		};
		let delta = value - current;
		if delta < min_delta {
			best = ordinal;
			min_delta = delta;
		}
	}
	best
}

#[cfg(test)]
mod tests {
	use super::*;

	fn build(rows: &[&str], seed: IVec2, players: &[Vec2]) -> (FlowField, ReachabilityMap) {
		let tiles = MapDefinition::from_rows("test", rows, vec![])
			.build_tile_grid()
			.unwrap();
		let reachability = ReachabilityMap::new(&tiles, &[seed]);
		let mut exposure = ExposureMap::new(tiles.get_dimensions());
		exposure.update(&tiles, &reachability, players);
		let mut flow = FlowField::new(tiles.get_dimensions());
		flow.calculate(&exposure, &reachability);
		(flow, reachability)
	}
	#[rustfmt::skip]
	const TWO_ROOMS: [&str; 5] = [
		"#########",
		"#...#...#",
		"#...#...#",
		"#.......#",
		"#########",
	];
	#[test]
	fn heads_for_the_gap() {
		let (flow, _) = build(&TWO_ROOMS, IVec2::new(1, 1), &[Vec2::new(2.5, 3.5)]);
		assert_eq!(Some(Ordinal::SouthEast), flow.get_field_cell_value(IVec2::new(2, 3)));
		assert_eq!(Some(Ordinal::East), flow.get_field_cell_value(IVec2::new(3, 1)));
		// the wall above the gap doesn't block north east as east is open
		assert_eq!(Some(Ordinal::NorthEast), flow.get_field_cell_value(IVec2::new(4, 1)));
	}
	#[test]
	fn deepest_tile_points_nowhere() {
		let (flow, _) = build(&TWO_ROOMS, IVec2::new(1, 1), &[Vec2::new(2.5, 3.5)]);
		assert_eq!(Some(Ordinal::Zero), flow.get_field_cell_value(IVec2::new(7, 3)));
	}
	#[test]
	fn diagonal_blocked_by_two_walls() {
		let tiles = MapDefinition::from_rows("test", &["....", ".#..", "#..."], vec![])
			.build_tile_grid()
			.unwrap();
		let reachability = ReachabilityMap::new(&tiles, &[IVec2::new(0, 2)]);
		// the low tile is reachable the long way round
		assert!(!reachability.is_tile_unreachable(IVec2::new(1, 0)));
		let mut heat = HeatMap::new(tiles.get_dimensions(), 10.0);
		heat.set_field_cell_value(5.0, IVec2::new(0, 1));
		heat.set_field_cell_value(0.0, IVec2::new(1, 0));
		let exposure = ExposureMap::from_heat_map(heat);
		let mut flow = FlowField::new(tiles.get_dimensions());
		flow.calculate(&exposure, &reachability);
		// south east of (0, 1) is lower but both south and east are walls
		assert_eq!(Some(Ordinal::Zero), flow.get_field_cell_value(IVec2::new(0, 1)));
		assert_eq!(Some(Ordinal::SouthWest), flow.get_field_cell_value(IVec2::new(2, 1)));
	}
	#[test]
	fn sealed_pocket_has_no_flow() {
		let rows = [
			"#######",
			"#...#.#",
			"#...#.#",
			"#######",
		];
		let (flow, reachability) = build(&rows, IVec2::new(1, 1), &[Vec2::new(1.5, 1.5)]);
		for y in 1..3 {
			let pocket = IVec2::new(5, y);
			assert!(reachability.is_tile_unreachable(pocket));
			assert_eq!(Some(Vec2::ZERO), flow.get_vector(pocket));
		}
	}
	#[test]
	fn recalculation_is_idempotent() {
		let tiles = MapDefinition::from_rows("test", &TWO_ROOMS, vec![])
			.build_tile_grid()
			.unwrap();
		let reachability = ReachabilityMap::new(&tiles, &[IVec2::new(1, 1)]);
		let mut exposure = ExposureMap::new(tiles.get_dimensions());
		exposure.update(&tiles, &reachability, &[Vec2::new(6.5, 3.5)]);
		let mut flow = FlowField::new(tiles.get_dimensions());
		flow.calculate(&exposure, &reachability);
		let first = flow.clone();
		flow.calculate(&exposure, &reachability);
		assert_eq!(first, flow);
	}
	#[test]
	fn steering_at_tile_centre_matches_tile() {
		let (flow, _) = build(&TWO_ROOMS, IVec2::new(1, 1), &[Vec2::new(2.5, 3.5)]);
		let steering = flow.get_steering_direction(Vec2::new(2.5, 3.5));
		let expected = Ordinal::SouthEast.get_direction();
		assert!((steering - expected).length() < 1e-5);
	}
	#[test]
	fn steering_points_inward_at_grid_corner() {
		let (flow, _) = build(&["...", "...", "..."], IVec2::new(1, 1), &[]);
		let steering = flow.get_steering_direction(Vec2::new(0.25, 0.25));
		assert!(steering.x > 0.0 && steering.y > 0.0);
		assert!((steering.x - steering.y).abs() < 1e-5);
		assert!((steering.length() - 1.0).abs() < 1e-5);
	}
	#[test]
	fn steering_points_inward_at_grid_edge() {
		let (flow, _) = build(&["...", "...", "..."], IVec2::new(1, 1), &[]);
		let steering = flow.get_steering_direction(Vec2::new(2.9, 1.5));
		assert!((steering - -Vec2::X).length() < 1e-5);
	}
}

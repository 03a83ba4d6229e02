//! A [HeatMap] is a 2D array of floats over the tile grid.
//!
//! Its core operation is a heat spread: a relaxation that starts from every tile holding a search value and
//! pushes `search + step` into each orthogonal, passable neighbour that doesn't already hold a better value. The
//! search value then advances by `step` and the pass repeats until no tile holds it.
//!
//! Seeding one tile with `0` of an otherwise [FLOOD_SENTINEL] map and spreading with a step of `1` produces the
//! familiar diamond of tile-hop distances (walls, `#`, are never entered and keep the sentinel):
//!
//! ```text
//!  _____________________________
//! |     |     |     |     |     |
//! |  4  |  3  |  2  |  3  |  4  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  3  |  2  |  1  |  2  |  3  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  2  |  1  |  0  |  1  |  2  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  3  |  2  |  1  |  2  |  3  |
//! |_____|_____|_____|_____|_____|
//! |     |     |     |     |     |
//! |  4  |  3  |  2  |  3  |  4  |
//! |_____|_____|_____|_____|_____|
//! ```
//!
//! With a negative step the comparison flips, so the spread only ever lowers values. The exposure map relies on
//! both directions.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Dense float field over the tile grid
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMap {
	/// Size of the grid
	dimensions: MapDimensions,
	/// One value per tile, row-major
	values: Vec<f32>,
}

impl Field<f32> for HeatMap {
	/// Get a reference to the field array
	fn get(&self) -> &[f32] {
		&self.values
	}
	fn get_dimensions(&self) -> MapDimensions {
		self.dimensions
	}
	/// Retrieve a tile value
	fn get_field_cell_value(&self, coords: IVec2) -> Option<f32> {
		self.dimensions.get_index(coords).map(|i| self.values[i])
	}
	/// Set a tile to a value
	fn set_field_cell_value(&mut self, value: f32, coords: IVec2) {
		if let Some(i) = self.dimensions.get_index(coords) {
			self.values[i] = value;
		}
	}
}

impl HeatMap {
	/// Creates a new [HeatMap] with every tile set to `initial`
	pub fn new(dimensions: MapDimensions, initial: f32) -> Self {
		HeatMap {
			dimensions,
			values: vec![initial; dimensions.get_tile_count()],
		}
	}
	/// Set every tile to `value`
	pub fn set_all(&mut self, value: f32) {
		self.values.iter_mut().for_each(|v| *v = value);
	}
	/// Value by row-major index
	pub fn get_value_at_index(&self, index: usize) -> f32 {
		self.values[index]
	}
	/// Set a value by row-major index
	pub fn set_value_at_index(&mut self, value: f32, index: usize) {
		self.values[index] = value;
	}
	/// Replace every occurrence of `from` with `to`
	pub fn replace_all(&mut self, from: f32, to: f32) {
		for v in self.values.iter_mut() {
			if *v == from {
				*v = to;
			}
		}
	}
	/// Relax the map outwards from every tile holding `start_value`, see the module docs. Neighbours for which
	/// `is_passable` is `false` are never written to
	pub fn spread_heat(&mut self, start_value: f32, step: f32, is_passable: impl Fn(IVec2) -> bool) {
		if step == 0.0 {
			return;
		}
		let is_increasing = step > 0.0;
		let mut search_value = start_value;
		let mut is_spreading = true;
		while is_spreading {
			is_spreading = false;
			let next_value = search_value + step;
			for index in 0..self.values.len() {
				if self.values[index] != search_value {
					continue;
				}
				is_spreading = true;
				let coords = self.dimensions.get_coords(index);
				for ordinal in Ordinal::ORTHOGONAL {
					let neighbour = coords + ordinal.get_offset();
					let Some(n_index) = self.dimensions.get_index(neighbour) else {
						continue;
					};
					if !is_passable(neighbour) {
						continue;
					}
					let current = self.values[n_index];
					// don't overwrite a tile with a worse value
					if is_increasing && current <= next_value {
						continue;
					}
					if !is_increasing && current >= next_value {
						continue;
					}
					self.values[n_index] = next_value;
				}
			}
			search_value = next_value;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Lay out a heat map from rows written top first, `#` marks an impassable tile
	fn layout(rows: &[&str]) -> (HeatMap, Vec<IVec2>) {
		let height = rows.len() as i32;
		let width = rows[0].len() as u32;
		let map = HeatMap::new(MapDimensions::new(width, height as u32), FLOOD_SENTINEL);
		let mut walls = Vec::new();
		for (row, line) in rows.iter().enumerate() {
			for (x, c) in line.chars().enumerate() {
				if c == '#' {
					walls.push(IVec2::new(x as i32, height - 1 - row as i32));
				}
			}
		}
		(map, walls)
	}
	/// Read the map back as rows written top first
	fn rows_of(map: &HeatMap) -> Vec<Vec<f32>> {
		let dims = map.get_dimensions();
		(0..dims.get_height() as i32)
			.rev()
			.map(|y| {
				(0..dims.get_width() as i32)
					.map(|x| map.get_field_cell_value(IVec2::new(x, y)).unwrap())
					.collect()
			})
			.collect()
	}
	#[test]
	fn diamond_from_centre() {
		let (mut map, walls) = layout(&[".....", ".....", ".....", ".....", "....."]);
		map.set_field_cell_value(0.0, IVec2::new(2, 2));
		map.spread_heat(0.0, 1.0, |c| !walls.contains(&c));
		#[rustfmt::skip]
		let expected = vec![
			vec![4.0, 3.0, 2.0, 3.0, 4.0],
			vec![3.0, 2.0, 1.0, 2.0, 3.0],
			vec![2.0, 1.0, 0.0, 1.0, 2.0],
			vec![3.0, 2.0, 1.0, 2.0, 3.0],
			vec![4.0, 3.0, 2.0, 3.0, 4.0],
		];
		assert_eq!(expected, rows_of(&map));
	}
	#[test]
	fn walls_are_routed_around() {
		let (mut map, walls) = layout(&["...", "##.", "..."]);
		map.set_field_cell_value(0.0, IVec2::new(0, 0));
		map.spread_heat(0.0, 1.0, |c| !walls.contains(&c));
		let s = FLOOD_SENTINEL;
		#[rustfmt::skip]
		let expected = vec![
			vec![6.0, 5.0, 4.0],
			vec![s,   s,   3.0],
			vec![0.0, 1.0, 2.0],
		];
		assert_eq!(expected, rows_of(&map));
	}
	#[test]
	fn sealed_pocket_keeps_sentinel() {
		let (mut map, walls) = layout(&["..#.", "..#.", "..#."]);
		map.set_field_cell_value(0.0, IVec2::new(0, 0));
		map.spread_heat(0.0, 1.0, |c| !walls.contains(&c));
		for y in 0..3 {
			assert_eq!(Some(FLOOD_SENTINEL), map.get_field_cell_value(IVec2::new(3, y)));
		}
	}
	#[test]
	fn decreasing_spread_deepens() {
		let (mut map, _) = layout(&["....."]);
		map.set_all(CONCEALED_SENTINEL);
		map.set_field_cell_value(1.0, IVec2::new(0, 0));
		map.spread_heat(1.0, -1.0, |_| true);
		assert_eq!(vec![vec![1.0, 0.0, -1.0, -2.0, -3.0]], rows_of(&map));
	}
	#[test]
	fn zero_step_is_a_no_op() {
		let (mut map, _) = layout(&["..."]);
		map.set_all(0.0);
		map.spread_heat(0.0, 0.0, |_| true);
		assert_eq!(vec![vec![0.0, 0.0, 0.0]], rows_of(&map));
	}
	#[test]
	fn replace_and_index_access() {
		let mut map = HeatMap::new(MapDimensions::new(2, 2), 0.0);
		map.set_value_at_index(5.0, 3);
		map.replace_all(0.0, -1.0);
		assert_eq!(&[-1.0, -1.0, -1.0, 5.0], map.get());
		assert_eq!(5.0, map.get_value_at_index(3));
		assert_eq!(None, map.get_field_cell_value(IVec2::new(2, 0)));
	}
}

//! The immutable tile grid an arena is built on.
//!
//! Tiles are unit cubes. Tile `(x, y)` spans `x..x+1` and `y..y+1` in world space and `FLOOR_Z..CEILING_Z`
//! vertically, so any world position can be mapped to a tile by flooring its `x` and `y`:
//!
//! ```text
//!  y
//!  ^
//! 2|_____|_____|_____|
//!  |     |#####|     |
//! 1|_____|#####|_____|
//!  |     |     |     |
//! 0|_____|_____|_____|> x
//!  0     1     2     3
//! ```
//!
//! The grid is created once when a map is loaded and never mutated afterwards.
//!

use std::sync::Arc;

use crate::prelude::*;
use bevy::prelude::*;

/// The width `x` and height `y` of the map measured in tiles
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub struct MapDimensions(u32, u32);

impl MapDimensions {
	/// Create a new instance of [MapDimensions]
	pub fn new(width: u32, height: u32) -> Self {
		MapDimensions(width, height)
	}
	pub fn get_width(&self) -> u32 {
		self.0
	}
	pub fn get_height(&self) -> u32 {
		self.1
	}
	/// Total number of tiles
	pub fn get_tile_count(&self) -> usize {
		self.0 as usize * self.1 as usize
	}
	/// Whether the tile coordinates sit inside the grid
	pub fn are_coords_in_bounds(&self, coords: IVec2) -> bool {
		coords.x >= 0 && coords.y >= 0 && coords.x < self.0 as i32 && coords.y < self.1 as i32
	}
	/// Row-major index of the tile coordinates, `None` when outside the grid
	pub fn get_index(&self, coords: IVec2) -> Option<usize> {
		if self.are_coords_in_bounds(coords) {
			Some(coords.y as usize * self.0 as usize + coords.x as usize)
		} else {
			None
		}
	}
	/// Tile coordinates of a row-major index
	pub fn get_coords(&self, index: usize) -> IVec2 {
		let width = self.0.max(1) as usize;
		IVec2::new((index % width) as i32, (index / width) as i32)
	}
	/// Whether a world position lies inside the volume of the map, with a small tolerance at every face
	pub fn is_position_in_bounds(&self, position: Vec3) -> bool {
		position.x >= -BOUNDS_EPSILON
			&& position.y >= -BOUNDS_EPSILON
			&& position.z >= FLOOR_Z - BOUNDS_EPSILON
			&& position.x <= self.0 as f32 + BOUNDS_EPSILON
			&& position.y <= self.1 as f32 + BOUNDS_EPSILON
			&& position.z <= CEILING_Z + BOUNDS_EPSILON
	}
}

/// Data shared by every tile of one kind
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TileDefinition {
	/// Unique name of the definition
	pub name: String,
	/// Solid tiles block movement and rays
	pub is_solid: bool,
	/// Sprite sheet cell used by a renderer for the floor face, if any
	pub floor_sprite: Option<UVec2>,
	/// Sprite sheet cell used by a renderer for the wall faces, if any
	pub wall_sprite: Option<UVec2>,
}

impl TileDefinition {
	/// Create a definition without any sprite data
	pub fn new(name: &str, is_solid: bool) -> Self {
		TileDefinition {
			name: name.to_string(),
			is_solid,
			..default()
		}
	}
}

/// One cell of the grid
#[derive(Debug, Clone)]
pub struct Tile {
	/// Kind of tile
	definition: Arc<TileDefinition>,
}

impl Tile {
	/// Create a tile of a kind, its place in the grid gives its bounds
	pub fn new(definition: Arc<TileDefinition>) -> Self {
		Tile { definition }
	}
	pub fn get_definition(&self) -> &TileDefinition {
		&self.definition
	}
	pub fn is_solid(&self) -> bool {
		self.definition.is_solid
	}
}

/// Row-major grid of [Tile]s, row `0` is the bottom of the map
#[derive(Debug, Clone)]
pub struct TileGrid {
	/// Size of the grid
	dimensions: MapDimensions,
	/// Every tile, `y * width + x`
	tiles: Vec<Tile>,
}

impl TileGrid {
	/// Build a grid from a list of tiles in row-major order, the list must contain exactly `width * height` tiles
	pub fn new(dimensions: MapDimensions, tiles: Vec<Tile>) -> Result<Self, DefinitionError> {
		if tiles.len() != dimensions.get_tile_count() || tiles.is_empty() {
			return Err(DefinitionError::EmptyGrid);
		}
		Ok(TileGrid { dimensions, tiles })
	}
	/// Build a grid from ASCII rows where the first row is the top of the map. Every glyph must appear in `legend`
	pub fn from_rows(
		rows: &[String],
		legend: &[(char, TileDefinition)],
	) -> Result<Self, DefinitionError> {
		let height = rows.len();
		let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
		if width == 0 || height == 0 {
			return Err(DefinitionError::EmptyGrid);
		}
		let lookup: Vec<(char, Arc<TileDefinition>)> = legend
			.iter()
			.map(|(glyph, def)| (*glyph, Arc::new(def.clone())))
			.collect();
		let mut tiles = Vec::with_capacity(width * height);
		for y in 0..height {
			// the bottom row of the grid is the last written row
			let row = &rows[height - 1 - y];
			if row.chars().count() != width {
				return Err(DefinitionError::RaggedRows {
					row: height - 1 - y,
					expected: width,
					found: row.chars().count(),
				});
			}
			for (x, glyph) in row.chars().enumerate() {
				let Some((_, def)) = lookup.iter().find(|(g, _)| *g == glyph) else {
					return Err(DefinitionError::UnknownTileGlyph(glyph));
				};
				tiles.push(Tile::new(def.clone()));
			}
		}
		let dimensions = MapDimensions::new(width as u32, height as u32);
		debug!(
			"Built tile grid of {}x{}",
			dimensions.get_width(),
			dimensions.get_height()
		);
		TileGrid::new(dimensions, tiles)
	}
	pub fn get_dimensions(&self) -> MapDimensions {
		self.dimensions
	}
	/// Get a tile, `None` outside the grid
	pub fn get_tile(&self, coords: IVec2) -> Option<&Tile> {
		self.dimensions.get_index(coords).map(|i| &self.tiles[i])
	}
	/// Whether a tile blocks movement and rays. Anything outside the grid is treated as solid
	pub fn is_tile_solid(&self, coords: IVec2) -> bool {
		self.get_tile(coords).map(|t| t.is_solid()).unwrap_or(true)
	}
	/// Whether a world position lies inside the map volume
	pub fn is_position_in_bounds(&self, position: Vec3) -> bool {
		self.dimensions.is_position_in_bounds(position)
	}
	/// Tile coordinates containing a world position
	pub fn get_coords_for_world_pos(&self, position: Vec2) -> IVec2 {
		position.floor().as_ivec2()
	}
	/// World space centre of a tile
	pub fn get_tile_center(&self, coords: IVec2) -> Vec2 {
		coords.as_vec2() + Vec2::splat(0.5)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn legend() -> Vec<(char, TileDefinition)> {
		vec![
			('.', TileDefinition::new("Floor", false)),
			('#', TileDefinition::new("Wall", true)),
		]
	}
	fn rows(r: &[&str]) -> Vec<String> {
		r.iter().map(|s| s.to_string()).collect()
	}
	#[test]
	fn bottom_row_is_last_written() {
		let grid = TileGrid::from_rows(&rows(&["#..", "...", "..."]), &legend()).unwrap();
		assert!(grid.is_tile_solid(IVec2::new(0, 2)));
		assert!(!grid.is_tile_solid(IVec2::new(0, 0)));
	}
	#[test]
	fn outside_is_solid() {
		let grid = TileGrid::from_rows(&rows(&["...", "...", "..."]), &legend()).unwrap();
		assert!(grid.is_tile_solid(IVec2::new(-1, 0)));
		assert!(grid.is_tile_solid(IVec2::new(3, 0)));
		assert!(grid.is_tile_solid(IVec2::new(0, 3)));
		assert!(!grid.is_tile_solid(IVec2::new(2, 2)));
	}
	#[test]
	fn ragged_rows_rejected() {
		let result = TileGrid::from_rows(&rows(&["...", ".."]), &legend());
		assert!(matches!(result, Err(DefinitionError::RaggedRows { row: 1, .. })));
	}
	#[test]
	fn unknown_glyph_rejected() {
		let result = TileGrid::from_rows(&rows(&["..x"]), &legend());
		assert!(matches!(result, Err(DefinitionError::UnknownTileGlyph('x'))));
	}
	#[test]
	fn world_pos_floors() {
		let grid = TileGrid::from_rows(&rows(&["...", "..."]), &legend()).unwrap();
		assert_eq!(IVec2::new(1, 0), grid.get_coords_for_world_pos(Vec2::new(1.99, 0.2)));
		assert_eq!(IVec2::new(-1, 0), grid.get_coords_for_world_pos(Vec2::new(-0.2, 0.2)));
		assert_eq!(Vec2::new(2.5, 1.5), grid.get_tile_center(IVec2::new(2, 1)));
	}
	#[test]
	fn position_bounds_have_tolerance() {
		let dims = MapDimensions::new(3, 2);
		assert!(dims.is_position_in_bounds(Vec3::new(3.0, 2.0, 1.0)));
		assert!(dims.is_position_in_bounds(Vec3::new(-0.00005, 0.0, 0.0)));
		assert!(!dims.is_position_in_bounds(Vec3::new(3.01, 1.0, 0.5)));
		assert!(!dims.is_position_in_bounds(Vec3::new(1.0, 1.0, -0.1)));
	}
	#[test]
	fn index_round_trip() {
		let dims = MapDimensions::new(4, 3);
		let coords = IVec2::new(3, 2);
		let index = dims.get_index(coords).unwrap();
		assert_eq!(11, index);
		assert_eq!(coords, dims.get_coords(index));
		assert_eq!(None, dims.get_index(IVec2::new(4, 0)));
	}
}

//! Static classification of which tiles can be walked to from the player spawn points.
//!
//! Built once when a map is created: a distance flood from every spawn tile through non-solid tiles, after which
//! anything the flood never touched is marked [UNREACHABLE_VALUE] and everything else [REACHABLE_VALUE]. Sealed
//! pockets of floor are therefore unreachable just like walls, and the navigation fields never diffuse into them.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Binary reachable/unreachable map
#[derive(Debug, Clone, PartialEq)]
pub struct ReachabilityMap(HeatMap);

impl ReachabilityMap {
	/// Flood the grid from the `seeds` tiles. Seeds that are solid or outside the grid are ignored
	pub fn new(tiles: &TileGrid, seeds: &[IVec2]) -> Self {
		let dimensions = tiles.get_dimensions();
		let mut distances = HeatMap::new(dimensions, FLOOD_SENTINEL);
		for seed in seeds {
			if !tiles.is_tile_solid(*seed) {
				distances.set_field_cell_value(0.0, *seed);
			}
		}
		distances.spread_heat(0.0, 1.0, |c| !tiles.is_tile_solid(c));
		let mut reachable = 0;
		for index in 0..dimensions.get_tile_count() {
			if distances.get_value_at_index(index) == FLOOD_SENTINEL {
				distances.set_value_at_index(UNREACHABLE_VALUE, index);
			} else {
				distances.set_value_at_index(REACHABLE_VALUE, index);
				reachable += 1;
			}
		}
		debug!(
			"Reachability built from {} seeds, {} of {} tiles reachable",
			seeds.len(),
			reachable,
			dimensions.get_tile_count()
		);
		ReachabilityMap(distances)
	}
	/// Whether a tile can never be walked to. Anything outside the grid is unreachable
	pub fn is_tile_unreachable(&self, coords: IVec2) -> bool {
		self.0
			.get_field_cell_value(coords)
			.map(|v| v == UNREACHABLE_VALUE)
			.unwrap_or(true)
	}
	/// The underlying [HeatMap]
	pub fn get_heat_map(&self) -> &HeatMap {
		&self.0
	}
}

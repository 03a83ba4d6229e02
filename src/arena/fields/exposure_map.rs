//! The exposure map describes how visible each tile is to the players, rebuilt every tick.
//!
//! 1. Every tile starts at [UNEXPOSED_VALUE], unreachable tiles are stamped with [FLOOD_SENTINEL] so they never
//!    look attractive
//! 2. For each player a visibility ray is cast to the centre of every reachable tile, anything in view and within
//!    [SIGHT_RANGE] is set to [EXPOSED_VALUE]
//! 3. A forward heat spread from the baseline with a step of `+1` rewrites the exposed region with its tile-hop
//!    distance from the nearest hidden tile, so values climb towards the heart of what players can see
//! 4. Every tile still at the baseline is flipped to [CONCEALED_SENTINEL] and a backward spread with a step of
//!    `-1` runs from just above the baseline, so concealment deepens the further a tile is from any exposure
//!
//! For a player `P` in the left room of the map below, with a gap in the dividing wall at the bottom:
//!
//! ```text
//!  ___________________________________
//! |   |   |   |   |   |   |   |   |   |
//! | # | 5 | 4 | 3 | # | -3| -4| -5| # |
//! |___|___|_P_|___|___|___|___|___|___|
//! |   |   |   |   |   |   |   |   |   |
//! | # | 4 | 3 | 2 | # | -2| -3| -4| # |
//! |___|___|___|___|___|___|___|___|___|
//! |   |   |   |   |   |   |   |   |   |
//! | # | 3 | 2 | 1 | 0 | -1| -2| -3| # |
//! |___|___|___|___|___|___|___|___|___|
//! ```
//!
//! Descending this landscape leads out of sight and into the deepest hiding place. Both passes matter, a single
//! distance transform would lose the sign change at the edge of visibility.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Per tick visibility landscape
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureMap(HeatMap);

impl ExposureMap {
	/// Create a new [ExposureMap] where nothing is exposed
	pub fn new(dimensions: MapDimensions) -> Self {
		ExposureMap(HeatMap::new(dimensions, UNEXPOSED_VALUE))
	}
	/// Wrap a hand-built landscape
	#[cfg(test)]
	pub(crate) fn from_heat_map(heat_map: HeatMap) -> Self {
		ExposureMap(heat_map)
	}
	/// Rebuild from the current player positions, see the module docs
	pub fn update(
		&mut self,
		tiles: &TileGrid,
		reachability: &ReachabilityMap,
		player_positions: &[Vec2],
	) {
		let dimensions = self.0.get_dimensions();
		let map = &mut self.0;
		map.set_all(UNEXPOSED_VALUE);
		for index in 0..dimensions.get_tile_count() {
			if reachability.is_tile_unreachable(dimensions.get_coords(index)) {
				map.set_value_at_index(FLOOD_SENTINEL, index);
			}
		}
		for player in player_positions {
			let start = player.extend(FLOOR_Z);
			for index in 0..dimensions.get_tile_count() {
				let coords = dimensions.get_coords(index);
				if reachability.is_tile_unreachable(coords) {
					continue;
				}
				let displacement = tiles.get_tile_center(coords) - *player;
				let result = tiles.raycast_xy(
					start,
					displacement.normalize_or_zero().extend(0.0),
					displacement.length(),
				);
				if !result.did_impact() && result.get_impact_dist() <= SIGHT_RANGE {
					map.set_value_at_index(EXPOSED_VALUE, index);
				}
			}
		}
		let is_passable = |c: IVec2| !reachability.is_tile_unreachable(c);
		map.spread_heat(UNEXPOSED_VALUE, 1.0, is_passable);
		map.replace_all(UNEXPOSED_VALUE, CONCEALED_SENTINEL);
		map.spread_heat(UNEXPOSED_VALUE + 1.0, -1.0, is_passable);
	}
	/// Exposure of a tile, `None` outside the grid
	pub fn get_value(&self, coords: IVec2) -> Option<f32> {
		self.0.get_field_cell_value(coords)
	}
	/// The underlying [HeatMap]
	pub fn get_heat_map(&self) -> &HeatMap {
		&self.0
	}
}

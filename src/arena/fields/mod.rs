//! The navigation fields laid over the tile grid. Each is a dense, row-major array with one value per tile:
//!
//! - [heat_map::HeatMap] stores a float per tile. It backs both the static reachability map and the exposure map
//! - [flow_field::FlowField] stores a direction per tile, derived from the exposure map
//!

pub mod exposure_map;
pub mod flow_field;
pub mod heat_map;
pub mod reachability_map;

use crate::prelude::*;
use bevy::prelude::*;

/// Defines required access to field arrays
pub trait Field<T> {
	/// Get a reference to the field array
	fn get(&self) -> &[T];
	/// Size of the grid the field covers
	fn get_dimensions(&self) -> MapDimensions;
	/// Retrieve a field cell value, `None` outside the grid
	fn get_field_cell_value(&self, coords: IVec2) -> Option<T>;
	/// Set a field cell to a value, ignored outside the grid
	fn set_field_cell_value(&mut self, value: T, coords: IVec2);
}

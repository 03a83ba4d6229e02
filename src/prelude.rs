//! `use bevy_arena_sim_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::arena::{
	actors::{ai::*, controller::*, handle::*, registry::*, *},
	collision::*,
	definitions::*,
	fields::{exposure_map::*, flow_field::*, heat_map::*, reachability_map::*, *},
	map::*,
	raycast::*,
	tiles::*,
	utilities::*,
};

#[doc(hidden)]
pub use crate::plugin::{cue_layer::*, sim_layer::*, *};

//! Defines the Bevy [Plugin] for the arena simulation
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod cue_layer;
pub mod sim_layer;

/// Order of the arena work within a frame
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum ArenaSet {
	/// Apply requests sent by gameplay code
	Requests,
	/// Advance the simulation by one tick
	Simulate,
	/// Hand out what happened during the tick
	Cues,
}

/// Runs an [ArenaMap] resource once inserted into the app
pub struct ArenaSimPlugin;

impl Plugin for ArenaSimPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<Ordinal>()
			.register_type::<MapDimensions>()
			.register_type::<FloatRange>()
			.register_type::<ActorHandle>()
			.register_type::<Faction>()
			.register_type::<Controller>()
			.register_type::<AiState>()
			.register_type::<CueKind>()
			.add_event::<sim_layer::EventSpawnActor>()
			.add_event::<sim_layer::EventDamageActor>()
			.add_event::<sim_layer::EventPossessNext>()
			.add_event::<cue_layer::EventArenaCue>()
			.configure_sets(
				Update,
				(ArenaSet::Requests, ArenaSet::Simulate, ArenaSet::Cues).chain(),
			)
			.add_systems(
				Update,
				(
					(
						sim_layer::process_spawn_requests,
						sim_layer::process_damage_requests,
						sim_layer::process_possess_requests,
					)
						.chain()
						.in_set(ArenaSet::Requests),
					sim_layer::tick_arena.in_set(ArenaSet::Simulate),
					cue_layer::forward_cues.in_set(ArenaSet::Cues),
				)
					.run_if(resource_exists::<ArenaMap>),
			);
	}
}

//! Requests into the [ArenaMap] and the system that ticks it
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Ask for an actor to be placed into the arena
#[derive(Event)]
pub struct EventSpawnActor(SpawnInfo);

impl EventSpawnActor {
	/// Create a new instance of [EventSpawnActor]
	pub fn new(spawn_info: SpawnInfo) -> Self {
		EventSpawnActor(spawn_info)
	}
	pub fn get_spawn_info(&self) -> &SpawnInfo {
		&self.0
	}
}

/// Deal damage to an actor from outside the simulation, e.g. a scripted hazard
#[derive(Event)]
pub struct EventDamageActor {
	/// Actor to damage
	target: ActorHandle,
	/// Health to remove
	amount: f32,
	/// Actor to blame, if any
	causer: Option<ActorHandle>,
}

impl EventDamageActor {
	/// Create a new instance of [EventDamageActor]
	pub fn new(target: ActorHandle, amount: f32, causer: Option<ActorHandle>) -> Self {
		EventDamageActor {
			target,
			amount,
			causer,
		}
	}
	pub fn get_target(&self) -> ActorHandle {
		self.target
	}
	pub fn get_amount(&self) -> f32 {
		self.amount
	}
	pub fn get_causer(&self) -> Option<ActorHandle> {
		self.causer
	}
}

/// Move a player on to the next actor it can possess
#[derive(Event)]
pub struct EventPossessNext(pub usize);

/// Read [EventSpawnActor] and spawn into the [ArenaMap]
#[cfg(not(tarpaulin_include))]
pub fn process_spawn_requests(
	mut events: EventReader<EventSpawnActor>,
	mut map: ResMut<ArenaMap>,
) {
	for event in events.read() {
		if let Err(e) = map.spawn_actor(event.get_spawn_info()) {
			error!("Spawn request for `{}` failed: {}", event.get_spawn_info().actor, e);
		}
	}
}

/// Read [EventDamageActor] and apply the damage
#[cfg(not(tarpaulin_include))]
pub fn process_damage_requests(
	mut events: EventReader<EventDamageActor>,
	mut map: ResMut<ArenaMap>,
) {
	for event in events.read() {
		map.damage_actor(event.get_target(), event.get_amount(), event.get_causer());
	}
}

/// Read [EventPossessNext] and cycle the player's actor
#[cfg(not(tarpaulin_include))]
pub fn process_possess_requests(
	mut events: EventReader<EventPossessNext>,
	mut map: ResMut<ArenaMap>,
) {
	for event in events.read() {
		if map.possess_next(event.0).is_none() {
			warn!("Player {} has nothing to possess", event.0);
		}
	}
}

/// Advance the [ArenaMap] by the frame time
#[cfg(not(tarpaulin_include))]
pub fn tick_arena(time: Res<Time>, mut map: ResMut<ArenaMap>) {
	map.update(time.delta_secs());
}

//! Cues recorded by the [ArenaMap] are forwarded as events so audio and HUD code can react without touching
//! the simulation
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Something noteworthy happened to an actor during the last tick
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EventArenaCue(pub ArenaCue);

/// Drain the cues of the [ArenaMap] into [EventArenaCue]s
#[cfg(not(tarpaulin_include))]
pub fn forward_cues(mut map: ResMut<ArenaMap>, mut cues: EventWriter<EventArenaCue>) {
	for cue in map.drain_cues() {
		cues.write(EventArenaCue(cue));
	}
}

//! Who is driving an actor. The set of controller kinds is closed: an actor is either possessed by one of the
//! map's [Player]s or falls back to its own [crate::prelude::AiController]
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Current possessor of an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Controller {
	/// Index into the map's player list
	Player(usize),
	/// The actor's own AI
	Ai,
}

impl Controller {
	/// The player index when player controlled
	pub fn as_player(&self) -> Option<usize> {
		match self {
			Controller::Player(index) => Some(*index),
			Controller::Ai => None,
		}
	}
	/// Whether the actor's own AI is driving
	pub fn is_ai(&self) -> bool {
		matches!(self, Controller::Ai)
	}
}

/// A human participant, persists across the deaths of the actors it possesses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
	/// Actor currently possessed, may be stale once that actor has been swept
	actor: ActorHandle,
	/// Opposing actors killed
	kills: u32,
	/// Times the possessed actor died
	deaths: u32,
	/// Screen shake budget in `[0, 1]`, raised when landing hits
	trauma: f32,
}

impl Player {
	/// Create a new [Player] possessing nothing
	pub fn new() -> Self {
		Player::default()
	}
	pub fn get_actor(&self) -> ActorHandle {
		self.actor
	}
	/// Point the player at a new actor, the map is responsible for updating the actors' controllers
	pub(crate) fn set_actor(&mut self, handle: ActorHandle) {
		self.actor = handle;
	}
	pub fn get_kills(&self) -> u32 {
		self.kills
	}
	pub fn get_deaths(&self) -> u32 {
		self.deaths
	}
	pub fn get_trauma(&self) -> f32 {
		self.trauma
	}
	/// Count a kill
	pub(crate) fn add_kill(&mut self) {
		self.kills += 1;
	}
	/// Count a death
	pub(crate) fn add_death(&mut self) {
		self.deaths += 1;
	}
	/// Raise trauma, saturating at `1`
	pub fn add_trauma(&mut self, amount: f32) {
		self.trauma = (self.trauma + amount).clamp(0.0, 1.0);
	}
	/// Shed trauma for a tick
	pub(crate) fn update(&mut self, delta_seconds: f32) {
		self.trauma = (self.trauma - HIT_TRAUMA_DECAY_PER_SECOND * delta_seconds).max(0.0);
	}
}

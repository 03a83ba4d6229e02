//! Behaviour of AI driven actors.
//!
//! The controller is a three state machine:
//!
//! ```text
//!          enemy spotted             accumulated damage >= threshold
//!  Idle ------------------> Flee ---------------------------------> Stagger
//!   ^                        |  ^                                      |
//!   |    target lost/dead    |  |           countdown expired          |
//!   +------------------------+  +--------------------------------------+
//! ```
//!
//! While fleeing the actor follows the map's steering field, which points away from what players can see.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Current behaviour of an [AiController]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum AiState {
	/// Looking for an enemy
	#[default]
	Idle,
	/// Running away from player visibility
	Flee,
	/// Reeling from damage, no movement
	Stagger,
}

/// Who dealt damage to an AI, after resolving projectiles to whoever fired them
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageSource {
	/// The causer claims an owner that no longer exists
	Unattributed,
	/// An actor that can be blamed
	Actor {
		/// The blamed actor
		handle: ActorHandle,
		/// Whether the damaged AI considers it an enemy
		is_opposing: bool,
		/// Whether a player is driving it
		is_player_controlled: bool,
	},
}

/// What the AI wants its actor to do after thinking for a tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AiOutcome {
	/// Direction to turn towards and run along
	pub steering: Option<Vec2>,
	/// Cue to announce
	pub cue: Option<CueKind>,
}

/// Result of notifying an AI of damage
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageResponse {
	/// The damage tipped the AI into [AiState::Stagger]
	pub staggered: bool,
	/// A player controlled actor that should feel the hit land
	pub hit_reaction: Option<ActorHandle>,
}

/// Per actor AI state, owned by the actor it drives
#[derive(Debug, Clone, PartialEq)]
pub struct AiController {
	/// Current behaviour
	state: AiState,
	/// Enemy being fled from
	target: ActorHandle,
	/// Damage taken since the last stagger
	accumulated_damage: f32,
	/// Seconds of stagger remaining
	stagger_timer: f32,
	/// Visual flag raised for the duration of a stagger
	is_staggering: bool,
	/// Length of a stagger
	stagger_seconds: f32,
	/// Damage needed to stagger
	stagger_damage_threshold: f32,
}

impl AiController {
	/// Create a new [AiController] in the [AiState::Idle] state
	pub fn new(definition: &AiDefinition) -> Self {
		AiController {
			state: AiState::Idle,
			target: ActorHandle::INVALID,
			accumulated_damage: 0.0,
			stagger_timer: 0.0,
			is_staggering: false,
			stagger_seconds: definition.stagger_seconds,
			stagger_damage_threshold: definition.stagger_damage_threshold,
		}
	}
	pub fn get_state(&self) -> AiState {
		self.state
	}
	pub fn get_target(&self) -> ActorHandle {
		self.target
	}
	pub fn get_accumulated_damage(&self) -> f32 {
		self.accumulated_damage
	}
	pub fn is_staggering(&self) -> bool {
		self.is_staggering
	}
	/// Think for one tick. `actor` is the actor being driven, it is read but never mutated here, the caller
	/// applies the returned [AiOutcome]
	pub fn update(&mut self, actor: &Actor, map: &ArenaMap, delta_seconds: f32) -> AiOutcome {
		let mut outcome = AiOutcome::default();
		match self.state {
			AiState::Idle => {
				if map.get_actor_by_handle(self.target).is_none() {
					if let Some(enemy) = map.get_closest_visible_enemy(actor) {
						trace!("{:?} spotted {:?}", actor.get_handle(), enemy);
						self.target = enemy;
						self.state = AiState::Flee;
						outcome.cue = Some(CueKind::Alert);
					}
				} else {
					self.state = AiState::Flee;
					outcome.cue = Some(CueKind::Alert);
				}
			}
			AiState::Flee => match map.get_actor_by_handle(self.target) {
				Some(target) if !target.is_dead() => {
					let position = actor.get_position();
					outcome.steering =
						Some(map.get_steering_direction(Vec2::new(position.x, position.y)));
				}
				_ => {
					trace!("{:?} lost its target", actor.get_handle());
					self.target = ActorHandle::INVALID;
					self.state = AiState::Idle;
				}
			},
			AiState::Stagger => {
				self.stagger_timer -= delta_seconds;
				if self.stagger_timer < 0.0 {
					self.is_staggering = false;
					self.state = AiState::Flee;
				}
			}
		}
		outcome
	}
	/// Notify the AI that its actor took `amount` damage. `source` is `None` when nothing caused it
	pub fn damaged_by(
		&mut self,
		amount: f32,
		is_dead: bool,
		source: Option<DamageSource>,
	) -> DamageResponse {
		let mut response = DamageResponse::default();
		let Some(source) = source else {
			return response;
		};
		if self.state != AiState::Stagger && !is_dead {
			self.accumulated_damage += amount;
			if self.accumulated_damage >= self.stagger_damage_threshold {
				self.state = AiState::Stagger;
				self.accumulated_damage = 0.0;
				self.is_staggering = true;
				self.stagger_timer = self.stagger_seconds;
				response.staggered = true;
			}
		}
		if let DamageSource::Actor {
			handle,
			is_opposing,
			is_player_controlled,
		} = source
		{
			if is_opposing {
				self.target = handle;
			}
			if is_player_controlled {
				response.hit_reaction = Some(handle);
			}
		}
		response
	}
}

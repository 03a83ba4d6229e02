//! Actors are the simulated entities of an arena: players, monsters, projectiles and spawn markers alike. They
//! live in an [ActorRegistry] owned by the [crate::prelude::ArenaMap] and are referred to by [ActorHandle]s.
//!
//! An actor is never removed in the middle of a tick. Dying starts a corpse countdown, once that elapses the actor
//! is flagged as garbage and it is only the map's sweep at a fixed point of the tick which frees its slot.
//!

pub mod ai;
pub mod controller;
pub mod handle;
pub mod registry;

use std::sync::Arc;

use crate::prelude::*;
use bevy::prelude::*;

/// A simulated entity
#[derive(Debug, Clone)]
pub struct Actor {
	/// Handle the actor was spawned with
	handle: ActorHandle,
	/// Shared data of this kind of actor
	definition: Arc<ActorDefinition>,
	/// Feet position, `z` is height above the floor
	position: Vec3,
	/// Facing in degrees from `+x`
	yaw_degrees: f32,
	/// Units per second
	velocity: Vec3,
	/// Forces accumulated this tick
	acceleration: Vec3,
	/// Remaining health
	health: f32,
	/// Actor that fired this one
	owner: ActorHandle,
	/// Current possessor
	controller: Option<Controller>,
	/// Fallback possessor when no player drives the actor
	ai: Option<AiController>,
	/// Health ran out
	is_dead: bool,
	/// Waiting for the sweep
	is_garbage: bool,
	/// Seconds until a corpse becomes garbage
	corpse_timer: Option<f32>,
}

impl Actor {
	/// Create a new [Actor] from a definition, AI enabled definitions start out driven by their own AI
	pub fn new(
		handle: ActorHandle,
		definition: Arc<ActorDefinition>,
		spawn_info: &SpawnInfo,
	) -> Self {
		let ai = if definition.ai.ai_enabled {
			Some(AiController::new(&definition.ai))
		} else {
			None
		};
		Actor {
			handle,
			position: spawn_info.position,
			yaw_degrees: spawn_info.yaw_degrees,
			velocity: spawn_info.velocity,
			acceleration: Vec3::ZERO,
			health: definition.health,
			owner: spawn_info.owner,
			controller: ai.as_ref().map(|_| Controller::Ai),
			ai,
			is_dead: false,
			is_garbage: false,
			corpse_timer: None,
			definition,
		}
	}
	pub fn get_handle(&self) -> ActorHandle {
		self.handle
	}
	pub fn get_definition(&self) -> &ActorDefinition {
		&self.definition
	}
	pub fn get_faction(&self) -> Faction {
		self.definition.faction
	}
	pub fn get_position(&self) -> Vec3 {
		self.position
	}
	pub fn set_position(&mut self, position: Vec3) {
		self.position = position;
	}
	pub fn get_yaw_degrees(&self) -> f32 {
		self.yaw_degrees
	}
	pub fn set_yaw_degrees(&mut self, yaw_degrees: f32) {
		self.yaw_degrees = yaw_degrees;
	}
	pub fn get_velocity(&self) -> Vec3 {
		self.velocity
	}
	pub fn get_health(&self) -> f32 {
		self.health
	}
	pub fn get_owner(&self) -> ActorHandle {
		self.owner
	}
	pub fn get_controller(&self) -> Option<Controller> {
		self.controller
	}
	/// Index of the player possessing this actor
	pub fn as_player(&self) -> Option<usize> {
		self.controller.and_then(|c| c.as_player())
	}
	/// The AI, only while it is the one driving the actor
	pub fn as_ai(&self) -> Option<&AiController> {
		self.controller
			.filter(|c| c.is_ai())
			.and_then(|_| self.ai.as_ref())
	}
	/// The actor's own AI, whether or not it is currently driving
	pub fn get_ai(&self) -> Option<&AiController> {
		self.ai.as_ref()
	}
	pub fn is_dead(&self) -> bool {
		self.is_dead
	}
	/// Alive actors take part in collision, sight and raycasts
	pub fn is_alive(&self) -> bool {
		!self.is_dead
	}
	pub fn is_garbage(&self) -> bool {
		self.is_garbage
	}
	/// Whether the actor is reeling from a stagger
	pub fn is_staggering(&self) -> bool {
		self.ai.as_ref().map(|ai| ai.is_staggering()).unwrap_or(false)
	}
	/// Whether this actor treats `other` as an enemy
	pub fn is_opposing(&self, other: &Actor) -> bool {
		self.definition.faction.is_opposing(other.get_faction())
	}
	/// Collision radius
	pub fn get_radius(&self) -> f32 {
		self.definition.collision.radius
	}
	/// Vertical extent of the collision cylinder
	pub fn get_z_range(&self) -> FloatRange {
		FloatRange::new(
			self.position.z,
			self.position.z + self.definition.collision.height,
		)
	}
	/// Unit vector of the facing in the horizontal plane
	pub fn get_forward_normal_2d(&self) -> Vec2 {
		make_from_polar_degrees(self.yaw_degrees)
	}
	/// Where sight rays start from
	pub fn get_eye_position(&self) -> Vec3 {
		self.position + Vec3::Z * self.definition.camera.eye_height
	}
	/// Accumulate a force to be integrated on the next physics step
	pub fn add_force(&mut self, force: Vec3) {
		self.acceleration += force;
	}
	/// Change velocity immediately
	pub fn add_impulse(&mut self, impulse: Vec3) {
		self.velocity += impulse;
	}
	/// Push towards `direction` with enough force to reach `speed` against drag
	pub fn move_in_direction(&mut self, direction: Vec3, speed: f32) {
		self.add_force(direction * speed * self.definition.physics.drag);
	}
	/// Rotate towards `target_yaw_degrees` by at most `max_delta_degrees`
	pub fn turn_in_direction(&mut self, target_yaw_degrees: f32, max_delta_degrees: f32) {
		self.yaw_degrees =
			get_turned_toward_degrees(self.yaw_degrees, target_yaw_degrees, max_delta_degrees);
	}
	/// Integrate forces into velocity and velocity into position. Only simulated, living actors move
	pub fn update_physics(&mut self, delta_seconds: f32) {
		if !self.definition.physics.simulated || self.is_dead {
			return;
		}
		self.add_force(-self.velocity * self.definition.physics.drag);
		self.velocity += self.acceleration * delta_seconds;
		self.position += self.velocity * delta_seconds;
		self.acceleration = Vec3::ZERO;
		if !self.definition.physics.flying {
			self.position.z = FLOOR_Z;
		}
	}
	/// Count down the corpse timer, flagging the actor as garbage once it elapses
	pub fn update_corpse_timer(&mut self, delta_seconds: f32) {
		if let Some(remaining) = self.corpse_timer.as_mut() {
			*remaining -= delta_seconds;
			if *remaining <= 0.0 {
				self.is_garbage = true;
			}
		}
	}
	/// Remove health, returns `true` if this depleted it
	pub(crate) fn lose_health(&mut self, amount: f32) -> bool {
		self.health -= amount;
		if self.health <= 0.0 {
			self.health = 0.0;
			return true;
		}
		false
	}
	/// Mark as dead and start the corpse countdown, returns `false` if it was already dead
	pub(crate) fn die(&mut self) -> bool {
		if self.is_dead {
			return false;
		}
		self.is_dead = true;
		self.corpse_timer = Some(self.definition.corpse_lifetime);
		true
	}
	/// Flag for removal at the next sweep
	pub fn mark_garbage(&mut self) {
		self.is_garbage = true;
	}
	/// Hand control to a new possessor
	pub(crate) fn set_controller(&mut self, controller: Option<Controller>) {
		self.controller = controller;
	}
	/// Control reverts to the actor's AI, if it has one
	pub(crate) fn on_unpossessed(&mut self) {
		self.controller = self.ai.as_ref().map(|_| Controller::Ai);
	}
	/// Borrow the AI out of the actor so it can think while the map is read
	pub(crate) fn take_ai(&mut self) -> Option<AiController> {
		self.ai.take()
	}
	/// Return an AI borrowed with [Actor::take_ai]
	pub(crate) fn restore_ai(&mut self, ai: AiController) {
		self.ai = Some(ai);
	}
	/// Mutable access to the actor's AI
	pub(crate) fn get_ai_mut(&mut self) -> Option<&mut AiController> {
		self.ai.as_mut()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn definition() -> Arc<ActorDefinition> {
		Arc::new(ActorDefinition {
			name: "Imp".to_string(),
			health: 20.0,
			corpse_lifetime: 1.0,
			faction: Faction::Demon,
			collision: CollisionDefinition {
				radius: 0.35,
				height: 0.75,
				..default()
			},
			physics: PhysicsDefinition {
				simulated: true,
				drag: 9.0,
				run_speed: 3.0,
				turn_speed: 90.0,
				..default()
			},
			camera: CameraDefinition { eye_height: 0.6 },
			ai: AiDefinition {
				ai_enabled: true,
				..default()
			},
			..default()
		})
	}
	fn actor() -> Actor {
		Actor::new(
			ActorHandle::new(0, 0),
			definition(),
			&SpawnInfo::new("Imp", Vec3::new(2.0, 2.0, 0.3), 90.0),
		)
	}
	#[test]
	fn ai_definitions_start_ai_driven() {
		let actor = actor();
		assert_eq!(Some(Controller::Ai), actor.get_controller());
		assert!(actor.as_ai().is_some());
		assert_eq!(None, actor.as_player());
	}
	#[test]
	fn unpossessed_reverts_to_ai() {
		let mut actor = actor();
		actor.set_controller(Some(Controller::Player(0)));
		assert!(actor.as_ai().is_none());
		assert!(actor.get_ai().is_some());
		actor.on_unpossessed();
		assert_eq!(Some(Controller::Ai), actor.get_controller());
	}
	#[test]
	fn physics_integrates_and_grounds() {
		let mut actor = actor();
		actor.move_in_direction(Vec3::X, 3.0);
		actor.update_physics(0.1);
		// a = 3 * 9, v = 2.7, x = 2 + 0.27
		assert!((actor.get_velocity().x - 2.7).abs() < 1e-5);
		assert!((actor.get_position().x - 2.27).abs() < 1e-5);
		assert_eq!(0.0, actor.get_position().z);
	}
	#[test]
	fn dead_actors_do_not_move() {
		let mut actor = actor();
		actor.add_impulse(Vec3::X);
		assert!(actor.die());
		actor.update_physics(1.0);
		assert_eq!(Vec3::new(2.0, 2.0, 0.3), actor.get_position());
	}
	#[test]
	fn corpse_becomes_garbage() {
		let mut actor = actor();
		actor.die();
		assert!(!actor.die());
		actor.update_corpse_timer(0.6);
		assert!(!actor.is_garbage());
		actor.update_corpse_timer(0.6);
		assert!(actor.is_garbage());
	}
	#[test]
	fn health_clamps_at_zero() {
		let mut actor = actor();
		assert!(!actor.lose_health(5.0));
		assert_eq!(15.0, actor.get_health());
		assert!(actor.lose_health(50.0));
		assert_eq!(0.0, actor.get_health());
	}
	#[test]
	fn turn_is_rate_limited() {
		let mut actor = actor();
		actor.turn_in_direction(180.0, 45.0);
		assert_eq!(135.0, actor.get_yaw_degrees());
	}
	#[test]
	fn eye_and_forward() {
		let actor = actor();
		assert!((actor.get_eye_position().z - 0.9).abs() < 1e-6);
		let forward = actor.get_forward_normal_2d();
		assert!(forward.x.abs() < 1e-6 && (forward.y - 1.0).abs() < 1e-6);
		let z_range = actor.get_z_range();
		assert_eq!(0.3, z_range.min);
		assert!((z_range.max - 1.05).abs() < 1e-6);
	}
}

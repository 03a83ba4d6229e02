//! The [ArenaMap] is the authoritative context of a running arena. It owns the tile grid, every actor, the
//! players, the navigation fields, the random number generator and the queue of cues for collaborators, and
//! advances all of them with [ArenaMap::update].
//!
//! Nothing here is global: everything the simulation needs is reached through the map, and the only outside
//! input is the elapsed time handed to each update.
//!

use std::sync::Arc;

use crate::prelude::*;
use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Something noteworthy happened to an actor
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum CueKind {
	/// An AI spotted an enemy
	Alert,
	/// An AI was staggered by damage
	Stagger,
	/// Damage was taken without dying
	Hurt,
	/// An actor died
	Death,
}

/// A cue recorded during a tick, consumed by audio and HUD collaborators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaCue {
	pub kind: CueKind,
	/// Actor the cue is about
	pub actor: ActorHandle,
	/// Where the actor stood when the cue was recorded
	pub position: Vec3,
}

/// Authoritative state of an arena
#[derive(Resource, Debug, Clone)]
pub struct ArenaMap {
	/// Name from the [MapDefinition]
	name: String,
	/// Static layout
	tiles: TileGrid,
	/// Every actor
	registry: ActorRegistry,
	/// Kinds of actor that can be spawned
	definitions: ActorDefinitions,
	/// Where players appear
	spawn_points: Vec<SpawnInfo>,
	/// Definition spawned for players
	player_actor: String,
	/// Human participants
	players: Vec<Player>,
	/// Tiles reachable from the spawn points, fixed for the life of the map
	reachability: ReachabilityMap,
	/// Visibility landscape, rebuilt every tick
	exposure: ExposureMap,
	/// Direction of descent of the exposure, rebuilt every tick
	flow_field: FlowField,
	/// Source of every random roll
	rng: StdRng,
	/// Cues waiting to be drained
	cues: Vec<ArenaCue>,
}

impl ArenaMap {
	/// Build a map from its definition. Spawn infos naming [SPAWN_POINT_ACTOR] become spawn points, all others
	/// are spawned immediately. `seed` makes every random roll reproducible
	pub fn new(
		definition: &MapDefinition,
		definitions: ActorDefinitions,
		seed: u64,
	) -> Result<Self, DefinitionError> {
		let tiles = definition.build_tile_grid()?;
		let (spawn_points, placements): (Vec<SpawnInfo>, Vec<SpawnInfo>) = definition
			.spawn_infos
			.iter()
			.cloned()
			.partition(|info| info.actor == SPAWN_POINT_ACTOR);
		if spawn_points.is_empty() {
			warn!(
				"Map `{}` has no spawn points, no tile will be reachable",
				definition.name
			);
		}
		let seeds: Vec<IVec2> = spawn_points
			.iter()
			.map(|p| tiles.get_coords_for_world_pos(p.position.truncate()))
			.collect();
		let reachability = ReachabilityMap::new(&tiles, &seeds);
		let dimensions = tiles.get_dimensions();
		let mut map = ArenaMap {
			name: definition.name.clone(),
			tiles,
			registry: ActorRegistry::new(),
			definitions,
			spawn_points,
			player_actor: definition.player_actor.clone(),
			players: Vec::new(),
			reachability,
			exposure: ExposureMap::new(dimensions),
			flow_field: FlowField::new(dimensions),
			rng: StdRng::seed_from_u64(seed),
			cues: Vec::new(),
		};
		for placement in placements.iter() {
			if let Err(e) = map.spawn_actor(placement) {
				warn!(
					"Skipped placing `{}` on map `{}`: {}",
					placement.actor, map.name, e
				);
			}
		}
		debug!(
			"Created map `{}` of {}x{} tiles with {} actors and {} spawn points",
			map.name,
			dimensions.get_width(),
			dimensions.get_height(),
			map.registry.get_actor_count(),
			map.spawn_points.len()
		);
		Ok(map)
	}
	/// Advance the arena by one tick
	pub fn update(&mut self, delta_seconds: f32) {
		self.update_players(delta_seconds);
		self.update_actors(delta_seconds);
		self.collide_actors();
		self.collide_actors_with_map();
		self.delete_destroyed_actors();
		self.check_and_spawn_players();
		self.update_nav_grids();
	}
	/// Let hit trauma wear off
	pub fn update_players(&mut self, delta_seconds: f32) {
		for player in self.players.iter_mut() {
			player.update(delta_seconds);
		}
	}
	/// Let every actor think and move. Actors spawned during the pass wait for the next tick
	pub fn update_actors(&mut self, delta_seconds: f32) {
		for handle in self.registry.snapshot_handles() {
			self.update_actor(handle, delta_seconds);
		}
	}
	/// AI, physics and corpse countdown of one actor
	fn update_actor(&mut self, handle: ActorHandle, delta_seconds: f32) {
		let ai = match self.registry.get_mut(handle) {
			Some(actor) if actor.is_alive() && actor.as_ai().is_some() => actor.take_ai(),
			Some(_) => None,
			None => return,
		};
		if let Some(mut ai) = ai {
			let outcome = match self.registry.get(handle) {
				Some(actor) => ai.update(actor, self, delta_seconds),
				None => AiOutcome::default(),
			};
			let Some(actor) = self.registry.get_mut(handle) else {
				return;
			};
			actor.restore_ai(ai);
			if let Some(steering) = outcome.steering.filter(|s| *s != Vec2::ZERO) {
				let physics = &actor.get_definition().physics;
				let (turn_speed, run_speed) = (physics.turn_speed, physics.run_speed);
				actor.turn_in_direction(
					get_orientation_degrees(steering),
					turn_speed * delta_seconds,
				);
				actor.move_in_direction(steering.extend(0.0), run_speed);
			}
			if let Some(kind) = outcome.cue {
				self.push_cue(kind, handle);
			}
		}
		if let Some(actor) = self.registry.get_mut(handle) {
			actor.update_physics(delta_seconds);
			actor.update_corpse_timer(delta_seconds);
		}
	}
	/// Free the slots of every actor flagged as garbage
	pub fn delete_destroyed_actors(&mut self) -> usize {
		self.registry.delete_garbage()
	}
	/// Respawn each player whose possessed actor no longer exists
	pub fn check_and_spawn_players(&mut self) {
		for index in 0..self.players.len() {
			if self.registry.get(self.players[index].get_actor()).is_some() {
				continue;
			}
			match self.spawn_player(index) {
				Ok(handle) => debug!("Player {} spawned as {:?}", index, handle),
				Err(e) => warn!("Player {} could not be spawned: {}", index, e),
			}
		}
	}
	/// Rebuild the exposure map and flow field from where the living players stand
	pub fn update_nav_grids(&mut self) {
		let player_positions: Vec<Vec2> = self
			.players
			.iter()
			.filter_map(|p| self.registry.get(p.get_actor()))
			.filter(|a| a.is_alive())
			.map(|a| a.get_position().truncate())
			.collect();
		self.exposure
			.update(&self.tiles, &self.reachability, &player_positions);
		self.flow_field.calculate(&self.exposure, &self.reachability);
		trace!(
			"Rebuilt nav grids of `{}` for {} players",
			self.name,
			player_positions.len()
		);
	}
	/// Place a new actor. Fails if the definition is unknown or the registry is exhausted
	pub fn spawn_actor(&mut self, spawn_info: &SpawnInfo) -> Result<ActorHandle, SpawnError> {
		let definition: Arc<ActorDefinition> = self
			.definitions
			.get(&spawn_info.actor)
			.cloned()
			.ok_or_else(|| SpawnError::UnknownDefinition(spawn_info.actor.clone()))?;
		let die_on_spawn = definition.die_on_spawn;
		let handle = self
			.registry
			.spawn(|handle| Actor::new(handle, definition, spawn_info))?;
		trace!("Spawned `{}` as {:?}", spawn_info.actor, handle);
		if die_on_spawn {
			self.die(handle);
		}
		Ok(handle)
	}
	/// Register a new player, returns its index. The player is spawned on the next tick
	pub fn add_player(&mut self) -> usize {
		self.players.push(Player::new());
		self.players.len() - 1
	}
	/// Spawn the player actor at a random spawn point and possess it
	pub fn spawn_player(&mut self, index: usize) -> Result<ActorHandle, SpawnError> {
		if index >= self.players.len() {
			return Err(SpawnError::UnknownPlayer(index));
		}
		if self.spawn_points.is_empty() {
			return Err(SpawnError::NoSpawnPoints);
		}
		let pick = self.rng.random_range(0..self.spawn_points.len());
		let point = &self.spawn_points[pick];
		let spawn_info = SpawnInfo::new(&self.player_actor, point.position, point.yaw_degrees);
		let handle = self.spawn_actor(&spawn_info)?;
		self.possess(index, handle);
		Ok(handle)
	}
	/// Hand control of an actor to a player. The player's previous actor falls back to its AI, and a player
	/// that was driving the new actor is left with nothing. Returns `false` if either side doesn't exist
	pub fn possess(&mut self, index: usize, handle: ActorHandle) -> bool {
		let Some(player) = self.players.get(index) else {
			return false;
		};
		let previous = player.get_actor();
		if previous == handle {
			return self.registry.get(handle).is_some();
		}
		let Some(actor) = self.registry.get_mut(handle) else {
			return false;
		};
		let displaced = actor.as_player();
		actor.set_controller(Some(Controller::Player(index)));
		if let Some(other) = displaced.and_then(|i| self.players.get_mut(i)) {
			other.set_actor(ActorHandle::INVALID);
		}
		if let Some(old) = self.registry.get_mut(previous) {
			old.on_unpossessed();
		}
		self.players[index].set_actor(handle);
		true
	}
	/// Move a player on to the next living actor, in slot order, that can be possessed
	pub fn possess_next(&mut self, index: usize) -> Option<ActorHandle> {
		let current = self.players.get(index)?.get_actor();
		let slot_count = self.registry.get_slot_count();
		if slot_count == 0 {
			return None;
		}
		let start = match self.registry.get(current) {
			Some(_) => current.get_index(),
			None => slot_count - 1,
		};
		for offset in 1..=slot_count {
			let slot = (start + offset) % slot_count;
			let Some(actor) = self.registry.get_slot(slot) else {
				continue;
			};
			if actor.is_alive() && actor.get_definition().can_be_possessed {
				let handle = actor.get_handle();
				if handle != current {
					self.possess(index, handle);
				}
				return Some(handle);
			}
		}
		None
	}
	/// Resolve a handle, `None` once the actor is gone
	pub fn get_actor_by_handle(&self, handle: ActorHandle) -> Option<&Actor> {
		self.registry.get(handle)
	}
	/// Resolve a handle for mutation
	pub fn get_actor_by_handle_mut(&mut self, handle: ActorHandle) -> Option<&mut Actor> {
		self.registry.get_mut(handle)
	}
	/// Work out who to blame for damage dealt by `causer`, projectiles are blamed on whoever fired them
	fn resolve_damage_source(
		&self,
		victim_faction: Faction,
		causer: Option<ActorHandle>,
	) -> Option<DamageSource> {
		let causer = self.registry.get(causer?)?;
		let owner = causer.get_owner();
		let blamed = if owner.is_valid() {
			match self.registry.get(owner) {
				Some(owner) => owner,
				None => return Some(DamageSource::Unattributed),
			}
		} else {
			causer
		};
		Some(DamageSource::Actor {
			handle: blamed.get_handle(),
			is_opposing: victim_faction.is_opposing(blamed.get_faction()),
			is_player_controlled: blamed.as_player().is_some(),
		})
	}
	/// Player driving an actor
	fn get_player_of(&self, handle: ActorHandle) -> Option<usize> {
		self.registry.get(handle).and_then(|a| a.as_player())
	}
	/// Remove health from an actor. Running out kills anything but a neutral and counts the kill and death for
	/// the players involved, otherwise a hurt cue is recorded. An AI driving the actor is told who to blame
	pub fn damage_actor(&mut self, target: ActorHandle, amount: f32, causer: Option<ActorHandle>) {
		let Some(actor) = self.registry.get_mut(target) else {
			return;
		};
		if actor.is_dead() || actor.is_garbage() {
			return;
		}
		let is_depleted = actor.lose_health(amount);
		let faction = actor.get_faction();
		let is_dead = is_depleted && faction != Faction::Neutral;
		let source = self.resolve_damage_source(faction, causer);
		if is_dead {
			if let Some(victim) = self.get_player_of(target) {
				self.players[victim].add_death();
			}
			if let Some(DamageSource::Actor { handle, .. }) = source {
				if let Some(killer) = self.get_player_of(handle) {
					self.players[killer].add_kill();
				}
			}
			self.die(target);
		} else {
			self.push_cue(CueKind::Hurt, target);
		}
		let response = match self.registry.get_mut(target) {
			Some(actor) if actor.as_ai().is_some() => actor
				.get_ai_mut()
				.map(|ai| ai.damaged_by(amount, is_dead, source)),
			_ => None,
		};
		if let Some(response) = response {
			if response.staggered {
				self.push_cue(CueKind::Stagger, target);
			}
			if let Some(player) = response.hit_reaction.and_then(|h| self.get_player_of(h)) {
				self.players[player].add_trauma(HIT_TRAUMA);
			}
		}
	}
	/// Kill an actor, starting its corpse countdown
	pub fn die(&mut self, handle: ActorHandle) {
		let Some(actor) = self.registry.get_mut(handle) else {
			return;
		};
		if actor.die() {
			trace!("{:?} died", handle);
			self.push_cue(CueKind::Death, handle);
		}
	}
	/// React to a contact. `other` is `None` for tiles, floor and ceiling. A living `other` takes this actor's
	/// contact damage and impulse, then this actor dies if it is meant to on any contact
	pub fn on_collide(&mut self, this: ActorHandle, other: Option<ActorHandle>) {
		let Some(actor) = self.registry.get(this) else {
			return;
		};
		let collision = actor.get_definition().collision.clone();
		let velocity = actor.get_velocity();
		if let Some(other) = other {
			let is_other_alive = self
				.registry
				.get(other)
				.map(|o| o.is_alive())
				.unwrap_or(false);
			if is_other_alive {
				if !collision.damage_on_collide.is_zero() {
					let damage = collision.damage_on_collide.roll(&mut self.rng);
					self.damage_actor(other, damage, Some(this));
				}
				let impulse = velocity.truncate().normalize_or_zero().extend(0.0)
					* collision.impulse_on_collide;
				if let Some(other) = self.registry.get_mut(other) {
					other.add_impulse(impulse);
				}
			}
		}
		if collision.die_on_collide {
			self.die(this);
		}
	}
	/// Nearest living enemy inside an actor's sight cone with nothing solid in between
	pub fn get_closest_visible_enemy(&self, actor: &Actor) -> Option<ActorHandle> {
		let sight = &actor.get_definition().ai;
		let origin = actor.get_position().truncate();
		let forward = actor.get_forward_normal_2d();
		let eye = actor.get_eye_position();
		let mut closest = None;
		let mut closest_dist_sq = f32::MAX;
		for candidate in self.registry.iter() {
			if candidate.is_dead() || !actor.is_opposing(candidate) {
				continue;
			}
			let target = candidate.get_position().truncate();
			if !is_point_inside_directed_sector(
				target,
				origin,
				forward,
				sight.sight_angle,
				sight.sight_radius,
			) {
				continue;
			}
			let dist_sq = (target - origin).length_squared();
			let direction = (target - origin).normalize_or_zero().extend(0.0);
			let result = self.tiles.raycast_xy(eye, direction, sight.sight_radius);
			if result.did_impact() && result.get_impact_dist().powi(2) <= dist_sq {
				continue;
			}
			if dist_sq < closest_dist_sq {
				closest = Some(candidate.get_handle());
				closest_dist_sq = dist_sq;
			}
		}
		closest
	}
	/// Smooth direction away from player visibility at a world position
	pub fn get_steering_direction(&self, position: Vec2) -> Vec2 {
		self.flow_field.get_steering_direction(position)
	}
	/// Whether a tile blocks movement and rays, anything outside the map does
	pub fn is_tile_solid(&self, coords: IVec2) -> bool {
		self.tiles.is_tile_solid(coords)
	}
	/// Tile containing a world position
	pub fn get_coords_for_world_pos(&self, position: Vec2) -> IVec2 {
		self.tiles.get_coords_for_world_pos(position)
	}
	/// Fire an instant shot from an actor's eye and damage whatever actor it strikes. Returns `None` if the
	/// shooter doesn't exist
	pub fn fire_hitscan(
		&mut self,
		shooter: ActorHandle,
		direction: Vec3,
		range: f32,
		damage: FloatRange,
	) -> Option<RaycastResult> {
		let eye = self.registry.get(shooter)?.get_eye_position();
		let result = self.raycast_all(eye, direction.normalize_or_zero(), range, Some(shooter));
		let hit = result.get_hit_actor();
		if hit.is_valid() {
			let amount = damage.roll(&mut self.rng);
			self.damage_actor(hit, amount, Some(shooter));
		}
		Some(result)
	}
	/// Record a cue about an actor at its current position
	fn push_cue(&mut self, kind: CueKind, handle: ActorHandle) {
		if let Some(actor) = self.registry.get(handle) {
			self.cues.push(ArenaCue {
				kind,
				actor: handle,
				position: actor.get_position(),
			});
		}
	}
	/// Take every cue recorded since the last drain
	pub fn drain_cues(&mut self) -> Vec<ArenaCue> {
		std::mem::take(&mut self.cues)
	}
	pub fn get_name(&self) -> &str {
		&self.name
	}
	pub fn get_tile_grid(&self) -> &TileGrid {
		&self.tiles
	}
	pub fn get_registry(&self) -> &ActorRegistry {
		&self.registry
	}
	/// Mutable access to the actors for the collision passes
	pub(crate) fn get_registry_mut(&mut self) -> &mut ActorRegistry {
		&mut self.registry
	}
	/// Split borrow of the static tiles and the actors
	pub(crate) fn get_tiles_and_registry_mut(&mut self) -> (&TileGrid, &mut ActorRegistry) {
		(&self.tiles, &mut self.registry)
	}
	pub fn get_actor_definitions(&self) -> &ActorDefinitions {
		&self.definitions
	}
	pub fn get_spawn_points(&self) -> &[SpawnInfo] {
		&self.spawn_points
	}
	pub fn get_players(&self) -> &[Player] {
		&self.players
	}
	pub fn get_player(&self, index: usize) -> Option<&Player> {
		self.players.get(index)
	}
	/// Mutable access to a player, e.g. to add trauma from outside the simulation
	pub fn get_player_mut(&mut self, index: usize) -> Option<&mut Player> {
		self.players.get_mut(index)
	}
	pub fn get_reachability_map(&self) -> &ReachabilityMap {
		&self.reachability
	}
	pub fn get_exposure_map(&self) -> &ExposureMap {
		&self.exposure
	}
	pub fn get_flow_field(&self) -> &FlowField {
		&self.flow_field
	}
}

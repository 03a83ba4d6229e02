//! Immutable data describing kinds of actors and the layout of a map. These are produced by a loader (RON files
//! with the `ron` feature, or built in code) and shared by every actor spawned from them
//!

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::prelude::*;
use bevy::prelude::*;
use thiserror::Error;

/// Side an actor fights for
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum Faction {
	#[default]
	Neutral,
	Marine,
	Demon,
}

impl Faction {
	/// Whether an actor of this faction treats `other` as an enemy
	pub fn is_opposing(&self, other: Faction) -> bool {
		match self {
			Faction::Demon => other != Faction::Neutral && other != Faction::Demon,
			Faction::Marine => other != Faction::Neutral && other != Faction::Marine,
			Faction::Neutral => false,
		}
	}
}

/// Collision volume and contact behaviour
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollisionDefinition {
	/// Radius of the vertical cylinder
	pub radius: f32,
	/// Height of the vertical cylinder
	pub height: f32,
	/// Pushed out of solid tiles, floor and ceiling
	pub collides_with_world: bool,
	/// Pushed out of other actors
	pub collides_with_actors: bool,
	/// Dies on any contact, typical of projectiles
	pub die_on_collide: bool,
	/// Damage dealt to whatever it touches, [FloatRange::ZERO] for none
	pub damage_on_collide: FloatRange,
	/// Impulse applied to whatever it touches along its direction of travel
	pub impulse_on_collide: f32,
}

/// Movement tuning
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PhysicsDefinition {
	/// Integrated each tick, otherwise the actor never moves by itself
	pub simulated: bool,
	/// Flying actors keep their height, others are snapped to the floor
	pub flying: bool,
	pub walk_speed: f32,
	pub run_speed: f32,
	/// Resistance proportional to velocity
	pub drag: f32,
	/// Degrees per second
	pub turn_speed: f32,
}

/// Viewpoint
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraDefinition {
	/// Height of the eyes above the actor position, sight rays start here
	pub eye_height: f32,
}

/// Behaviour of an AI controlled actor
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct AiDefinition {
	/// Actor gets an AI controller when spawned
	pub ai_enabled: bool,
	/// Furthest distance an enemy can be spotted from
	pub sight_radius: f32,
	/// Full aperture of the sight cone in degrees
	pub sight_angle: f32,
	/// Length of a stagger
	pub stagger_seconds: f32,
	/// Accumulated damage that triggers a stagger
	pub stagger_damage_threshold: f32,
}

impl Default for AiDefinition {
	fn default() -> Self {
		AiDefinition {
			ai_enabled: false,
			sight_radius: 0.0,
			sight_angle: 0.0,
			stagger_seconds: 0.0,
			stagger_damage_threshold: 1000.0,
		}
	}
}

/// Everything shared by actors of one kind
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ActorDefinition {
	/// Unique name, spawn infos refer to it
	pub name: String,
	pub health: f32,
	/// Seconds a dead actor lingers before it is swept
	pub corpse_lifetime: f32,
	pub faction: Faction,
	pub can_be_possessed: bool,
	pub die_on_spawn: bool,
	pub collision: CollisionDefinition,
	pub physics: PhysicsDefinition,
	pub camera: CameraDefinition,
	pub ai: AiDefinition,
}

impl Default for ActorDefinition {
	fn default() -> Self {
		ActorDefinition {
			name: "UnknownActor".to_string(),
			health: 1.0,
			corpse_lifetime: 0.0,
			faction: Faction::Neutral,
			can_be_possessed: false,
			die_on_spawn: false,
			collision: CollisionDefinition::default(),
			physics: PhysicsDefinition::default(),
			camera: CameraDefinition::default(),
			ai: AiDefinition::default(),
		}
	}
}

/// Lookup of [ActorDefinition]s by name
#[derive(Debug, Clone, Default)]
pub struct ActorDefinitions(BTreeMap<String, Arc<ActorDefinition>>);

impl ActorDefinitions {
	/// Create a lookup from a list of definitions, later duplicates replace earlier ones
	pub fn new(definitions: Vec<ActorDefinition>) -> Self {
		let mut lookup = ActorDefinitions::default();
		for def in definitions {
			lookup.insert(def);
		}
		lookup
	}
	/// Add or replace a definition
	pub fn insert(&mut self, definition: ActorDefinition) {
		self.0.insert(definition.name.clone(), Arc::new(definition));
	}
	/// Find a definition by name
	pub fn get(&self, name: &str) -> Option<&Arc<ActorDefinition>> {
		self.0.get(name)
	}
	pub fn len(&self) -> usize {
		self.0.len()
	}
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
	/// Parse a RON list of [ActorDefinition]s
	#[cfg(feature = "ron")]
	pub fn from_ron_str(source: &str) -> Result<Self, DefinitionError> {
		let list: Vec<ActorDefinition> = ron::de::from_str(source)?;
		Ok(ActorDefinitions::new(list))
	}
	/// Read and parse a RON list of [ActorDefinition]s from disk
	#[cfg(feature = "ron")]
	pub fn from_file(path: &str) -> Result<Self, DefinitionError> {
		let source = std::fs::read_to_string(path)?;
		ActorDefinitions::from_ron_str(&source)
	}
}

/// Request to place an actor into the world
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpawnInfo {
	/// Name of the [ActorDefinition]
	pub actor: String,
	pub position: Vec3,
	/// Yaw in degrees
	pub yaw_degrees: f32,
	pub velocity: Vec3,
	/// Actor that fired this one, [ActorHandle::INVALID] for none
	#[cfg_attr(feature = "serde", serde(skip))]
	pub owner: ActorHandle,
}

impl SpawnInfo {
	/// Create a new [SpawnInfo] at rest
	pub fn new(actor: &str, position: Vec3, yaw_degrees: f32) -> Self {
		SpawnInfo {
			actor: actor.to_string(),
			position,
			yaw_degrees,
			..default()
		}
	}
	/// Mark the spawned actor as owned by another, typical of projectiles
	pub fn with_owner(mut self, owner: ActorHandle) -> Self {
		self.owner = owner;
		self
	}
	/// Give the spawned actor an initial velocity
	pub fn with_velocity(mut self, velocity: Vec3) -> Self {
		self.velocity = velocity;
		self
	}
}

/// Layout of a map: its tiles and what populates it
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapDefinition {
	pub name: String,
	/// ASCII rows, the first row is the top of the map
	pub rows: Vec<String>,
	/// Which tile each glyph of `rows` stands for
	pub legend: Vec<(char, TileDefinition)>,
	/// Actors and spawn points placed when the map is created
	pub spawn_infos: Vec<SpawnInfo>,
	/// Actor definition spawned for each player
	pub player_actor: String,
}

impl Default for MapDefinition {
	fn default() -> Self {
		MapDefinition {
			name: String::new(),
			rows: Vec::new(),
			legend: vec![
				('.', TileDefinition::new("Floor", false)),
				('#', TileDefinition::new("Wall", true)),
			],
			spawn_infos: Vec::new(),
			player_actor: "Marine".to_string(),
		}
	}
}

impl MapDefinition {
	/// Create a definition using the default legend where `.` is floor and `#` is wall
	pub fn from_rows(name: &str, rows: &[&str], spawn_infos: Vec<SpawnInfo>) -> Self {
		MapDefinition {
			name: name.to_string(),
			rows: rows.iter().map(|r| r.to_string()).collect(),
			spawn_infos,
			..default()
		}
	}
	/// Build the [TileGrid] described by the rows and legend
	pub fn build_tile_grid(&self) -> Result<TileGrid, DefinitionError> {
		TileGrid::from_rows(&self.rows, &self.legend)
	}
	/// Parse a RON [MapDefinition]
	#[cfg(feature = "ron")]
	pub fn from_ron_str(source: &str) -> Result<Self, DefinitionError> {
		Ok(ron::de::from_str(source)?)
	}
	/// Read and parse a RON [MapDefinition] from disk
	#[cfg(feature = "ron")]
	pub fn from_file(path: &str) -> Result<Self, DefinitionError> {
		let source = std::fs::read_to_string(path)?;
		MapDefinition::from_ron_str(&source)
	}
}

/// Problems found while turning definitions into a map
#[derive(Debug, Error)]
pub enum DefinitionError {
	#[error("tile glyph `{0}` has no entry in the legend")]
	UnknownTileGlyph(char),
	#[error("row {row} has {found} tiles, expected {expected}")]
	RaggedRows {
		/// Index of the row as written, top first
		row: usize,
		/// Width of the first row
		expected: usize,
		/// Width of this row
		found: usize,
	},
	#[error("a map needs at least one tile")]
	EmptyGrid,
	#[cfg(feature = "ron")]
	#[error("failed to read definition file: {0}")]
	Io(#[from] std::io::Error),
	#[cfg(feature = "ron")]
	#[error("failed to parse definition: {0}")]
	Ron(#[from] ron::error::SpannedError),
}

#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn faction_rules() {
		assert!(Faction::Demon.is_opposing(Faction::Marine));
		assert!(!Faction::Demon.is_opposing(Faction::Demon));
		assert!(!Faction::Demon.is_opposing(Faction::Neutral));
		assert!(Faction::Marine.is_opposing(Faction::Demon));
		assert!(!Faction::Marine.is_opposing(Faction::Marine));
		assert!(!Faction::Neutral.is_opposing(Faction::Demon));
		assert!(!Faction::Neutral.is_opposing(Faction::Marine));
	}
	#[test]
	fn stagger_threshold_defaults_high() {
		let def = ActorDefinition::default();
		assert_eq!(1000.0, def.ai.stagger_damage_threshold);
		assert_eq!(1.0, def.health);
	}
	#[test]
	fn later_duplicate_wins() {
		let defs = ActorDefinitions::new(vec![
			ActorDefinition {
				name: "Demon".to_string(),
				health: 10.0,
				..default()
			},
			ActorDefinition {
				name: "Demon".to_string(),
				health: 20.0,
				..default()
			},
		]);
		assert_eq!(1, defs.len());
		assert_eq!(20.0, defs.get("Demon").unwrap().health);
	}
	#[test]
	fn map_definition_builds_grid() {
		let def = MapDefinition::from_rows("test", &["###", "#.#", "###"], vec![]);
		let grid = def.build_tile_grid().unwrap();
		assert_eq!(MapDimensions::new(3, 3), grid.get_dimensions());
		assert!(!grid.is_tile_solid(IVec2::new(1, 1)));
		assert_eq!("Marine", def.player_actor);
	}
	#[cfg(feature = "ron")]
	#[test]
	fn parse_actor_definitions() {
		let source = r#"[
			(
				name: "Demon",
				health: 160.0,
				faction: Demon,
				collision: (radius: 0.35, height: 0.85, collides_with_world: true, collides_with_actors: true),
				ai: (ai_enabled: true, sight_radius: 64.0, sight_angle: 120.0, stagger_seconds: 0.5, stagger_damage_threshold: 30.0),
			),
		]"#;
		let defs = ActorDefinitions::from_ron_str(source).unwrap();
		let demon = defs.get("Demon").unwrap();
		assert_eq!(Faction::Demon, demon.faction);
		assert_eq!(30.0, demon.ai.stagger_damage_threshold);
		assert!(!demon.physics.simulated);
	}
}

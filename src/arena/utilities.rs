//! Useful structures, constants and tools shared across the arena
//!

use bevy::prelude::*;
use rand::Rng;

/// Height of the floor plane, every actor and ray lives above it
pub const FLOOR_Z: f32 = 0.0;
/// Height of the ceiling plane
pub const CEILING_Z: f32 = 1.0;
/// Tolerance used when testing whether a world position lies inside the map volume
pub const BOUNDS_EPSILON: f32 = 0.0001;
/// Furthest distance a player can expose a tile from
pub const SIGHT_RANGE: f32 = 15.0;
/// Exposure value written into every tile a player can see
pub const EXPOSED_VALUE: f32 = 10_000.0;
/// Exposure baseline that the forward heat spread starts from
pub const UNEXPOSED_VALUE: f32 = 0.0;
/// Placeholder for tiles that have not yet been reached by a flood fill, also stamped onto unreachable tiles of the exposure map
pub const FLOOD_SENTINEL: f32 = 999_999.0;
/// Placeholder for concealed tiles before the backward heat spread deepens them
pub const CONCEALED_SENTINEL: f32 = -999_999.0;
/// Reachability map value of a tile that can be walked to from a spawn point
pub const REACHABLE_VALUE: f32 = 0.0;
/// Reachability map value of a tile that can never be walked to
pub const UNREACHABLE_VALUE: f32 = 1.0;
/// Trauma applied to a player when they land a hit on an AI
pub const HIT_TRAUMA: f32 = 1.0;
/// Trauma a player sheds each second
pub const HIT_TRAUMA_DECAY_PER_SECOND: f32 = 1.5;
/// Name of the actor definition used to mark player spawn points
pub const SPAWN_POINT_ACTOR: &str = "SpawnPoint";

/// Convenience way of walking the 8 neighbours of a tile. North points along `+y`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Reflect)]
pub enum Ordinal {
	North,
	East,
	South,
	West,
	NorthEast,
	SouthEast,
	SouthWest,
	NorthWest,
	/// Special case, used to indicate a tile with no direction of travel
	Zero,
}

impl Ordinal {
	/// Orthogonal directions in the order neighbours are inspected
	pub const ORTHOGONAL: [Ordinal; 4] = [
		Ordinal::North,
		Ordinal::South,
		Ordinal::East,
		Ordinal::West,
	];
	/// Diagonal directions in the order neighbours are inspected
	pub const DIAGONAL: [Ordinal; 4] = [
		Ordinal::NorthEast,
		Ordinal::NorthWest,
		Ordinal::SouthWest,
		Ordinal::SouthEast,
	];
	/// All 8 directions, orthogonals first
	pub const ALL: [Ordinal; 8] = [
		Ordinal::North,
		Ordinal::South,
		Ordinal::East,
		Ordinal::West,
		Ordinal::NorthEast,
		Ordinal::NorthWest,
		Ordinal::SouthWest,
		Ordinal::SouthEast,
	];
	/// Tile coordinate step of the direction
	pub fn get_offset(&self) -> IVec2 {
		match self {
			Ordinal::North => IVec2::new(0, 1),
			Ordinal::East => IVec2::new(1, 0),
			Ordinal::South => IVec2::new(0, -1),
			Ordinal::West => IVec2::new(-1, 0),
			Ordinal::NorthEast => IVec2::new(1, 1),
			Ordinal::SouthEast => IVec2::new(1, -1),
			Ordinal::SouthWest => IVec2::new(-1, -1),
			Ordinal::NorthWest => IVec2::new(-1, 1),
			Ordinal::Zero => IVec2::ZERO,
		}
	}
	/// Unit vector of the direction, [Ordinal::Zero] gives [Vec2::ZERO]
	pub fn get_direction(&self) -> Vec2 {
		self.get_offset().as_vec2().normalize_or_zero()
	}
	/// For a diagonal find the two orthogonals either side of it
	pub fn get_flanking(&self) -> Option<(Ordinal, Ordinal)> {
		match self {
			Ordinal::NorthEast => Some((Ordinal::North, Ordinal::East)),
			Ordinal::NorthWest => Some((Ordinal::North, Ordinal::West)),
			Ordinal::SouthWest => Some((Ordinal::South, Ordinal::West)),
			Ordinal::SouthEast => Some((Ordinal::South, Ordinal::East)),
			_ => None,
		}
	}
}

/// Closed interval of floats, used for vertical extents and damage rolls
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct FloatRange {
	/// Lower bound
	pub min: f32,
	/// Upper bound
	pub max: f32,
}

impl FloatRange {
	/// The `[0, 0]` range
	pub const ZERO: FloatRange = FloatRange { min: 0.0, max: 0.0 };
	/// Create a new instance of [FloatRange]
	pub fn new(min: f32, max: f32) -> Self {
		FloatRange { min, max }
	}
	/// A zero range means "no value", e.g. an actor that deals no damage on contact
	pub fn is_zero(&self) -> bool {
		*self == FloatRange::ZERO
	}
	/// Whether the two ranges share at least one value
	pub fn is_overlapping_with(&self, other: &FloatRange) -> bool {
		self.min <= other.max && self.max >= other.min
	}
	/// Uniformly pick a value inside the range
	pub fn roll<R: Rng>(&self, rng: &mut R) -> f32 {
		let (low, high) = if self.min <= self.max {
			(self.min, self.max)
		} else {
			(self.max, self.min)
		};
		rng.random_range(low..=high)
	}
}

/// Wrap an angle in degrees into `(-180, 180]`
pub fn get_shortest_angular_displacement_degrees(start: f32, end: f32) -> f32 {
	let mut displacement = (end - start) % 360.0;
	if displacement > 180.0 {
		displacement -= 360.0;
	} else if displacement <= -180.0 {
		displacement += 360.0;
	}
	displacement
}

/// Rotate `current` towards `goal` by no more than `max_delta` degrees, taking the short way round
pub fn get_turned_toward_degrees(current: f32, goal: f32, max_delta: f32) -> f32 {
	let displacement = get_shortest_angular_displacement_degrees(current, goal);
	if displacement.abs() <= max_delta {
		return goal;
	}
	current + max_delta * displacement.signum()
}

/// Angle in degrees between two vectors, zero length vectors count as aligned
pub fn get_angle_degrees_between(a: Vec2, b: Vec2) -> f32 {
	let lengths = a.length() * b.length();
	if lengths == 0.0 {
		return 0.0;
	}
	(a.dot(b) / lengths).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Is `point` within `radius` of `origin` and no more than half of `aperture_degrees` away from `forward`
pub fn is_point_inside_directed_sector(
	point: Vec2,
	origin: Vec2,
	forward: Vec2,
	aperture_degrees: f32,
	radius: f32,
) -> bool {
	let displacement = point - origin;
	if displacement.length_squared() > radius * radius {
		return false;
	}
	get_angle_degrees_between(forward, displacement) <= aperture_degrees * 0.5
}

/// Unit vector pointing along a yaw measured in degrees from `+x`
pub fn make_from_polar_degrees(yaw_degrees: f32) -> Vec2 {
	Vec2::from_angle(yaw_degrees.to_radians())
}

/// Yaw in degrees of a 2d direction
pub fn get_orientation_degrees(direction: Vec2) -> f32 {
	direction.y.atan2(direction.x).to_degrees()
}

//! Discrete collision resolution, run once per tick after every actor has moved.
//!
//! Actors are vertical cylinders, in the horizontal plane each is a disc. Two passes run in a fixed order:
//!
//! 1. Every unordered pair of live actors which both collide with actors, in slot order. Pairs that share an
//!    owner (sibling projectiles) or where one owns the other are skipped, and the cylinders must overlap
//!    vertically. Simulated actors are movable, the rest are fixed
//! 2. Every live actor which collides with the world is pushed out of the solid tiles around it, then clamped
//!    between floor and ceiling
//!
//! Any push notifies the actors involved through [ArenaMap::on_collide].
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Push two movable discs apart along the line between their centres, each moving by half the overlap.
/// Returns `true` if they overlapped
pub fn push_discs_out_of_each_other(
	center_a: &mut Vec2,
	radius_a: f32,
	center_b: &mut Vec2,
	radius_b: f32,
) -> bool {
	let displacement = *center_b - *center_a;
	let distance = displacement.length();
	let overlap = radius_a + radius_b - distance;
	if overlap <= 0.0 {
		return false;
	}
	let normal = displacement.normalize_or(Vec2::X);
	*center_a -= normal * overlap * 0.5;
	*center_b += normal * overlap * 0.5;
	true
}

/// Push a movable disc out of a fixed one. Returns `true` if they overlapped
pub fn push_disc_out_of_fixed_disc(
	mobile_center: &mut Vec2,
	mobile_radius: f32,
	fixed_center: Vec2,
	fixed_radius: f32,
) -> bool {
	let displacement = *mobile_center - fixed_center;
	let distance = displacement.length();
	let overlap = mobile_radius + fixed_radius - distance;
	if overlap <= 0.0 {
		return false;
	}
	*mobile_center += displacement.normalize_or(Vec2::X) * overlap;
	true
}

/// Push a movable disc out of a fixed axis aligned box. A centre inside the box leaves through the nearest face.
/// Returns `true` if they overlapped
pub fn push_disc_out_of_fixed_aabb(
	mobile_center: &mut Vec2,
	radius: f32,
	mins: Vec2,
	maxs: Vec2,
) -> bool {
	let nearest = mobile_center.clamp(mins, maxs);
	if nearest == *mobile_center {
		let to_west = mobile_center.x - mins.x;
		let to_east = maxs.x - mobile_center.x;
		let to_south = mobile_center.y - mins.y;
		let to_north = maxs.y - mobile_center.y;
		let shortest = to_west.min(to_east).min(to_south).min(to_north);
		if shortest == to_west {
			mobile_center.x = mins.x - radius;
		} else if shortest == to_east {
			mobile_center.x = maxs.x + radius;
		} else if shortest == to_south {
			mobile_center.y = mins.y - radius;
		} else {
			mobile_center.y = maxs.y + radius;
		}
		return true;
	}
	let displacement = *mobile_center - nearest;
	let distance = displacement.length();
	if distance >= radius {
		return false;
	}
	*mobile_center = nearest + displacement / distance * radius;
	true
}

/// Resolve one pair of actors, returns `true` if either was moved
fn push_actors_apart(a: &mut Actor, b: &mut Actor) -> bool {
	if a.is_dead() || b.is_dead() {
		return false;
	}
	if !a.get_definition().collision.collides_with_actors
		|| !b.get_definition().collision.collides_with_actors
	{
		return false;
	}
	// siblings and owner/owned never touch
	if a.get_owner().is_valid() && a.get_owner() == b.get_owner() {
		return false;
	}
	if a.get_owner() == b.get_handle() || b.get_owner() == a.get_handle() {
		return false;
	}
	if !a.get_z_range().is_overlapping_with(&b.get_z_range()) {
		return false;
	}
	let (radius_a, radius_b) = (a.get_radius(), b.get_radius());
	let (position_a, position_b) = (a.get_position(), b.get_position());
	let mut center_a = position_a.truncate();
	let mut center_b = position_b.truncate();
	let is_pushed = match (
		a.get_definition().physics.simulated,
		b.get_definition().physics.simulated,
	) {
		(true, true) => push_discs_out_of_each_other(&mut center_a, radius_a, &mut center_b, radius_b),
		(true, false) => push_disc_out_of_fixed_disc(&mut center_a, radius_a, center_b, radius_b),
		(false, true) => push_disc_out_of_fixed_disc(&mut center_b, radius_b, center_a, radius_a),
		(false, false) => false,
	};
	if is_pushed {
		a.set_position(center_a.extend(position_a.z));
		b.set_position(center_b.extend(position_b.z));
	}
	is_pushed
}

/// Push an actor out of the solid tiles surrounding it and back between floor and ceiling. Returns how many
/// contacts were made
fn push_actor_out_of_world(actor: &mut Actor, tiles: &TileGrid) -> u32 {
	if actor.is_dead() || !actor.get_definition().collision.collides_with_world {
		return 0;
	}
	let mut contacts = 0;
	let radius = actor.get_radius();
	let mut position = actor.get_position();
	let tile = tiles.get_coords_for_world_pos(position.truncate());
	for ordinal in Ordinal::ALL {
		let neighbour = tile + ordinal.get_offset();
		if !tiles.is_tile_solid(neighbour) {
			continue;
		}
		let mins = neighbour.as_vec2();
		let mut center = position.truncate();
		if push_disc_out_of_fixed_aabb(&mut center, radius, mins, mins + Vec2::ONE) {
			position = center.extend(position.z);
			contacts += 1;
		}
	}
	let height = actor.get_definition().collision.height;
	if position.z + height > CEILING_Z {
		position.z -= position.z + height - CEILING_Z;
		contacts += 1;
	}
	if position.z < FLOOR_Z {
		position.z = FLOOR_Z;
		contacts += 1;
	}
	actor.set_position(position);
	contacts
}

impl ArenaMap {
	/// Resolve every overlapping pair of actors, see the module docs
	pub fn collide_actors(&mut self) {
		let slot_count = self.get_registry().get_slot_count();
		for i in 0..slot_count {
			for j in (i + 1)..slot_count {
				let Some((a, b)) = self.get_registry_mut().get_pair_mut(i, j) else {
					continue;
				};
				if !push_actors_apart(a, b) {
					continue;
				}
				let (handle_a, handle_b) = (a.get_handle(), b.get_handle());
				self.on_collide(handle_a, Some(handle_b));
				self.on_collide(handle_b, Some(handle_a));
			}
		}
	}
	/// Keep every actor out of walls and inside the vertical extent of the map
	pub fn collide_actors_with_map(&mut self) {
		for handle in self.get_registry().snapshot_handles() {
			let (tiles, registry) = self.get_tiles_and_registry_mut();
			let Some(actor) = registry.get_mut(handle) else {
				continue;
			};
			let contacts = push_actor_out_of_world(actor, tiles);
			for _ in 0..contacts {
				self.on_collide(handle, None);
			}
		}
	}
}

//! Slot array owning every [Actor] of a map.
//!
//! Freed slots are left empty rather than compacted, the next spawn reuses the first empty slot and otherwise
//! appends. A uid counter shared by every slot is bumped on each spawn so a handle to a swept actor can never
//! resolve to whatever later moves into its slot.
//!

use crate::prelude::*;
use bevy::prelude::*;
use thiserror::Error;

/// Reasons a spawn can be refused
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpawnError {
	#[error("every actor uid has been issued")]
	UidExhausted,
	#[error("every registry slot is occupied")]
	SlotsExhausted,
	#[error("no actor definition named `{0}`")]
	UnknownDefinition(String),
	#[error("the map has no spawn points")]
	NoSpawnPoints,
	#[error("no player with index {0}")]
	UnknownPlayer(usize),
}

/// Owner of all actors, addressed by [ActorHandle]
#[derive(Debug, Clone, Default)]
pub struct ActorRegistry {
	/// Actors by slot index, `None` for a freed slot
	slots: Vec<Option<Actor>>,
	/// Uid given to the next spawn
	current_uid: u32,
}

impl ActorRegistry {
	/// Create a new empty [ActorRegistry]
	pub fn new() -> Self {
		ActorRegistry::default()
	}
	/// Store a new actor built by `build` from the handle it is assigned
	pub fn spawn(
		&mut self,
		build: impl FnOnce(ActorHandle) -> Actor,
	) -> Result<ActorHandle, SpawnError> {
		if self.current_uid >= ActorHandle::MAX_ACTOR_UID {
			return Err(SpawnError::UidExhausted);
		}
		let index = match self.slots.iter().position(|s| s.is_none()) {
			Some(free) => free,
			None => {
				if self.slots.len() >= ActorHandle::MAX_ACTOR_INDEX as usize {
					return Err(SpawnError::SlotsExhausted);
				}
				self.slots.push(None);
				self.slots.len() - 1
			}
		};
		let handle = ActorHandle::new(self.current_uid, index as u32);
		self.slots[index] = Some(build(handle));
		self.current_uid += 1;
		Ok(handle)
	}
	/// Resolve a handle, `None` for the sentinel, an empty slot or a stale handle
	pub fn get(&self, handle: ActorHandle) -> Option<&Actor> {
		if !handle.is_valid() {
			return None;
		}
		self.slots
			.get(handle.get_index())
			.and_then(|s| s.as_ref())
			.filter(|a| a.get_handle() == handle)
	}
	/// Resolve a handle for mutation
	pub fn get_mut(&mut self, handle: ActorHandle) -> Option<&mut Actor> {
		if !handle.is_valid() {
			return None;
		}
		self.slots
			.get_mut(handle.get_index())
			.and_then(|s| s.as_mut())
			.filter(|a| a.get_handle() == handle)
	}
	/// Actor stored in a slot
	pub fn get_slot(&self, index: usize) -> Option<&Actor> {
		self.slots.get(index).and_then(|s| s.as_ref())
	}
	/// Mutable access to two distinct slots at once, `None` unless both are occupied
	pub fn get_pair_mut(&mut self, a: usize, b: usize) -> Option<(&mut Actor, &mut Actor)> {
		if a == b || a >= self.slots.len() || b >= self.slots.len() {
			return None;
		}
		let (low, high) = if a < b { (a, b) } else { (b, a) };
		let (head, tail) = self.slots.split_at_mut(high);
		let first = head[low].as_mut()?;
		let second = tail[0].as_mut()?;
		if a < b {
			Some((first, second))
		} else {
			Some((second, first))
		}
	}
	/// Number of slots, occupied or not
	pub fn get_slot_count(&self) -> usize {
		self.slots.len()
	}
	/// Number of occupied slots
	pub fn get_actor_count(&self) -> usize {
		self.slots.iter().filter(|s| s.is_some()).count()
	}
	/// Uid the next spawn will be given
	pub fn get_current_uid(&self) -> u32 {
		self.current_uid
	}
	/// Every occupied slot in index order
	pub fn iter(&self) -> impl Iterator<Item = &Actor> {
		self.slots.iter().filter_map(|s| s.as_ref())
	}
	/// Copy of the handles of every stored actor, safe to walk while actors are spawned
	pub fn snapshot_handles(&self) -> Vec<ActorHandle> {
		self.iter().map(|a| a.get_handle()).collect()
	}
	/// Free the slot of every actor flagged as garbage, returns how many were removed
	pub fn delete_garbage(&mut self) -> usize {
		let mut removed = 0;
		for slot in self.slots.iter_mut() {
			if slot.as_ref().map(|a| a.is_garbage()).unwrap_or(false) {
				*slot = None;
				removed += 1;
			}
		}
		if removed > 0 {
			debug!("Swept {} actors", removed);
		}
		removed
	}
}

//! A generational reference to an [crate::prelude::Actor].
//!
//! The handle packs the unique id the actor was spawned with into the high 16 bits and the registry slot it
//! lives in into the low 16 bits:
//!
//! ```text
//!  31            16 15             0
//! |  uid           |  slot index    |
//! ```
//!
//! A slot can be reused once its actor has been swept, but because every spawn draws a fresh uid the old handle
//! will no longer match what is stored in the slot and resolving it yields nothing.
//!

use bevy::prelude::*;

/// Generational reference to an actor stored in an [crate::prelude::ActorRegistry]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Reflect)]
pub struct ActorHandle(u32);

impl Default for ActorHandle {
	fn default() -> Self {
		ActorHandle::INVALID
	}
}

impl ActorHandle {
	/// Sentinel referring to no actor
	pub const INVALID: ActorHandle = ActorHandle(0xFFFF_FFFF);
	/// Uids at or beyond this cannot be issued
	pub const MAX_ACTOR_UID: u32 = 0x0000_FFFE;
	/// Largest number of slots a registry can hold
	pub const MAX_ACTOR_INDEX: u32 = 0x0000_FFFF;
	/// Create a new instance of [ActorHandle]
	pub fn new(uid: u32, index: u32) -> Self {
		ActorHandle(((uid & 0xFFFF) << 16) | (index & 0xFFFF))
	}
	/// Anything but the sentinel. Note a valid handle may still be stale
	pub fn is_valid(&self) -> bool {
		*self != ActorHandle::INVALID
	}
	/// Registry slot the actor lives in
	pub fn get_index(&self) -> usize {
		(self.0 & 0xFFFF) as usize
	}
	/// Unique id the actor was spawned with
	pub fn get_uid(&self) -> u32 {
		self.0 >> 16
	}
	/// Packed representation
	pub fn get_raw(&self) -> u32 {
		self.0
	}
}

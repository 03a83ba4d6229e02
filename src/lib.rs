//! This is a plugin for Bevy game engine which runs a tile arena simulation: actors addressed by generational
//! handles, voxel raycasts, disc collision and AI that flees along an exposure driven flow field
//!

pub mod arena;
pub mod plugin;

pub mod prelude;

//! The arena is the spatial simulation core: a tile grid of walls and floor, populated by actors that move,
//! collide, shoot and think.
//!
//! [Generational indices](https://lucassardois.medium.com/generational-indices-guide-8e3c5f7fd594)
//!
//! [A Fast Voxel Traversal Algorithm for Ray Tracing](http://www.cse.yorku.ca/~amana/research/grid.pdf)
//!
//! World space is measured in tiles. Tile `(x, y)` covers `[x, x+1) x [y, y+1)` so the origin is the
//! bottom-left corner of the map, `+y` points north and the playable volume spans the floor at `z = 0` to the
//! ceiling at `z = 1`.
//!
//! Each tick of the [map::ArenaMap] runs the same fixed sequence:
//!
//! ```text
//!  _________     ______________     _____________     _______________     _______________     _______________     __________
//! |         |   |              |   |             |   |               |   |               |   |               |   |          |
//! | players |-->| update actors|-->| collide     |-->| collide actors|-->| delete        |-->| respawn       |-->| nav grids|
//! | trauma  |   | ai + physics |   | actor pairs |   | with the map  |   | garbage       |   | players       |   |          |
//! |_________|   |______________|   |_____________|   |_______________|   |_______________|   |_______________|   |__________|
//! ```
//!
//! Actors are only ever removed at the sweep, so a handle taken anywhere earlier in the tick still resolves to
//! the same actor or to nothing at all.
//!
//! Definitions:
//!
//! * Handle - a `(uid, slot)` pair addressing an actor, stale once that actor is swept
//! * Reachability map - tiles a player could walk to from the spawn points
//! * Exposure map - per tile visibility to the players, positive in sight and negative out of it
//! * Flow field - per tile direction of steepest descent of the exposure, followed by fleeing AI
//!

pub mod actors;
pub mod collision;
pub mod definitions;
pub mod fields;
pub mod map;
pub mod raycast;
pub mod tiles;
pub mod utilities;

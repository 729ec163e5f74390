//! Geometry packets for sensor fields of view, lattice grids and borders.
//!
//! Every generator validates its inputs up front, resolves per-entity
//! decoration once, and returns packets in a stable order: per entity, then
//! per boundary kind, then per arc.
mod border;
mod broadcast;
mod decoration;
mod error;
mod fov;
mod grid;
mod id;
mod packet;
mod point;
mod registry;

pub use border::*;
pub use broadcast::*;
pub use decoration::*;
pub use error::*;
pub use fov::*;
pub use grid::*;
pub use id::*;
pub use packet::*;
pub use point::*;
pub use registry::*;

//! Subcommand implementations

pub mod collide;
pub mod tile;
pub mod walk;

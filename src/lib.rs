//! Starsystem - Orbital Mechanics Simulation Engine
//!
//! A library crate providing the physics models, the simulation driver and
//! the Bevy plugins that host them.

pub mod bodies;
pub mod camera;
pub mod orbital;
pub mod physics;
pub mod render;
pub mod scenarios;
pub mod simulation;
pub mod types;

#[cfg(test)]
pub mod test_utils;

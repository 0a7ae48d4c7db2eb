//! Always-on pairwise Newtonian gravity for free bodies.
//!
//! Independent of the stepping driver: every fixed tick each free body feels
//! `F = G·mA·mB / d²` from every other free body, then integrates with the
//! fixed timestep.

use bevy::math::DVec3;
use bevy::prelude::*;

/// Which engine moves bodies at runtime.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GravityMode {
    /// Bodies move only while the simulation driver is running.
    #[default]
    Driver,
    /// Bodies with [`FreeBody`] attract each other every fixed tick.
    Continuous,
}

/// A body driven by continuous force accumulation rather than the driver.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct FreeBody {
    pub position: DVec3,
    pub velocity: DVec3,
    pub mass: f64,
}

impl FreeBody {
    pub fn new(position: DVec3, velocity: DVec3, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
        }
    }
}

/// Apply one tick of pairwise gravity to `bodies`.
///
/// All forces are computed from the positions at the start of the tick, then
/// velocities (`v += F/m · dt`) and positions (`x += v · dt`) are updated.
/// Coincident pairs and bodies with non-positive mass are skipped.
pub fn accumulate_forces(bodies: &mut [FreeBody], gravitational_constant: f64, dt: f64) {
    let forces: Vec<DVec3> = bodies
        .iter()
        .enumerate()
        .map(|(i, a)| {
            bodies
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, b)| pair_force(a, b, gravitational_constant))
                .sum()
        })
        .collect();

    for (body, force) in bodies.iter_mut().zip(forces) {
        if body.mass > 0.0 {
            body.velocity += force / body.mass * dt;
        }
        body.position += body.velocity * dt;
    }
}

/// Force on `a` due to `b`.
fn pair_force(a: &FreeBody, b: &FreeBody, gravitational_constant: f64) -> DVec3 {
    let delta = b.position - a.position;
    let dist_sq = delta.length_squared();
    if dist_sq == 0.0 || a.mass <= 0.0 || b.mass <= 0.0 {
        return DVec3::ZERO;
    }
    delta.normalize() * (gravitational_constant * a.mass * b.mass / dist_sq)
}

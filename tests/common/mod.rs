//! Common test utilities for integration tests.

#![allow(dead_code)]

use bevy::math::DVec3;
use starsystem::physics::PhysicsConfig;
use starsystem::simulation::DriverConfig;
use starsystem::types::{BodyId, BodyRecord, VirtualBody};

/// Physics constants with G = 1, so a central mass equals its gravitational parameter.
pub fn unit_physics() -> PhysicsConfig {
    PhysicsConfig {
        gravitational_constant: 1.0,
        ..PhysicsConfig::default()
    }
}

/// Driver configuration with G = 1 and the given raw step.
pub fn unit_driver(time_step: f64) -> DriverConfig {
    DriverConfig {
        physics: unit_physics(),
        time_step,
        ..DriverConfig::default()
    }
}

/// Circular orbit state at `radius` around a central mass at the origin.
pub fn circular_orbit(g: f64, central_mass: f64, radius: f64) -> (DVec3, DVec3) {
    let v = (g * central_mass / radius).sqrt();
    (DVec3::new(radius, 0.0, 0.0), DVec3::new(0.0, v, 0.0))
}

/// Elliptical orbit state at periapsis around a central mass at the origin.
pub fn elliptical_orbit(g: f64, central_mass: f64, periapsis: f64, eccentricity: f64) -> (DVec3, DVec3) {
    let a = periapsis / (1.0 - eccentricity);
    let v = (g * central_mass * (2.0 / periapsis - 1.0 / a)).sqrt();
    (DVec3::new(periapsis, 0.0, 0.0), DVec3::new(0.0, v, 0.0))
}

/// Orbital period for the given semi-major axis.
pub fn orbital_period(g: f64, central_mass: f64, semi_major_axis: f64) -> f64 {
    use std::f64::consts::TAU;
    TAU * (semi_major_axis.powi(3) / (g * central_mass)).sqrt()
}

/// Specific orbital energy relative to the central body.
pub fn orbital_energy(mu: f64, pos: DVec3, vel: DVec3) -> f64 {
    0.5 * vel.length_squared() - mu / pos.length()
}

/// A stationary central body followed by one orbiting body.
pub fn central_pair(central_mass: f64, orbiter_mass: f64, state: (DVec3, DVec3)) -> Vec<VirtualBody> {
    vec![
        VirtualBody::new(BodyId(0), DVec3::ZERO, DVec3::ZERO, central_mass),
        VirtualBody::new(BodyId(1), state.0, state.1, orbiter_mass),
    ]
}

/// Host-side records for a body array.
pub fn records(bodies: &[VirtualBody]) -> Vec<BodyRecord> {
    bodies
        .iter()
        .map(|b| BodyRecord::new(b.position, b.velocity, b.mass()))
        .collect()
}

/// Render positions currently committed to `records`.
pub fn rendered(records: &[BodyRecord]) -> Vec<DVec3> {
    records.iter().map(|r| r.render_position).collect()
}

//! Helpers for placing bodies on orbits when building a system.
//!
//! All functions take the gravitational constant explicitly and use
//! `mu = G * central_mass`. The reference plane is x-y with +z as the
//! orbit normal for zero inclination; inclination tilts the orbit about +x.

use std::f64::consts::TAU;

use bevy::math::{DQuat, DVec3};

use crate::types::DEG_TO_RAD;

/// Rejected orbit setup inputs.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OrbitSetupError {
    #[error("orbit radius must be positive (got {0})")]
    NonPositiveRadius(f64),

    #[error("semi-major axis must be positive (got {0})")]
    NonPositiveSemiMajorAxis(f64),

    #[error("gravitational parameter G * M must be positive (got {0})")]
    NonPositiveGravitationalParameter(f64),

    #[error("eccentricity must be in [0, 1) (got {0})")]
    InvalidEccentricity(f64),
}

/// Classical elements for placing a body, angles in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeplerianSpec {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub ascending_node_deg: f64,
    pub argument_of_periapsis_deg: f64,
    pub true_anomaly_deg: f64,
}

impl KeplerianSpec {
    /// Coplanar orbit starting at periapsis.
    pub fn planar(semi_major_axis: f64, eccentricity: f64) -> Self {
        Self {
            semi_major_axis,
            eccentricity,
            inclination_deg: 0.0,
            ascending_node_deg: 0.0,
            argument_of_periapsis_deg: 0.0,
            true_anomaly_deg: 0.0,
        }
    }
}

fn gravitational_parameter(g: f64, central_mass: f64) -> Result<f64, OrbitSetupError> {
    let mu = g * central_mass;
    if !(mu > 0.0 && mu.is_finite()) {
        return Err(OrbitSetupError::NonPositiveGravitationalParameter(mu));
    }
    Ok(mu)
}

/// Speed of a circular orbit: `v = sqrt(G M / r)`.
pub fn circular_orbit_velocity(g: f64, central_mass: f64, radius: f64) -> Result<f64, OrbitSetupError> {
    if !(radius > 0.0) {
        return Err(OrbitSetupError::NonPositiveRadius(radius));
    }
    let mu = gravitational_parameter(g, central_mass)?;
    Ok((mu / radius).sqrt())
}

/// Position and velocity on a circular orbit.
///
/// `start_angle_deg` is measured from +x in the orbit plane; motion is
/// counter-clockwise seen from the orbit normal.
pub fn circular_orbit_state(
    g: f64,
    central_position: DVec3,
    central_mass: f64,
    radius: f64,
    inclination_deg: f64,
    start_angle_deg: f64,
) -> Result<(DVec3, DVec3), OrbitSetupError> {
    let speed = circular_orbit_velocity(g, central_mass, radius)?;

    let tilt = DQuat::from_rotation_x(inclination_deg * DEG_TO_RAD);
    let (sin_t, cos_t) = (start_angle_deg * DEG_TO_RAD).sin_cos();

    let position = tilt * DVec3::new(cos_t, sin_t, 0.0) * radius;
    let velocity = tilt * DVec3::new(-sin_t, cos_t, 0.0) * speed;

    Ok((central_position + position, velocity))
}

/// Kepler's third law: `T = 2π sqrt(a³ / (G M))`.
pub fn orbital_period(g: f64, central_mass: f64, semi_major_axis: f64) -> Result<f64, OrbitSetupError> {
    if !(semi_major_axis > 0.0) {
        return Err(OrbitSetupError::NonPositiveSemiMajorAxis(semi_major_axis));
    }
    let mu = gravitational_parameter(g, central_mass)?;
    Ok(TAU * (semi_major_axis.powi(3) / mu).sqrt())
}

/// Position and velocity of a body on an elliptical orbit.
///
/// Built in the perifocal frame and rotated by `Rz(Ω) · Rx(i) · Rz(ω)`.
pub fn elliptical_orbit_state(
    g: f64,
    central_position: DVec3,
    central_mass: f64,
    orbit: KeplerianSpec,
) -> Result<(DVec3, DVec3), OrbitSetupError> {
    let a = orbit.semi_major_axis;
    let e = orbit.eccentricity;
    if !(a > 0.0) {
        return Err(OrbitSetupError::NonPositiveSemiMajorAxis(a));
    }
    if !(0.0..1.0).contains(&e) {
        return Err(OrbitSetupError::InvalidEccentricity(e));
    }
    let mu = gravitational_parameter(g, central_mass)?;

    let nu = orbit.true_anomaly_deg * DEG_TO_RAD;
    let (sin_nu, cos_nu) = nu.sin_cos();

    // Semi-latus rectum p = a(1 - e²), r = p / (1 + e cos ν)
    let p = a * (1.0 - e * e);
    let r = p / (1.0 + e * cos_nu);

    let position = DVec3::new(r * cos_nu, r * sin_nu, 0.0);
    let velocity = DVec3::new(-sin_nu, e + cos_nu, 0.0) * (mu / p).sqrt();

    let rotation = DQuat::from_rotation_z(orbit.ascending_node_deg * DEG_TO_RAD)
        * DQuat::from_rotation_x(orbit.inclination_deg * DEG_TO_RAD)
        * DQuat::from_rotation_z(orbit.argument_of_periapsis_deg * DEG_TO_RAD);

    Ok((central_position + rotation * position, rotation * velocity))
}

/// A comfortable orbit distance for a new body.
///
/// Three times the combined radii, scaled up by `sqrt(M / 10)` around stars.
pub fn recommend_orbit_distance(
    central_radius: f64,
    body_radius: f64,
    central_mass: f64,
    central_is_star: bool,
) -> f64 {
    let min_distance = (central_radius + body_radius) * 3.0;
    if central_is_star {
        min_distance * (central_mass.max(0.0) / 10.0).sqrt()
    } else {
        min_distance
    }
}

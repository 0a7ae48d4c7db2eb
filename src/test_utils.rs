//! Test utilities for the star system simulation.
//!
//! Provides fixtures for building body arrays in known orbits and assertions
//! for verifying physical invariants like energy conservation. Fixtures use
//! G = 1 unless a constant is passed explicitly, so a central mass equals its
//! gravitational parameter.

use std::f64::consts::TAU;

use bevy::math::DVec3;

use crate::types::{BodyId, BodyRecord, VirtualBody};

/// Fixtures for creating test body arrays.
pub mod fixtures {
    use super::*;

    /// Central body plus one body on a circular orbit with the given period.
    ///
    /// The orbiting body starts on +x moving towards +y. G = 1.
    pub fn circular_pair(radius: f64, period: f64) -> Vec<VirtualBody> {
        // T = 2π √(r³/mu)  =>  mu = 4π² r³ / T²
        let mu = TAU * TAU * radius.powi(3) / (period * period);
        let speed = (mu / radius).sqrt();
        vec![
            VirtualBody::new(BodyId(0), DVec3::ZERO, DVec3::ZERO, mu),
            VirtualBody::new(
                BodyId(1),
                DVec3::new(radius, 0.0, 0.0),
                DVec3::new(0.0, speed, 0.0),
                1.0,
            ),
        ]
    }

    /// Central body plus one body at periapsis of an ellipse. G = 1.
    pub fn elliptical_pair(periapsis: f64, eccentricity: f64, central_mass: f64) -> Vec<VirtualBody> {
        assert!(
            (0.0..1.0).contains(&eccentricity),
            "Eccentricity must be in [0, 1) for elliptical orbit"
        );
        let a = periapsis / (1.0 - eccentricity);
        // Vis-viva at periapsis: v = sqrt(mu * (2/r - 1/a))
        let speed = (central_mass * (2.0 / periapsis - 1.0 / a)).sqrt();
        vec![
            VirtualBody::new(BodyId(0), DVec3::ZERO, DVec3::ZERO, central_mass),
            VirtualBody::new(
                BodyId(1),
                DVec3::new(periapsis, 0.0, 0.0),
                DVec3::new(0.0, speed, 0.0),
                1.0,
            ),
        ]
    }

    /// Two bodies on circular orbits about their common barycentre at the
    /// origin, with zero total momentum.
    pub fn barycentric_binary(
        primary_mass: f64,
        secondary_mass: f64,
        separation: f64,
        gravitational_constant: f64,
    ) -> Vec<VirtualBody> {
        let total = primary_mass + secondary_mass;
        let relative_speed = (gravitational_constant * total / separation).sqrt();
        let f1 = secondary_mass / total;
        let f2 = primary_mass / total;
        vec![
            VirtualBody::new(
                BodyId(0),
                DVec3::new(-f1 * separation, 0.0, 0.0),
                DVec3::new(0.0, -f1 * relative_speed, 0.0),
                primary_mass,
            ),
            VirtualBody::new(
                BodyId(1),
                DVec3::new(f2 * separation, 0.0, 0.0),
                DVec3::new(0.0, f2 * relative_speed, 0.0),
                secondary_mass,
            ),
        ]
    }

    /// Relative state on +x with the given speed, flight-path angle (radians
    /// away from the local horizontal) and orbit inclination about +x.
    pub fn inclined_state(radius: f64, speed: f64, flight_angle: f64, inclination: f64) -> (DVec3, DVec3) {
        let radial = DVec3::X;
        let tangential = DVec3::new(0.0, inclination.cos(), inclination.sin());
        let direction = radial * flight_angle.sin() + tangential * flight_angle.cos();
        (radial * radius, direction * speed)
    }

    /// External records matching a body array, for driver tests.
    pub fn records(bodies: &[VirtualBody]) -> Vec<BodyRecord> {
        bodies
            .iter()
            .map(|b| BodyRecord::new(b.position, b.velocity, b.mass()))
            .collect()
    }
}

/// Assertions for verifying physical invariants.
pub mod assertions {
    use super::*;

    /// Specific orbital energy ε = v²/2 - mu/r relative to a fixed centre.
    pub fn specific_energy(rel_pos: DVec3, rel_vel: DVec3, mu: f64) -> f64 {
        0.5 * rel_vel.length_squared() - mu / rel_pos.length()
    }

    /// Assert that energy is conserved within a relative tolerance.
    ///
    /// # Panics
    /// Panics if relative energy drift exceeds tolerance.
    pub fn assert_energy_conserved(initial_energy: f64, final_energy: f64, tolerance: f64) {
        let drift = if initial_energy.abs() > 1e-10 {
            ((final_energy - initial_energy) / initial_energy).abs()
        } else {
            (final_energy - initial_energy).abs()
        };
        assert!(
            drift <= tolerance,
            "Energy not conserved: initial={initial_energy:.6e}, final={final_energy:.6e}, drift={drift:.6e}, tolerance={tolerance:.6e}"
        );
    }

    /// Assert two positions agree to within `tolerance` world units.
    ///
    /// # Panics
    /// Panics with both positions if they differ by more.
    pub fn assert_position_near(actual: DVec3, expected: DVec3, tolerance: f64) {
        let error = (actual - expected).length();
        assert!(
            error <= tolerance,
            "Position mismatch: actual={actual:?}, expected={expected:?}, error={error:.6e}, tolerance={tolerance:.6e}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_circular_pair_has_requested_period() {
        let bodies = fixtures::circular_pair(10.0, 100.0);
        let mu = bodies[0].mass();
        let period = TAU * (10.0f64.powi(3) / mu).sqrt();
        assert_relative_eq!(period, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_elliptical_pair_is_bound() {
        let bodies = fixtures::elliptical_pair(5.0, 0.6, 100.0);
        let energy = assertions::specific_energy(bodies[1].position, bodies[1].velocity, 100.0);
        assert!(energy < 0.0, "Elliptical orbit should have negative energy");
    }

    #[test]
    fn test_binary_has_zero_momentum() {
        let bodies = fixtures::barycentric_binary(30.0, 3.0, 12.0, 2.0);
        let momentum: DVec3 = bodies.iter().map(|b| b.velocity * b.mass()).sum();
        let centre: DVec3 = bodies.iter().map(|b| b.position * b.mass()).sum();
        assert!(momentum.length() < 1e-12);
        assert!(centre.length() < 1e-12);
    }

    #[test]
    fn test_inclined_state_speed_and_radius() {
        let (pos, vel) = fixtures::inclined_state(7.0, 3.0, 0.4, 1.1);
        assert_relative_eq!(pos.length(), 7.0, epsilon = 1e-12);
        assert_relative_eq!(vel.length(), 3.0, epsilon = 1e-12);
    }
}

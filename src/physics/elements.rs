//! Keplerian orbital elements derived from a relative state vector.

use std::f64::consts::TAU;

use bevy::math::DVec3;

use super::kepler::{
    eccentric_to_mean_anomaly, eccentric_to_true_anomaly, solve_eccentric_anomaly,
    true_to_eccentric_anomaly,
};

/// Below this eccentricity the periapsis direction is numerically meaningless
/// and the current radius vector is used instead.
const CIRCULAR_EPSILON: f64 = 1e-9;

/// How the propagators treat trajectories they cannot represent exactly.
///
/// The engine only propagates bound (elliptical) orbits. Parabolic and
/// hyperbolic trajectories are replaced by an elliptical approximation rather
/// than rejected; this is a deliberate simplification for an editor, not a
/// physically exact treatment.
#[derive(Clone, Debug, PartialEq)]
pub struct DegenerateOrbitPolicy {
    /// Eccentricities above this are clamped. Default: 0.999.
    pub max_eccentricity: f64,
    /// Eccentricity substituted for unbound trajectories. Default: 0.9.
    pub fallback_eccentricity: f64,
    /// Minimum distance from the central body. Default: 1e-6.
    pub min_radius: f64,
    /// |specific energy| below this is treated as parabolic. Default: 1e-10.
    pub parabolic_energy_threshold: f64,
}

impl Default for DegenerateOrbitPolicy {
    fn default() -> Self {
        Self {
            max_eccentricity: 0.999,
            fallback_eccentricity: 0.9,
            min_radius: 1e-6,
            parabolic_energy_threshold: 1e-10,
        }
    }
}

/// Classification of the trajectory the elements were derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitRegime {
    /// Bound orbit represented exactly.
    Elliptical,
    /// Bound orbit whose eccentricity exceeded the policy maximum.
    EccentricityClamped,
    /// Near-zero specific energy, replaced by the fallback ellipse.
    Parabolic,
    /// Positive specific energy, replaced by the fallback ellipse.
    Hyperbolic,
}

/// Orbital elements of one body around a fixed central body.
/// Angles in radians, distances in world units, times in simulation time.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitalElements {
    /// Closest distance to the central body
    pub periapsis: f64,
    /// Farthest distance from the central body
    pub apoapsis: f64,
    /// Eccentricity (dimensionless, 0 ≤ e < 1)
    pub eccentricity: f64,
    /// Semi-major axis
    pub semi_major_axis: f64,
    /// Orbital period
    pub period: f64,
    /// Simulation time at which the elements were computed
    pub epoch: f64,
    /// Gravitational parameter of the central body (G * M)
    pub mu: f64,
    /// Mean anomaly at epoch in radians
    pub mean_anomaly_at_epoch: f64,
    /// Unit vector from the central body towards periapsis
    pub periapsis_direction: DVec3,
    /// Unit orbit normal (direction of the angular momentum)
    pub normal: DVec3,
    /// Trajectory classification before any clamping
    pub regime: OrbitRegime,
    /// True if the input radius was below the policy minimum
    pub radius_clamped: bool,
}

impl OrbitalElements {
    /// Derive elements from a state relative to the central body.
    ///
    /// # Arguments
    /// * `rel_pos` - Position relative to the central body
    /// * `rel_vel` - Velocity relative to the central body
    /// * `mu` - Gravitational parameter G * M of the central body (must be > 0)
    /// * `epoch` - Simulation time the state refers to
    /// * `policy` - Treatment of unbound and degenerate trajectories
    pub fn from_state(
        rel_pos: DVec3,
        rel_vel: DVec3,
        mu: f64,
        epoch: f64,
        policy: &DegenerateOrbitPolicy,
    ) -> Self {
        let mut r = rel_pos;
        let mut r_mag = r.length();
        let radius_clamped = !(r_mag >= policy.min_radius);
        if radius_clamped {
            r = DVec3::X * policy.min_radius;
            r_mag = policy.min_radius;
        }
        let r_hat = r / r_mag;
        let v = rel_vel;

        // Specific angular momentum h = r × v
        let h = r.cross(v);
        let h_mag = h.length();
        let normal = if h_mag > f64::EPSILON * r_mag * v.length() && h_mag > 0.0 {
            h / h_mag
        } else {
            // Radial trajectory: any plane containing r will do
            r_hat.any_orthonormal_vector()
        };

        // Eccentricity vector e = (v × h)/mu - r̂
        let e_vec = v.cross(h) / mu - r_hat;
        let e_raw = e_vec.length();

        // Specific orbital energy ε = v²/2 - mu/r
        let energy = 0.5 * v.length_squared() - mu / r_mag;

        let regime = if energy.abs() < policy.parabolic_energy_threshold {
            OrbitRegime::Parabolic
        } else if energy > 0.0 {
            OrbitRegime::Hyperbolic
        } else if e_raw > policy.max_eccentricity {
            OrbitRegime::EccentricityClamped
        } else {
            OrbitRegime::Elliptical
        };

        let (eccentricity, semi_major_axis, periapsis_direction, true_anomaly) = match regime {
            OrbitRegime::Parabolic | OrbitRegime::Hyperbolic => {
                // Replace with an ellipse whose periapsis is the current point,
                // keeping the plane and sense of motion.
                let e = policy.fallback_eccentricity;
                (e, r_mag / (1.0 - e), r_hat, 0.0)
            }
            OrbitRegime::Elliptical | OrbitRegime::EccentricityClamped => {
                let e = e_raw.min(policy.max_eccentricity);
                let a = -mu / (2.0 * energy);
                let p_hat = if e_raw > CIRCULAR_EPSILON {
                    // Project into the orbit plane to remove round-off
                    (e_vec - normal * e_vec.dot(normal)).normalize_or(r_hat)
                } else {
                    r_hat
                };
                let q_hat = normal.cross(p_hat);
                let nu = r_hat.dot(q_hat).atan2(r_hat.dot(p_hat));
                (e, a, p_hat, nu)
            }
        };

        let eccentric_anomaly = true_to_eccentric_anomaly(true_anomaly, eccentricity);
        let mean_anomaly_at_epoch =
            eccentric_to_mean_anomaly(eccentric_anomaly, eccentricity).rem_euclid(TAU);

        // Kepler's third law: T = 2π √(a³/mu)
        let period = TAU * (semi_major_axis.powi(3) / mu).sqrt();

        Self {
            periapsis: semi_major_axis * (1.0 - eccentricity),
            apoapsis: semi_major_axis * (1.0 + eccentricity),
            eccentricity,
            semi_major_axis,
            period,
            epoch,
            mu,
            mean_anomaly_at_epoch,
            periapsis_direction,
            normal,
            regime,
            radius_clamped,
        }
    }

    /// True when the elements approximate rather than represent the input state.
    pub fn is_degenerate(&self) -> bool {
        self.regime != OrbitRegime::Elliptical || self.radius_clamped
    }

    /// Mean motion in radians per time unit.
    pub fn mean_motion(&self) -> f64 {
        TAU / self.period
    }

    /// Mean anomaly M = M0 + n·(t - epoch) at the given simulation time.
    pub fn mean_anomaly_at(&self, time: f64) -> f64 {
        self.mean_anomaly_at_epoch + self.mean_motion() * (time - self.epoch)
    }

    /// Position and velocity relative to the central body at `time`.
    pub fn state_at(&self, time: f64) -> (DVec3, DVec3) {
        let e = self.eccentricity;
        let a = self.semi_major_axis;

        let eccentric_anomaly = solve_eccentric_anomaly(self.mean_anomaly_at(time), e);
        let true_anomaly = eccentric_to_true_anomaly(eccentric_anomaly, e);
        let radius = a * (1.0 - e * eccentric_anomaly.cos());

        // Perifocal frame: x̂ towards periapsis, ŷ = n̂ × x̂
        let x_axis = self.periapsis_direction;
        let y_axis = self.normal.cross(x_axis);

        let (sin_nu, cos_nu) = true_anomaly.sin_cos();
        let position = radius * (cos_nu * x_axis + sin_nu * y_axis);

        // v = √(mu/p) · (-sin ν x̂ + (e + cos ν) ŷ), p = a(1 - e²)
        let semi_latus_rectum = a * (1.0 - e * e);
        let speed = (self.mu / semi_latus_rectum).sqrt();
        let velocity = speed * (-sin_nu * x_axis + (e + cos_nu) * y_axis);

        (position, velocity)
    }
}

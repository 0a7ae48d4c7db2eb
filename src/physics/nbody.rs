//! Pairwise N-body gravity with semi-implicit Euler integration.

use bevy::math::DVec3;

use super::PhysicsModel;
use crate::types::VirtualBody;

/// Default softening ε added to squared separations.
pub const DEFAULT_SOFTENING: f64 = 1e-3;

/// Pairwise N-body integrator.
///
/// Every body attracts every other body. Accelerations are computed from the
/// pre-step positions of all bodies, then velocities and positions are updated
/// with semi-implicit (symplectic) Euler:
///
/// ```text
/// v += a * dt
/// x += v * dt
/// ```
///
/// Cost is O(n²) per step. Symplectic Euler conserves angular momentum exactly
/// for pairwise central forces, while the total energy oscillates around its
/// initial value and slowly drifts over long runs; smaller `dt` reduces both.
#[derive(Clone, Debug)]
pub struct NBodyIntegrator {
    gravitational_constant: f64,
    softening: f64,
    /// Scratch buffer reused between steps.
    accelerations: Vec<DVec3>,
}

impl NBodyIntegrator {
    pub fn new(gravitational_constant: f64, softening: f64) -> Self {
        Self {
            gravitational_constant,
            softening,
            accelerations: Vec::new(),
        }
    }
}

impl PhysicsModel for NBodyIntegrator {
    fn name(&self) -> &'static str {
        "N-Body"
    }

    fn initialize(&mut self, _bodies: &[VirtualBody]) {
        // State is self-contained in the bodies
    }

    fn advance(&mut self, bodies: &mut [VirtualBody], dt: f64) {
        compute_accelerations(
            bodies,
            self.gravitational_constant,
            self.softening,
            &mut self.accelerations,
        );

        for (body, acc) in bodies.iter_mut().zip(&self.accelerations) {
            body.velocity += *acc * dt;
            body.position += body.velocity * dt;
        }
    }
}

/// Compute the gravitational acceleration of every body due to all others.
///
/// `a_i = Σ_{j≠i} G m_j normalize(r_j - r_i) / (|r_j - r_i|² + ε)`
///
/// Coincident bodies contribute nothing (the direction is undefined) and the
/// softening keeps nearby pairs from producing unbounded accelerations.
pub fn compute_accelerations(
    bodies: &[VirtualBody],
    gravitational_constant: f64,
    softening: f64,
    out: &mut Vec<DVec3>,
) {
    out.clear();
    out.resize(bodies.len(), DVec3::ZERO);

    for (i, body) in bodies.iter().enumerate() {
        let mut acc = DVec3::ZERO;
        for (j, other) in bodies.iter().enumerate() {
            if i == j {
                continue;
            }
            let delta = other.position - body.position;
            let dist_sq = delta.length_squared() + softening;
            acc += delta.normalize_or_zero() * (gravitational_constant * other.mass() / dist_sq);
        }
        out[i] = acc;
    }
}

/// Total mechanical energy Σ ½ m v² - Σ_{i<j} G m_i m_j / r_ij.
pub fn total_energy(bodies: &[VirtualBody], gravitational_constant: f64) -> f64 {
    let kinetic: f64 = bodies
        .iter()
        .map(|b| 0.5 * b.mass() * b.velocity.length_squared())
        .sum();

    let mut potential = 0.0;
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            let r = (b.position - a.position).length();
            if r > 0.0 {
                potential -= gravitational_constant * a.mass() * b.mass() / r;
            }
        }
    }

    kinetic + potential
}

/// Total angular momentum Σ m (r × v) about the origin.
pub fn total_angular_momentum(bodies: &[VirtualBody]) -> DVec3 {
    bodies
        .iter()
        .map(|b| b.mass() * b.position.cross(b.velocity))
        .sum()
}

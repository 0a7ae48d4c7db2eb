//! Two-body propagator that re-derives elements from the live state.

use std::collections::HashSet;

use bevy::log::warn;

use super::elements::{DegenerateOrbitPolicy, OrbitalElements};
use super::{PhysicsModel, warn_degenerate};
use crate::types::{BodyId, VirtualBody};

/// Iterative Keplerian propagator.
///
/// Like [`KeplerianPropagator`](super::KeplerianPropagator) body 0 is a fixed
/// centre, but nothing is cached: every step solves the orbit from the
/// current relative position and velocity and propagates it by `dt`. This
/// costs an element derivation per body per step, and in exchange it follows
/// any edit made to a body's state between steps without re-initialization.
#[derive(Clone, Debug)]
pub struct IterativeKeplerPropagator {
    gravitational_constant: f64,
    policy: DegenerateOrbitPolicy,
    /// Bodies already reported as degenerate, so each warns once per run.
    warned: HashSet<BodyId>,
}

impl IterativeKeplerPropagator {
    pub fn new(gravitational_constant: f64, policy: DegenerateOrbitPolicy) -> Self {
        Self {
            gravitational_constant,
            policy,
            warned: HashSet::new(),
        }
    }
}

impl PhysicsModel for IterativeKeplerPropagator {
    fn name(&self) -> &'static str {
        "Iterative Keplerian"
    }

    fn initialize(&mut self, _bodies: &[VirtualBody]) {
        self.warned.clear();
    }

    fn advance(&mut self, bodies: &mut [VirtualBody], dt: f64) {
        let Some((central, orbiting)) = bodies.split_first_mut() else {
            return;
        };

        let mu = self.gravitational_constant * central.mass();
        if !(mu > 0.0 && mu.is_finite()) {
            if self.warned.insert(central.id()) {
                warn!("Central body has no usable gravitational parameter (mu = {})", mu);
            }
            return;
        }

        for body in orbiting {
            let elements = OrbitalElements::from_state(
                body.position - central.position,
                body.velocity,
                mu,
                0.0,
                &self.policy,
            );
            if elements.is_degenerate() && self.warned.insert(body.id()) {
                warn_degenerate(body.id(), &elements);
            }

            let (rel_pos, rel_vel) = elements.state_at(dt);
            body.position = central.position + rel_pos;
            body.velocity = rel_vel;
        }
    }
}

//! Closed-form two-body propagator with cached orbital elements.

use std::collections::HashMap;

use bevy::log::warn;

use super::elements::{DegenerateOrbitPolicy, OrbitalElements};
use super::{PhysicsModel, warn_degenerate};
use crate::types::{BodyId, VirtualBody};

/// Closed-form Keplerian propagator.
///
/// Body 0 is a fixed gravitational centre with `mu = G * m0`. Elements for
/// every other body are derived once in [`PhysicsModel::initialize`] and each
/// step evaluates the orbit analytically at the accumulated elapsed time, so
/// error does not build up over long runs. Bodies never interact with each
/// other; edits to the state between steps are ignored until re-initialized.
#[derive(Clone, Debug)]
pub struct KeplerianPropagator {
    gravitational_constant: f64,
    policy: DegenerateOrbitPolicy,
    /// Element cache keyed by stable body identity.
    elements: HashMap<BodyId, OrbitalElements>,
    /// Simulation time since `initialize`.
    elapsed: f64,
}

impl KeplerianPropagator {
    pub fn new(gravitational_constant: f64, policy: DegenerateOrbitPolicy) -> Self {
        Self {
            gravitational_constant,
            policy,
            elements: HashMap::new(),
            elapsed: 0.0,
        }
    }

    /// Cached elements for a body, if it is orbiting.
    pub fn elements(&self, id: BodyId) -> Option<&OrbitalElements> {
        self.elements.get(&id)
    }

    /// Simulation time accumulated since the last `initialize`.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl PhysicsModel for KeplerianPropagator {
    fn name(&self) -> &'static str {
        "Keplerian"
    }

    fn initialize(&mut self, bodies: &[VirtualBody]) {
        self.elements.clear();
        self.elapsed = 0.0;

        let Some((central, orbiting)) = bodies.split_first() else {
            return;
        };

        let mu = self.gravitational_constant * central.mass();
        if !(mu > 0.0 && mu.is_finite()) {
            warn!(
                "Central body has no usable gravitational parameter (mu = {}), orbits will not move",
                mu
            );
            return;
        }

        for body in orbiting {
            // The centre is held fixed, so its velocity plays no part
            let elements = OrbitalElements::from_state(
                body.position - central.position,
                body.velocity,
                mu,
                self.elapsed,
                &self.policy,
            );
            warn_degenerate(body.id(), &elements);
            self.elements.insert(body.id(), elements);
        }
    }

    fn advance(&mut self, bodies: &mut [VirtualBody], dt: f64) {
        self.elapsed += dt;

        let Some((central, orbiting)) = bodies.split_first_mut() else {
            return;
        };

        for body in orbiting {
            let Some(elements) = self.elements.get(&body.id()) else {
                continue;
            };
            let (rel_pos, rel_vel) = elements.state_at(self.elapsed);
            body.position = central.position + rel_pos;
            body.velocity = rel_vel;
        }
    }
}

//! Pluggable physics models for the star system simulation.
//!
//! A [`PhysicsModel`] advances an ordered array of [`VirtualBody`] in place.
//! Three models are provided:
//!
//! - [`KeplerianPropagator`]: closed-form two-body orbits around body 0
//! - [`IterativeKeplerPropagator`]: two-body orbits re-derived every step
//! - [`NBodyIntegrator`]: softened pairwise gravity, semi-implicit Euler
//!
//! The [`ContinuousGravityPlugin`] is separate from the driver and moves
//! [`FreeBody`] entities in `FixedUpdate` when [`GravityMode::Continuous`] is
//! selected.

pub mod continuous;
pub mod elements;
mod iterative;
pub mod kepler;
mod keplerian;
pub mod nbody;

#[cfg(test)]
mod proptest_physics;

use bevy::log::warn;
use bevy::prelude::*;

pub use continuous::{FreeBody, GravityMode, accumulate_forces};
pub use elements::{DegenerateOrbitPolicy, OrbitRegime, OrbitalElements};
pub use iterative::IterativeKeplerPropagator;
pub use keplerian::KeplerianPropagator;
pub use nbody::{DEFAULT_SOFTENING, NBodyIntegrator};

use crate::simulation::{Simulation, SimulationSettings};
use crate::types::{BodyId, DEFAULT_G, VirtualBody};

/// A numerical scheme that advances body state.
///
/// Implementations must be deterministic for identical input and must never
/// change a body's mass (the type only exposes it read-only).
pub trait PhysicsModel: Send + Sync {
    /// Human-readable model name.
    fn name(&self) -> &'static str;

    /// Prepare for a new run. Must discard anything cached by a previous run.
    fn initialize(&mut self, bodies: &[VirtualBody]);

    /// Advance every body by `dt` simulation time units.
    fn advance(&mut self, bodies: &mut [VirtualBody], dt: f64);
}

/// Constants shared by all physics models.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    /// Gravitational constant G. Default: 6.674 (editor units).
    pub gravitational_constant: f64,
    /// N-body softening ε added to squared distances. Default: 1e-3.
    pub softening: f64,
    /// Treatment of orbits the two-body models cannot represent.
    pub degenerate_orbits: DegenerateOrbitPolicy,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: DEFAULT_G,
            softening: DEFAULT_SOFTENING,
            degenerate_orbits: DegenerateOrbitPolicy::default(),
        }
    }
}

/// Selectable physics models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PhysicsModelKind {
    #[default]
    Keplerian,
    IterativeKeplerian,
    NBody,
}

impl PhysicsModelKind {
    pub const ALL: [PhysicsModelKind; 3] = [
        PhysicsModelKind::Keplerian,
        PhysicsModelKind::IterativeKeplerian,
        PhysicsModelKind::NBody,
    ];

    /// Display name, identical to [`PhysicsModel::name`] of the built model.
    pub fn name(self) -> &'static str {
        match self {
            PhysicsModelKind::Keplerian => "Keplerian",
            PhysicsModelKind::IterativeKeplerian => "Iterative Keplerian",
            PhysicsModelKind::NBody => "N-Body",
        }
    }

    /// Names of all selectable models, in menu order.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|kind| kind.name()).collect()
    }

    /// Look a model up by its display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Construct a fresh model instance.
    pub fn build(self, config: &PhysicsConfig) -> Box<dyn PhysicsModel> {
        let g = config.gravitational_constant;
        match self {
            PhysicsModelKind::Keplerian => {
                Box::new(KeplerianPropagator::new(g, config.degenerate_orbits.clone()))
            }
            PhysicsModelKind::IterativeKeplerian => Box::new(IterativeKeplerPropagator::new(
                g,
                config.degenerate_orbits.clone(),
            )),
            PhysicsModelKind::NBody => Box::new(NBodyIntegrator::new(g, config.softening)),
        }
    }
}

/// Log how the degenerate-orbit policy altered a body's trajectory.
pub(crate) fn warn_degenerate(id: BodyId, elements: &OrbitalElements) {
    if elements.radius_clamped {
        warn!(
            "Body {} is too close to the central body, radius clamped",
            id.index()
        );
    }
    match elements.regime {
        OrbitRegime::Elliptical => {}
        OrbitRegime::EccentricityClamped => warn!(
            "Body {} has eccentricity at or above the maximum, clamped to {:.3}",
            id.index(),
            elements.eccentricity
        ),
        OrbitRegime::Parabolic | OrbitRegime::Hyperbolic => warn!(
            "Body {} is on an unbound ({:?}) trajectory, approximated by an ellipse with e = {:.3}",
            id.index(),
            elements.regime,
            elements.eccentricity
        ),
    }
}

/// Plugin moving [`FreeBody`] entities under mutual gravity.
///
/// Runs in `FixedUpdate` so the force accumulation sees a constant timestep.
pub struct ContinuousGravityPlugin;

impl Plugin for ContinuousGravityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GravityMode>()
            .add_systems(FixedUpdate, continuous_gravity_step);
    }
}

/// Accumulate pairwise forces for all free bodies and sync their transforms.
fn continuous_gravity_step(
    mode: Res<GravityMode>,
    settings: Option<Res<SimulationSettings>>,
    sim: Option<Res<Simulation>>,
    time: Res<Time>,
    mut bodies: Query<(&mut FreeBody, &mut Transform)>,
) {
    if *mode != GravityMode::Continuous {
        return;
    }
    // Wait until the driver has handed the bodies over
    if sim.is_some_and(|sim| sim.driver.is_simulating()) {
        return;
    }

    let dt = time.delta_secs_f64();
    if dt <= 0.0 {
        return;
    }

    let g = settings
        .map(|s| s.driver.physics.gravitational_constant)
        .unwrap_or(DEFAULT_G);

    let mut snapshot: Vec<FreeBody> = bodies.iter().map(|(body, _)| body.clone()).collect();
    accumulate_forces(&mut snapshot, g, dt);

    for ((mut body, mut transform), updated) in bodies.iter_mut().zip(snapshot) {
        if !updated.position.is_finite() || !updated.velocity.is_finite() {
            warn!("Free body produced a non-finite state, keeping previous state");
            continue;
        }
        transform.translation = updated.position.as_vec3();
        *body = updated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_names_match_built_models() {
        let config = PhysicsConfig::default();
        for kind in PhysicsModelKind::ALL {
            assert_eq!(kind.build(&config).name(), kind.name());
            assert_eq!(PhysicsModelKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(
            PhysicsModelKind::names(),
            vec!["Keplerian", "Iterative Keplerian", "N-Body"]
        );
        assert_eq!(PhysicsModelKind::from_name("Verlet"), None);
    }

    #[test]
    fn test_default_config() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravitational_constant, DEFAULT_G);
        assert_eq!(config.softening, 1e-3);
        assert_eq!(config.degenerate_orbits.max_eccentricity, 0.999);
    }
}

//! Property-based tests for the physics models using proptest.
//!
//! These tests verify solver accuracy and physical invariants across a wide
//! range of orbital parameters.

use std::f64::consts::TAU;

use proptest::prelude::*;

use super::elements::{DegenerateOrbitPolicy, OrbitalElements};
use super::kepler::{eccentric_to_mean_anomaly, solve_eccentric_anomaly};
use super::nbody::{total_angular_momentum, total_energy};
use super::{DEFAULT_SOFTENING, KeplerianPropagator, NBodyIntegrator, PhysicsModel};
use crate::test_utils::{assertions, fixtures};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The solver satisfies Kepler's equation for every mean anomaly and
    /// every eccentricity up to 0.99.
    #[test]
    fn prop_kepler_residual_is_small(
        mean_anomaly in 0.0f64..TAU,
        eccentricity in 0.0f64..=0.99,
    ) {
        let e_anom = solve_eccentric_anomaly(mean_anomaly, eccentricity);
        let residual = (eccentric_to_mean_anomaly(e_anom, eccentricity) - mean_anomaly).abs();
        prop_assert!(
            residual < 1e-5,
            "residual {:.3e} for M={}, e={}", residual, mean_anomaly, eccentricity
        );
    }

    /// Elements derived from any bound state reproduce that state at epoch.
    #[test]
    fn prop_elements_reproduce_state(
        radius in 1.0f64..100.0,
        speed_fraction in 0.2f64..1.35,
        flight_angle in -1.2f64..1.2,
        inclination in 0.0f64..3.0,
    ) {
        let mu = 500.0;
        let (pos, vel) = fixtures::inclined_state(radius, speed_fraction * (mu / radius).sqrt(), flight_angle, inclination);
        let el = OrbitalElements::from_state(pos, vel, mu, 0.0, &DegenerateOrbitPolicy::default());
        prop_assume!(!el.is_degenerate());

        let (p, v) = el.state_at(0.0);
        prop_assert!((p - pos).length() < 1e-6 * radius, "position {:?} vs {:?}", p, pos);
        prop_assert!((v - vel).length() < 1e-6 * vel.length().max(1.0), "velocity {:?} vs {:?}", v, vel);
    }

    /// The closed-form propagator conserves specific energy and angular
    /// momentum exactly, however far it is advanced.
    #[test]
    fn prop_closed_form_conserves_invariants(
        periapsis in 2.0f64..50.0,
        eccentricity in 0.0f64..0.9,
        steps in 1usize..200,
        dt in 0.01f64..5.0,
    ) {
        let central_mass = 1000.0;
        let mut bodies = fixtures::elliptical_pair(periapsis, eccentricity, central_mass);
        let e0 = assertions::specific_energy(bodies[1].position, bodies[1].velocity, central_mass);
        let h0 = bodies[1].position.cross(bodies[1].velocity);

        let mut model = KeplerianPropagator::new(1.0, DegenerateOrbitPolicy::default());
        model.initialize(&bodies);
        for _ in 0..steps {
            model.advance(&mut bodies, dt);
        }

        let e1 = assertions::specific_energy(bodies[1].position, bodies[1].velocity, central_mass);
        let h1 = bodies[1].position.cross(bodies[1].velocity);
        assertions::assert_energy_conserved(e0, e1, 1e-6);
        prop_assert!((h1 - h0).length() < 1e-6 * h0.length());
    }

    /// Pairwise N-body keeps total angular momentum for any circular binary.
    #[test]
    fn prop_nbody_conserves_angular_momentum(
        primary in 10.0f64..1000.0,
        secondary in 0.1f64..10.0,
        separation in 5.0f64..50.0,
    ) {
        let mut bodies = fixtures::barycentric_binary(primary, secondary, separation, 1.0);
        let l0 = total_angular_momentum(&bodies);
        let e0 = total_energy(&bodies, 1.0);

        let mut model = NBodyIntegrator::new(1.0, DEFAULT_SOFTENING);
        model.initialize(&bodies);
        for _ in 0..200 {
            model.advance(&mut bodies, 0.01);
        }

        let l1 = total_angular_momentum(&bodies);
        prop_assert!((l1 - l0).length() < 1e-9 * l0.length().max(1.0));
        assertions::assert_energy_conserved(e0, total_energy(&bodies, 1.0), 0.05);
        prop_assert!(bodies.iter().all(|b| b.is_finite()));
    }
}

//! Preset star systems.
//!
//! Four systems covering the three physics models: a planetary system for the
//! closed-form propagator, a binary star, a planet with moons, and an
//! eccentric comet.

use bevy::color::Color;
use bevy::math::DVec3;

use super::Scenario;
use crate::bodies::{BodyKind, BodySpec};
use crate::orbital::{
    KeplerianSpec, OrbitSetupError, circular_orbit_state, circular_orbit_velocity,
    elliptical_orbit_state, recommend_orbit_distance,
};
use crate::physics::PhysicsModelKind;

/// All available preset scenarios.
pub static SCENARIOS: &[Scenario] = &[SUN_AND_PLANETS, BINARY_STARS, PLANET_AND_MOONS, ECCENTRIC_COMET];

const STAR_MASS: f64 = 1000.0;
const STAR_RADIUS: f32 = 10.0;

fn star() -> BodySpec {
    BodySpec::new("Sun", BodyKind::Star, STAR_MASS, STAR_RADIUS, Color::srgb(1.0, 0.85, 0.4))
}

/// Scenario 1: Sun and Planets
///
/// Four planets on circular orbits, one slightly inclined. Two-body motion
/// around a dominant star is what the closed-form propagator is exact for.
pub static SUN_AND_PLANETS: Scenario = Scenario {
    id: "sun-and-planets",
    name: "Sun and Planets",
    description: "Four planets on circular orbits around a single star.",
    model: PhysicsModelKind::Keplerian,
    time_step: 0.05,
    steps_per_tick: 2,
    camera_zoom: 1.4,
    build: sun_and_planets,
};

fn sun_and_planets(g: f64) -> Result<Vec<BodySpec>, OrbitSetupError> {
    let sun = star();
    let mut bodies = Vec::new();

    // (name, mass, radius, colour, distance multiplier, inclination, start angle)
    let planets = [
        ("Ember", 1.0, 2.0, Color::srgb(0.75, 0.55, 0.45), 1.0, 0.0, 0.0),
        ("Azure", 2.0, 3.0, Color::srgb(0.3, 0.55, 0.9), 1.6, 4.0, 120.0),
        ("Verdant", 5.0, 4.0, Color::srgb(0.35, 0.75, 0.4), 2.5, 0.0, 240.0),
        ("Frost", 3.0, 3.5, Color::srgb(0.7, 0.85, 0.95), 3.6, 2.0, 45.0),
    ];

    for (name, mass, radius, color, multiplier, inclination, start_angle) in planets {
        let distance = recommend_orbit_distance(STAR_RADIUS as f64, radius as f64, sun.mass, true) * multiplier / 3.0;
        let (pos, vel) = circular_orbit_state(g, sun.position, sun.mass, distance, inclination, start_angle)?;
        bodies.push(BodySpec::new(name, BodyKind::Planet, mass, radius, color).at(pos, vel));
    }

    bodies.insert(0, sun);
    Ok(bodies)
}

/// Scenario 2: Binary Stars
///
/// Two equal stars orbiting their barycentre with a circumbinary planet far
/// outside. Needs the N-body model: neither star is a fixed centre.
pub static BINARY_STARS: Scenario = Scenario {
    id: "binary-stars",
    name: "Binary Stars",
    description: "Two stars orbiting each other with a distant circumbinary planet.",
    model: PhysicsModelKind::NBody,
    time_step: 0.01,
    steps_per_tick: 5,
    camera_zoom: 1.2,
    build: binary_stars,
};

fn binary_stars(g: f64) -> Result<Vec<BodySpec>, OrbitSetupError> {
    let mass = 500.0;
    let separation = 60.0;

    // Each star circles the barycentre at half the separation
    let relative_speed = circular_orbit_velocity(g, 2.0 * mass, separation)?;
    let offset = DVec3::new(separation / 2.0, 0.0, 0.0);
    let speed = DVec3::new(0.0, relative_speed / 2.0, 0.0);

    let primary = BodySpec::new("Alpha", BodyKind::Star, mass, 8.0, Color::srgb(1.0, 0.8, 0.45))
        .at(-offset, -speed);
    let secondary = BodySpec::new("Beta", BodyKind::Star, mass, 8.0, Color::srgb(0.6, 0.75, 1.0))
        .at(offset, speed);

    let (pos, vel) = circular_orbit_state(g, DVec3::ZERO, 2.0 * mass, 250.0, 0.0, 90.0)?;
    let planet = BodySpec::new("Wanderer", BodyKind::Planet, 1.0, 3.0, Color::srgb(0.55, 0.7, 0.5)).at(pos, vel);

    Ok(vec![primary, secondary, planet])
}

/// Scenario 3: Planet and Moons
///
/// A heavy planet with two moons well inside its Hill sphere. Moon velocities
/// are the planet's orbital velocity plus their own circular speed.
pub static PLANET_AND_MOONS: Scenario = Scenario {
    id: "planet-and-moons",
    name: "Planet and Moons",
    description: "A gas giant with two moons, all orbiting a star.",
    model: PhysicsModelKind::NBody,
    time_step: 0.005,
    steps_per_tick: 4,
    camera_zoom: 0.8,
    build: planet_and_moons,
};

fn planet_and_moons(g: f64) -> Result<Vec<BodySpec>, OrbitSetupError> {
    let sun = star();
    let planet_mass = 50.0;

    let (planet_pos, planet_vel) = circular_orbit_state(g, sun.position, sun.mass, 150.0, 0.0, 0.0)?;
    let planet = BodySpec::new("Titan Major", BodyKind::Planet, planet_mass, 5.0, Color::srgb(0.85, 0.65, 0.45))
        .at(planet_pos, planet_vel);

    let mut bodies = vec![sun, planet];
    for (name, distance, start_angle) in [("Io Minor", 12.0, 0.0), ("Callisto Minor", 20.0, 180.0)] {
        let (pos, vel) = circular_orbit_state(g, planet_pos, planet_mass, distance, 0.0, start_angle)?;
        bodies.push(
            BodySpec::new(name, BodyKind::Moon, 0.05, 1.2, Color::srgb(0.7, 0.7, 0.7)).at(pos, vel + planet_vel),
        );
    }

    Ok(bodies)
}

/// Scenario 4: Eccentric Comet
///
/// An inclined comet with e = 0.85 sweeping past a planet's orbit. Shows the
/// closed-form propagator on a highly eccentric ellipse.
pub static ECCENTRIC_COMET: Scenario = Scenario {
    id: "eccentric-comet",
    name: "Eccentric Comet",
    description: "A comet on an inclined, highly eccentric orbit.",
    model: PhysicsModelKind::Keplerian,
    time_step: 0.02,
    steps_per_tick: 3,
    camera_zoom: 1.5,
    build: eccentric_comet,
};

fn eccentric_comet(g: f64) -> Result<Vec<BodySpec>, OrbitSetupError> {
    let sun = star();

    let (planet_pos, planet_vel) = circular_orbit_state(g, sun.position, sun.mass, 120.0, 0.0, 30.0)?;
    let planet = BodySpec::new("Azure", BodyKind::Planet, 2.0, 3.0, Color::srgb(0.3, 0.55, 0.9))
        .at(planet_pos, planet_vel);

    let comet_orbit = KeplerianSpec {
        semi_major_axis: 150.0,
        eccentricity: 0.85,
        inclination_deg: 10.0,
        ascending_node_deg: 20.0,
        argument_of_periapsis_deg: 60.0,
        true_anomaly_deg: 180.0,
    };
    let (comet_pos, comet_vel) = elliptical_orbit_state(g, sun.position, sun.mass, comet_orbit)?;
    let comet = BodySpec::new("Halley", BodyKind::Comet, 0.01, 1.5, Color::srgb(0.8, 0.95, 1.0))
        .at(comet_pos, comet_vel);

    Ok(vec![sun, planet, comet])
}

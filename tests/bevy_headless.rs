//! Headless Bevy integration tests.
//!
//! These tests verify the simulation plugins work correctly without GPU.

use std::time::Duration;

use bevy::math::DVec3;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use starsystem::bodies::{BodyKind, CelestialBody};
use starsystem::physics::{ContinuousGravityPlugin, FreeBody, GravityMode, PhysicsModelKind};
use starsystem::simulation::{DiagnosticKind, Simulation, SimulationCommand, SimulationPlugin, SimulationSettings};

fn create_minimal_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, SimulationPlugin));
    app
}

fn spawn_body(app: &mut App, order: u32, position: DVec3, velocity: DVec3, mass: f64) -> Entity {
    app.world_mut()
        .spawn((
            CelestialBody {
                name: format!("Body {order}"),
                kind: if order == 0 { BodyKind::Star } else { BodyKind::Planet },
                order,
                initial_position: position,
                initial_velocity: velocity,
                mass,
            },
            Transform::from_translation(position.as_vec3()),
        ))
        .id()
}

/// Star at the origin and a planet on a circular orbit at r = 100.
fn spawn_star_and_planet(app: &mut App) -> (Entity, Entity) {
    let g = app.world().resource::<SimulationSettings>().driver.physics.gravitational_constant;
    let speed = (g * 1000.0 / 100.0).sqrt();
    // Spawned out of order to check sorting by `order`
    let planet = spawn_body(app, 1, DVec3::new(100.0, 0.0, 0.0), DVec3::new(0.0, speed, 0.0), 1.0);
    let star = spawn_body(app, 0, DVec3::ZERO, DVec3::ZERO, 1000.0);
    (star, planet)
}

fn send(app: &mut App, command: SimulationCommand) {
    app.world_mut().write_message(command);
}

fn translation(app: &App, entity: Entity) -> Vec3 {
    app.world()
        .get::<Transform>(entity)
        .map(|t| t.translation)
        .expect("entity has a transform")
}

#[test]
fn test_start_moves_transforms() {
    let mut app = create_minimal_app();
    let (star, planet) = spawn_star_and_planet(&mut app);

    send(&mut app, SimulationCommand::Start);
    for _ in 0..10 {
        app.update();
    }

    let sim = app.world().resource::<Simulation>();
    assert!(sim.driver.is_simulating());
    assert_eq!(sim.driver.model_name(), Some("Keplerian"));
    assert_eq!(sim.entities(), &[star, planet]);
    assert_eq!(sim.driver.step_count(), 10);

    assert_eq!(translation(&app, star), Vec3::ZERO);
    let moved = translation(&app, planet);
    assert!(moved.y > 0.5, "planet should have moved, at {:?}", moved);
    assert!((moved.length() - 100.0).abs() < 1e-3);
}

#[test]
fn test_stop_restores_initial_positions() {
    let mut app = create_minimal_app();
    let (_, planet) = spawn_star_and_planet(&mut app);

    send(&mut app, SimulationCommand::Start);
    for _ in 0..5 {
        app.update();
    }
    assert_ne!(translation(&app, planet), Vec3::new(100.0, 0.0, 0.0));

    send(&mut app, SimulationCommand::Stop);
    app.update();

    assert!(!app.world().resource::<Simulation>().driver.is_simulating());
    assert_eq!(translation(&app, planet), Vec3::new(100.0, 0.0, 0.0));
}

#[test]
fn test_pause_holds_transforms() {
    let mut app = create_minimal_app();
    let (_, planet) = spawn_star_and_planet(&mut app);

    send(&mut app, SimulationCommand::Start);
    app.update();
    send(&mut app, SimulationCommand::Pause);
    app.update();
    let frozen = translation(&app, planet);

    for _ in 0..5 {
        app.update();
    }
    assert_eq!(translation(&app, planet), frozen);

    send(&mut app, SimulationCommand::Resume);
    app.update();
    assert_ne!(translation(&app, planet), frozen);
}

#[test]
fn test_toggle_starts_and_stops() {
    let mut app = create_minimal_app();
    spawn_star_and_planet(&mut app);

    send(&mut app, SimulationCommand::Toggle);
    app.update();
    assert!(app.world().resource::<Simulation>().driver.is_simulating());

    send(&mut app, SimulationCommand::Toggle);
    app.update();
    assert!(!app.world().resource::<Simulation>().driver.is_simulating());
}

#[test]
fn test_despawned_entity_is_invalidated() {
    let mut app = create_minimal_app();
    let (_, planet) = spawn_star_and_planet(&mut app);

    send(&mut app, SimulationCommand::Start);
    app.update();
    app.world_mut().despawn(planet);
    app.update();
    app.update();

    let sim = app.world().resource::<Simulation>();
    assert!(sim.driver.is_simulating(), "run continues without the body");
    assert!(!sim.records()[1].valid);
    assert!(
        sim.driver
            .diagnostics()
            .any(|d| d.kind == DiagnosticKind::InvalidHandle && d.body.index() == 1)
    );
}

#[test]
fn test_settings_change_stops_run() {
    let mut app = create_minimal_app();
    spawn_star_and_planet(&mut app);

    send(&mut app, SimulationCommand::Start);
    app.update();
    app.update();

    app.world_mut().resource_mut::<SimulationSettings>().driver.time_step = 0.02;
    app.update();

    assert!(!app.world().resource::<Simulation>().driver.is_simulating());
}

#[test]
fn test_model_switch_keeps_running() {
    let mut app = create_minimal_app();
    spawn_star_and_planet(&mut app);

    send(&mut app, SimulationCommand::Start);
    app.update();
    send(&mut app, SimulationCommand::SetModel(PhysicsModelKind::NBody));
    app.update();
    app.update();

    let sim = app.world().resource::<Simulation>();
    assert!(sim.driver.is_simulating());
    assert_eq!(sim.driver.model_name(), Some("N-Body"));
    assert_eq!(sim.driver.step_count(), 3);
    assert_eq!(app.world().resource::<SimulationSettings>().model, PhysicsModelKind::NBody);
}

#[test]
fn test_continuous_mode_blocks_driver() {
    let mut app = create_minimal_app();
    spawn_star_and_planet(&mut app);
    app.insert_resource(GravityMode::Continuous);

    send(&mut app, SimulationCommand::Start);
    app.update();

    assert!(!app.world().resource::<Simulation>().driver.is_simulating());
}

#[test]
fn test_continuous_gravity_pulls_free_bodies_together() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, ContinuousGravityPlugin))
        .insert_resource(GravityMode::Continuous)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)));

    let left = app
        .world_mut()
        .spawn((
            FreeBody::new(DVec3::new(-10.0, 0.0, 0.0), DVec3::ZERO, 100.0),
            Transform::from_xyz(-10.0, 0.0, 0.0),
        ))
        .id();
    let right = app
        .world_mut()
        .spawn((
            FreeBody::new(DVec3::new(10.0, 0.0, 0.0), DVec3::ZERO, 100.0),
            Transform::from_xyz(10.0, 0.0, 0.0),
        ))
        .id();

    for _ in 0..20 {
        app.update();
    }

    let left_x = translation(&app, left).x;
    let right_x = translation(&app, right).x;
    assert!(left_x > -10.0 && right_x < 10.0, "bodies at {left_x}, {right_x}");
    assert!((left_x + right_x).abs() < 1e-4, "momentum should stay balanced");

    let body = app.world().get::<FreeBody>(left).expect("free body");
    assert!(body.velocity.x > 0.0);
    assert_eq!(body.mass, 100.0);
}

#[test]
fn test_rejected_start_keeps_active_run() {
    let mut app = create_minimal_app();
    let (_, planet) = spawn_star_and_planet(&mut app);

    send(&mut app, SimulationCommand::Start);
    app.update();
    app.update();

    app.world_mut()
        .get_mut::<CelestialBody>(planet)
        .expect("planet exists")
        .initial_velocity = DVec3::NAN;
    send(&mut app, SimulationCommand::Start);
    app.update();

    let sim = app.world().resource::<Simulation>();
    assert!(sim.driver.is_simulating(), "a failed start must not stop the run");
    assert_eq!(sim.driver.step_count(), 3);
}

#[test]
fn test_switching_to_continuous_hands_over_bodies() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, SimulationPlugin, ContinuousGravityPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::ZERO));
    let (star, planet) = spawn_star_and_planet(&mut app);
    let initial_velocity = app
        .world()
        .get::<CelestialBody>(planet)
        .map(|b| b.initial_velocity)
        .expect("planet exists");
    for (entity, mass) in [(star, 1000.0), (planet, 1.0)] {
        // Left over from an earlier continuous session
        app.world_mut()
            .entity_mut(entity)
            .insert(FreeBody::new(DVec3::new(500.0, 500.0, 0.0), DVec3::X, mass));
    }

    send(&mut app, SimulationCommand::Start);
    for _ in 0..3 {
        app.update();
    }
    assert_ne!(translation(&app, planet), Vec3::new(100.0, 0.0, 0.0));

    app.insert_resource(GravityMode::Continuous);
    app.update();

    let steps = {
        let sim = app.world().resource::<Simulation>();
        assert!(!sim.driver.is_simulating());
        sim.driver.step_count()
    };
    for _ in 0..3 {
        app.update();
    }
    assert_eq!(app.world().resource::<Simulation>().driver.step_count(), steps);

    // Bodies are back at their configured state, in both engines
    assert_eq!(translation(&app, planet), Vec3::new(100.0, 0.0, 0.0));
    let free = app.world().get::<FreeBody>(planet).expect("free body");
    assert_eq!(free.position, DVec3::new(100.0, 0.0, 0.0));
    assert_eq!(free.velocity, initial_velocity);
    assert_eq!(app.world().get::<FreeBody>(star).map(|b| b.position), Some(DVec3::ZERO));
}

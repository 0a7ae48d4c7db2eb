//! Scenario system for preset star systems.
//!
//! A scenario is an ordered list of bodies (central body first) together
//! with the physics model and step settings that suit it:
//! - Sun and planets (closed-form Keplerian)
//! - Binary stars (N-body)
//! - Planet and moons (N-body)
//! - Eccentric comet (closed-form Keplerian)

pub mod presets;

use bevy::log::{info, warn};
use bevy::prelude::*;

use crate::bodies::{BodySpec, CelestialBody, spawn_system};
use crate::camera::MainCamera;
use crate::orbital::OrbitSetupError;
use crate::physics::PhysicsModelKind;
use crate::simulation::{SimulationCommand, SimulationSet, SimulationSettings};

pub use presets::SCENARIOS;

/// A predefined star system.
#[derive(Clone, Copy, Debug)]
pub struct Scenario {
    /// Unique identifier for the scenario.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Brief description of the scenario.
    pub description: &'static str,
    /// Suggested physics model.
    pub model: PhysicsModelKind,
    /// Suggested raw step size.
    pub time_step: f64,
    /// Suggested raw steps per frame.
    pub steps_per_tick: u32,
    /// Camera zoom level (orthographic scale).
    pub camera_zoom: f32,
    build: fn(f64) -> Result<Vec<BodySpec>, OrbitSetupError>,
}

impl Scenario {
    /// Bodies of the system for gravitational constant `g`, central body first.
    pub fn bodies(&self, g: f64) -> Result<Vec<BodySpec>, OrbitSetupError> {
        (self.build)(g)
    }
}

/// Look up a preset by id.
pub fn find(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}

/// Resource tracking the loaded scenario.
#[derive(Resource, Default)]
pub struct CurrentScenario {
    /// ID of the current scenario, empty before the first load.
    pub id: &'static str,
    /// Start the simulation as soon as a scenario is loaded.
    pub auto_start: bool,
}

/// Message to replace the scene with a preset.
#[derive(Message, Clone, Copy, Debug)]
pub struct LoadScenario {
    /// ID of the scenario to load.
    pub scenario_id: &'static str,
}

/// Plugin providing scenario loading.
pub struct ScenarioPlugin;

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentScenario>()
            .add_message::<LoadScenario>()
            .add_systems(Update, handle_load_scenario.in_set(SimulationSet::Setup));
    }
}

/// Despawn the current bodies, spawn the preset and apply its settings.
#[allow(clippy::too_many_arguments)]
fn handle_load_scenario(
    mut commands: Commands,
    mut requests: MessageReader<LoadScenario>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut current: ResMut<CurrentScenario>,
    mut settings: ResMut<SimulationSettings>,
    mut sim_commands: MessageWriter<SimulationCommand>,
    existing: Query<Entity, With<CelestialBody>>,
    mut cameras: Query<&mut Projection, With<MainCamera>>,
) {
    // Only the last request in a frame matters
    let Some(request) = requests.read().last().copied() else {
        return;
    };

    let Some(scenario) = find(request.scenario_id) else {
        warn!("Unknown scenario '{}'", request.scenario_id);
        return;
    };

    let bodies = match scenario.bodies(settings.driver.physics.gravitational_constant) {
        Ok(bodies) => bodies,
        Err(error) => {
            warn!("Cannot build scenario '{}': {}", scenario.id, error);
            return;
        }
    };

    sim_commands.write(SimulationCommand::Stop);
    for entity in &existing {
        commands.entity(entity).despawn();
    }

    settings.driver.time_step = scenario.time_step;
    settings.driver.steps_per_tick = scenario.steps_per_tick;
    settings.model = scenario.model;

    spawn_system(&mut commands, &mut meshes, &mut materials, &bodies);

    if let Ok(mut projection) = cameras.single_mut()
        && let Projection::Orthographic(ref mut ortho) = *projection
    {
        ortho.scale = scenario.camera_zoom;
    }

    current.id = scenario.id;
    info!(
        "Loaded scenario '{}' with {} bodies ({} model)",
        scenario.name,
        bodies.len(),
        scenario.model.name()
    );

    if current.auto_start {
        sim_commands.write(SimulationCommand::Start);
    }
}

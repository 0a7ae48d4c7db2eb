//! Starsystem - Orbital Mechanics Simulator
//!
//! Loads a preset star system and runs it. The preset id can be passed as
//! the first argument, e.g. `starsystem binary-stars`.

use bevy::prelude::*;

use starsystem::camera::CameraPlugin;
use starsystem::physics::ContinuousGravityPlugin;
use starsystem::render::RenderPlugin;
use starsystem::scenarios::{self, CurrentScenario, LoadScenario, ScenarioPlugin};
use starsystem::simulation::SimulationPlugin;

const DEFAULT_SCENARIO: &str = "sun-and-planets";

/// Preset selected on the command line.
#[derive(Resource)]
struct StartupScenario(&'static str);

fn main() {
    let requested = std::env::args().nth(1);
    let scenario_id = match requested.as_deref().map(|id| (id, scenarios::find(id))) {
        Some((_, Some(scenario))) => scenario.id,
        Some((id, None)) => {
            let known: Vec<_> = scenarios::SCENARIOS.iter().map(|s| s.id).collect();
            eprintln!("Unknown scenario '{id}', available: {}", known.join(", "));
            DEFAULT_SCENARIO
        }
        None => DEFAULT_SCENARIO,
    };

    App::new()
        .add_plugins(DefaultPlugins)
        .insert_resource(ClearColor(Color::srgb(0.01, 0.01, 0.03)))
        // Insert resources before plugins that depend on them
        .insert_resource(CurrentScenario {
            id: "",
            auto_start: true,
        })
        .insert_resource(StartupScenario(scenario_id))
        .add_plugins((
            CameraPlugin,
            SimulationPlugin,
            ContinuousGravityPlugin,
            ScenarioPlugin,
            RenderPlugin,
        ))
        .add_systems(Startup, load_startup_scenario)
        .run();
}

fn load_startup_scenario(startup: Res<StartupScenario>, mut loads: MessageWriter<LoadScenario>) {
    info!("Loading scenario '{}'", startup.0);
    loads.write(LoadScenario {
        scenario_id: startup.0,
    });
}

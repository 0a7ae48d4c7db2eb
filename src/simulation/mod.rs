//! Simulation driver and its Bevy host integration.
//!
//! [`SimulationDriver`] is engine-agnostic and can be stepped from any loop.
//! [`SimulationPlugin`] hosts one driver as a resource, steps it once per
//! frame and mirrors committed positions onto [`CelestialBody`] transforms.

mod driver;
mod frame;
mod trail;

use bevy::log::{info, warn};
use bevy::prelude::*;

pub use driver::{
    DiagnosticKind, DriverConfig, SimulationDriver, SimulationError, SimulationState,
    StepDiagnostic, StepStatus,
};
pub use frame::ReferenceFrame;
pub use trail::{TrailBuffer, TrailConfig};

use crate::bodies::CelestialBody;
use crate::physics::{FreeBody, GravityMode, PhysicsModelKind};
use crate::types::BodyRecord;

/// User-facing simulation settings.
///
/// Changing `driver` while a run is active stops the run through
/// [`PhysicsSettingsChanged`]; `model` can be switched live with
/// [`SimulationCommand::SetModel`].
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct SimulationSettings {
    pub driver: DriverConfig,
    pub model: PhysicsModelKind,
}

/// Commands accepted by the hosted driver.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationCommand {
    Start,
    Stop,
    Pause,
    Resume,
    /// Start when idle, stop when active.
    Toggle,
    SetModel(PhysicsModelKind),
}

/// Emitted when physics-affecting settings change. Stops the active run.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct PhysicsSettingsChanged;

/// Ordering of the per-frame simulation work.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Scene changes (spawning bodies, loading presets).
    Setup,
    /// Settings change detection and command handling.
    Commands,
    /// Advancing the driver.
    Step,
    /// Writing committed positions to transforms.
    Sync,
}

/// The hosted driver and the entities it simulates, in simulation order.
#[derive(Resource)]
pub struct Simulation {
    pub driver: SimulationDriver,
    entities: Vec<Entity>,
    records: Vec<BodyRecord>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            driver: SimulationDriver::new(DriverConfig::default()),
            entities: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl Simulation {
    /// Entities of the current run; index `i` matches `driver.trail(i)`.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn records(&self) -> &[BodyRecord] {
        &self.records
    }

    /// Start a run over `bodies`, already sorted into simulation order.
    ///
    /// The active run is only replaced once the new one has started.
    fn start(
        &mut self,
        settings: &SimulationSettings,
        bodies: Vec<(Entity, &CelestialBody)>,
    ) -> Result<(), SimulationError> {
        let mut driver = SimulationDriver::with_model(
            settings.driver.clone(),
            settings.model.build(&settings.driver.physics),
        );
        let mut records: Vec<BodyRecord> = bodies
            .iter()
            .map(|(_, body)| BodyRecord::new(body.initial_position, body.initial_velocity, body.mass))
            .collect();
        driver.start(&mut records)?;

        self.driver.stop(&mut self.records);
        self.entities = bodies.iter().map(|(entity, _)| *entity).collect();
        self.records = records;
        self.driver = driver;
        Ok(())
    }

    fn stop(&mut self) {
        self.driver.stop(&mut self.records);
    }

    fn step(&mut self) -> StepStatus {
        self.driver.step(&mut self.records)
    }
}

/// Plugin hosting the simulation driver.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationSettings>()
            .init_resource::<Simulation>()
            .init_resource::<GravityMode>()
            .add_message::<SimulationCommand>()
            .add_message::<PhysicsSettingsChanged>()
            .configure_sets(
                Update,
                (
                    SimulationSet::Setup,
                    SimulationSet::Commands,
                    SimulationSet::Step,
                    SimulationSet::Sync,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    (apply_gravity_mode, detect_settings_changes, handle_commands)
                        .chain()
                        .in_set(SimulationSet::Commands),
                    advance_simulation.in_set(SimulationSet::Step),
                    sync_transforms.in_set(SimulationSet::Sync),
                ),
            );
    }
}

/// Hand the bodies over to continuous gravity when that mode is selected.
///
/// The active run is stopped, which returns every body to its configured
/// initial state, and each [`FreeBody`] is reseeded from that same state.
fn apply_gravity_mode(
    mode: Res<GravityMode>,
    mut sim: ResMut<Simulation>,
    mut bodies: Query<(&CelestialBody, &mut FreeBody)>,
) {
    if !mode.is_changed() || *mode != GravityMode::Continuous {
        return;
    }

    if sim.driver.is_simulating() {
        info!("Continuous gravity selected, stopping simulation");
        sim.stop();
    }

    for (body, mut free) in &mut bodies {
        *free = FreeBody::new(body.initial_position, body.initial_velocity, body.mass);
    }
}

/// Emit [`PhysicsSettingsChanged`] when the driver configuration is edited.
fn detect_settings_changes(
    settings: Res<SimulationSettings>,
    mut applied: Local<Option<DriverConfig>>,
    mut changed: MessageWriter<PhysicsSettingsChanged>,
) {
    if !settings.is_changed() {
        return;
    }
    if applied.as_ref().is_some_and(|previous| *previous != settings.driver) {
        changed.write(PhysicsSettingsChanged);
    }
    *applied = Some(settings.driver.clone());
}

/// Apply settings changes and user commands to the hosted driver.
fn handle_commands(
    mut sim: ResMut<Simulation>,
    mut settings: ResMut<SimulationSettings>,
    mode: Res<GravityMode>,
    mut settings_changed: MessageReader<PhysicsSettingsChanged>,
    mut commands: MessageReader<SimulationCommand>,
    bodies: Query<(Entity, &CelestialBody)>,
) {
    if settings_changed.read().count() > 0 && sim.driver.is_simulating() {
        info!("Physics settings changed, stopping simulation");
        sim.stop();
    }

    for command in commands.read() {
        match *command {
            SimulationCommand::Start => start_run(&mut sim, &settings, *mode, &bodies),
            SimulationCommand::Stop => sim.stop(),
            SimulationCommand::Pause => {
                sim.driver.pause();
            }
            SimulationCommand::Resume => {
                sim.driver.resume();
            }
            SimulationCommand::Toggle => {
                if sim.driver.is_simulating() {
                    sim.stop();
                } else {
                    start_run(&mut sim, &settings, *mode, &bodies);
                }
            }
            SimulationCommand::SetModel(kind) => {
                // Bypass change detection: a model switch must not stop the run
                settings.bypass_change_detection().model = kind;
                let model = kind.build(&settings.driver.physics);
                sim.driver.set_physics_model(model);
            }
        }
    }
}

fn start_run(
    sim: &mut Simulation,
    settings: &SimulationSettings,
    mode: GravityMode,
    bodies: &Query<(Entity, &CelestialBody)>,
) {
    if mode != GravityMode::Driver {
        warn!("Continuous gravity is active, not starting the simulation driver");
        return;
    }

    let mut ordered: Vec<(Entity, &CelestialBody)> = bodies.iter().collect();
    ordered.sort_by_key(|(entity, body)| (body.order, *entity));

    if let Err(error) = sim.start(settings, ordered) {
        warn!("Cannot start simulation: {}", error);
    }
}

/// Advance the hosted driver by one tick.
fn advance_simulation(mut sim: ResMut<Simulation>) {
    if !sim.driver.is_simulating() {
        return;
    }
    sim.step();
}

/// Copy committed positions to transforms, invalidating despawned bodies.
fn sync_transforms(
    mut sim: ResMut<Simulation>,
    mut transforms: Query<&mut Transform, With<CelestialBody>>,
) {
    if !sim.is_changed() {
        return;
    }
    let sim = sim.bypass_change_detection();
    for (entity, record) in sim.entities.iter().zip(sim.records.iter_mut()) {
        match transforms.get_mut(*entity) {
            Ok(mut transform) => transform.translation = record.render_position.as_vec3(),
            Err(_) => record.valid = false,
        }
    }
}

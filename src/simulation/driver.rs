//! The stepping driver: lifecycle, reference frame, trails and write-back.

use std::collections::VecDeque;

use bevy::log::{debug, info, warn};
use bevy::math::DVec3;

use super::frame::ReferenceFrame;
use super::trail::{TrailBuffer, TrailConfig};
use crate::physics::{PhysicsConfig, PhysicsModel};
use crate::types::{BodyId, SimBody, VirtualBody};

/// Diagnostics kept before the oldest are dropped.
const MAX_DIAGNOSTICS: usize = 256;

/// Configuration for a [`SimulationDriver`].
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    /// Constants handed to the physics models.
    pub physics: PhysicsConfig,
    /// Simulation time advanced by one raw step. Default: 0.01.
    pub time_step: f64,
    /// Multiplier applied to every raw step's dt. Default: 1.0.
    pub time_scale: f64,
    /// Raw steps performed per host tick. Default: 1.
    pub steps_per_tick: u32,
    /// Trail sizing.
    pub trail: TrailConfig,
    /// Index of the body positions are drawn relative to, if any.
    pub reference_body: Option<usize>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            time_step: 0.01,
            time_scale: 1.0,
            steps_per_tick: 1,
            trail: TrailConfig::default(),
            reference_body: None,
        }
    }
}

/// Errors that prevent a run from starting.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("no bodies to simulate")]
    NoBodies,

    #[error("no physics model selected")]
    NoPhysicsModel,

    #[error("invalid time step {0} (must be positive and finite)")]
    InvalidTimeStep(f64),

    #[error("invalid time scale {0} (must be non-negative and finite)")]
    InvalidTimeScale(f64),

    #[error("steps per tick must be at least 1")]
    InvalidStepsPerTick,

    #[error("reference body index {index} out of range for {count} bodies")]
    ReferenceOutOfRange { index: usize, count: usize },

    #[error("body {0} has a non-finite initial position or velocity")]
    NonFiniteBody(usize),
}

/// Lifecycle of a run.
///
/// `Idle → Initializing → Running ⇄ Paused → Stopped → Idle`. `Initializing`
/// and `Stopped` are only held for the duration of `start` and `stop`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationState {
    #[default]
    Idle,
    Initializing,
    Running,
    Paused,
    Stopped,
}

/// Outcome of one host tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// Bodies advanced and were written back.
    Running,
    /// Run is paused; nothing moved.
    Paused,
    /// No run is active.
    Stopped,
}

/// What went wrong with a body during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The model produced a NaN or infinite state; the previous state was kept.
    NonFiniteState,
    /// The external handle became invalid; the body is skipped from now on.
    InvalidHandle,
}

/// A recoverable per-body problem recorded during stepping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepDiagnostic {
    /// Raw step counter when the problem was seen.
    pub step: u64,
    pub body: BodyId,
    pub kind: DiagnosticKind,
}

/// Runs a physics model over an ordered set of bodies.
///
/// The host owns the external bodies and calls [`step`](Self::step) once per
/// frame. The driver owns the transient [`VirtualBody`] array, per-body
/// trails and the reference frame for the duration of a run.
pub struct SimulationDriver {
    config: DriverConfig,
    model: Option<Box<dyn PhysicsModel>>,
    state: SimulationState,
    bodies: Vec<VirtualBody>,
    /// Bodies still taking part in the run, as handed to the model.
    active: Vec<VirtualBody>,
    /// Pre-step copy used to roll back non-finite results.
    previous: Vec<VirtualBody>,
    trails: Vec<TrailBuffer>,
    frame: ReferenceFrame,
    skipped: Vec<bool>,
    non_finite_warned: Vec<bool>,
    diagnostics: VecDeque<StepDiagnostic>,
    step_count: u64,
    elapsed: f64,
}

impl SimulationDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            model: None,
            state: SimulationState::Idle,
            bodies: Vec::new(),
            active: Vec::new(),
            previous: Vec::new(),
            trails: Vec::new(),
            frame: ReferenceFrame::Inertial,
            skipped: Vec::new(),
            non_finite_warned: Vec::new(),
            diagnostics: VecDeque::new(),
            step_count: 0,
            elapsed: 0.0,
        }
    }

    /// Create a driver with a model already selected.
    pub fn with_model(config: DriverConfig, model: Box<dyn PhysicsModel>) -> Self {
        let mut driver = Self::new(config);
        driver.model = Some(model);
        driver
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// True while a run is active, paused or not.
    pub fn is_simulating(&self) -> bool {
        matches!(self.state, SimulationState::Running | SimulationState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.state == SimulationState::Paused
    }

    /// Name of the selected model, if any.
    pub fn model_name(&self) -> Option<&'static str> {
        self.model.as_ref().map(|m| m.name())
    }

    /// Current simulated bodies (empty when idle).
    pub fn bodies(&self) -> &[VirtualBody] {
        &self.bodies
    }

    /// Trail of body `index`, oldest point first.
    pub fn trail(&self, index: usize) -> Option<&TrailBuffer> {
        self.trails.get(index)
    }

    pub fn trails(&self) -> &[TrailBuffer] {
        &self.trails
    }

    /// Raw steps performed in the current run.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Simulation time elapsed in the current run.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &StepDiagnostic> {
        self.diagnostics.iter()
    }

    /// Drain recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<StepDiagnostic> {
        self.diagnostics.drain(..).collect()
    }

    /// Change the dt multiplier. Takes effect on the next tick.
    pub fn set_time_scale(&mut self, time_scale: f64) -> Result<(), SimulationError> {
        if !(time_scale >= 0.0 && time_scale.is_finite()) {
            return Err(SimulationError::InvalidTimeScale(time_scale));
        }
        self.config.time_scale = time_scale;
        Ok(())
    }

    /// Change how many raw steps a tick performs. Takes effect on the next tick.
    pub fn set_steps_per_tick(&mut self, steps: u32) -> Result<(), SimulationError> {
        if steps == 0 {
            return Err(SimulationError::InvalidStepsPerTick);
        }
        self.config.steps_per_tick = steps;
        Ok(())
    }

    /// Replace the physics model.
    ///
    /// During an active run the new model is initialized from the current
    /// state so the run continues without a restart.
    pub fn set_physics_model(&mut self, mut model: Box<dyn PhysicsModel>) {
        if self.is_simulating() {
            Self::gather_active(&self.bodies, &self.skipped, &mut self.active);
            model.initialize(&self.active);
            info!(
                "Switched physics model to {} at t = {:.3}",
                model.name(),
                self.elapsed
            );
        } else {
            debug!("Selected physics model {}", model.name());
        }
        self.model = Some(model);
    }

    fn validate<B: SimBody>(&self, bodies: &[B]) -> Result<(), SimulationError> {
        if bodies.is_empty() {
            return Err(SimulationError::NoBodies);
        }
        if self.model.is_none() {
            return Err(SimulationError::NoPhysicsModel);
        }
        let dt = self.config.time_step;
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SimulationError::InvalidTimeStep(dt));
        }
        let scale = self.config.time_scale;
        if !(scale >= 0.0 && scale.is_finite()) {
            return Err(SimulationError::InvalidTimeScale(scale));
        }
        if self.config.steps_per_tick == 0 {
            return Err(SimulationError::InvalidStepsPerTick);
        }
        if let Some(index) = self.config.reference_body
            && index >= bodies.len()
        {
            return Err(SimulationError::ReferenceOutOfRange {
                index,
                count: bodies.len(),
            });
        }
        if let Some(index) = bodies
            .iter()
            .position(|b| !(b.position().is_finite() && b.velocity().is_finite() && b.mass().is_finite()))
        {
            return Err(SimulationError::NonFiniteBody(index));
        }
        Ok(())
    }

    /// Begin a run from the bodies' configured initial state.
    ///
    /// Body 0 is treated as the central body by the two-body models. On error
    /// nothing is changed; an active run is restarted cleanly on success.
    pub fn start<B: SimBody>(&mut self, bodies: &mut [B]) -> Result<(), SimulationError> {
        self.validate(bodies)?;

        if self.is_simulating() {
            self.stop(bodies);
        }
        self.transition(SimulationState::Initializing);

        self.bodies = bodies
            .iter()
            .enumerate()
            .map(|(i, b)| VirtualBody::from_body(BodyId(i as u32), b))
            .collect();
        self.previous = self.bodies.clone();

        let capacity = self.config.trail.capacity_for(self.config.time_step);
        self.trails = vec![TrailBuffer::with_capacity(capacity); bodies.len()];
        self.frame = ReferenceFrame::snapshot(self.config.reference_body, &self.bodies);

        self.skipped = bodies.iter().map(|b| !b.is_valid()).collect();
        for index in self.skipped.iter().enumerate().filter(|(_, s)| **s).map(|(i, _)| i) {
            warn!("Body {} is not valid at start, it will not be updated", index);
        }
        self.non_finite_warned = vec![false; bodies.len()];
        self.diagnostics.clear();
        self.step_count = 0;
        self.elapsed = 0.0;

        let Some(model) = self.model.as_mut() else {
            self.transition(SimulationState::Idle);
            return Err(SimulationError::NoPhysicsModel);
        };
        Self::gather_active(&self.bodies, &self.skipped, &mut self.active);
        model.initialize(&self.active);

        info!(
            "Simulation started: {} bodies, {} model, dt = {}, {} steps per tick, trail capacity {}",
            self.bodies.len(),
            model.name(),
            self.config.time_step,
            self.config.steps_per_tick,
            capacity
        );
        self.transition(SimulationState::Running);
        Ok(())
    }

    /// Halt the run and restore every body to its configured position.
    ///
    /// Trails, the body array and the model's caches are released. Safe to
    /// call in any state.
    pub fn stop<B: SimBody>(&mut self, bodies: &mut [B]) {
        let was_active = self.is_simulating();
        self.transition(SimulationState::Stopped);

        for body in bodies.iter_mut().filter(|b| b.is_valid()) {
            let initial = body.position();
            body.set_render_position(initial);
        }

        self.bodies.clear();
        self.active.clear();
        self.previous.clear();
        self.trails.clear();
        self.skipped.clear();
        self.non_finite_warned.clear();
        self.frame = ReferenceFrame::Inertial;
        if let Some(model) = self.model.as_mut() {
            model.initialize(&[]);
        }

        if was_active {
            info!(
                "Simulation stopped after {} steps (t = {:.3})",
                self.step_count, self.elapsed
            );
        }
        self.transition(SimulationState::Idle);
    }

    /// Freeze the run. Returns false if nothing was running.
    pub fn pause(&mut self) -> bool {
        if self.state != SimulationState::Running {
            return false;
        }
        self.transition(SimulationState::Paused);
        true
    }

    /// Continue a paused run from where it stopped. No time is caught up.
    pub fn resume(&mut self) -> bool {
        if self.state != SimulationState::Paused {
            return false;
        }
        self.transition(SimulationState::Running);
        true
    }

    /// Perform one host tick.
    ///
    /// Runs `steps_per_tick` raw steps of `time_step * time_scale`, pushing
    /// every body's frame-corrected position into its trail after each raw
    /// step, then writes the final positions back to `bodies`.
    ///
    /// A body whose handle became invalid is removed from the model's view:
    /// it stays frozen, no longer attracts anything, and the model is
    /// re-initialized from the remaining bodies' current state.
    pub fn step<B: SimBody>(&mut self, bodies: &mut [B]) -> StepStatus {
        match self.state {
            SimulationState::Running => {}
            SimulationState::Paused => return StepStatus::Paused,
            _ => return StepStatus::Stopped,
        }

        let lost_bodies = self.check_handles(bodies);

        let Some(model) = self.model.as_mut() else {
            return StepStatus::Stopped;
        };
        if lost_bodies {
            Self::gather_active(&self.bodies, &self.skipped, &mut self.active);
            model.initialize(&self.active);
            debug!("Re-initialized {} with {} remaining bodies", model.name(), self.active.len());
        }
        let dt = self.config.time_step * self.config.time_scale;

        for _ in 0..self.config.steps_per_tick {
            self.previous.clone_from(&self.bodies);
            Self::gather_active(&self.bodies, &self.skipped, &mut self.active);
            model.advance(&mut self.active, dt);
            for body in self.active.drain(..) {
                let index = body.id().index();
                self.bodies[index] = body;
            }
            self.step_count += 1;
            self.elapsed += dt;

            for (i, body) in self.bodies.iter_mut().enumerate() {
                if body.is_finite() {
                    continue;
                }
                *body = self.previous[i].clone();
                if !self.non_finite_warned[i] {
                    self.non_finite_warned[i] = true;
                    warn!(
                        "Body {} produced a non-finite state at step {}, keeping previous state",
                        i, self.step_count
                    );
                }
                Self::record(
                    &mut self.diagnostics,
                    StepDiagnostic {
                        step: self.step_count,
                        body: body.id(),
                        kind: DiagnosticKind::NonFiniteState,
                    },
                );
            }

            let offset = self.frame.offset(&self.bodies);
            for (i, body) in self.bodies.iter().enumerate() {
                if !self.skipped[i] {
                    self.trails[i].push(self.frame.apply(i, body.position, offset));
                }
            }
        }

        let offset = self.frame.offset(&self.bodies);
        for (i, external) in bodies.iter_mut().enumerate() {
            if self.skipped.get(i).copied().unwrap_or(true) {
                continue;
            }
            if let Some(body) = self.bodies.get(i) {
                external.set_render_position(self.frame.apply(i, body.position, offset));
            }
        }

        StepStatus::Running
    }

    /// Frame-corrected position of body `index` as last emitted.
    pub fn emitted_position(&self, index: usize) -> Option<DVec3> {
        let body = self.bodies.get(index)?;
        let offset = self.frame.offset(&self.bodies);
        Some(self.frame.apply(index, body.position, offset))
    }

    /// Copy the bodies that are not skipped into `active`, in order.
    fn gather_active(bodies: &[VirtualBody], skipped: &[bool], active: &mut Vec<VirtualBody>) {
        active.clear();
        active.extend(
            bodies
                .iter()
                .zip(skipped)
                .filter(|(_, skipped)| !**skipped)
                .map(|(body, _)| body.clone()),
        );
    }

    /// Mark bodies whose external handle became invalid as skipped.
    ///
    /// Returns true if any body was newly skipped.
    fn check_handles<B: SimBody>(&mut self, bodies: &[B]) -> bool {
        let mut lost = false;
        for i in 0..self.skipped.len() {
            if self.skipped[i] {
                continue;
            }
            let valid = bodies.get(i).is_some_and(|b| b.is_valid());
            if valid {
                continue;
            }
            self.skipped[i] = true;
            warn!("Body {} no longer exists, skipping it for the rest of the run", i);
            Self::record(
                &mut self.diagnostics,
                StepDiagnostic {
                    step: self.step_count,
                    body: BodyId(i as u32),
                    kind: DiagnosticKind::InvalidHandle,
                },
            );
            lost = true;
        }
        lost
    }

    fn record(diagnostics: &mut VecDeque<StepDiagnostic>, diagnostic: StepDiagnostic) {
        if diagnostics.len() == MAX_DIAGNOSTICS {
            diagnostics.pop_front();
        }
        diagnostics.push_back(diagnostic);
    }

    fn transition(&mut self, to: SimulationState) {
        if self.state != to {
            debug!("Simulation state {:?} -> {:?}", self.state, to);
            self.state = to;
        }
    }
}

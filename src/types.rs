//! Core physics types and constants for the star system simulation.

use bevy::math::DVec3;

// Physical constants (editor units)

/// Gravitational constant used by the editor.
///
/// Star systems are authored in scene units (distances of tens of units,
/// masses of tens to thousands), so the constant is scaled accordingly
/// rather than being the SI value.
pub const DEFAULT_G: f64 = 6.674;

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// Stable identity of a body within one simulation run.
///
/// Assigned from the body's index in the ordered list passed to
/// [`SimulationDriver::start`](crate::simulation::SimulationDriver::start).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl BodyId {
    /// Index of the body in the driver's arrays.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Transient physical state of a body, decoupled from any renderable entity.
///
/// Mass is fixed at construction; physics models can only move the body.
#[derive(Clone, Debug, PartialEq)]
pub struct VirtualBody {
    /// Position in world units
    pub position: DVec3,
    /// Velocity in world units per time unit
    pub velocity: DVec3,
    mass: f64,
    id: BodyId,
}

impl VirtualBody {
    /// Create a new virtual body
    pub fn new(id: BodyId, position: DVec3, velocity: DVec3, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
            id,
        }
    }

    /// Snapshot the configured initial state of an external body.
    pub fn from_body<B: SimBody + ?Sized>(id: BodyId, body: &B) -> Self {
        Self::new(id, body.position(), body.velocity(), body.mass())
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    /// True when both position and velocity contain only finite components.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// An externally owned body handed to the simulation.
///
/// The simulation reads the configured initial state when a run starts and
/// writes committed positions back through [`SimBody::set_render_position`].
pub trait SimBody {
    /// Configured initial position.
    fn position(&self) -> DVec3;
    /// Configured initial velocity.
    fn velocity(&self) -> DVec3;
    /// Mass of the body.
    fn mass(&self) -> f64;
    /// Write-back target for the position shown to the user.
    fn set_render_position(&mut self, position: DVec3);
    /// Whether the handle still refers to a live body.
    fn is_valid(&self) -> bool {
        true
    }
}

/// Plain in-memory body record.
///
/// Used by headless hosts and tests, and by the Bevy layer as the mirror
/// between the driver and scene entities.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyRecord {
    /// Configured initial position
    pub position: DVec3,
    /// Configured initial velocity
    pub velocity: DVec3,
    /// Mass
    pub mass: f64,
    /// Last committed position
    pub render_position: DVec3,
    /// Cleared when the backing entity disappears
    pub valid: bool,
}

impl BodyRecord {
    /// Create a record whose render position starts at the initial position.
    pub fn new(position: DVec3, velocity: DVec3, mass: f64) -> Self {
        Self {
            position,
            velocity,
            mass,
            render_position: position,
            valid: true,
        }
    }
}

impl SimBody for BodyRecord {
    fn position(&self) -> DVec3 {
        self.position
    }

    fn velocity(&self) -> DVec3 {
        self.velocity
    }

    fn mass(&self) -> f64 {
        self.mass
    }

    fn set_render_position(&mut self, position: DVec3) {
        self.render_position = position;
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

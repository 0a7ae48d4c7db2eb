//! Celestial body entities and spawning.
//!
//! A [`CelestialBody`] carries the configured initial state the simulation
//! starts from. Its `Transform` shows the last committed position and is
//! owned by the simulation while a run is active.

use bevy::math::DVec3;
use bevy::prelude::*;

use crate::physics::FreeBody;

/// Broad category of a body, used for sizing and orbit recommendations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyKind {
    Star,
    #[default]
    Planet,
    Moon,
    Comet,
}

/// Description of a body to spawn.
#[derive(Clone, Debug, PartialEq)]
pub struct BodySpec {
    pub name: String,
    pub kind: BodyKind,
    /// Initial position in world units.
    pub position: DVec3,
    /// Initial velocity in world units per time unit.
    pub velocity: DVec3,
    pub mass: f64,
    /// Visual radius in world units.
    pub radius: f32,
    pub color: Color,
}

impl BodySpec {
    pub fn new(name: impl Into<String>, kind: BodyKind, mass: f64, radius: f32, color: Color) -> Self {
        Self {
            name: name.into(),
            kind,
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
            mass,
            radius,
            color,
        }
    }

    pub fn at(mut self, position: DVec3, velocity: DVec3) -> Self {
        self.position = position;
        self.velocity = velocity;
        self
    }
}

/// A body taking part in the simulation.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct CelestialBody {
    pub name: String,
    pub kind: BodyKind,
    /// Position in the simulation order; 0 is the central body.
    pub order: u32,
    /// Configured initial position.
    pub initial_position: DVec3,
    /// Configured initial velocity.
    pub initial_velocity: DVec3,
    pub mass: f64,
}

/// Visual properties for body and trail rendering.
#[derive(Component, Clone, Debug)]
pub struct BodyVisual {
    pub radius: f32,
    pub color: Color,
}

/// Spawn a body with mesh, material and simulation components.
///
/// The body also gets a [`FreeBody`] so it takes part in continuous gravity
/// when that mode is selected.
pub fn spawn_body(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    body: &BodySpec,
    order: u32,
) -> Entity {
    let mesh = meshes.add(Sphere::new(body.radius));

    // Stars glow, everything else is lit
    let material = match body.kind {
        BodyKind::Star => materials.add(StandardMaterial {
            base_color: body.color,
            emissive: body.color.to_linear() * 4.0,
            unlit: true,
            ..default()
        }),
        _ => materials.add(StandardMaterial {
            base_color: body.color,
            perceptual_roughness: 0.8,
            metallic: 0.1,
            ..default()
        }),
    };

    debug!(
        "Spawning {} (order {}) at ({:.2}, {:.2}, {:.2}), mass {}",
        body.name, order, body.position.x, body.position.y, body.position.z, body.mass
    );

    commands
        .spawn((
            Name::new(body.name.clone()),
            CelestialBody {
                name: body.name.clone(),
                kind: body.kind,
                order,
                initial_position: body.position,
                initial_velocity: body.velocity,
                mass: body.mass,
            },
            FreeBody::new(body.position, body.velocity, body.mass),
            BodyVisual {
                radius: body.radius,
                color: body.color,
            },
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(body.position.as_vec3()),
        ))
        .id()
}

/// Spawn bodies in order; the first becomes the central body.
pub fn spawn_system(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    bodies: &[BodySpec],
) -> Vec<Entity> {
    bodies
        .iter()
        .enumerate()
        .map(|(order, body)| spawn_body(commands, meshes, materials, body, order as u32))
        .collect()
}

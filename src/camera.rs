//! Camera setup for viewing the star system.
//!
//! A single orthographic camera looks down the -z axis at the origin, so the
//! x-y reference plane fills the view.

use bevy::camera::ScalingMode;
use bevy::prelude::*;

/// Default zoom level (orthographic scale).
pub const DEFAULT_ZOOM: f32 = 1.0;

/// Viewport height in world units at scale 1.0.
pub const VIEWPORT_HEIGHT: f32 = 700.0;

/// Marker component for the main camera.
#[derive(Component)]
pub struct MainCamera;

/// Plugin spawning the main camera and scene lighting.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_camera);
    }
}

/// Spawn the main camera with orthographic projection.
fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: VIEWPORT_HEIGHT,
            },
            scale: DEFAULT_ZOOM,
            near: -10000.0,
            far: 10000.0,
            ..OrthographicProjection::default_3d()
        }),
        Transform::from_xyz(0.0, 0.0, 1000.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));

    // Lit bodies are shaded from above the orbital plane
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            ..default()
        },
        Transform::from_xyz(200.0, 300.0, 800.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

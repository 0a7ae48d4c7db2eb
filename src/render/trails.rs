//! Motion trail rendering using Bevy Gizmos.
//!
//! Each simulated body's trail is drawn as a polyline fading from
//! transparent (oldest point) to the body's colour (newest point).

use bevy::prelude::*;

use crate::bodies::BodyVisual;
use crate::simulation::{Simulation, TrailBuffer};

/// Plugin providing trail visualization.
pub struct TrailPlugin;

impl Plugin for TrailPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrailSettings>();
    }
}

/// Settings for trail rendering.
#[derive(Resource, Clone, Debug)]
pub struct TrailSettings {
    /// Whether to show trails.
    pub visible: bool,
    /// Upper bound on vertices drawn per trail; longer trails are thinned.
    pub max_vertices: usize,
    /// Alpha of the newest segment.
    pub alpha: f32,
    /// Fade older segments towards transparent.
    pub fade: bool,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            visible: true,
            max_vertices: 1000,
            alpha: 0.8,
            fade: true,
        }
    }
}

/// Render-space vertices for a trail, oldest first.
///
/// Keeps every `stride`-th point so at most `max_vertices` are returned, and
/// always ends on the newest point so the line reaches the body.
pub fn trail_vertices(trail: &TrailBuffer, max_vertices: usize) -> Vec<Vec3> {
    let len = trail.len();
    if len < 2 || max_vertices < 2 {
        return Vec::new();
    }

    let stride = len.div_ceil(max_vertices).max(1);
    let mut vertices: Vec<Vec3> = trail
        .points()
        .step_by(stride)
        .map(|p| p.as_vec3())
        .collect();

    if (len - 1) % stride != 0
        && let Some(latest) = trail.latest()
    {
        vertices.push(latest.as_vec3());
    }
    vertices
}

/// Draw every body's trail from the hosted driver.
pub(super) fn draw_trails(
    mut gizmos: Gizmos,
    settings: Res<TrailSettings>,
    sim: Res<Simulation>,
    visuals: Query<&BodyVisual>,
) {
    if !settings.visible || !sim.driver.is_simulating() {
        return;
    }

    for (index, entity) in sim.entities().iter().enumerate() {
        let Some(trail) = sim.driver.trail(index) else {
            continue;
        };
        let vertices = trail_vertices(trail, settings.max_vertices);
        if vertices.is_empty() {
            continue;
        }

        let base = visuals
            .get(*entity)
            .map(|v| v.color)
            .unwrap_or(Color::WHITE);

        if settings.fade {
            let last = (vertices.len() - 1) as f32;
            gizmos.linestrip_gradient(vertices.into_iter().enumerate().map(|(i, p)| {
                (p, base.with_alpha(settings.alpha * i as f32 / last))
            }));
        } else {
            gizmos.linestrip(vertices, base.with_alpha(settings.alpha));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::DVec3;

    fn trail(n: usize) -> TrailBuffer {
        let mut trail = TrailBuffer::with_capacity(n);
        for i in 0..n {
            trail.push(DVec3::new(i as f64, 0.0, 0.0));
        }
        trail
    }

    #[test]
    fn test_short_trail_is_drawn_whole() {
        let vertices = trail_vertices(&trail(10), 100);
        assert_eq!(vertices.len(), 10);
        assert_eq!(vertices[0].x, 0.0);
        assert_eq!(vertices[9].x, 9.0);
    }

    #[test]
    fn test_long_trail_is_thinned_but_reaches_newest() {
        let vertices = trail_vertices(&trail(1000), 100);
        assert!(vertices.len() <= 101, "got {}", vertices.len());
        assert_eq!(vertices[0].x, 0.0);
        assert_eq!(vertices.last().map(|v| v.x), Some(999.0));
    }

    #[test]
    fn test_single_point_draws_nothing() {
        assert!(trail_vertices(&trail(1), 100).is_empty());
    }
}

//! Rendering systems for the star system simulation.
//!
//! Bodies are meshes spawned by [`crate::bodies`]; this module adds the
//! visual layers drawn on top of them.

mod trails;

use bevy::prelude::*;

use self::trails::{TrailPlugin, draw_trails};
use crate::simulation::SimulationSet;

pub use self::trails::{TrailSettings, trail_vertices};

/// Plugin aggregating all rendering functionality.
pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(TrailPlugin)
            // Trails are drawn from the positions committed this frame
            .add_systems(Update, draw_trails.after(SimulationSet::Sync));
    }
}

//! Moving reference frame correction.

use bevy::math::DVec3;

use crate::types::VirtualBody;

/// Reference frame snapshot taken when a run starts.
///
/// In a relative frame every emitted position is shifted by how far the
/// reference body has moved since the start, so the reference body appears
/// to stay put and everything else is drawn relative to it.
#[derive(Clone, Debug, PartialEq)]
pub enum ReferenceFrame {
    /// Positions are emitted as simulated.
    Inertial,
    /// Positions are emitted relative to the body at `index`.
    Relative { index: usize, initial_position: DVec3 },
}

impl ReferenceFrame {
    /// Snapshot the frame for a run. `index` must already be validated.
    pub fn snapshot(reference: Option<usize>, bodies: &[VirtualBody]) -> Self {
        match reference.and_then(|index| bodies.get(index).map(|b| (index, b))) {
            Some((index, body)) => ReferenceFrame::Relative {
                index,
                initial_position: body.position,
            },
            None => ReferenceFrame::Inertial,
        }
    }

    /// Offset to subtract from every simulated position this step.
    pub fn offset(&self, bodies: &[VirtualBody]) -> DVec3 {
        match self {
            ReferenceFrame::Inertial => DVec3::ZERO,
            ReferenceFrame::Relative {
                index,
                initial_position,
            } => bodies
                .get(*index)
                .map_or(DVec3::ZERO, |b| b.position - *initial_position),
        }
    }

    /// Frame-corrected position of body `index`.
    pub fn apply(&self, index: usize, position: DVec3, offset: DVec3) -> DVec3 {
        match self {
            ReferenceFrame::Relative {
                index: reference,
                initial_position,
            } if *reference == index => *initial_position,
            _ => position - offset,
        }
    }
}

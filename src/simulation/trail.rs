//! Bounded motion-trail history.

use std::collections::VecDeque;

use bevy::math::DVec3;

/// Sizing of per-body trails.
///
/// Capacity is derived from the time step so a trail always covers roughly
/// the same span of simulation time.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailConfig {
    /// Simulation time a trail should cover. Default: 400.
    pub span: f64,
    /// Lower bound on trail capacity. Default: 100.
    pub min_points: usize,
    /// Upper bound on trail capacity. Default: 4000.
    pub max_points: usize,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            span: 400.0,
            min_points: 100,
            max_points: 4000,
        }
    }
}

impl TrailConfig {
    /// `ceil(span / time_step)` clamped to `[min_points, max_points]`.
    pub fn capacity_for(&self, time_step: f64) -> usize {
        let raw = (self.span / time_step).ceil();
        let min = self.min_points.min(self.max_points);
        if !raw.is_finite() || raw >= self.max_points as f64 {
            return self.max_points.max(min);
        }
        (raw.max(0.0) as usize).clamp(min, self.max_points)
    }
}

/// Fixed-capacity FIFO of world positions, oldest first.
#[derive(Clone, Debug, Default)]
pub struct TrailBuffer {
    points: VecDeque<DVec3>,
    capacity: usize,
}

impl TrailBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting the oldest when full.
    pub fn push(&mut self, point: DVec3) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Points from oldest to newest.
    pub fn points(&self) -> impl ExactSizeIterator<Item = DVec3> + '_ {
        self.points.iter().copied()
    }

    /// Most recently pushed point.
    pub fn latest(&self) -> Option<DVec3> {
        self.points.back().copied()
    }
}

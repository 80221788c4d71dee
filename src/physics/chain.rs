use serde::{Deserialize, Serialize};

use crate::math::{Vector2, EPSILON};
use crate::scene::NodeLink;

/// A single point of a Verlet chain
///
/// Velocity is implicit in the distance between the current and previous
/// positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainPoint {
    pub position: Vector2,
    pub previous: Vector2,
}

/// A rope-like constraint simulated with Verlet integration
///
/// The first point is hard-pinned to the owning node's world position every
/// tick; the remaining points integrate under gravity and are then relaxed
/// toward the per-segment rest length. The last point can drive another
/// node's position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Chain {
    /// Number of points in the chain
    pub point_count: usize,

    /// Rest length of each segment
    pub segment_length: f64,

    /// How strongly each relaxation step enforces the rest length, 0-1
    pub stiffness: f64,

    /// Velocity retention per step, 0-1
    pub damping: f64,

    /// Node whose position is driven by the chain's last point
    pub attached_node: Option<NodeLink>,

    /// The simulated points; empty until the first step
    #[serde(skip)]
    points: Vec<ChainPoint>,
}

impl Chain {
    /// Creates a chain with the given point count and segment rest length
    pub fn new(point_count: usize, segment_length: f64) -> Self {
        Self {
            point_count: point_count.max(2),
            segment_length: segment_length.max(EPSILON),
            stiffness: 1.0,
            damping: 0.98,
            attached_node: None,
            points: Vec::new(),
        }
    }

    /// Returns the simulated points
    pub fn points(&self) -> &[ChainPoint] {
        &self.points
    }

    /// Returns the position of the last point, if the chain has been stepped
    pub fn last_position(&self) -> Option<Vector2> {
        self.points.last().map(|p| p.position)
    }

    /// Advances the chain by one tick
    ///
    /// `pin` is the owning node's world position. The relaxation runs a fixed
    /// number of iterations, re-pinning the first point after each pass so it
    /// is never pulled off the node.
    pub fn step(&mut self, pin: Vector2, gravity: Vector2, dt: f64, iterations: usize) {
        // Serialized data can carry a degenerate count; a chain needs at
        // least the pinned head and one free point
        let count = self.point_count.max(2);
        if self.points.len() != count {
            self.seed(pin, count);
        }

        // Verlet integration for every point but the pinned head
        let gravity_step = gravity * (dt * dt);
        for point in self.points.iter_mut().skip(1) {
            let velocity = (point.position - point.previous) * self.damping;
            point.previous = point.position;
            point.position += velocity + gravity_step;
        }

        self.points[0].previous = pin;
        self.points[0].position = pin;

        for _ in 0..iterations {
            self.relax();
            self.points[0].position = pin;
        }
    }

    /// Lays the points out from the pin along the x axis
    fn seed(&mut self, pin: Vector2, count: usize) {
        self.points = (0..count)
            .map(|i| {
                let position = pin + Vector2::new(self.segment_length * i as f64, 0.0);
                ChainPoint {
                    position,
                    previous: position,
                }
            })
            .collect();
    }

    /// One relaxation pass over all adjacent pairs
    fn relax(&mut self) {
        for i in 0..self.points.len() - 1 {
            let delta = self.points[i + 1].position - self.points[i].position;
            let distance = delta.length();
            if distance < EPSILON {
                continue;
            }

            let difference = (distance - self.segment_length) / distance;
            let correction = delta * (0.5 * self.stiffness * difference);

            self.points[i].position += correction;
            self.points[i + 1].position -= correction;
        }
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new(5, 10.0)
    }
}

use serde::{Deserialize, Serialize};

use crate::math::Vector2;
use crate::scene::NodeLink;

/// Where a gravity well sends a captured body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum WellDestination {
    /// A fixed world-space point
    Point { position: Vector2 },

    /// Another node's current world position
    Node { link: NodeLink },
}

/// A localized attractive force field with an optional teleport trigger
///
/// Every body inside the outer radius is pulled toward the well's center
/// with an inverse-square force. A body that falls inside the activation
/// radius is teleported to the configured destination in a single step, with
/// its velocity damped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GravityWell {
    /// Outer radius of influence
    pub radius: f64,

    /// Pull strength; the force on a body is `strength * mass / distance^2`
    pub strength: f64,

    /// Inner radius that triggers the teleport
    pub activation_radius: f64,

    /// Optional teleport destination
    pub destination: Option<WellDestination>,
}

impl GravityWell {
    /// Creates a gravity well with the given radius and pull strength
    pub fn new(radius: f64, strength: f64) -> Self {
        Self {
            radius: radius.max(0.0),
            strength,
            activation_radius: 0.0,
            destination: None,
        }
    }

    /// Computes the pull force on a body of the given mass at `body_position`
    ///
    /// Returns `None` outside the radius or at a degenerate distance.
    pub fn force_on(
        &self,
        center: Vector2,
        body_position: Vector2,
        body_mass: f64,
    ) -> Option<Vector2> {
        let to_center = center - body_position;
        let distance_sq = to_center.length_squared();
        if distance_sq < crate::math::EPSILON {
            return None;
        }

        let distance = distance_sq.sqrt();
        if distance >= self.radius {
            return None;
        }

        let direction = to_center / distance;
        Some(direction * (self.strength * body_mass / distance_sq))
    }

    /// Returns whether a body at the given distance triggers the teleport
    pub fn captures(&self, distance: f64) -> bool {
        self.destination.is_some() && distance < self.activation_radius
    }
}

impl Default for GravityWell {
    fn default() -> Self {
        Self::new(100.0, 1000.0)
    }
}

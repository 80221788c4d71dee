use serde::{Deserialize, Serialize};

/// Material properties for physics bodies
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Material {
    /// Coefficient of restitution (bounciness), 0-1
    pub restitution: f64,

    /// Static friction coefficient, used while the contact is not sliding
    pub static_friction: f64,

    /// Dynamic friction coefficient, used once the contact slides
    pub dynamic_friction: f64,

    /// Linear velocity damping per second, 0-1
    pub drag: f64,

    /// Angular velocity damping per second, 0-1
    pub angular_drag: f64,
}

impl Material {
    /// Creates a new material with the specified properties
    pub fn new(restitution: f64, static_friction: f64, dynamic_friction: f64) -> Self {
        Self {
            restitution: restitution.clamp(0.0, 1.0),
            static_friction: static_friction.max(0.0),
            dynamic_friction: dynamic_friction.max(0.0),
            drag: 0.0,
            angular_drag: 0.0,
        }
    }

    /// Creates a material for ice (low friction, some bounce)
    pub fn ice() -> Self {
        Self {
            restitution: 0.4,
            static_friction: 0.08,
            dynamic_friction: 0.05,
            drag: 0.0,
            angular_drag: 0.0,
        }
    }

    /// Creates a material for rubber (high friction, high bounce)
    pub fn rubber() -> Self {
        Self {
            restitution: 0.7,
            static_friction: 0.9,
            dynamic_friction: 0.8,
            drag: 0.0,
            angular_drag: 0.0,
        }
    }

    /// Creates a material for wood (medium friction, low bounce)
    pub fn wood() -> Self {
        Self {
            restitution: 0.2,
            static_friction: 0.7,
            dynamic_friction: 0.6,
            drag: 0.0,
            angular_drag: 0.0,
        }
    }

    /// Creates a material for metal (medium friction, medium bounce)
    pub fn metal() -> Self {
        Self {
            restitution: 0.5,
            static_friction: 0.5,
            dynamic_friction: 0.4,
            drag: 0.0,
            angular_drag: 0.0,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.3,
            static_friction: 0.6,
            dynamic_friction: 0.5,
            drag: 0.0,
            angular_drag: 0.0,
        }
    }
}

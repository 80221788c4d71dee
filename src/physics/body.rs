use serde::{Deserialize, Serialize};

use crate::math::Vector2;

/// A force or impulse accumulated for the next integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForceKind {
    /// A continuous force through the center of mass
    Force(Vector2),

    /// An instantaneous velocity change scaled by inverse mass
    Impulse(Vector2),

    /// A continuous force applied at a world-space point, producing torque
    ForceAtPoint { force: Vector2, point: Vector2 },
}

/// The kinematic state of a physics body
///
/// Forces accumulate over a tick and are cleared once integrated. Static
/// bodies have infinite effective mass: their inverse mass and inverse
/// inertia are zero and they accept no forces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyState {
    /// Linear velocity in world units per second
    pub velocity: Vector2,

    /// Angular velocity in radians per second
    pub angular_velocity: f64,

    /// Body mass, strictly positive
    mass: f64,

    /// Whether the body never moves
    pub is_static: bool,

    /// Forces accumulated for the next integration step
    #[serde(skip)]
    forces: Vec<ForceKind>,
}

impl BodyState {
    /// Creates a dynamic body state with the given mass
    pub fn new(mass: f64) -> Self {
        Self {
            velocity: Vector2::zero(),
            angular_velocity: 0.0,
            mass: mass.max(f64::MIN_POSITIVE),
            is_static: false,
            forces: Vec::new(),
        }
    }

    /// Creates a static body state
    pub fn new_static() -> Self {
        Self {
            is_static: true,
            ..Self::new(1.0)
        }
    }

    /// Returns the body's mass
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Sets the body's mass, clamped to stay positive
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass.max(f64::MIN_POSITIVE);
    }

    /// Returns the inverse mass, zero for static bodies
    pub fn inv_mass(&self) -> f64 {
        if self.is_static {
            0.0
        } else {
            1.0 / self.mass
        }
    }

    /// Returns the inverse of the given moment of inertia, zero for static
    /// bodies or degenerate inertia
    pub fn inv_inertia(&self, inertia: f64) -> f64 {
        if self.is_static || inertia <= 0.0 {
            0.0
        } else {
            1.0 / inertia
        }
    }

    /// Accumulates a force through the center of mass
    pub fn apply_force(&mut self, force: Vector2) {
        if !self.is_static {
            self.forces.push(ForceKind::Force(force));
        }
    }

    /// Accumulates an impulse
    pub fn apply_impulse(&mut self, impulse: Vector2) {
        if !self.is_static {
            self.forces.push(ForceKind::Impulse(impulse));
        }
    }

    /// Accumulates a force applied at a world-space point
    pub fn apply_force_at_point(&mut self, force: Vector2, point: Vector2) {
        if !self.is_static {
            self.forces.push(ForceKind::ForceAtPoint { force, point });
        }
    }

    /// Returns the number of pending forces
    pub fn pending_forces(&self) -> usize {
        self.forces.len()
    }

    /// Integrates accumulated forces into the velocities and clears them
    ///
    /// `position` is the body's current world position, used for torque from
    /// point forces; `inv_inertia` the inverse moment of inertia.
    pub fn integrate_forces(&mut self, dt: f64, position: Vector2, inv_inertia: f64) {
        if self.is_static {
            self.forces.clear();
            return;
        }

        let inv_mass = self.inv_mass();
        for force in &self.forces {
            match *force {
                ForceKind::Force(force) => {
                    self.velocity += force * inv_mass * dt;
                }
                ForceKind::Impulse(impulse) => {
                    self.velocity += impulse * inv_mass;
                }
                ForceKind::ForceAtPoint { force, point } => {
                    self.velocity += force * inv_mass * dt;
                    let r = point - position;
                    self.angular_velocity += r.cross(&force) * inv_inertia * dt;
                }
            }
        }
        self.forces.clear();
    }

    /// Applies drag to the velocities, scaled by the elapsed time
    pub fn apply_damping(&mut self, drag: f64, angular_drag: f64, dt: f64) {
        if self.is_static {
            return;
        }
        self.velocity *= 1.0 - (drag * dt).clamp(0.0, 1.0);
        self.angular_velocity *= 1.0 - (angular_drag * dt).clamp(0.0, 1.0);
    }
}

impl Default for BodyState {
    fn default() -> Self {
        Self::new(1.0)
    }
}

use crate::math::Vector2;

/// The result of a narrow-phase collision test between two shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactManifold {
    /// Unit collision normal, pointing from the first shape toward the second
    pub normal: Vector2,

    /// How deep the shapes interpenetrate along the normal
    pub penetration: f64,

    /// A representative contact point in world space
    pub contact_point: Vector2,
}

impl ContactManifold {
    /// Creates a new contact manifold
    pub fn new(normal: Vector2, penetration: f64, contact_point: Vector2) -> Self {
        Self {
            normal,
            penetration,
            contact_point,
        }
    }

    /// Returns the manifold seen from the other body's perspective
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            penetration: self.penetration,
            contact_point: self.contact_point,
        }
    }
}

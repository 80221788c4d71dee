use serde::{Deserialize, Serialize};

use crate::math::{Aabb, Vector2};

/// The collision shape of a physics body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Shape {
    /// A circle centered on the body's position
    Circle { radius: f64 },

    /// A rectangle centered on the body's position, rotated with it
    Rectangle { width: f64, height: f64 },
}

impl Shape {
    /// Creates a circle shape
    pub fn circle(radius: f64) -> Self {
        Shape::Circle {
            radius: radius.max(0.0),
        }
    }

    /// Creates a rectangle shape
    pub fn rectangle(width: f64, height: f64) -> Self {
        Shape::Rectangle {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Returns the moment of inertia for the given mass
    ///
    /// Circles use the solid-disc formula, rectangles the solid-box formula.
    pub fn moment_of_inertia(&self, mass: f64) -> f64 {
        match *self {
            Shape::Circle { radius } => 0.5 * mass * radius * radius,
            Shape::Rectangle { width, height } => {
                mass * (width * width + height * height) / 12.0
            }
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Circle { radius: 10.0 }
    }
}

/// A shape placed in world space, derived fresh from the owning node's
/// transform every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldShape {
    /// The shape extents, already scaled into world units
    pub shape: Shape,

    /// The shape center in world space
    pub position: Vector2,

    /// The shape rotation in radians
    pub angle: f64,
}

impl WorldShape {
    /// Creates a world-space shape from local extents and a world transform
    ///
    /// The node's world scale is folded into the extents: rectangle sides
    /// scale per axis, a circle's radius by the larger axis magnitude.
    pub fn new(shape: Shape, position: Vector2, angle_radians: f64, scale: Vector2) -> Self {
        let scaled = match shape {
            Shape::Circle { radius } => Shape::Circle {
                radius: radius * scale.x.abs().max(scale.y.abs()),
            },
            Shape::Rectangle { width, height } => Shape::Rectangle {
                width: width * scale.x.abs(),
                height: height * scale.y.abs(),
            },
        };
        Self {
            shape: scaled,
            position,
            angle: angle_radians,
        }
    }

    /// Returns the rectangle's corners in world space, counter-clockwise
    ///
    /// Only meaningful for rectangle shapes; a circle yields a degenerate
    /// quad at the center.
    pub fn corners(&self) -> [Vector2; 4] {
        let (half_w, half_h) = match self.shape {
            Shape::Rectangle { width, height } => (width * 0.5, height * 0.5),
            Shape::Circle { .. } => (0.0, 0.0),
        };
        let local = [
            Vector2::new(-half_w, -half_h),
            Vector2::new(half_w, -half_h),
            Vector2::new(half_w, half_h),
            Vector2::new(-half_w, half_h),
        ];
        let mut out = [Vector2::zero(); 4];
        for (i, corner) in local.iter().enumerate() {
            out[i] = self.position + corner.rotated(self.angle);
        }
        out
    }

    /// Returns the two distinct edge normals of the rectangle
    ///
    /// Opposite edges are parallel, so two axes suffice for the separating
    /// axis test.
    pub fn axes(&self) -> [Vector2; 2] {
        [
            Vector2::unit_x().rotated(self.angle),
            Vector2::unit_y().rotated(self.angle),
        ]
    }

    /// Returns a loose axis-aligned bound around the shape
    pub fn aabb(&self) -> Aabb {
        match self.shape {
            Shape::Circle { radius } => Aabb::from_center_half_extents(
                self.position,
                Vector2::new(radius, radius),
            ),
            Shape::Rectangle { .. } => Aabb::from_points(&self.corners()),
        }
    }

    /// Returns whether the given world point lies inside the shape
    pub fn contains_point(&self, point: &Vector2) -> bool {
        match self.shape {
            Shape::Circle { radius } => {
                self.position.distance_squared(point) <= radius * radius
            }
            Shape::Rectangle { width, height } => {
                let local = (*point - self.position).rotated(-self.angle);
                local.x.abs() <= width * 0.5 && local.y.abs() <= height * 0.5
            }
        }
    }
}

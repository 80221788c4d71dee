use crate::math::Vector2;

/// An axis-aligned bounding box in 2D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// The minimum corner of the box
    pub min: Vector2,

    /// The maximum corner of the box
    pub max: Vector2,
}

impl Aabb {
    /// Creates a new AABB from minimum and maximum corners
    pub fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    /// Creates an AABB from a center point and half extents
    pub fn from_center_half_extents(center: Vector2, half_extents: Vector2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates an AABB that tightly contains the given points
    pub fn from_points(points: &[Vector2]) -> Self {
        let mut min = Vector2::new(f64::MAX, f64::MAX);
        let mut max = Vector2::new(f64::MIN, f64::MIN);

        for point in points {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
        }

        Self { min, max }
    }

    /// Returns the center of the box
    #[inline]
    pub fn center(&self) -> Vector2 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half extents of the box
    #[inline]
    pub fn half_extents(&self) -> Vector2 {
        (self.max - self.min) * 0.5
    }

    /// Returns whether this box overlaps another box
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Returns whether this box contains the given point
    #[inline]
    pub fn contains_point(&self, point: &Vector2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Returns the smallest box containing both boxes
    pub fn merged(&self, other: &Aabb) -> Self {
        Self {
            min: Vector2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vector2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Returns this box expanded by the given margin on all sides
    pub fn expanded(&self, margin: f64) -> Self {
        let m = Vector2::new(margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }
}

/// An oriented bounding box exposed at the rendering boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// The x coordinate of the box center in world space
    pub x: f64,

    /// The y coordinate of the box center in world space
    pub y: f64,

    /// The width of the box
    pub width: f64,

    /// The height of the box
    pub height: f64,

    /// The rotation of the box in degrees
    pub rotation: f64,
}

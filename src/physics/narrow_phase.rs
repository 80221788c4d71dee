use crate::math::{Vector2, EPSILON};
use crate::physics::{ContactManifold, Shape, WorldShape};

/// Tests two world-space shapes for intersection
///
/// The returned manifold's normal points from `a` toward `b`.
pub fn collide(a: &WorldShape, b: &WorldShape) -> Option<ContactManifold> {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(a.position, ra, b.position, rb)
        }
        (Shape::Rectangle { .. }, Shape::Rectangle { .. }) => rect_rect(a, b),
        (Shape::Circle { radius }, Shape::Rectangle { .. }) => circle_rect(a.position, radius, b),
        (Shape::Rectangle { .. }, Shape::Circle { radius }) => {
            circle_rect(b.position, radius, a).map(|m| m.flipped())
        }
    }
}

/// Cheap axis-aligned reject before the narrow phase
pub fn aabb_overlap(a: &WorldShape, b: &WorldShape) -> bool {
    a.aabb().overlaps(&b.aabb())
}

/// Circle versus circle
///
/// Intersecting iff the center distance is strictly below the radius sum.
/// Coincident centers are a degenerate non-collision: there is no meaningful
/// normal, so the pair is reported as separate rather than resolved along a
/// made-up direction.
fn circle_circle(
    center_a: Vector2,
    radius_a: f64,
    center_b: Vector2,
    radius_b: f64,
) -> Option<ContactManifold> {
    let diff = center_b - center_a;
    let distance = diff.length();

    if distance < EPSILON {
        return None;
    }
    if distance >= radius_a + radius_b {
        return None;
    }

    let normal = diff / distance;
    let penetration = radius_a + radius_b - distance;
    let contact_point = center_a + normal * (radius_a - penetration * 0.5);

    Some(ContactManifold::new(normal, penetration, contact_point))
}

/// Rotated rectangle versus rotated rectangle, via the separating axis test
///
/// Each rectangle contributes its two distinct edge normals, tested in the
/// fixed order A0, A1, B0, B1. The minimum-overlap axis becomes the collision
/// normal; ties keep the first axis evaluated. The contact point is the
/// centroid of all corners interior to the other rectangle, or the midpoint
/// of both centers for edge-on-edge contact. The centroid fallback is an
/// approximation, kept as documented behavior.
fn rect_rect(a: &WorldShape, b: &WorldShape) -> Option<ContactManifold> {
    let corners_a = a.corners();
    let corners_b = b.corners();
    let axes_a = a.axes();
    let axes_b = b.axes();
    let axes = [axes_a[0], axes_a[1], axes_b[0], axes_b[1]];

    let mut min_overlap = f64::MAX;
    let mut best_axis = Vector2::zero();

    for axis in &axes {
        let (min_a, max_a) = project(&corners_a, axis);
        let (min_b, max_b) = project(&corners_b, axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);

        if overlap <= 0.0 {
            return None;
        }
        if overlap < min_overlap {
            min_overlap = overlap;
            best_axis = *axis;
        }
    }

    // Orient the normal from a toward b
    let mut normal = best_axis;
    if (b.position - a.position).dot(&normal) < 0.0 {
        normal = -normal;
    }

    let mut interior = Vec::new();
    for corner in &corners_a {
        if b.contains_point(corner) {
            interior.push(*corner);
        }
    }
    for corner in &corners_b {
        if a.contains_point(corner) {
            interior.push(*corner);
        }
    }

    let contact_point = if interior.is_empty() {
        (a.position + b.position) * 0.5
    } else {
        let sum = interior
            .iter()
            .fold(Vector2::zero(), |acc, p| acc + *p);
        sum / interior.len() as f64
    };

    Some(ContactManifold::new(normal, min_overlap, contact_point))
}

/// Circle versus rotated rectangle
///
/// Finds the closest point on the rectangle's boundary to the circle center.
/// A center outside the rectangle collides when the distance is at most the
/// radius; a center inside always collides and is pushed out through the
/// nearest edge.
fn circle_rect(center: Vector2, radius: f64, rect: &WorldShape) -> Option<ContactManifold> {
    let corners = rect.corners();

    let mut closest = corners[0];
    let mut closest_dist_sq = f64::MAX;
    for i in 0..4 {
        let q = closest_point_on_segment(&center, &corners[i], &corners[(i + 1) % 4]);
        let dist_sq = center.distance_squared(&q);
        if dist_sq < closest_dist_sq {
            closest_dist_sq = dist_sq;
            closest = q;
        }
    }

    let distance = closest_dist_sq.sqrt();
    let inside = rect.contains_point(&center);

    if inside {
        // Push the circle out through the nearest edge; the normal points
        // from the closest boundary point toward the center.
        let normal = if distance > EPSILON {
            (center - closest) / distance
        } else {
            Vector2::zero()
        };
        let penetration = radius + distance;
        return Some(ContactManifold::new(normal, penetration, closest));
    }

    if distance > radius {
        return None;
    }
    if distance < EPSILON {
        return None;
    }

    let normal = (closest - center) / distance;
    let penetration = radius - distance;
    Some(ContactManifold::new(normal, penetration, closest))
}

/// Projects a corner set onto an axis, returning the (min, max) interval
fn project(corners: &[Vector2; 4], axis: &Vector2) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for corner in corners {
        let d = corner.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Returns the closest point to `p` on the segment from `a` to `b`
fn closest_point_on_segment(p: &Vector2, a: &Vector2, b: &Vector2) -> Vector2 {
    let ab = *b - *a;
    let length_sq = ab.length_squared();
    if length_sq < EPSILON {
        return *a;
    }
    let t = ((*p - *a).dot(&ab) / length_sq).clamp(0.0, 1.0);
    *a + ab * t
}

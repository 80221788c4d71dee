use approx::assert_relative_eq;
use scene2d::math::{clamp, lerp, to_degrees, to_radians, Aabb, Vector2};
use std::f64::consts::PI;

#[test]
fn test_vector2_operations() {
    let v1 = Vector2::new(3.0, 4.0);
    let v2 = Vector2::new(1.0, 2.0);

    // Addition and subtraction
    let sum = v1 + v2;
    assert_eq!(sum.x, 4.0);
    assert_eq!(sum.y, 6.0);

    let diff = v1 - v2;
    assert_eq!(diff.x, 2.0);
    assert_eq!(diff.y, 2.0);

    // Scalar multiplication and division
    let scaled = v1 * 2.0;
    assert_eq!(scaled.x, 6.0);
    assert_eq!(scaled.y, 8.0);

    let halved = v1 / 2.0;
    assert_eq!(halved.x, 1.5);
    assert_eq!(halved.y, 2.0);

    // Dot and cross products
    assert_eq!(v1.dot(&v2), 3.0 + 8.0);
    assert_eq!(v1.cross(&v2), 3.0 * 2.0 - 4.0 * 1.0);

    // Length
    assert_relative_eq!(v1.length(), 5.0);
    assert_relative_eq!(v1.length_squared(), 25.0);

    // Normalize
    let normalized = v1.normalize();
    assert_relative_eq!(normalized.length(), 1.0);
    assert_relative_eq!(normalized.x, 0.6);
    assert_relative_eq!(normalized.y, 0.8);

    // Distance
    assert_relative_eq!(v1.distance(&v2), (4.0f64 + 4.0).sqrt());
}

#[test]
fn test_vector2_rotation() {
    let v = Vector2::new(1.0, 0.0);

    let quarter = v.rotated(PI / 2.0);
    assert_relative_eq!(quarter.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(quarter.y, 1.0, epsilon = 1e-12);

    let half = v.rotated(PI);
    assert_relative_eq!(half.x, -1.0, epsilon = 1e-12);
    assert_relative_eq!(half.y, 0.0, epsilon = 1e-12);

    // Rotating back recovers the original vector
    let round_trip = quarter.rotated(-PI / 2.0);
    assert_relative_eq!(round_trip.x, v.x, epsilon = 1e-12);
    assert_relative_eq!(round_trip.y, v.y, epsilon = 1e-12);

    // Rotation preserves length
    let long = Vector2::new(3.0, -7.0);
    assert_relative_eq!(long.rotated(1.234).length(), long.length(), epsilon = 1e-12);
}

#[test]
fn test_vector2_perpendicular() {
    let v = Vector2::new(2.0, 5.0);
    let p = v.perpendicular();

    assert_relative_eq!(v.dot(&p), 0.0);
    assert_relative_eq!(p.length(), v.length());
}

#[test]
fn test_vector2_lerp() {
    let a = Vector2::new(0.0, 0.0);
    let b = Vector2::new(10.0, -4.0);

    let mid = a.lerp(&b, 0.5);
    assert_relative_eq!(mid.x, 5.0);
    assert_relative_eq!(mid.y, -2.0);

    let start = a.lerp(&b, 0.0);
    assert_eq!(start, a);

    let end = a.lerp(&b, 1.0);
    assert_eq!(end, b);
}

#[test]
fn test_angle_conversions() {
    assert_relative_eq!(to_radians(180.0), PI);
    assert_relative_eq!(to_radians(90.0), PI / 2.0);
    assert_relative_eq!(to_degrees(PI), 180.0);
    assert_relative_eq!(to_degrees(to_radians(37.5)), 37.5, epsilon = 1e-12);
}

#[test]
fn test_scalar_helpers() {
    assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
    assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
    assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);

    assert_relative_eq!(lerp(0.0, 10.0, 0.25), 2.5);
    assert_relative_eq!(lerp(-2.0, 2.0, 0.5), 0.0);
}

#[test]
fn test_aabb_operations() {
    let a = Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(10.0, 10.0));
    let b = Aabb::new(Vector2::new(5.0, 5.0), Vector2::new(15.0, 15.0));
    let c = Aabb::new(Vector2::new(20.0, 20.0), Vector2::new(30.0, 30.0));

    assert!(a.overlaps(&b));
    assert!(b.overlaps(&a));
    assert!(!a.overlaps(&c));

    assert!(a.contains_point(&Vector2::new(5.0, 5.0)));
    assert!(!a.contains_point(&Vector2::new(11.0, 5.0)));

    let center = a.center();
    assert_relative_eq!(center.x, 5.0);
    assert_relative_eq!(center.y, 5.0);

    let merged = a.merged(&c);
    assert_eq!(merged.min, Vector2::new(0.0, 0.0));
    assert_eq!(merged.max, Vector2::new(30.0, 30.0));
}

#[test]
fn test_aabb_from_points() {
    let points = [
        Vector2::new(3.0, -1.0),
        Vector2::new(-2.0, 4.0),
        Vector2::new(0.0, 0.0),
    ];
    let aabb = Aabb::from_points(&points);

    assert_eq!(aabb.min, Vector2::new(-2.0, -1.0));
    assert_eq!(aabb.max, Vector2::new(3.0, 4.0));
}

#[test]
fn test_aabb_from_center() {
    let aabb = Aabb::from_center_half_extents(Vector2::new(5.0, 5.0), Vector2::new(2.0, 3.0));
    assert_eq!(aabb.min, Vector2::new(3.0, 2.0));
    assert_eq!(aabb.max, Vector2::new(7.0, 8.0));
}

use crate::math::{Vector2, EPSILON};
use crate::physics::{ContactManifold, PhysicsConfig};

/// The state of one body as seen by the contact resolver
///
/// Static bodies carry zero inverse mass and zero inverse inertia, which
/// makes every phase a no-op on them by construction.
#[derive(Debug, Clone, Copy)]
pub struct ResolveBody {
    pub position: Vector2,
    pub velocity: Vector2,
    pub angular_velocity: f64,
    pub inv_mass: f64,
    pub inv_inertia: f64,
    pub restitution: f64,
    pub static_friction: f64,
    pub dynamic_friction: f64,
}

/// The impulses applied while resolving a contact
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactResolution {
    /// Whether any phase ran (false for a fully static or separating pair)
    pub resolved: bool,

    /// Magnitude of the normal impulse
    pub normal_impulse: f64,

    /// Magnitude of the tangential (friction) impulse
    pub tangent_impulse: f64,
}

/// Resolves a contact between two bodies in three phases
///
/// 1. Positional correction along the normal, split by inverse-mass share,
///    with a slop tolerance so near-zero penetration is not corrected.
/// 2. A normal impulse with combined restitution `sqrt(e_a * e_b)`, skipped
///    for separating pairs.
/// 3. A friction impulse clamped by Coulomb's law, switching from static to
///    dynamic friction when the bound is exceeded.
///
/// Each phase is idempotent on an already-separated pair. A degenerate
/// normal falls back to a fixed direction instead of propagating NaN.
pub fn resolve_contact(
    a: &mut ResolveBody,
    b: &mut ResolveBody,
    manifold: &ContactManifold,
    config: &PhysicsConfig,
) -> ContactResolution {
    let total_inv_mass = a.inv_mass + b.inv_mass;
    if total_inv_mass <= 0.0 {
        return ContactResolution::default();
    }

    let normal = if manifold.normal.length_squared() < EPSILON {
        config.fallback_normal
    } else {
        manifold.normal.normalize()
    };

    // Phase 1: positional correction
    let penetration = (manifold.penetration - config.penetration_slop).max(0.0);
    let correction = normal * (penetration / total_inv_mass * config.correction_factor);
    a.position -= correction * a.inv_mass;
    b.position += correction * b.inv_mass;

    // Phase 2: normal impulse
    let r_a = manifold.contact_point - a.position;
    let r_b = manifold.contact_point - b.position;

    let vel_a = a.velocity + angular_contribution(a.angular_velocity, &r_a);
    let vel_b = b.velocity + angular_contribution(b.angular_velocity, &r_b);
    let relative = vel_b - vel_a;
    let along_normal = relative.dot(&normal);

    // Separating pairs are left alone
    if along_normal > 0.0 {
        return ContactResolution {
            resolved: true,
            ..Default::default()
        };
    }

    let mut restitution = (a.restitution * b.restitution).sqrt();
    if along_normal.abs() < config.restitution_velocity_threshold {
        restitution = 0.0;
    }

    let r_a_cross_n = r_a.cross(&normal);
    let r_b_cross_n = r_b.cross(&normal);
    let normal_mass = total_inv_mass
        + r_a_cross_n * r_a_cross_n * a.inv_inertia
        + r_b_cross_n * r_b_cross_n * b.inv_inertia;
    if normal_mass <= 0.0 {
        return ContactResolution {
            resolved: true,
            ..Default::default()
        };
    }

    let j = -(1.0 + restitution) * along_normal / normal_mass;
    let impulse = normal * j;

    apply_impulse(a, -impulse, &r_a);
    apply_impulse(b, impulse, &r_b);

    // Phase 3: friction impulse
    let vel_a = a.velocity + angular_contribution(a.angular_velocity, &r_a);
    let vel_b = b.velocity + angular_contribution(b.angular_velocity, &r_b);
    let relative = vel_b - vel_a;
    let tangent_dir = relative - normal * relative.dot(&normal);

    let mut tangent_impulse = 0.0;
    if !tangent_dir.is_zero() {
        let tangent = tangent_dir.normalize();

        let r_a_cross_t = r_a.cross(&tangent);
        let r_b_cross_t = r_b.cross(&tangent);
        let tangent_mass = total_inv_mass
            + r_a_cross_t * r_a_cross_t * a.inv_inertia
            + r_b_cross_t * r_b_cross_t * b.inv_inertia;

        if tangent_mass > 0.0 {
            let jt = -relative.dot(&tangent) / tangent_mass;

            let mu_static = (a.static_friction * b.static_friction).sqrt();
            let friction = if jt.abs() <= j * mu_static {
                tangent * jt
            } else {
                let mu_dynamic = (a.dynamic_friction * b.dynamic_friction).sqrt();
                tangent * (-j * mu_dynamic)
            };

            apply_impulse(a, -friction, &r_a);
            apply_impulse(b, friction, &r_b);
            tangent_impulse = friction.length();
        }
    }

    ContactResolution {
        resolved: true,
        normal_impulse: j,
        tangent_impulse,
    }
}

/// Velocity of a point offset `r` from the center due to rotation
#[inline]
fn angular_contribution(angular_velocity: f64, r: &Vector2) -> Vector2 {
    Vector2::new(-angular_velocity * r.y, angular_velocity * r.x)
}

/// Applies a linear and angular impulse to one body
#[inline]
fn apply_impulse(body: &mut ResolveBody, impulse: Vector2, r: &Vector2) {
    body.velocity += impulse * body.inv_mass;
    body.angular_velocity += r.cross(&impulse) * body.inv_inertia;
}

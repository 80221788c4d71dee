//! The 2D physics layer
//!
//! Bodies are ordinary scene nodes carrying a [`PhysicsUnit`]. The layer has
//! no solver loop of its own: each body integrates, collides and resolves
//! during its node's update hook, in the graph's deterministic traversal
//! order. Narrow-phase detection, contact resolution, rope constraints and
//! gravity wells are plain functions and data types usable on their own.

pub mod body;
pub mod chain;
pub mod manifold;
pub mod material;
pub mod narrow_phase;
pub mod resolver;
pub mod shape;
pub mod unit;
pub mod well;
pub mod world;

pub use body::{BodyState, ForceKind};
pub use chain::{Chain, ChainPoint};
pub use manifold::ContactManifold;
pub use material::Material;
pub use narrow_phase::{aabb_overlap, collide};
pub use resolver::{resolve_contact, ContactResolution, ResolveBody};
pub use shape::{Shape, WorldShape};
pub use unit::PhysicsUnit;
pub use well::{GravityWell, WellDestination};
pub use world::{ContactEvent, EventQueue, PhysicsConfig, TeleportEvent, WorldContext};

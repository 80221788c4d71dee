pub mod storage;
pub mod node;
pub mod unit;
pub mod registry;
pub mod graph;
mod clone;
mod serialize;

pub use self::storage::{NodeHandle, NodeStorage};
pub use self::node::{Node, NodeFlags, Size};
pub use self::unit::{
    BehaviorUnit, HandleMap, NodeLink, PlaceholderUnit, PropertyKind, PropertySpec, UnitCore,
};
pub use self::registry::{UnitFactory, UnitRegistry};
pub use self::graph::SceneGraph;
pub use self::serialize::{NodeData, UnitData};

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Generates a fresh string id with the given prefix
///
/// Ids are unique within a process; loaded scenes keep their persisted ids.
pub(crate) fn fresh_id(prefix: &str) -> String {
    let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:06x}", prefix, n)
}

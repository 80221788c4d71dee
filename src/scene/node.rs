use std::collections::BTreeSet;

use bitflags::bitflags;

use crate::math::Vector2;
use crate::scene::{fresh_id, BehaviorUnit, NodeHandle};

bitflags! {
    /// Runtime flags for a scene node
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeFlags: u32 {
        /// The node and its subtree participate in the frame lifecycle
        const ACTIVE            = 0x01;

        /// The node is drawn
        const VISIBLE           = 0x02;

        /// The node is selected in the editor
        const SELECTED          = 0x04;

        /// The node's physics unit takes part in collision checks
        const COLLISION_ENABLED = 0x08;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        NodeFlags::ACTIVE | NodeFlags::VISIBLE | NodeFlags::COLLISION_ENABLED
    }
}

/// The width and height of a node, used for its render bounds
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Creates a new size
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}

/// A node in the scene graph
///
/// A node owns its local transform, an ordered list of behavior units and an
/// ordered list of child handles. The parent back-reference and the parent's
/// child list are kept in agreement by the graph's hierarchy operations; the
/// world transform is always derived from the ancestor chain, never stored.
pub struct Node {
    /// Stable string identity, preserved across serialization
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Free-form string tags
    pub tags: BTreeSet<String>,

    /// Local position relative to the parent
    pub position: Vector2,

    /// Local rotation in degrees
    pub angle: f64,

    /// Local scale
    pub scale: Vector2,

    /// Pivot point, normalized to the node's size (0..1)
    pub origin: Vector2,

    /// Width and height used for the render bounds
    pub size: Size,

    /// Draw ordering depth
    pub depth: f64,

    /// Runtime flags
    pub flags: NodeFlags,

    /// The collision layer bit this node occupies
    pub collision_layer: u32,

    /// The mask of layers this node collides with
    pub collision_mask: u32,

    /// The parent handle, if any
    pub(crate) parent: Option<NodeHandle>,

    /// Ordered child handles
    pub(crate) children: Vec<NodeHandle>,

    /// Ordered behavior units attached to this node
    pub(crate) units: Vec<Box<dyn BehaviorUnit>>,
}

impl Node {
    /// Creates a new node with the given name and default transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: fresh_id("node"),
            name: name.into(),
            tags: BTreeSet::new(),
            position: Vector2::zero(),
            angle: 0.0,
            scale: Vector2::one(),
            origin: Vector2::new(0.5, 0.5),
            size: Size::default(),
            depth: 0.0,
            flags: NodeFlags::default(),
            collision_layer: 1,
            collision_mask: u32::MAX,
            parent: None,
            children: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Returns the parent handle, if any
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns the ordered child handles
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Returns whether the node is active
    pub fn is_active(&self) -> bool {
        self.flags.contains(NodeFlags::ACTIVE)
    }

    /// Sets whether the node is active
    pub fn set_active(&mut self, active: bool) {
        self.flags.set(NodeFlags::ACTIVE, active);
    }

    /// Returns whether the node is visible
    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    /// Sets whether the node is visible
    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(NodeFlags::VISIBLE, visible);
    }

    /// Returns whether the node participates in collision checks
    pub fn is_collision_enabled(&self) -> bool {
        self.flags.contains(NodeFlags::COLLISION_ENABLED)
    }

    /// Sets whether the node participates in collision checks
    pub fn set_collision_enabled(&mut self, enabled: bool) {
        self.flags.set(NodeFlags::COLLISION_ENABLED, enabled);
    }

    /// Adds a tag to the node
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    /// Returns whether the node carries the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Removes a tag from the node
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Returns the number of attached behavior units
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Returns an iterator over the attached behavior units
    pub fn units(&self) -> impl Iterator<Item = &dyn BehaviorUnit> {
        self.units.iter().map(|u| u.as_ref())
    }

    /// Returns whether a unit with the given type name is attached
    pub fn has_unit_type(&self, type_name: &str) -> bool {
        self.units.iter().any(|u| u.type_name() == type_name)
    }
}

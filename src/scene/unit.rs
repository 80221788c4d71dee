use std::any::Any;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scene::{NodeHandle, SceneGraph};
use crate::physics::WorldContext;
use crate::Result;

/// A table mapping original node handles to their clones
///
/// Built once per clone operation and handed to every cloned unit so that
/// internal references into the original subtree can be rewritten.
pub type HandleMap = HashMap<NodeHandle, NodeHandle>;

/// State shared by every behavior unit implementation
#[derive(Debug, Clone, Default)]
pub struct UnitCore {
    /// Stable string identity, preserved across serialization
    pub id: String,

    /// Whether the start hook has already run
    pub started: bool,
}

/// The kind of an exposed property, with editing constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PropertyKind {
    /// A numeric property with optional range constraints
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },

    /// A true/false property
    Boolean,

    /// A free-form text property
    Text,

    /// A 2D vector property
    Vector2,

    /// A choice from a fixed set of options
    Options { options: Vec<String> },
}

/// A property a unit exposes for editor display and serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySpec {
    /// The property name
    pub name: String,

    /// The property kind and constraints
    pub kind: PropertyKind,

    /// The current value as JSON
    pub value: Value,
}

impl PropertySpec {
    /// Creates a new property specification
    pub fn new(name: impl Into<String>, kind: PropertyKind, value: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
        }
    }
}

/// A serializable reference to another node, resolved by id at runtime
///
/// The handle cache is transient; after deserialization the link is resolved
/// again by scanning for the node id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeLink {
    /// The stable id of the referenced node
    pub node_id: String,

    #[serde(skip)]
    handle: Option<NodeHandle>,
}

impl NodeLink {
    /// Creates a link to the given node
    pub fn new(handle: NodeHandle, graph: &SceneGraph) -> Option<Self> {
        let node = graph.node(handle)?;
        Some(Self {
            node_id: node.id.clone(),
            handle: Some(handle),
        })
    }

    /// Resolves the link to a live handle, caching the result
    pub fn resolve(&mut self, graph: &SceneGraph) -> Option<NodeHandle> {
        if let Some(handle) = self.handle {
            if graph.contains(handle) {
                return Some(handle);
            }
            self.handle = None;
        }

        let handle = graph.find_node_by_id(&self.node_id)?;
        self.handle = Some(handle);
        Some(handle)
    }

    /// Rewrites the link if its target was part of a cloned subtree
    pub fn remap(&mut self, map: &HandleMap, graph: &SceneGraph) {
        let current = match self.handle.or_else(|| graph.find_node_by_id(&self.node_id)) {
            Some(handle) => handle,
            None => return,
        };

        if let Some(&clone) = map.get(&current) {
            self.handle = Some(clone);
            if let Some(node) = graph.node(clone) {
                self.node_id = node.id.clone();
            }
        }
    }
}

/// A pluggable capability attached to a scene node
///
/// Units receive the full graph and world context in their lifecycle hooks;
/// the owning node's unit list is detached while its hooks run, so a hook may
/// freely query and mutate the rest of the graph.
pub trait BehaviorUnit: Any {
    /// Returns the type tag used for registry lookup and serialization
    fn type_name(&self) -> &str;

    /// Returns the shared unit state
    fn core(&self) -> &UnitCore;

    /// Returns the shared unit state mutably
    fn core_mut(&mut self) -> &mut UnitCore;

    /// Returns the unit's stable id
    fn id(&self) -> &str {
        &self.core().id
    }

    /// Sets the unit's stable id
    fn set_id(&mut self, id: String) {
        self.core_mut().id = id;
    }

    /// Returns whether the start hook has already run
    fn is_started(&self) -> bool {
        self.core().started
    }

    /// Marks the start hook as having run
    fn mark_started(&mut self) {
        self.core_mut().started = true;
    }

    /// Type names of units this unit requires on the same node
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    /// Whether more than one instance may be attached to a node
    fn allow_multiple(&self) -> bool {
        false
    }

    /// Properties exposed for editor display
    fn exposed_properties(&self) -> Vec<PropertySpec> {
        Vec::new()
    }

    /// Called when the unit is attached to a node
    fn on_attach(&mut self, _node: NodeHandle, _graph: &mut SceneGraph) {}

    /// Called once before start, for resource loading
    fn preload(
        &mut self,
        _node: NodeHandle,
        _graph: &mut SceneGraph,
        _world: &mut WorldContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Called once before the unit's first update
    fn start(
        &mut self,
        _node: NodeHandle,
        _graph: &mut SceneGraph,
        _world: &mut WorldContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Called at the top of every frame, before updates
    fn begin_frame(
        &mut self,
        _node: NodeHandle,
        _graph: &mut SceneGraph,
        _world: &mut WorldContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Called every frame with the elapsed time in seconds
    fn update(
        &mut self,
        _dt: f64,
        _node: NodeHandle,
        _graph: &mut SceneGraph,
        _world: &mut WorldContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Called at the end of every frame, after updates
    fn end_frame(
        &mut self,
        _node: NodeHandle,
        _graph: &mut SceneGraph,
        _world: &mut WorldContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Called during the draw pass for visible nodes
    fn draw(
        &mut self,
        _node: NodeHandle,
        _graph: &mut SceneGraph,
        _world: &mut WorldContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when the owning node is destroyed
    fn on_destroy(&mut self, _node: NodeHandle, _graph: &mut SceneGraph) {}

    /// Serializes the unit's state to a JSON data blob
    fn to_data(&self) -> Result<Value>;

    /// Deep-copies this unit
    fn clone_unit(&self) -> Box<dyn BehaviorUnit>;

    /// Rewrites internal node references after a subtree clone
    fn remap_references(&mut self, _map: &HandleMap, _graph: &SceneGraph) {}

    /// Upcast for typed capability queries
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed capability queries
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A stand-in for a unit whose concrete type could not be resolved
///
/// Preserves the original type name and data blob so nothing is lost when the
/// scene is serialized again.
#[derive(Debug, Clone)]
pub struct PlaceholderUnit {
    core: UnitCore,
    original_type: String,
    data: Value,
}

impl PlaceholderUnit {
    /// Creates a placeholder preserving the given type name and data
    pub fn new(original_type: impl Into<String>, data: Value) -> Self {
        Self {
            core: UnitCore::default(),
            original_type: original_type.into(),
            data,
        }
    }

    /// Returns the preserved data blob
    pub fn data(&self) -> &Value {
        &self.data
    }
}

impl BehaviorUnit for PlaceholderUnit {
    fn type_name(&self) -> &str {
        &self.original_type
    }

    fn core(&self) -> &UnitCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UnitCore {
        &mut self.core
    }

    fn to_data(&self) -> Result<Value> {
        Ok(self.data.clone())
    }

    fn clone_unit(&self) -> Box<dyn BehaviorUnit> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

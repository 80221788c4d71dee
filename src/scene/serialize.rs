use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::math::Vector2;
use crate::scene::{
    fresh_id, BehaviorUnit, Node, NodeHandle, PlaceholderUnit, SceneGraph, Size,
};
use crate::Result;

/// The serialized form of an attached behavior unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitData {
    /// The unit's type tag, resolved through the registry on load
    #[serde(rename = "type")]
    pub type_name: String,

    /// The unit's stable id
    #[serde(default)]
    pub id: String,

    /// The unit's serialized state
    #[serde(default)]
    pub data: Value,
}

/// The serialized form of a scene node and its subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub position: Vector2,

    #[serde(default = "one_vector")]
    pub scale: Vector2,

    #[serde(default = "center_origin")]
    pub origin: Vector2,

    #[serde(default)]
    pub size: Size,

    #[serde(default)]
    pub angle: f64,

    #[serde(default)]
    pub depth: f64,

    #[serde(default = "enabled")]
    pub active: bool,

    #[serde(default = "enabled")]
    pub visible: bool,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "enabled")]
    pub collision_enabled: bool,

    #[serde(default = "default_layer")]
    pub collision_layer: u32,

    #[serde(default = "default_mask")]
    pub collision_mask: u32,

    #[serde(default)]
    pub modules: Vec<UnitData>,

    #[serde(default)]
    pub children: Vec<NodeData>,
}

fn one_vector() -> Vector2 {
    Vector2::one()
}

fn center_origin() -> Vector2 {
    Vector2::new(0.5, 0.5)
}

fn enabled() -> bool {
    true
}

fn default_layer() -> u32 {
    1
}

fn default_mask() -> u32 {
    u32::MAX
}

impl SceneGraph {
    /// Serializes a subtree into its JSON value form
    pub fn to_json(&self, handle: NodeHandle) -> Result<Value> {
        let data = self.node_to_data(handle)?;
        Ok(serde_json::to_value(data)?)
    }

    /// Serializes a subtree into a pretty-printed JSON string
    pub fn to_json_string(&self, handle: NodeHandle) -> Result<String> {
        let data = self.node_to_data(handle)?;
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Deserializes a JSON node tree into the graph as a new root
    ///
    /// Module types that cannot be resolved through the registry are kept as
    /// placeholders carrying the original data blob, so a later save loses
    /// nothing.
    pub fn from_json(&mut self, value: Value) -> Result<NodeHandle> {
        let data: NodeData = serde_json::from_value(value)?;
        let handle = self.data_to_node(&data)?;
        self.push_root(handle);
        debug_assert!(self.is_hierarchy_consistent());
        Ok(handle)
    }

    /// Deserializes a JSON string node tree into the graph as a new root
    pub fn from_json_str(&mut self, json: &str) -> Result<NodeHandle> {
        let value: Value = serde_json::from_str(json)?;
        self.from_json(value)
    }

    fn node_to_data(&self, handle: NodeHandle) -> Result<NodeData> {
        let node = self.nodes.get_node(handle)?;

        let mut modules = Vec::with_capacity(node.units.len());
        for unit in &node.units {
            modules.push(UnitData {
                type_name: unit.type_name().to_string(),
                id: unit.id().to_string(),
                data: unit.to_data()?,
            });
        }

        let mut children = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            children.push(self.node_to_data(child)?);
        }

        Ok(NodeData {
            id: node.id.clone(),
            name: node.name.clone(),
            position: node.position,
            scale: node.scale,
            origin: node.origin,
            size: node.size,
            angle: node.angle,
            depth: node.depth,
            active: node.is_active(),
            visible: node.is_visible(),
            tags: node.tags.iter().cloned().collect(),
            collision_enabled: node.is_collision_enabled(),
            collision_layer: node.collision_layer,
            collision_mask: node.collision_mask,
            modules,
            children,
        })
    }

    fn data_to_node(&mut self, data: &NodeData) -> Result<NodeHandle> {
        let mut node = Node::new(data.name.clone());
        if !data.id.is_empty() {
            node.id = data.id.clone();
        }
        node.position = data.position;
        node.scale = data.scale;
        node.origin = data.origin;
        node.size = data.size;
        node.angle = data.angle;
        node.depth = data.depth;
        node.set_active(data.active);
        node.set_visible(data.visible);
        node.set_collision_enabled(data.collision_enabled);
        node.collision_layer = data.collision_layer;
        node.collision_mask = data.collision_mask;
        node.tags = data.tags.iter().cloned().collect();

        // Units are restored verbatim, without dependency auto-resolution:
        // a serialized node already lists its full unit set.
        for module in &data.modules {
            let mut unit: Box<dyn BehaviorUnit> = match self.registry().resolve(&module.type_name) {
                Some(factory) => factory(&module.data)?,
                None => {
                    log::warn!(
                        "unknown unit type '{}' on node '{}'; preserving as placeholder",
                        module.type_name,
                        data.name
                    );
                    Box::new(PlaceholderUnit::new(
                        module.type_name.clone(),
                        module.data.clone(),
                    ))
                }
            };
            if module.id.is_empty() {
                unit.set_id(fresh_id("unit"));
            } else {
                unit.set_id(module.id.clone());
            }
            node.units.push(unit);
        }

        let handle = self.nodes.add(node);
        for unit_index in 0..self.nodes.get_node(handle)?.units.len() {
            let mut unit = {
                let node = self.nodes.get_node_mut(handle)?;
                node.units.remove(unit_index)
            };
            unit.on_attach(handle, self);
            let node = self.nodes.get_node_mut(handle)?;
            node.units.insert(unit_index, unit);
        }

        for child_data in &data.children {
            let child = self.data_to_node(child_data)?;
            let node = self.nodes.get_node_mut(child)?;
            node.parent = Some(handle);
            self.nodes.get_node_mut(handle)?.children.push(child);
        }

        Ok(handle)
    }
}

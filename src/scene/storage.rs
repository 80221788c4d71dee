use std::collections::HashMap;

use crate::error::EngineError;
use crate::scene::Node;
use crate::Result;

/// A unique identifier for a node in the scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) u32);

/// Arena storage for scene nodes
///
/// Nodes are addressed by stable handles. An insertion-order list is kept
/// alongside the map so that iteration order is deterministic.
pub struct NodeStorage {
    items: HashMap<NodeHandle, Node>,
    order: Vec<NodeHandle>,
    next_id: u32,
}

impl NodeStorage {
    /// Creates a new empty storage
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
            // Start at 1, so 0 can represent invalid handle
            next_id: 1,
        }
    }

    /// Adds a node to the storage and returns its handle
    pub fn add(&mut self, node: Node) -> NodeHandle {
        let handle = NodeHandle(self.next_id);
        self.next_id += 1;
        self.items.insert(handle, node);
        self.order.push(handle);
        handle
    }

    /// Gets a reference to a node by its handle
    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        self.items.get(&handle)
    }

    /// Gets a mutable reference to a node by its handle
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.items.get_mut(&handle)
    }

    /// Removes a node from the storage
    pub fn remove(&mut self, handle: NodeHandle) -> Option<Node> {
        let node = self.items.remove(&handle);
        if node.is_some() {
            self.order.retain(|h| *h != handle);
        }
        node
    }

    /// Returns whether the storage contains the given handle
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.items.contains_key(&handle)
    }

    /// Returns the number of nodes in the storage
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the storage is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Clears all nodes from the storage
    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    /// Returns all handles in insertion order
    pub fn handles(&self) -> Vec<NodeHandle> {
        self.order.clone()
    }

    /// Returns an iterator over all nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.order
            .iter()
            .filter_map(move |h| self.items.get(h).map(|n| (*h, n)))
    }

    /// Gets a node by its handle, returning an error if not found
    pub fn get_node(&self, handle: NodeHandle) -> Result<&Node> {
        self.get(handle)
            .ok_or_else(|| EngineError::NodeNotFound(format!("{:?}", handle)))
    }

    /// Gets a mutable reference to a node by its handle, returning an error if not found
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Result<&mut Node> {
        self.get_mut(handle)
            .ok_or_else(|| EngineError::NodeNotFound(format!("{:?}", handle)))
    }
}

impl Default for NodeStorage {
    fn default() -> Self {
        Self::new()
    }
}

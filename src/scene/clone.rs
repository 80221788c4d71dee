use crate::scene::{fresh_id, HandleMap, Node, NodeHandle, SceneGraph};
use crate::Result;

impl SceneGraph {
    /// Deep-copies a subtree, rewriting every internal reference
    ///
    /// All nodes and units in the subtree are cloned with fresh ids. A handle
    /// remap table is built in one pass over the subtree, then every cloned
    /// unit rewrites its references through it, so nothing in the clone points
    /// back into the original subtree. The clone is attached next to the
    /// original: under the same parent, or as a root.
    ///
    /// When `suffix_copy` is set the cloned root's name gains a " (copy)"
    /// suffix.
    pub fn clone_subtree(&mut self, root: NodeHandle, suffix_copy: bool) -> Result<NodeHandle> {
        let original_parent = self.nodes.get_node(root)?.parent;
        let order = self.collect_subtree(root);

        // Pass 1: clone every node, building the remap table.
        let mut map = HandleMap::new();
        for &handle in &order {
            let clone = {
                let node = self.nodes.get_node(handle)?;
                clone_node(node)
            };
            let clone_handle = self.nodes.add(clone);
            map.insert(handle, clone_handle);
        }

        // Pass 2: mirror the hierarchy through the table.
        for &handle in &order {
            let children: Vec<NodeHandle> = self.nodes.get_node(handle)?.children.clone();
            let clone_handle = map[&handle];
            let clone_children: Vec<NodeHandle> = children.iter().map(|c| map[c]).collect();
            let parent = self.nodes.get_node(handle)?.parent;

            let clone_node = self.nodes.get_node_mut(clone_handle)?;
            clone_node.children = clone_children;
            clone_node.parent = if handle == root {
                original_parent
            } else {
                parent.map(|p| map[&p])
            };
        }

        let clone_root = map[&root];
        match original_parent {
            Some(parent) => self.nodes.get_node_mut(parent)?.children.push(clone_root),
            None => self.push_root(clone_root),
        }

        // Pass 3: rewrite unit references into the clone.
        for &handle in &order {
            let clone_handle = map[&handle];
            let mut units = match self.nodes.get_mut(clone_handle) {
                Some(node) => std::mem::take(&mut node.units),
                None => continue,
            };
            for unit in units.iter_mut() {
                unit.remap_references(&map, self);
            }
            if let Some(node) = self.nodes.get_mut(clone_handle) {
                node.units = units;
            }
        }

        if suffix_copy {
            let node = self.nodes.get_node_mut(clone_root)?;
            node.name.push_str(" (copy)");
        }

        debug_assert!(self.is_hierarchy_consistent());
        Ok(clone_root)
    }
}

/// Clones a node's own data and units, leaving hierarchy links empty
fn clone_node(node: &Node) -> Node {
    let mut clone = Node::new(node.name.clone());
    clone.id = fresh_id("node");
    clone.tags = node.tags.clone();
    clone.position = node.position;
    clone.angle = node.angle;
    clone.scale = node.scale;
    clone.origin = node.origin;
    clone.size = node.size;
    clone.depth = node.depth;
    clone.flags = node.flags;
    clone.collision_layer = node.collision_layer;
    clone.collision_mask = node.collision_mask;
    clone.units = node
        .units
        .iter()
        .map(|u| {
            let mut unit = u.clone_unit();
            unit.set_id(fresh_id("unit"));
            unit
        })
        .collect();
    clone
}

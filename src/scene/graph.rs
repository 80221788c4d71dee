use serde_json::Value;

use crate::math::{to_radians, BoundingBox, Vector2};
use crate::physics::WorldContext;
use crate::scene::{
    fresh_id, BehaviorUnit, Node, NodeHandle, NodeStorage, PlaceholderUnit, UnitRegistry,
};
use crate::Result;

/// The lifecycle phase being driven over the tree
#[derive(Debug, Clone, Copy, PartialEq)]
enum HookPhase {
    BeginFrame,
    Update(f64),
    EndFrame,
    Draw,
}

/// The scene graph: an arena of nodes forming a parent-child hierarchy
///
/// All hierarchy operations go through the graph so that the symmetry
/// invariant (a node's parent pointer agrees with its parent's child list)
/// holds at all times. Frame driving follows the engine loop contract:
/// `begin_frame`, `update(dt)`, `end_frame`, `draw`, each a pre-order
/// traversal where a parent's hooks run before its children's and an inactive
/// node's subtree is skipped entirely.
pub struct SceneGraph {
    pub(crate) nodes: NodeStorage,
    roots: Vec<NodeHandle>,
    registry: UnitRegistry,
}

impl SceneGraph {
    /// Creates a new scene graph with the built-in unit registry
    pub fn new() -> Self {
        Self::with_registry(UnitRegistry::new())
    }

    /// Creates a new scene graph with the given unit registry
    pub fn with_registry(registry: UnitRegistry) -> Self {
        Self {
            nodes: NodeStorage::new(),
            roots: Vec::new(),
            registry,
        }
    }

    /// Returns the unit registry
    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Returns the unit registry mutably, for registering custom unit types
    pub fn registry_mut(&mut self) -> &mut UnitRegistry {
        &mut self.registry
    }

    // === Hierarchy ===

    /// Adds a node to the graph as a root and returns its handle
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.add(node);
        self.roots.push(handle);
        handle
    }

    /// Returns the root handles in order
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    /// Appends a handle to the root list if it is not already there
    pub(crate) fn push_root(&mut self, handle: NodeHandle) {
        if !self.roots.contains(&handle) {
            self.roots.push(handle);
        }
    }

    /// Returns a reference to a node
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Returns a mutable reference to a node
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    /// Returns whether the graph contains the given handle
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains(handle)
    }

    /// Returns the number of nodes in the graph
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Finds a node by its stable string id
    pub fn find_node_by_id(&self, id: &str) -> Option<NodeHandle> {
        self.nodes.iter().find(|(_, n)| n.id == id).map(|(h, _)| h)
    }

    /// Finds the first node with the given name
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(h, _)| h)
    }

    /// Makes `child` a child of `parent`
    ///
    /// If the child already has a parent it is detached from it first, so a
    /// node is never parented twice. Parenting a node under its own
    /// descendant is rejected; the ancestor chain must stay acyclic.
    /// Returns the child handle.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<NodeHandle> {
        if parent == child {
            return Err(crate::error::EngineError::InvalidParameter(
                "a node cannot be its own child".into(),
            ));
        }
        self.nodes.get_node(parent)?;
        self.nodes.get_node(child)?;

        let mut ancestor = self.nodes.get_node(parent)?.parent;
        while let Some(handle) = ancestor {
            if handle == child {
                return Err(crate::error::EngineError::InvalidParameter(
                    "a node cannot be a child of its own descendant".into(),
                ));
            }
            ancestor = self.nodes.get_node(handle)?.parent;
        }

        self.detach(child);

        self.nodes.get_node_mut(child)?.parent = Some(parent);
        self.nodes.get_node_mut(parent)?.children.push(child);

        debug_assert!(self.is_hierarchy_consistent());
        Ok(child)
    }

    /// Removes `child` from `parent`'s child list
    ///
    /// Returns whether a removal occurred. The child stays in the graph as a
    /// root.
    pub fn remove_child(&mut self, parent: NodeHandle, child: NodeHandle) -> bool {
        let was_child = match self.nodes.get(child) {
            Some(node) => node.parent == Some(parent),
            None => return false,
        };
        if !was_child {
            return false;
        }

        self.detach(child);
        self.roots.push(child);

        debug_assert!(self.is_hierarchy_consistent());
        true
    }

    /// Detaches a node from its parent or the root list, leaving it dangling
    fn detach(&mut self, handle: NodeHandle) {
        let parent = match self.nodes.get(handle) {
            Some(node) => node.parent,
            None => return,
        };

        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(p) {
                    parent_node.children.retain(|c| *c != handle);
                }
                if let Some(node) = self.nodes.get_mut(handle) {
                    node.parent = None;
                }
            }
            None => {
                self.roots.retain(|r| *r != handle);
            }
        }
    }

    /// Removes a node and its whole subtree, notifying every unit
    ///
    /// Children are destroyed before their parent. Returns whether the node
    /// existed.
    pub fn remove_node(&mut self, handle: NodeHandle) -> bool {
        if !self.nodes.contains(handle) {
            return false;
        }

        self.detach(handle);

        let subtree = self.collect_subtree(handle);
        for &h in subtree.iter().rev() {
            if let Some(mut node) = self.nodes.remove(h) {
                for unit in node.units.iter_mut() {
                    unit.on_destroy(h, self);
                }
            }
        }

        debug_assert!(self.is_hierarchy_consistent());
        true
    }

    /// Collects a subtree in pre-order, including inactive nodes
    pub(crate) fn collect_subtree(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if let Some(node) = self.nodes.get(handle) {
                out.push(handle);
                for &child in node.children.iter().rev() {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Collects the handles of all nodes reachable through active ancestors,
    /// in pre-order
    fn collect_active(&self, visible_only: bool) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_active_into(root, visible_only, &mut out);
        }
        out
    }

    fn collect_active_into(&self, handle: NodeHandle, visible_only: bool, out: &mut Vec<NodeHandle>) {
        let node = match self.nodes.get(handle) {
            Some(node) => node,
            None => return,
        };
        if !node.is_active() || (visible_only && !node.is_visible()) {
            return;
        }
        out.push(handle);
        for &child in &node.children {
            self.collect_active_into(child, visible_only, out);
        }
    }

    /// Verifies the parent/child symmetry invariant over the whole graph
    pub fn is_hierarchy_consistent(&self) -> bool {
        for (handle, node) in self.nodes.iter() {
            match node.parent {
                Some(parent) => {
                    let ok = self
                        .nodes
                        .get(parent)
                        .map(|p| p.children.contains(&handle))
                        .unwrap_or(false);
                    if !ok || self.roots.contains(&handle) {
                        return false;
                    }
                }
                None => {
                    if !self.roots.contains(&handle) {
                        return false;
                    }
                }
            }
            for &child in &node.children {
                let ok = self
                    .nodes
                    .get(child)
                    .map(|c| c.parent == Some(handle))
                    .unwrap_or(false);
                if !ok {
                    return false;
                }
            }
        }
        true
    }

    // === World transform ===

    /// Returns the node's rotation in world space, in degrees
    ///
    /// The world rotation is the sum of the node's angle and every ancestor's
    /// angle. Derived on every call; depth is small in practice.
    pub fn world_rotation(&self, handle: NodeHandle) -> f64 {
        let mut rotation = 0.0;
        let mut current = Some(handle);
        while let Some(h) = current {
            match self.nodes.get(h) {
                Some(node) => {
                    rotation += node.angle;
                    current = node.parent;
                }
                None => break,
            }
        }
        rotation
    }

    /// Returns the node's position in world space
    ///
    /// The local position is rotated by the parent's world rotation and
    /// translated by the parent's world position, recursively.
    pub fn world_position(&self, handle: NodeHandle) -> Vector2 {
        let node = match self.nodes.get(handle) {
            Some(node) => node,
            None => return Vector2::zero(),
        };

        match node.parent {
            Some(parent) => {
                let parent_rotation = to_radians(self.world_rotation(parent));
                self.world_position(parent) + node.position.rotated(parent_rotation)
            }
            None => node.position,
        }
    }

    /// Returns the node's scale in world space, the component-wise product of
    /// its own scale and every ancestor's scale
    pub fn world_scale(&self, handle: NodeHandle) -> Vector2 {
        let node = match self.nodes.get(handle) {
            Some(node) => node,
            None => return Vector2::one(),
        };

        match node.parent {
            Some(parent) => self.world_scale(parent).scaled(&node.scale),
            None => node.scale,
        }
    }

    /// Sets the node's world-space position by converting it into the
    /// parent's local frame
    pub fn set_world_position(&mut self, handle: NodeHandle, world: Vector2) -> Result<()> {
        let parent = self.nodes.get_node(handle)?.parent;
        let local = match parent {
            Some(p) => {
                let parent_rotation = to_radians(self.world_rotation(p));
                (world - self.world_position(p)).rotated(-parent_rotation)
            }
            None => world,
        };
        self.nodes.get_node_mut(handle)?.position = local;
        Ok(())
    }

    /// Returns the oriented bounding box the renderer consumes for this node
    pub fn bounding_box(&self, handle: NodeHandle) -> Result<BoundingBox> {
        let node = self.nodes.get_node(handle)?;
        let position = self.world_position(handle);
        let scale = self.world_scale(handle);
        Ok(BoundingBox {
            x: position.x,
            y: position.y,
            width: node.size.width * scale.x.abs(),
            height: node.size.height * scale.y.abs(),
            rotation: self.world_rotation(handle),
        })
    }

    // === Behavior units ===

    /// Attaches a behavior unit to a node, returning its index in the node's
    /// unit list
    ///
    /// A second instance of a non-multi-instance type is rejected: the index
    /// of the existing instance is returned and a warning is logged. Declared
    /// dependency types that are missing from the node are resolved through
    /// the registry and attached first; an unresolvable dependency is
    /// substituted with a placeholder so the requirement stays visible, and a
    /// dependency cycle is broken with a warning instead of recursing.
    pub fn attach_unit(
        &mut self,
        handle: NodeHandle,
        unit: Box<dyn BehaviorUnit>,
    ) -> Result<usize> {
        let mut resolving = Vec::new();
        self.attach_unit_guarded(handle, unit, &mut resolving)
    }

    fn attach_unit_guarded(
        &mut self,
        handle: NodeHandle,
        mut unit: Box<dyn BehaviorUnit>,
        resolving: &mut Vec<String>,
    ) -> Result<usize> {
        let node = self.nodes.get_node(handle)?;

        if !unit.allow_multiple() {
            if let Some(index) = node
                .units
                .iter()
                .position(|u| u.type_name() == unit.type_name())
            {
                log::warn!(
                    "unit type '{}' is already attached to node '{}'; keeping the existing instance",
                    unit.type_name(),
                    node.name
                );
                return Ok(index);
            }
        }

        // Types on the resolution path are skipped to break dependency cycles
        resolving.push(unit.type_name().to_string());
        for dep in unit.dependencies() {
            if self.nodes.get_node(handle)?.has_unit_type(dep) {
                continue;
            }
            if resolving.iter().any(|t| t == dep) {
                log::warn!(
                    "dependency cycle through unit type '{}'; skipping its auto-attach",
                    dep
                );
                continue;
            }
            match self.registry.resolve(dep) {
                Some(factory) => {
                    let dep_unit = factory(&Value::Null)?;
                    self.attach_unit_guarded(handle, dep_unit, resolving)?;
                }
                None => {
                    log::warn!(
                        "dependency unit type '{}' is not registered; attaching a placeholder",
                        dep
                    );
                    let placeholder = Box::new(PlaceholderUnit::new(*dep, Value::Null));
                    self.attach_unit_guarded(handle, placeholder, resolving)?;
                }
            }
        }
        resolving.pop();

        if unit.id().is_empty() {
            unit.set_id(fresh_id("unit"));
        }
        unit.on_attach(handle, self);

        let node = self.nodes.get_node_mut(handle)?;
        node.units.push(unit);
        Ok(node.units.len() - 1)
    }

    /// Detaches the unit with the given id from a node
    pub fn detach_unit(&mut self, handle: NodeHandle, unit_id: &str) -> Option<Box<dyn BehaviorUnit>> {
        let node = self.nodes.get_mut(handle)?;
        let index = node.units.iter().position(|u| u.id() == unit_id)?;
        let mut unit = node.units.remove(index);
        unit.on_destroy(handle, self);
        Some(unit)
    }

    /// Returns the first unit of the given concrete type on a node
    pub fn unit_ref<T: BehaviorUnit>(&self, handle: NodeHandle) -> Option<&T> {
        self.nodes
            .get(handle)?
            .units
            .iter()
            .find_map(|u| u.as_any().downcast_ref::<T>())
    }

    /// Returns the first unit of the given concrete type on a node, mutably
    pub fn unit_mut<T: BehaviorUnit>(&mut self, handle: NodeHandle) -> Option<&mut T> {
        self.nodes
            .get_mut(handle)?
            .units
            .iter_mut()
            .find_map(|u| u.as_any_mut().downcast_mut::<T>())
    }

    /// Returns whether a node carries a unit with the given type name
    pub fn has_unit(&self, handle: NodeHandle, type_name: &str) -> bool {
        self.nodes
            .get(handle)
            .map(|n| n.has_unit_type(type_name))
            .unwrap_or(false)
    }

    // === Frame driving ===

    /// Runs the begin-frame hooks over the active tree
    pub fn begin_frame(&mut self, world: &mut WorldContext) {
        world.begin_tick();
        self.register_bodies(world);
        let order = self.collect_active(false);
        self.run_phase(HookPhase::BeginFrame, &order, world);
    }

    /// Runs the update hooks over the active tree with the elapsed time in
    /// seconds
    ///
    /// Pending preload/start hooks run here, before the unit's first update.
    pub fn update(&mut self, dt: f64, world: &mut WorldContext) {
        self.register_bodies(world);
        let order = self.collect_active(false);
        self.run_phase(HookPhase::Update(dt), &order, world);
    }

    /// Runs the end-frame hooks over the active tree
    pub fn end_frame(&mut self, world: &mut WorldContext) {
        let order = self.collect_active(false);
        self.run_phase(HookPhase::EndFrame, &order, world);
    }

    /// Runs the draw hooks over the active, visible tree
    pub fn draw(&mut self, world: &mut WorldContext) {
        let order = self.collect_active(true);
        self.run_phase(HookPhase::Draw, &order, world);
    }

    /// Rebuilds the world's flat body list in deterministic traversal order
    fn register_bodies(&self, world: &mut WorldContext) {
        let order = self.collect_active(false);
        let bodies: Vec<NodeHandle> = order
            .into_iter()
            .filter(|&h| self.has_unit(h, crate::physics::PhysicsUnit::TYPE_NAME))
            .collect();
        world.set_bodies(bodies);
    }

    /// Drives one lifecycle phase over the given handles
    ///
    /// Each node's unit list is detached while its hooks run, so hooks
    /// receive the graph mutably. A failing hook is logged with the unit type
    /// and node name and does not stop the pass.
    fn run_phase(&mut self, phase: HookPhase, order: &[NodeHandle], world: &mut WorldContext) {
        for &handle in order {
            let (mut units, node_name) = match self.nodes.get_mut(handle) {
                Some(node) => (std::mem::take(&mut node.units), node.name.clone()),
                None => continue,
            };

            for unit in units.iter_mut() {
                if let HookPhase::Update(_) = phase {
                    if !unit.is_started() {
                        if let Err(err) = unit
                            .preload(handle, self, world)
                            .and_then(|_| unit.start(handle, self, world))
                        {
                            log::warn!(
                                "start of unit '{}' failed on node '{}': {}",
                                unit.type_name(),
                                node_name,
                                err
                            );
                        }
                        unit.mark_started();
                    }
                }

                let result = match phase {
                    HookPhase::BeginFrame => unit.begin_frame(handle, self, world),
                    HookPhase::Update(dt) => unit.update(dt, handle, self, world),
                    HookPhase::EndFrame => unit.end_frame(handle, self, world),
                    HookPhase::Draw => unit.draw(handle, self, world),
                };
                if let Err(err) = result {
                    log::warn!(
                        "{:?} hook of unit '{}' failed on node '{}': {}",
                        phase,
                        unit.type_name(),
                        node_name,
                        err
                    );
                }
            }

            // Units attached during the hooks land behind the restored list
            if let Some(node) = self.nodes.get_mut(handle) {
                units.append(&mut node.units);
                node.units = units;
            }
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

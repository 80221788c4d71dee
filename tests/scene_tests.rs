use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use scene2d::physics::{Chain, Material, PhysicsUnit, Shape, WorldContext};
use scene2d::scene::{BehaviorUnit, NodeLink, UnitCore};
use scene2d::{Node, NodeHandle, SceneGraph, Vector2};

/// A test unit that counts its lifecycle calls through shared cells
struct CounterUnit {
    core: UnitCore,
    starts: Rc<Cell<usize>>,
    updates: Rc<Cell<usize>>,
}

impl CounterUnit {
    fn new(starts: Rc<Cell<usize>>, updates: Rc<Cell<usize>>) -> Self {
        Self {
            core: UnitCore::default(),
            starts,
            updates,
        }
    }
}

impl BehaviorUnit for CounterUnit {
    fn type_name(&self) -> &str {
        "Counter"
    }

    fn core(&self) -> &UnitCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UnitCore {
        &mut self.core
    }

    fn start(
        &mut self,
        _node: NodeHandle,
        _graph: &mut SceneGraph,
        _world: &mut WorldContext,
    ) -> scene2d::Result<()> {
        self.starts.set(self.starts.get() + 1);
        Ok(())
    }

    fn update(
        &mut self,
        _dt: f64,
        _node: NodeHandle,
        _graph: &mut SceneGraph,
        _world: &mut WorldContext,
    ) -> scene2d::Result<()> {
        self.updates.set(self.updates.get() + 1);
        Ok(())
    }

    fn to_data(&self) -> scene2d::Result<Value> {
        Ok(Value::Null)
    }

    fn clone_unit(&self) -> Box<dyn BehaviorUnit> {
        Box::new(Self {
            core: UnitCore::default(),
            starts: Rc::clone(&self.starts),
            updates: Rc::clone(&self.updates),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A test unit that declares a dependency on the physics unit
struct DependentUnit {
    core: UnitCore,
}

impl BehaviorUnit for DependentUnit {
    fn type_name(&self) -> &str {
        "Dependent"
    }

    fn core(&self) -> &UnitCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UnitCore {
        &mut self.core
    }

    fn dependencies(&self) -> &[&'static str] {
        &["Physics"]
    }

    fn to_data(&self) -> scene2d::Result<Value> {
        Ok(Value::Null)
    }

    fn clone_unit(&self) -> Box<dyn BehaviorUnit> {
        Box::new(Self {
            core: UnitCore::default(),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A pair of test unit types that each declare the other as a dependency
struct CycleUnit {
    core: UnitCore,
    type_name: &'static str,
    requires: &'static [&'static str],
}

impl BehaviorUnit for CycleUnit {
    fn type_name(&self) -> &str {
        self.type_name
    }

    fn core(&self) -> &UnitCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UnitCore {
        &mut self.core
    }

    fn dependencies(&self) -> &[&'static str] {
        self.requires
    }

    fn to_data(&self) -> scene2d::Result<Value> {
        Ok(Value::Null)
    }

    fn clone_unit(&self) -> Box<dyn BehaviorUnit> {
        Box::new(Self {
            core: UnitCore::default(),
            type_name: self.type_name,
            requires: self.requires,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn cycle_a_factory(_data: &Value) -> scene2d::Result<Box<dyn BehaviorUnit>> {
    Ok(Box::new(CycleUnit {
        core: UnitCore::default(),
        type_name: "CycleA",
        requires: &["CycleB"],
    }))
}

fn cycle_b_factory(_data: &Value) -> scene2d::Result<Box<dyn BehaviorUnit>> {
    Ok(Box::new(CycleUnit {
        core: UnitCore::default(),
        type_name: "CycleB",
        requires: &["CycleA"],
    }))
}

#[test]
fn test_add_child_maintains_symmetry() {
    let mut graph = SceneGraph::new();
    let parent = graph.add_node(Node::new("parent"));
    let child = graph.add_node(Node::new("child"));

    graph.add_child(parent, child).unwrap();

    assert_eq!(graph.node(child).unwrap().parent(), Some(parent));
    assert!(graph.node(parent).unwrap().children().contains(&child));
    assert!(!graph.roots().contains(&child));
    assert!(graph.is_hierarchy_consistent());
}

#[test]
fn test_reparenting_detaches_from_old_parent() {
    let mut graph = SceneGraph::new();
    let first = graph.add_node(Node::new("first"));
    let second = graph.add_node(Node::new("second"));
    let child = graph.add_node(Node::new("child"));

    graph.add_child(first, child).unwrap();
    graph.add_child(second, child).unwrap();

    assert!(graph.node(first).unwrap().children().is_empty());
    assert_eq!(graph.node(child).unwrap().parent(), Some(second));
    assert!(graph.is_hierarchy_consistent());
}

#[test]
fn test_self_parenting_rejected() {
    let mut graph = SceneGraph::new();
    let node = graph.add_node(Node::new("node"));
    assert!(graph.add_child(node, node).is_err());
}

#[test]
fn test_cyclic_parenting_rejected() {
    let mut graph = SceneGraph::new();
    let a = graph.add_node(Node::new("a"));
    let b = graph.add_node(Node::new("b"));
    let c = graph.add_node(Node::new("c"));
    graph.add_child(a, b).unwrap();
    graph.add_child(b, c).unwrap();

    // Parenting an ancestor under its own descendant would close a cycle
    assert!(graph.add_child(b, a).is_err());
    assert!(graph.add_child(c, a).is_err());

    // The hierarchy is untouched and world queries still terminate
    assert!(graph.is_hierarchy_consistent());
    assert_eq!(graph.node(a).unwrap().parent(), None);
    assert_eq!(graph.node(b).unwrap().parent(), Some(a));
    let _ = graph.world_position(c);
    assert_relative_eq!(graph.world_rotation(c), 0.0);
}

#[test]
fn test_remove_child_promotes_to_root() {
    let mut graph = SceneGraph::new();
    let parent = graph.add_node(Node::new("parent"));
    let child = graph.add_node(Node::new("child"));
    graph.add_child(parent, child).unwrap();

    assert!(graph.remove_child(parent, child));

    assert!(graph.contains(child));
    assert_eq!(graph.node(child).unwrap().parent(), None);
    assert!(graph.roots().contains(&child));
    assert!(graph.is_hierarchy_consistent());
}

#[test]
fn test_remove_node_removes_subtree() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::new("root"));
    let child = graph.add_node(Node::new("child"));
    let grandchild = graph.add_node(Node::new("grandchild"));
    graph.add_child(root, child).unwrap();
    graph.add_child(child, grandchild).unwrap();

    assert!(graph.remove_node(child));

    assert!(graph.contains(root));
    assert!(!graph.contains(child));
    assert!(!graph.contains(grandchild));
    assert!(graph.node(root).unwrap().children().is_empty());
    assert!(graph.is_hierarchy_consistent());
}

#[test]
fn test_randomized_hierarchy_stays_consistent() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut graph = SceneGraph::new();
    let mut handles: Vec<NodeHandle> = (0..24)
        .map(|i| graph.add_node(Node::new(format!("node-{}", i))))
        .collect();

    for step in 0..400 {
        let a = handles[rng.gen_range(0..handles.len())];
        let b = handles[rng.gen_range(0..handles.len())];

        match rng.gen_range(0..4) {
            0 | 1 => {
                if a != b && graph.contains(a) && graph.contains(b) {
                    // Cyclic parenting attempts are rejected by the graph
                    let _ = graph.add_child(a, b);
                }
            }
            2 => {
                if graph.contains(a) && graph.contains(b) {
                    graph.remove_child(a, b);
                }
            }
            _ => {
                if graph.contains(a) && graph.node_count() > 4 {
                    graph.remove_node(a);
                    handles.retain(|h| graph.contains(*h));
                    handles.push(graph.add_node(Node::new(format!("refill-{}", step))));
                }
            }
        }

        assert!(graph.is_hierarchy_consistent(), "step {} broke symmetry", step);
    }
}

#[test]
fn test_world_transform_composition() {
    let mut graph = SceneGraph::new();
    let parent = graph.add_node(Node::new("parent"));
    let child = graph.add_node(Node::new("child"));
    graph.add_child(parent, child).unwrap();

    {
        let node = graph.node_mut(parent).unwrap();
        node.position = Vector2::new(10.0, 0.0);
        node.angle = 90.0;
        node.scale = Vector2::new(2.0, 2.0);
    }
    {
        let node = graph.node_mut(child).unwrap();
        node.position = Vector2::new(5.0, 0.0);
        node.angle = 15.0;
        node.scale = Vector2::new(3.0, 1.0);
    }

    // The child's local offset is rotated into the parent's frame
    let world = graph.world_position(child);
    assert_relative_eq!(world.x, 10.0, epsilon = 1e-9);
    assert_relative_eq!(world.y, 5.0, epsilon = 1e-9);

    // Rotations add along the ancestor chain
    assert_relative_eq!(graph.world_rotation(child), 105.0);

    // Scales multiply component-wise
    let scale = graph.world_scale(child);
    assert_relative_eq!(scale.x, 6.0);
    assert_relative_eq!(scale.y, 2.0);
}

#[test]
fn test_set_world_position_round_trips() {
    let mut graph = SceneGraph::new();
    let parent = graph.add_node(Node::new("parent"));
    let child = graph.add_node(Node::new("child"));
    graph.add_child(parent, child).unwrap();

    {
        let node = graph.node_mut(parent).unwrap();
        node.position = Vector2::new(-3.0, 7.0);
        node.angle = 33.0;
    }

    let target = Vector2::new(12.5, -8.25);
    graph.set_world_position(child, target).unwrap();

    let world = graph.world_position(child);
    assert_relative_eq!(world.x, target.x, epsilon = 1e-9);
    assert_relative_eq!(world.y, target.y, epsilon = 1e-9);
}

#[test]
fn test_bounding_box_uses_world_transform() {
    let mut graph = SceneGraph::new();
    let parent = graph.add_node(Node::new("parent"));
    let child = graph.add_node(Node::new("child"));
    graph.add_child(parent, child).unwrap();

    graph.node_mut(parent).unwrap().scale = Vector2::new(2.0, 1.0);
    {
        let node = graph.node_mut(child).unwrap();
        node.size = scene2d::scene::Size::new(10.0, 20.0);
        node.angle = 45.0;
    }

    let bb = graph.bounding_box(child).unwrap();
    assert_relative_eq!(bb.width, 20.0);
    assert_relative_eq!(bb.height, 20.0);
    assert_relative_eq!(bb.rotation, 45.0);
}

#[test]
fn test_attach_unit_rejects_duplicates() {
    let mut graph = SceneGraph::new();
    let node = graph.add_node(Node::new("body"));

    let first = graph
        .attach_unit(node, Box::new(PhysicsUnit::default()))
        .unwrap();
    let second = graph
        .attach_unit(node, Box::new(PhysicsUnit::default()))
        .unwrap();

    assert_eq!(first, 0);
    assert_eq!(second, 0);
    assert_eq!(graph.node(node).unwrap().unit_count(), 1);
}

#[test]
fn test_attach_unit_resolves_dependencies() {
    let mut graph = SceneGraph::new();
    let node = graph.add_node(Node::new("body"));

    graph
        .attach_unit(
            node,
            Box::new(DependentUnit {
                core: UnitCore::default(),
            }),
        )
        .unwrap();

    // The declared dependency was auto-attached first
    assert!(graph.has_unit(node, PhysicsUnit::TYPE_NAME));
    assert!(graph.has_unit(node, "Dependent"));
    assert_eq!(graph.node(node).unwrap().unit_count(), 2);
}

#[test]
fn test_mutually_dependent_units_attach_without_recursing() {
    let mut graph = SceneGraph::new();
    graph.registry_mut().register("CycleA", cycle_a_factory);
    graph.registry_mut().register("CycleB", cycle_b_factory);

    let node = graph.add_node(Node::new("node"));
    graph
        .attach_unit(node, cycle_a_factory(&Value::Null).unwrap())
        .unwrap();

    // The cycle is broken with a warning; both units still end up attached
    assert!(graph.has_unit(node, "CycleA"));
    assert!(graph.has_unit(node, "CycleB"));
    assert_eq!(graph.node(node).unwrap().unit_count(), 2);
}

#[test]
fn test_detach_unit() {
    let mut graph = SceneGraph::new();
    let node = graph.add_node(Node::new("body"));
    graph
        .attach_unit(node, Box::new(PhysicsUnit::default()))
        .unwrap();

    let unit_id = graph
        .node(node)
        .unwrap()
        .units()
        .next()
        .unwrap()
        .id()
        .to_string();

    assert!(graph.detach_unit(node, &unit_id).is_some());
    assert_eq!(graph.node(node).unwrap().unit_count(), 0);
    assert!(graph.detach_unit(node, &unit_id).is_none());
}

#[test]
fn test_start_runs_once_before_first_update() {
    let starts = Rc::new(Cell::new(0));
    let updates = Rc::new(Cell::new(0));

    let mut graph = SceneGraph::new();
    let mut world = WorldContext::new();
    let node = graph.add_node(Node::new("counter"));
    graph
        .attach_unit(
            node,
            Box::new(CounterUnit::new(Rc::clone(&starts), Rc::clone(&updates))),
        )
        .unwrap();

    for _ in 0..3 {
        graph.begin_frame(&mut world);
        graph.update(1.0 / 60.0, &mut world);
        graph.end_frame(&mut world);
    }

    assert_eq!(starts.get(), 1);
    assert_eq!(updates.get(), 3);
}

#[test]
fn test_inactive_subtree_is_skipped() {
    let starts = Rc::new(Cell::new(0));
    let updates = Rc::new(Cell::new(0));

    let mut graph = SceneGraph::new();
    let mut world = WorldContext::new();
    let parent = graph.add_node(Node::new("parent"));
    let child = graph.add_node(Node::new("child"));
    graph.add_child(parent, child).unwrap();
    graph
        .attach_unit(
            child,
            Box::new(CounterUnit::new(Rc::clone(&starts), Rc::clone(&updates))),
        )
        .unwrap();

    // Deactivating an ancestor silences the whole subtree
    graph.node_mut(parent).unwrap().set_active(false);
    graph.update(1.0 / 60.0, &mut world);
    assert_eq!(updates.get(), 0);

    graph.node_mut(parent).unwrap().set_active(true);
    graph.update(1.0 / 60.0, &mut world);
    assert_eq!(updates.get(), 1);
}

#[test]
fn test_json_round_trip() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::new("root"));
    {
        let node = graph.node_mut(root).unwrap();
        node.position = Vector2::new(1.0, 2.0);
        node.angle = 30.0;
        node.add_tag("enemy");
    }
    let child = graph.add_node(Node::new("child"));
    graph.add_child(root, child).unwrap();
    graph
        .attach_unit(
            child,
            Box::new(PhysicsUnit::with_mass(
                Shape::circle(4.0),
                Material::rubber(),
                2.5,
            )),
        )
        .unwrap();

    let json = graph.to_json(root).unwrap();

    let mut loaded = SceneGraph::new();
    let new_root = loaded.from_json(json).unwrap();

    let node = loaded.node(new_root).unwrap();
    assert_eq!(node.name, "root");
    assert_eq!(node.id, graph.node(root).unwrap().id);
    assert_eq!(node.position, Vector2::new(1.0, 2.0));
    assert_eq!(node.angle, 30.0);
    assert!(node.has_tag("enemy"));
    assert_eq!(node.children().len(), 1);

    let new_child = node.children()[0];
    let unit = loaded.unit_ref::<PhysicsUnit>(new_child).unwrap();
    assert_eq!(unit.body.mass(), 2.5);
    assert_eq!(unit.shape, Shape::circle(4.0));
    assert!(loaded.is_hierarchy_consistent());
}

#[test]
fn test_unknown_unit_type_is_preserved() {
    let scene = json!({
        "name": "mystery",
        "modules": [
            { "type": "Sparkle", "id": "unit-sparkle", "data": { "intensity": 3 } }
        ]
    });

    let mut graph = SceneGraph::new();
    let handle = graph.from_json(scene).unwrap();

    assert!(graph.has_unit(handle, "Sparkle"));

    // Saving again loses nothing
    let out = graph.to_json(handle).unwrap();
    assert_eq!(out["modules"][0]["type"], "Sparkle");
    assert_eq!(out["modules"][0]["id"], "unit-sparkle");
    assert_eq!(out["modules"][0]["data"]["intensity"], 3);
}

#[test]
fn test_clone_subtree_is_isolated() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::new("root"));
    let child = graph.add_node(Node::new("child"));
    graph.add_child(root, child).unwrap();
    graph.node_mut(child).unwrap().position = Vector2::new(4.0, 4.0);
    graph
        .attach_unit(child, Box::new(PhysicsUnit::default()))
        .unwrap();

    let clone_root = graph.clone_subtree(root, true).unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.node(clone_root).unwrap().name, "root (copy)");
    assert_ne!(graph.node(clone_root).unwrap().id, graph.node(root).unwrap().id);

    let clone_child = graph.node(clone_root).unwrap().children()[0];
    assert!(graph.has_unit(clone_child, PhysicsUnit::TYPE_NAME));

    // Mutating the original leaves the clone untouched
    graph.node_mut(child).unwrap().position = Vector2::new(-1.0, -1.0);
    assert_eq!(
        graph.node(clone_child).unwrap().position,
        Vector2::new(4.0, 4.0)
    );

    let original_unit_id = graph
        .node(child)
        .unwrap()
        .units()
        .next()
        .unwrap()
        .id()
        .to_string();
    let clone_unit_id = graph
        .node(clone_child)
        .unwrap()
        .units()
        .next()
        .unwrap()
        .id()
        .to_string();
    assert_ne!(original_unit_id, clone_unit_id);
    assert!(graph.is_hierarchy_consistent());
}

#[test]
fn test_clone_remaps_internal_links() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Node::new("anchor"));
    let child = graph.add_node(Node::new("weight"));
    graph.add_child(root, child).unwrap();

    let mut unit = PhysicsUnit::new_static(Shape::circle(1.0), Material::default());
    let mut chain = Chain::new(4, 5.0);
    chain.attached_node = NodeLink::new(child, &graph);
    unit.chain = Some(chain);
    graph.attach_unit(root, Box::new(unit)).unwrap();

    let clone_root = graph.clone_subtree(root, false).unwrap();
    let clone_child = graph.node(clone_root).unwrap().children()[0];

    // The cloned chain points at the cloned child, not the original
    let clone_unit = graph.unit_ref::<PhysicsUnit>(clone_root).unwrap();
    let link = clone_unit
        .chain
        .as_ref()
        .unwrap()
        .attached_node
        .as_ref()
        .unwrap();
    assert_eq!(link.node_id, graph.node(clone_child).unwrap().id);
    assert_ne!(link.node_id, graph.node(child).unwrap().id);
}

#[test]
fn test_find_by_id_and_name() {
    let mut graph = SceneGraph::new();
    let node = graph.add_node(Node::new("hero"));
    let id = graph.node(node).unwrap().id.clone();

    assert_eq!(graph.find_node_by_id(&id), Some(node));
    assert_eq!(graph.find_node_by_name("hero"), Some(node));
    assert_eq!(graph.find_node_by_name("missing"), None);
}

#[test]
fn test_registry_has_builtin_physics() {
    let graph = SceneGraph::new();
    assert!(graph.registry().contains(PhysicsUnit::TYPE_NAME));

    let factory = graph.registry().resolve(PhysicsUnit::TYPE_NAME).unwrap();
    let unit = factory(&Value::Null).unwrap();
    assert_eq!(unit.type_name(), "Physics");
}

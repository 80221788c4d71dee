use std::any::Any;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::math::{to_degrees, to_radians, Vector2};
use crate::physics::{
    aabb_overlap, collide, resolve_contact, BodyState, Chain, ContactEvent, GravityWell, Material,
    ResolveBody, Shape, TeleportEvent, WellDestination, WorldContext, WorldShape,
};
use crate::scene::{
    BehaviorUnit, HandleMap, NodeHandle, PropertyKind, PropertySpec, SceneGraph, UnitCore,
};
use crate::Result;

/// The behavior unit that makes a node a physics body
///
/// Each tick the unit applies its gravity well to the other bodies,
/// integrates accumulated forces and global gravity, writes the node's new
/// transform, then detects and resolves contacts against every other
/// registered body. Contacts are resolved immediately when found, so by the
/// time the other body of a pair updates it sees an already-separated pair
/// and skips it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhysicsUnit {
    #[serde(skip)]
    core: UnitCore,

    /// The collision shape, in local units before the node's world scale
    pub shape: Shape,

    /// Surface and damping properties
    pub material: Material,

    /// Kinematic state and accumulated forces
    pub body: BodyState,

    /// Optional rope constraint pinned to this node
    pub chain: Option<Chain>,

    /// Optional attractive field centered on this node
    pub well: Option<GravityWell>,
}

impl PhysicsUnit {
    /// The registry type tag for this unit
    pub const TYPE_NAME: &'static str = "Physics";

    /// Creates a dynamic body with unit mass
    pub fn new(shape: Shape, material: Material) -> Self {
        Self {
            shape,
            material,
            ..Self::default()
        }
    }

    /// Creates a dynamic body with the given mass
    pub fn with_mass(shape: Shape, material: Material, mass: f64) -> Self {
        Self {
            shape,
            material,
            body: BodyState::new(mass),
            ..Self::default()
        }
    }

    /// Creates a static body that collides but never moves
    pub fn new_static(shape: Shape, material: Material) -> Self {
        Self {
            shape,
            material,
            body: BodyState::new_static(),
            ..Self::default()
        }
    }

    /// Builds a physics unit from a serialized data blob
    ///
    /// A null blob yields the default unit, which lets the type serve as an
    /// auto-attached dependency.
    pub fn from_data(data: &Value) -> Result<Box<dyn BehaviorUnit>> {
        if data.is_null() {
            return Ok(Box::new(Self::default()));
        }
        let unit: PhysicsUnit = serde_json::from_value(data.clone())?;
        Ok(Box::new(unit))
    }

    /// Returns the body's collision shape placed at the node's world transform
    pub fn world_shape(&self, node: NodeHandle, graph: &SceneGraph) -> WorldShape {
        WorldShape::new(
            self.shape,
            graph.world_position(node),
            to_radians(graph.world_rotation(node)),
            graph.world_scale(node),
        )
    }

    /// Applies the well's pull to every other dynamic body, teleporting the
    /// ones that fall inside the activation radius
    fn run_well(
        &mut self,
        node: NodeHandle,
        center: Vector2,
        graph: &mut SceneGraph,
        world: &mut WorldContext,
    ) {
        let well = match self.well.as_mut() {
            Some(well) => well,
            None => return,
        };

        let handles: Vec<NodeHandle> = world.bodies().to_vec();
        for other in handles {
            if other == node {
                continue;
            }
            let other_position = graph.world_position(other);
            let distance = center.distance(&other_position);

            let (mass, is_static) = match graph.unit_ref::<PhysicsUnit>(other) {
                Some(unit) => (unit.body.mass(), unit.body.is_static),
                None => continue,
            };
            if is_static {
                continue;
            }

            if well.captures(distance) {
                let destination = match well.destination.as_mut() {
                    Some(WellDestination::Point { position }) => Some(*position),
                    Some(WellDestination::Node { link }) => {
                        link.resolve(graph).map(|h| graph.world_position(h))
                    }
                    None => None,
                };
                if let Some(destination) = destination {
                    if graph.set_world_position(other, destination).is_ok() {
                        if let Some(unit) = graph.unit_mut::<PhysicsUnit>(other) {
                            unit.body.velocity *= world.config.teleport_damping;
                        }
                        world.events.push_teleport(TeleportEvent {
                            node: other,
                            well: node,
                            destination,
                        });
                    }
                    continue;
                }
            }

            if let Some(force) = well.force_on(center, other_position, mass) {
                if let Some(unit) = graph.unit_mut::<PhysicsUnit>(other) {
                    unit.body.apply_force(force);
                }
            }
        }
    }

    /// Detects and resolves contacts against every other registered body
    ///
    /// `position` tracks the node's world position across successive contacts
    /// within the same tick.
    fn resolve_collisions(
        &mut self,
        node: NodeHandle,
        position: &mut Vector2,
        graph: &mut SceneGraph,
        world: &mut WorldContext,
    ) -> Result<()> {
        let (my_layer, my_mask) = match graph.node(node) {
            Some(n) if n.is_collision_enabled() => (n.collision_layer, n.collision_mask),
            _ => return Ok(()),
        };

        let handles: Vec<NodeHandle> = world.bodies().to_vec();
        for other in handles {
            if other == node {
                continue;
            }
            let (other_layer, other_mask) = match graph.node(other) {
                Some(n) if n.is_collision_enabled() => (n.collision_layer, n.collision_mask),
                _ => continue,
            };
            // Layers must match both ways for the pair to interact
            if (my_layer & other_mask) == 0 || (other_layer & my_mask) == 0 {
                continue;
            }

            let (other_body, other_material, other_shape) =
                match graph.unit_ref::<PhysicsUnit>(other) {
                    Some(unit) => (unit.body.clone(), unit.material, unit.shape),
                    None => continue,
                };
            if self.body.is_static && other_body.is_static {
                continue;
            }

            let my_shape = WorldShape::new(
                self.shape,
                *position,
                to_radians(graph.world_rotation(node)),
                graph.world_scale(node),
            );
            let their_shape = WorldShape::new(
                other_shape,
                graph.world_position(other),
                to_radians(graph.world_rotation(other)),
                graph.world_scale(other),
            );

            if !aabb_overlap(&my_shape, &their_shape) {
                continue;
            }
            let manifold = match collide(&my_shape, &their_shape) {
                Some(manifold) => manifold,
                None => continue,
            };

            let my_inertia = my_shape.shape.moment_of_inertia(self.body.mass());
            let their_inertia = their_shape.shape.moment_of_inertia(other_body.mass());

            let mut a = ResolveBody {
                position: *position,
                velocity: self.body.velocity,
                angular_velocity: self.body.angular_velocity,
                inv_mass: self.body.inv_mass(),
                inv_inertia: self.body.inv_inertia(my_inertia),
                restitution: self.material.restitution,
                static_friction: self.material.static_friction,
                dynamic_friction: self.material.dynamic_friction,
            };
            let mut b = ResolveBody {
                position: their_shape.position,
                velocity: other_body.velocity,
                angular_velocity: other_body.angular_velocity,
                inv_mass: other_body.inv_mass(),
                inv_inertia: other_body.inv_inertia(their_inertia),
                restitution: other_material.restitution,
                static_friction: other_material.static_friction,
                dynamic_friction: other_material.dynamic_friction,
            };

            let resolution = resolve_contact(&mut a, &mut b, &manifold, &world.config);
            if !resolution.resolved {
                continue;
            }

            self.body.velocity = a.velocity;
            self.body.angular_velocity = a.angular_velocity;
            *position = a.position;
            graph.set_world_position(node, a.position)?;

            if !other_body.is_static {
                graph.set_world_position(other, b.position)?;
                if let Some(unit) = graph.unit_mut::<PhysicsUnit>(other) {
                    unit.body.velocity = b.velocity;
                    unit.body.angular_velocity = b.angular_velocity;
                }
            }

            world.events.push_contact(ContactEvent {
                node_a: node,
                node_b: other,
                contact_point: manifold.contact_point,
                normal: manifold.normal,
                normal_impulse: resolution.normal_impulse,
            });
        }
        Ok(())
    }

    /// Steps the rope constraint and drives the attached node, if any
    fn run_chain(
        &mut self,
        node: NodeHandle,
        pin: Vector2,
        dt: f64,
        graph: &mut SceneGraph,
        world: &WorldContext,
    ) {
        let chain = match self.chain.as_mut() {
            Some(chain) => chain,
            None => return,
        };
        chain.step(pin, world.gravity, dt, world.config.chain_iterations);

        let end = match chain.last_position() {
            Some(end) => end,
            None => return,
        };
        if let Some(link) = chain.attached_node.as_mut() {
            if let Some(target) = link.resolve(graph) {
                if target != node {
                    if let Err(err) = graph.set_world_position(target, end) {
                        log::warn!("chain could not position its attached node: {}", err);
                    }
                }
            }
        }
    }
}

impl BehaviorUnit for PhysicsUnit {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn core(&self) -> &UnitCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UnitCore {
        &mut self.core
    }

    fn exposed_properties(&self) -> Vec<PropertySpec> {
        vec![
            PropertySpec::new(
                "mass",
                PropertyKind::Number {
                    min: Some(0.0),
                    max: None,
                },
                json!(self.body.mass()),
            ),
            PropertySpec::new("isStatic", PropertyKind::Boolean, json!(self.body.is_static)),
            PropertySpec::new(
                "restitution",
                PropertyKind::Number {
                    min: Some(0.0),
                    max: Some(1.0),
                },
                json!(self.material.restitution),
            ),
            PropertySpec::new(
                "staticFriction",
                PropertyKind::Number {
                    min: Some(0.0),
                    max: None,
                },
                json!(self.material.static_friction),
            ),
            PropertySpec::new(
                "dynamicFriction",
                PropertyKind::Number {
                    min: Some(0.0),
                    max: None,
                },
                json!(self.material.dynamic_friction),
            ),
            PropertySpec::new(
                "drag",
                PropertyKind::Number {
                    min: Some(0.0),
                    max: Some(1.0),
                },
                json!(self.material.drag),
            ),
            PropertySpec::new(
                "velocity",
                PropertyKind::Vector2,
                serde_json::to_value(self.body.velocity).unwrap_or(Value::Null),
            ),
        ]
    }

    fn update(
        &mut self,
        dt: f64,
        node: NodeHandle,
        graph: &mut SceneGraph,
        world: &mut WorldContext,
    ) -> Result<()> {
        if dt <= 0.0 {
            return Ok(());
        }

        let mut position = graph.world_position(node);

        self.run_well(node, position, graph, world);

        if self.body.is_static {
            // Stray forces on a static body are dropped, not accumulated
            self.body.integrate_forces(dt, position, 0.0);
        } else {
            let mass = self.body.mass();
            self.body.apply_force(world.gravity * mass);

            let shape = self.world_shape(node, graph);
            let inv_inertia = self.body.inv_inertia(shape.shape.moment_of_inertia(mass));
            self.body.integrate_forces(dt, position, inv_inertia);
            self.body
                .apply_damping(self.material.drag, self.material.angular_drag, dt);

            position += self.body.velocity * dt;
            graph.set_world_position(node, position)?;
            if let Some(n) = graph.node_mut(node) {
                n.angle += to_degrees(self.body.angular_velocity) * dt;
            }

            self.resolve_collisions(node, &mut position, graph, world)?;
        }

        self.run_chain(node, position, dt, graph, world);
        Ok(())
    }

    fn to_data(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn clone_unit(&self) -> Box<dyn BehaviorUnit> {
        let mut clone = self.clone();
        clone.core.started = false;
        Box::new(clone)
    }

    fn remap_references(&mut self, map: &HandleMap, graph: &SceneGraph) {
        if let Some(chain) = self.chain.as_mut() {
            if let Some(link) = chain.attached_node.as_mut() {
                link.remap(map, graph);
            }
        }
        if let Some(well) = self.well.as_mut() {
            if let Some(WellDestination::Node { link }) = well.destination.as_mut() {
                link.remap(map, graph);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

use std::collections::VecDeque;

use crate::math::Vector2;
use crate::scene::NodeHandle;

/// Configuration parameters for the physics simulation
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Penetration below this depth is not positionally corrected
    pub penetration_slop: f64,

    /// Fraction of the remaining penetration corrected per contact
    pub correction_factor: f64,

    /// Contacts slower than this along the normal lose their restitution
    pub restitution_velocity_threshold: f64,

    /// Fixed number of chain relaxation iterations per tick
    pub chain_iterations: usize,

    /// Velocity retained after a gravity-well teleport
    pub teleport_damping: f64,

    /// Direction used when a contact normal is degenerate
    pub fallback_normal: Vector2,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            penetration_slop: 0.01,
            correction_factor: 0.8,
            restitution_velocity_threshold: 0.5,
            chain_iterations: 3,
            teleport_damping: 0.5,
            fallback_normal: Vector2::new(1.0, 0.0),
        }
    }
}

/// A contact resolved during the tick
#[derive(Debug, Clone, Copy)]
pub struct ContactEvent {
    /// The node whose update resolved the contact
    pub node_a: NodeHandle,

    /// The other node of the pair
    pub node_b: NodeHandle,

    /// The contact point in world space
    pub contact_point: Vector2,

    /// The contact normal, pointing from `node_a` toward `node_b`
    pub normal: Vector2,

    /// Magnitude of the applied normal impulse
    pub normal_impulse: f64,
}

/// A gravity-well teleport performed during the tick
#[derive(Debug, Clone, Copy)]
pub struct TeleportEvent {
    /// The teleported node
    pub node: NodeHandle,

    /// The well's owning node
    pub well: NodeHandle,

    /// Where the node was sent
    pub destination: Vector2,
}

/// A queue of physics events produced during a tick
#[derive(Debug, Default)]
pub struct EventQueue {
    contact_events: VecDeque<ContactEvent>,
    teleport_events: VecDeque<TeleportEvent>,
}

impl EventQueue {
    /// Creates a new empty event queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a contact event to the queue
    pub fn push_contact(&mut self, event: ContactEvent) {
        self.contact_events.push_back(event);
    }

    /// Adds a teleport event to the queue
    pub fn push_teleport(&mut self, event: TeleportEvent) {
        self.teleport_events.push_back(event);
    }

    /// Gets the next contact event from the queue
    pub fn next_contact(&mut self) -> Option<ContactEvent> {
        self.contact_events.pop_front()
    }

    /// Gets the next teleport event from the queue
    pub fn next_teleport(&mut self) -> Option<TeleportEvent> {
        self.teleport_events.pop_front()
    }

    /// Returns whether any contact events are queued
    pub fn has_contacts(&self) -> bool {
        !self.contact_events.is_empty()
    }

    /// Returns all contact events involving the given node
    pub fn contacts_for(&self, node: NodeHandle) -> Vec<&ContactEvent> {
        self.contact_events
            .iter()
            .filter(|e| e.node_a == node || e.node_b == node)
            .collect()
    }

    /// Clears all events from the queue
    pub fn clear(&mut self) {
        self.contact_events.clear();
        self.teleport_events.clear();
    }
}

/// Shared simulation state passed into every lifecycle hook
///
/// Replaces ambient global lookups: components receive the world's gravity,
/// configuration and the flat list of active physics bodies by parameter
/// injection. The body list is rebuilt by the graph in traversal order at
/// the start of each tick, so collision iteration is deterministic; it is
/// never mutated mid-tick.
pub struct WorldContext {
    /// Global gravity in world units per second squared
    pub gravity: Vector2,

    /// Simulation tuning parameters
    pub config: PhysicsConfig,

    /// Events produced during the current tick
    pub events: EventQueue,

    /// Active physics bodies in traversal order
    bodies: Vec<NodeHandle>,
}

impl WorldContext {
    /// Creates a world context with no gravity
    pub fn new() -> Self {
        Self {
            gravity: Vector2::zero(),
            config: PhysicsConfig::default(),
            events: EventQueue::new(),
            bodies: Vec::new(),
        }
    }

    /// Creates a world context with the given gravity
    pub fn with_gravity(gravity: Vector2) -> Self {
        Self {
            gravity,
            ..Self::new()
        }
    }

    /// Returns the active physics bodies in traversal order
    pub fn bodies(&self) -> &[NodeHandle] {
        &self.bodies
    }

    /// Replaces the body list; called by the graph at tick boundaries
    pub(crate) fn set_bodies(&mut self, bodies: Vec<NodeHandle>) {
        self.bodies = bodies;
    }

    /// Clears per-tick state at the start of a frame
    pub(crate) fn begin_tick(&mut self) {
        self.events.clear();
    }
}

impl Default for WorldContext {
    fn default() -> Self {
        Self::new()
    }
}

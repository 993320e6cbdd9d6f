//=========================================================================
// Node Behaviors
//=========================================================================
//
// Capability interface attached to nodes.
//
// A behavior declares what it can do through `Capabilities`. The set is
// read once, when the node is staged, and decides which registry slots
// the node occupies:
//
//   UPDATE → update-target set  → Behavior::update(dt)
//   EVENTS → event-target set   → Behavior::handle_event(event)
//   DRAW   → draw pass          → Behavior::draw(renderer, matrix)
//
// Lifecycle hooks (`on_attach` / `on_detach`) fire exactly when the node
// enters or leaves the stage, i.e. when its registrations are made or
// removed.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use bitflags::bitflags;
use kurbo::{Affine, Point};

//=== Internal Dependencies ===============================================

use super::{NodeId, NodeTree};
use crate::core::collaborators::Renderer;
use crate::core::config::WorldProperties;
use crate::core::coords;
use crate::core::error::{BehaviorResult, StageError};
use crate::core::input::{InputEvent, StateTracker};
use crate::core::registry::TargetRegistry;

//=== Capabilities ========================================================

bitflags! {
    /// What a behavior participates in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        /// Receives `update(dt)` once per frame.
        const UPDATE = 0b001;
        /// Receives dispatched input events.
        const EVENTS = 0b010;
        /// Draws during the draw pass.
        const DRAW   = 0b100;
    }
}

//=== EventResponse =======================================================

/// Whether an event target consumed the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    /// Delivery stops here.
    Handled,

    /// Delivery continues with the next target.
    Ignored,
}

impl EventResponse {
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

//=== Contexts ============================================================

/// Mutable view of the stage handed to a behavior during `update`.
///
/// The behavior may restructure the tree (including detaching or
/// destroying its own node); registration changes made here apply from
/// the next pass.
pub struct UpdateContext<'a> {
    /// Node whose behavior is running.
    pub node: NodeId,
    pub tree: &'a mut NodeTree,
    pub registry: &'a mut TargetRegistry,
    pub properties: &'a WorldProperties,
    pub input: &'a StateTracker,
}

/// Mutable view of the stage handed to a behavior during event dispatch.
pub struct EventContext<'a> {
    /// Node whose behavior is receiving the event.
    pub node: NodeId,
    pub tree: &'a mut NodeTree,
    pub registry: &'a mut TargetRegistry,
    pub properties: &'a WorldProperties,
    pub input: &'a StateTracker,
}

impl EventContext<'_> {
    /// Current pointer position in device pixels.
    pub fn pointer_device(&self) -> Point {
        let (x, y) = self.input.mouse_position();
        Point::new(f64::from(x), f64::from(y))
    }

    /// Current pointer position in this node's local frame.
    pub fn pointer_local(&self) -> Result<Point, StageError> {
        let device = self.pointer_device();
        coords::device_to_node(self.tree, self.properties, device.x, device.y, self.node)
    }
}

//=== Behavior ============================================================

/// Per-node behavior. Every method has a no-op default.
///
/// # Example
///
/// ```rust
/// # use aetheric_stage::prelude::*;
/// # use std::time::Duration;
/// struct Spinner { speed: f64 }
///
/// impl Behavior for Spinner {
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::UPDATE
///     }
///
///     fn update(&mut self, ctx: &mut UpdateContext<'_>, dt: Duration) -> BehaviorResult {
///         ctx.tree.rotate_by(ctx.node, self.speed * dt.as_secs_f64());
///         Ok(())
///     }
/// }
/// ```
pub trait Behavior: Send {
    /// Capability set, read once when the node is staged.
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// The node entered the stage; its registrations are in place.
    fn on_attach(&mut self, _node: NodeId) {}

    /// The node left the stage; its registrations are gone.
    fn on_detach(&mut self, _node: NodeId) {}

    /// Per-frame update. Errors are reported and isolated per node.
    fn update(&mut self, _ctx: &mut UpdateContext<'_>, _dt: Duration) -> BehaviorResult {
        Ok(())
    }

    /// Input event delivery, in registry order until one returns `Handled`.
    fn handle_event(&mut self, _ctx: &mut EventContext<'_>, _event: &InputEvent) -> EventResponse {
        EventResponse::Ignored
    }

    /// Custom drawing with the node's composed matrix.
    fn draw(&self, _renderer: &mut dyn Renderer, _matrix: Affine) {}
}

//=========================================================================
// Unit Tests
//=========================================================================

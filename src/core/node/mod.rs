//=========================================================================
// Node System
//=========================================================================
//
// Ownership tree of transformable nodes.
//
// Architecture:
//   NodeTree
//     └─ nodes: SlotMap<NodeId, Node>
//          ├─ parent: Option<NodeId>   (back-reference)
//          ├─ children: Vec<NodeId>    (owned, traversal order)
//          ├─ transform + composed cache
//          └─ behavior: Box<dyn Behavior> (capability interface)
//
// Ids are generational: once a node is destroyed its id never resolves
// again, so holders of stale ids (the registry, scene controllers) get
// `None` instead of a dangling node.
//
//=========================================================================

//=== Module Declarations =================================================

mod behavior;
mod transform;
mod tree;

//=== Public API ==========================================================

pub use behavior::{Behavior, Capabilities, EventContext, EventResponse, UpdateContext};
pub use transform::Transform;
pub use tree::NodeTree;

pub(crate) use tree::BehaviorLease;

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::fmt;

use kurbo::Affine;
use slotmap::new_key_type;

//=== Internal Dependencies ===============================================

use crate::core::collaborators::RenderPayload;

//=== NodeId ==============================================================

new_key_type! {
    /// Unique, generational node identity.
    pub struct NodeId;
}

//=== Node ================================================================

/// A single element of the tree.
///
/// Nodes are created and mutated through [`NodeTree`]; this type exposes
/// read access only so cached transforms and registrations cannot drift.
pub struct Node {
    pub(super) name: String,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,

    //--- Spatial State ----------------------------------------------------
    pub(super) transform: Transform,
    pub(super) composed: Cell<Option<Affine>>,

    //--- Flags ------------------------------------------------------------
    pub(super) visible: bool,
    pub(super) active: bool,
    pub(super) staged: bool,

    //--- Payload & Behavior ----------------------------------------------
    pub(super) payload: Option<RenderPayload>,
    pub(super) behavior: Option<Box<dyn Behavior>>,
    pub(super) capabilities: Capabilities,
    pub(super) hooked: bool,
}

impl Node {
    pub(super) fn new(name: String, behavior: Option<Box<dyn Behavior>>) -> Self {
        let capabilities = behavior
            .as_ref()
            .map(|b| b.capabilities())
            .unwrap_or_default();

        Self {
            name,
            parent: None,
            children: Vec::new(),
            transform: Transform::IDENTITY,
            composed: Cell::new(None),
            visible: true,
            active: true,
            staged: false,
            payload: None,
            behavior,
            capabilities,
            hooked: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in traversal order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the node is part of a subtree currently on stage.
    pub fn is_staged(&self) -> bool {
        self.staged
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn payload(&self) -> Option<&RenderPayload> {
        self.payload.as_ref()
    }

    /// Capabilities captured from the behavior.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("transform", &self.transform)
            .field("visible", &self.visible)
            .field("active", &self.active)
            .field("staged", &self.staged)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

//=========================================================================
// Node Tree
//=========================================================================
//
// Arena that owns every node and keeps three lifecycles in lockstep:
//
//   tree membership   add_child() / detach() / destroy()
//   staging           stage() / unstage()  (subtree on or off stage)
//   registration      TargetRegistry slots derived from capabilities
//
// Rules:
// - A node is staged iff its root was staged. Attaching under a staged
//   parent stages the new subtree; detaching a staged node unstages it.
// - Staging registers by capabilities and fires `on_attach`; unstaging
//   unregisters and fires `on_detach`.
// - `destroy()` detaches and unstages before freeing, so the registry is
//   empty for a node before that node disappears.
//
// Composed transforms are memoized per node. If a node's cache is dirty,
// every descendant's cache is dirty too, so invalidation stops early.
//
//=========================================================================

//=== External Dependencies ===============================================

use kurbo::{Affine, Point, Vec2};
use log::{debug, warn};
use slotmap::SlotMap;

//=== Internal Dependencies ===============================================

use super::{Behavior, Capabilities, Node, NodeId, Transform};
use crate::core::collaborators::{RenderPayload, Renderer};
use crate::core::error::StageError;
use crate::core::registry::TargetRegistry;

//=== BehaviorLease =======================================================

/// A behavior temporarily taken out of its node so it can run with
/// mutable access to the tree.
pub(crate) struct BehaviorLease {
    pub(crate) node: NodeId,
    pub(crate) behavior: Box<dyn Behavior>,
    hooked: bool,
}

//=== NodeTree ============================================================

/// Owner of all nodes.
#[derive(Default)]
pub struct NodeTree {
    nodes: SlotMap<NodeId, Node>,
}

impl NodeTree {
    //--- Construction -----------------------------------------------------

    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached root node without behavior.
    pub fn create(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.nodes.insert(Node::new(name.into(), None));
        debug!("Created node {:?}", id);
        id
    }

    /// Creates a detached root node with a behavior.
    pub fn spawn<B>(&mut self, name: impl Into<String>, behavior: B) -> NodeId
    where
        B: Behavior + 'static,
    {
        let id = self
            .nodes
            .insert(Node::new(name.into(), Some(Box::new(behavior))));
        debug!("Spawned node {:?}", id);
        id
    }

    //--- Lookup -----------------------------------------------------------

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name.as_str())
    }

    /// First node with the given name (names are not unique).
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Topmost ancestor of `id` (itself when it is a root).
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        let mut node = self.nodes.get(current)?;
        while let Some(parent) = node.parent {
            current = parent;
            node = self.nodes.get(current)?;
        }
        Some(current)
    }

    /// Number of ancestors above `id`.
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut cursor = self.nodes.get(id)?.parent;
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.nodes.get(parent)?.parent;
        }
        Some(depth)
    }

    /// True if `ancestor` lies on the path from `id` to its root.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            cursor = self.parent(parent);
        }
        false
    }

    /// `root` and all its descendants, parent before children.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    //--- Structure --------------------------------------------------------

    /// Appends `child` to `parent`'s children.
    ///
    /// Fails without side effects if `child` already has a parent or if
    /// the attachment would create a cycle. The child subtree takes the
    /// parent's staging state.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        registry: &mut TargetRegistry,
    ) -> Result<(), StageError> {
        let parent_staged = self
            .nodes
            .get(parent)
            .map(|n| n.staged)
            .ok_or(StageError::UnknownNode(parent))?;
        let child_node = self.nodes.get(child).ok_or(StageError::UnknownNode(child))?;

        if let Some(existing) = child_node.parent {
            warn!(
                "Node {:?} already has parent {:?}, refusing to attach to {:?}",
                child, existing, parent
            );
            return Err(StageError::AlreadyParented {
                child,
                parent: existing,
            });
        }

        if child == parent || self.is_ancestor(child, parent) {
            warn!("Attaching {:?} under {:?} would create a cycle", child, parent);
            return Err(StageError::CycleDetected { child, parent });
        }

        let child_staged = child_node.staged;

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        self.invalidate(child);

        match (parent_staged, child_staged) {
            (true, false) => self.stage_subtree(child, registry),
            (false, true) => self.unstage_subtree(child, registry),
            _ => {}
        }

        debug!("Attached {:?} under {:?}", child, parent);
        Ok(())
    }

    /// Removes `id` from its parent. Children stay with `id`.
    ///
    /// Returns `false` for roots and unknown ids.
    pub fn detach(&mut self, id: NodeId, registry: &mut TargetRegistry) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };

        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&c| c != id);
        }

        let staged = match self.nodes.get_mut(id) {
            Some(node) => {
                node.parent = None;
                node.staged
            }
            None => false,
        };
        self.invalidate(id);

        if staged {
            self.unstage_subtree(id, registry);
        }

        debug!("Detached {:?} from {:?}", id, parent);
        true
    }

    /// Detaches, unregisters and frees `id` with its whole subtree.
    ///
    /// Returns `false` if the id is unknown.
    pub fn destroy(&mut self, id: NodeId, registry: &mut TargetRegistry) -> bool {
        if !self.contains(id) {
            return false;
        }

        self.detach(id, registry);
        self.unstage_subtree(id, registry);

        let doomed = self.descendants(id);
        for &nid in doomed.iter().rev() {
            registry.unregister_all(nid);
            self.nodes.remove(nid);
        }

        debug!("Destroyed {:?} ({} nodes)", id, doomed.len());
        true
    }

    //--- Staging ----------------------------------------------------------

    /// Puts a root subtree on stage: registers by capabilities and fires
    /// `on_attach` for every node, parent before children.
    ///
    /// Staging an already staged root is a no-op.
    pub fn stage(&mut self, root: NodeId, registry: &mut TargetRegistry) -> Result<(), StageError> {
        let node = self.nodes.get(root).ok_or(StageError::UnknownNode(root))?;

        if let Some(parent) = node.parent {
            return Err(StageError::AlreadyParented {
                child: root,
                parent,
            });
        }

        if !node.staged {
            self.stage_subtree(root, registry);
        }
        Ok(())
    }

    /// Takes a root subtree off stage: unregisters and fires `on_detach`.
    pub fn unstage(&mut self, root: NodeId, registry: &mut TargetRegistry) {
        if self.is_staged(root) {
            self.unstage_subtree(root, registry);
        }
    }

    pub fn is_staged(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.staged)
    }

    fn stage_subtree(&mut self, root: NodeId, registry: &mut TargetRegistry) {
        let ids = self.descendants(root);
        for &id in &ids {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            node.staged = true;
            if let Some(behavior) = node.behavior.as_ref() {
                node.capabilities = behavior.capabilities();
            }
            registry.register_capabilities(id, node.capabilities);
            self.sync_hooks(id);
        }
        debug!("Staged {:?} ({} nodes)", root, ids.len());
    }

    fn unstage_subtree(&mut self, root: NodeId, registry: &mut TargetRegistry) {
        let ids = self.descendants(root);
        for &id in &ids {
            registry.unregister_all(id);
            if let Some(node) = self.nodes.get_mut(id) {
                node.staged = false;
            }
            self.sync_hooks(id);
        }
        debug!("Unstaged {:?} ({} nodes)", root, ids.len());
    }

    /// Delivers the pending lifecycle hook, if any.
    fn sync_hooks(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let Some(behavior) = node.behavior.as_mut() else {
            return;
        };

        if node.staged && !node.hooked {
            behavior.on_attach(id);
            node.hooked = true;
        } else if !node.staged && node.hooked {
            behavior.on_detach(id);
            node.hooked = false;
        }
    }

    //--- Behaviors --------------------------------------------------------

    /// Installs (or replaces) a node's behavior.
    ///
    /// On a staged node the registrations are rebuilt from the new
    /// capabilities, which moves the node to the end of each set.
    pub fn set_behavior<B>(
        &mut self,
        id: NodeId,
        behavior: B,
        registry: &mut TargetRegistry,
    ) -> Result<(), StageError>
    where
        B: Behavior + 'static,
    {
        let node = self.nodes.get_mut(id).ok_or(StageError::UnknownNode(id))?;

        let capabilities = behavior.capabilities();
        let previous = node.behavior.replace(Box::new(behavior));
        let was_hooked = std::mem::replace(&mut node.hooked, false);
        node.capabilities = capabilities;
        let staged = node.staged;

        if let Some(mut previous) = previous {
            if was_hooked {
                previous.on_detach(id);
            }
        }

        if staged {
            registry.unregister_all(id);
            registry.register_capabilities(id, capabilities);
        }
        self.sync_hooks(id);
        Ok(())
    }

    pub(crate) fn lease_behavior(&mut self, id: NodeId) -> Option<BehaviorLease> {
        let node = self.nodes.get_mut(id)?;
        let behavior = node.behavior.take()?;
        Some(BehaviorLease {
            node: id,
            behavior,
            hooked: node.hooked,
        })
    }

    /// Puts a leased behavior back, settling any lifecycle change that
    /// happened while it was out.
    pub(crate) fn return_behavior(&mut self, lease: BehaviorLease) {
        let BehaviorLease {
            node: id,
            mut behavior,
            hooked,
        } = lease;

        match self.nodes.get_mut(id) {
            Some(node) if node.behavior.is_none() => {
                node.behavior = Some(behavior);
                self.sync_hooks(id);
            }
            // Replaced or destroyed while leased.
            _ => {
                if hooked {
                    behavior.on_detach(id);
                }
            }
        }
    }

    //--- Flags & Payload --------------------------------------------------

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        self.with_node(id, |n| n.visible = visible)
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.visible)
    }

    /// Inactive nodes keep their registrations but skip updates and events.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> bool {
        self.with_node(id, |n| n.active = active)
    }

    pub fn is_active(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.active)
    }

    pub fn set_payload(&mut self, id: NodeId, payload: Option<RenderPayload>) -> bool {
        self.with_node(id, |n| n.payload = payload)
    }

    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.with_node(id, |n| n.name = name)
    }

    fn with_node(&mut self, id: NodeId, f: impl FnOnce(&mut Node)) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }

    //--- Transforms -------------------------------------------------------

    pub fn transform(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(id).map(|n| n.transform)
    }

    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.nodes.get(id).map(|n| n.transform.position)
    }

    /// Mutates the local transform and invalidates cached compositions.
    pub fn with_transform(&mut self, id: NodeId, f: impl FnOnce(&mut Transform)) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        f(&mut node.transform);
        self.invalidate(id);
        true
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        self.with_transform(id, |t| *t = transform)
    }

    pub fn set_position(&mut self, id: NodeId, position: Point) -> bool {
        self.with_transform(id, |t| t.position = position)
    }

    pub fn set_rotation(&mut self, id: NodeId, radians: f64) -> bool {
        self.with_transform(id, |t| t.rotation = radians)
    }

    pub fn set_scale(&mut self, id: NodeId, sx: f64, sy: f64) -> bool {
        self.with_transform(id, |t| t.scale = Vec2::new(sx, sy))
    }

    pub fn translate_by(&mut self, id: NodeId, delta: Vec2) -> bool {
        self.with_transform(id, |t| t.position += delta)
    }

    pub fn rotate_by(&mut self, id: NodeId, radians: f64) -> bool {
        self.with_transform(id, |t| t.rotation += radians)
    }

    /// Local matrix of a node.
    pub fn local(&self, id: NodeId) -> Option<Affine> {
        self.nodes.get(id).map(|n| n.transform.to_affine())
    }

    /// Root-to-node matrix, rebuilt lazily and memoized.
    ///
    /// Walks up to the nearest cached ancestor (or the root) and fills the
    /// caches on the way back down, so sibling queries share the work.
    pub fn composed(&self, id: NodeId) -> Option<Affine> {
        let node = self.nodes.get(id)?;
        if let Some(cached) = node.composed.get() {
            return Some(cached);
        }

        let mut chain = vec![id];
        let mut base = Affine::IDENTITY;
        let mut cursor = node.parent;

        while let Some(parent_id) = cursor {
            let parent = self.nodes.get(parent_id)?;
            if let Some(cached) = parent.composed.get() {
                base = cached;
                break;
            }
            chain.push(parent_id);
            cursor = parent.parent;
        }

        for &nid in chain.iter().rev() {
            let n = self.nodes.get(nid)?;
            base = base * n.transform.to_affine();
            n.composed.set(Some(base));
        }

        Some(base)
    }

    /// Whether a node's composed matrix is currently cached.
    pub fn is_composed_cached(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.composed.get().is_some())
    }

    fn invalidate(&self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(nid) = stack.pop() {
            let Some(node) = self.nodes.get(nid) else {
                continue;
            };
            if node.composed.take().is_none() && nid != id {
                continue;
            }
            stack.extend(node.children.iter().copied());
        }
    }

    //--- Traversal --------------------------------------------------------

    /// Depth-first, parent before children, with composed matrices.
    ///
    /// Children are visited in insertion order.
    pub fn traverse<F>(&self, root: NodeId, mut visitor: F)
    where
        F: FnMut(NodeId, &Node, Affine),
    {
        self.walk(root, false, &mut visitor);
    }

    /// Like [`NodeTree::traverse`] but skips invisible nodes and their
    /// subtrees.
    pub fn traverse_visible<F>(&self, root: NodeId, mut visitor: F)
    where
        F: FnMut(NodeId, &Node, Affine),
    {
        self.walk(root, true, &mut visitor);
    }

    fn walk<F>(&self, root: NodeId, visible_only: bool, visitor: &mut F)
    where
        F: FnMut(NodeId, &Node, Affine),
    {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if visible_only && !node.visible {
                continue;
            }
            let Some(matrix) = self.composed(id) else {
                continue;
            };

            visitor(id, node, matrix);
            stack.extend(node.children.iter().rev());
        }
    }

    /// Draws a subtree: render payloads first, then `DRAW` behaviors.
    ///
    /// Returns the number of draw calls issued.
    pub(crate) fn draw_subtree(&self, root: NodeId, renderer: &mut dyn Renderer) -> usize {
        let mut drawn = 0;

        self.traverse_visible(root, |_, node, matrix| {
            if let Some(payload) = node.payload {
                renderer.set_color(payload.color);
                renderer.render(payload.shape, matrix);
                drawn += 1;
            }

            if node.capabilities.contains(Capabilities::DRAW) {
                if let Some(behavior) = node.behavior.as_ref() {
                    behavior.draw(renderer, matrix);
                    drawn += 1;
                }
            }
        });

        drawn
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

//=========================================================================
// Target Registry
//=========================================================================
//
// Decoupled sets of nodes that receive per-frame callbacks, independent
// of who is a child of whom.
//
// Architecture:
//   TargetRegistry
//     ├─ update: TargetSet  (Vec<NodeId> order + HashSet<NodeId> members)
//     └─ events: TargetSet
//
// Iteration is copy-on-iterate: a `TargetPass` snapshots the order at the
// start of a pass and re-checks membership before yielding each id.
//
//   registered mid-pass   → not in snapshot, first seen next pass
//   unregistered mid-pass → skipped (never called after removal)
//
// The registry stores ids only. It never owns, outlives or frees a node.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::node::{Capabilities, EventResponse, NodeId};

//=== TargetKind ==========================================================

/// Which registry set a pass walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Update,
    Event,
}

//=== TargetSet ===========================================================

/// Insertion-ordered set of node ids.
#[derive(Debug, Default, Clone)]
struct TargetSet {
    order: Vec<NodeId>,
    members: HashSet<NodeId>,
}

impl TargetSet {
    fn insert(&mut self, id: NodeId) -> bool {
        if self.members.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    fn remove(&mut self, id: NodeId) -> bool {
        if self.members.remove(&id) {
            self.order.retain(|&other| other != id);
            true
        } else {
            false
        }
    }

    fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

//=== DispatchOutcome =====================================================

/// Result of delivering one event through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Target that consumed the event, if any.
    pub handled_by: Option<NodeId>,

    /// Number of targets the event was delivered to.
    pub delivered: usize,
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        self.handled_by.is_some()
    }
}

//=== TargetPass ==========================================================

/// Snapshot of one registry set, walked with live membership checks.
#[derive(Debug)]
pub struct TargetPass {
    kind: TargetKind,
    snapshot: Vec<NodeId>,
    cursor: usize,
}

impl TargetPass {
    /// Next id of the snapshot that is still registered.
    pub fn next_live(&mut self, registry: &TargetRegistry) -> Option<NodeId> {
        while let Some(&id) = self.snapshot.get(self.cursor) {
            self.cursor += 1;
            if registry.contains(self.kind, id) {
                return Some(id);
            }
            trace!("Skipping {:?} target {:?} unregistered mid-pass", self.kind, id);
        }
        None
    }

    /// Size of the snapshot taken at the start of the pass.
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

//=== TargetRegistry ======================================================

/// Update-target and event-target sets.
///
/// Every operation is idempotent: registering twice is ignored and
/// unregistering an absent id is a no-op.
#[derive(Debug, Default, Clone)]
pub struct TargetRegistry {
    update: TargetSet,
    events: TargetSet,
}

impl TargetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    //--- Registration -----------------------------------------------------

    /// Adds a node to the update set. Returns `false` if already present.
    pub fn register_update_target(&mut self, id: NodeId) -> bool {
        let added = self.update.insert(id);
        if added {
            trace!("Registered update target {:?}", id);
        }
        added
    }

    /// Removes a node from the update set. Returns `false` if absent.
    pub fn unregister_update_target(&mut self, id: NodeId) -> bool {
        let removed = self.update.remove(id);
        if removed {
            trace!("Unregistered update target {:?}", id);
        }
        removed
    }

    /// Adds a node to the event set. Returns `false` if already present.
    pub fn register_event_target(&mut self, id: NodeId) -> bool {
        let added = self.events.insert(id);
        if added {
            trace!("Registered event target {:?}", id);
        }
        added
    }

    /// Removes a node from the event set. Returns `false` if absent.
    pub fn unregister_event_target(&mut self, id: NodeId) -> bool {
        let removed = self.events.remove(id);
        if removed {
            trace!("Unregistered event target {:?}", id);
        }
        removed
    }

    /// Registers into every set the capabilities call for.
    pub fn register_capabilities(&mut self, id: NodeId, capabilities: Capabilities) {
        if capabilities.contains(Capabilities::UPDATE) {
            self.register_update_target(id);
        }
        if capabilities.contains(Capabilities::EVENTS) {
            self.register_event_target(id);
        }
    }

    /// Removes a node from both sets.
    pub fn unregister_all(&mut self, id: NodeId) {
        self.unregister_update_target(id);
        self.unregister_event_target(id);
    }

    /// Empties both sets.
    pub fn clear(&mut self) {
        self.update.clear();
        self.events.clear();
    }

    //--- Queries ----------------------------------------------------------

    pub fn contains(&self, kind: TargetKind, id: NodeId) -> bool {
        match kind {
            TargetKind::Update => self.update.contains(id),
            TargetKind::Event => self.events.contains(id),
        }
    }

    pub fn is_update_target(&self, id: NodeId) -> bool {
        self.update.contains(id)
    }

    pub fn is_event_target(&self, id: NodeId) -> bool {
        self.events.contains(id)
    }

    /// Whether the node appears in either set.
    pub fn is_registered(&self, id: NodeId) -> bool {
        self.is_update_target(id) || self.is_event_target(id)
    }

    pub fn update_len(&self) -> usize {
        self.update.len()
    }

    pub fn event_len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.update.len() == 0 && self.events.len() == 0
    }

    /// Update targets in registration order.
    pub fn update_targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.update.order.iter().copied()
    }

    /// Event targets in registration order.
    pub fn event_targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.events.order.iter().copied()
    }

    //--- Passes -----------------------------------------------------------

    /// Starts a snapshot pass over one set.
    pub fn pass(&self, kind: TargetKind) -> TargetPass {
        let snapshot = match kind {
            TargetKind::Update => self.update.order.clone(),
            TargetKind::Event => self.events.order.clone(),
        };

        TargetPass {
            kind,
            snapshot,
            cursor: 0,
        }
    }

    /// Calls `f` once per update target, in registration order.
    pub fn for_each_update_target<F>(&self, mut f: F)
    where
        F: FnMut(NodeId),
    {
        let mut pass = self.pass(TargetKind::Update);
        while let Some(id) = pass.next_live(self) {
            f(id);
        }
    }

    /// Delivers an event to event targets in registration order, stopping
    /// at the first target that reports [`EventResponse::Handled`].
    pub fn dispatch_event<E, F>(&self, event: &E, mut deliver: F) -> DispatchOutcome
    where
        F: FnMut(NodeId, &E) -> EventResponse,
    {
        let mut outcome = DispatchOutcome::default();
        let mut pass = self.pass(TargetKind::Event);

        while let Some(id) = pass.next_live(self) {
            outcome.delivered += 1;
            if deliver(id, event).is_handled() {
                outcome.handled_by = Some(id);
                break;
            }
        }

        outcome
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<NodeId> {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    //--- Idempotence ------------------------------------------------------

    #[test]
    fn double_registration_is_ignored() {
        let id = ids(1)[0];
        let mut registry = TargetRegistry::new();

        assert!(registry.register_update_target(id));
        assert!(!registry.register_update_target(id));
        assert_eq!(registry.update_len(), 1);

        let mut calls = 0;
        registry.for_each_update_target(|_| calls += 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn unregistering_absent_id_is_noop() {
        let all = ids(2);
        let mut registry = TargetRegistry::new();
        registry.register_update_target(all[0]);

        assert!(!registry.unregister_update_target(all[1]));
        assert!(!registry.unregister_event_target(all[1]));
        assert_eq!(registry.update_len(), 1);
        assert_eq!(registry.event_len(), 0);
    }

    #[test]
    fn sets_are_independent() {
        let id = ids(1)[0];
        let mut registry = TargetRegistry::new();

        registry.register_event_target(id);
        assert!(registry.is_event_target(id));
        assert!(!registry.is_update_target(id));
        assert!(registry.is_registered(id));

        registry.unregister_all(id);
        assert!(registry.is_empty());
    }

    #[test]
    fn capabilities_drive_registration() {
        let all = ids(3);
        let mut registry = TargetRegistry::new();

        registry.register_capabilities(all[0], Capabilities::UPDATE);
        registry.register_capabilities(all[1], Capabilities::EVENTS | Capabilities::UPDATE);
        registry.register_capabilities(all[2], Capabilities::DRAW);

        assert_eq!(registry.update_len(), 2);
        assert_eq!(registry.event_len(), 1);
        assert!(!registry.is_registered(all[2]));
    }

    //--- Ordering ---------------------------------------------------------

    #[test]
    fn iteration_follows_registration_order() {
        let all = ids(4);
        let mut registry = TargetRegistry::new();
        for &id in all.iter().rev() {
            registry.register_update_target(id);
        }

        let mut seen = Vec::new();
        registry.for_each_update_target(|id| seen.push(id));

        let expected: Vec<_> = all.iter().rev().copied().collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn reregistration_appends_at_end() {
        let all = ids(3);
        let mut registry = TargetRegistry::new();
        for &id in &all {
            registry.register_update_target(id);
        }

        registry.unregister_update_target(all[0]);
        registry.register_update_target(all[0]);

        let order: Vec<_> = registry.update_targets().collect();
        assert_eq!(order, vec![all[1], all[2], all[0]]);
    }

    //--- Passes -----------------------------------------------------------

    #[test]
    fn pass_skips_entries_removed_mid_pass() {
        let all = ids(3);
        let mut registry = TargetRegistry::new();
        for &id in &all {
            registry.register_update_target(id);
        }

        let mut pass = registry.pass(TargetKind::Update);
        let mut seen = Vec::new();

        while let Some(id) = pass.next_live(&registry) {
            seen.push(id);
            if id == all[0] {
                registry.unregister_update_target(all[1]);
            }
        }

        assert_eq!(seen, vec![all[0], all[2]]);
    }

    #[test]
    fn pass_defers_entries_added_mid_pass() {
        let all = ids(3);
        let mut registry = TargetRegistry::new();
        registry.register_update_target(all[0]);
        registry.register_update_target(all[1]);

        let mut pass = registry.pass(TargetKind::Update);
        let mut seen = Vec::new();

        while let Some(id) = pass.next_live(&registry) {
            seen.push(id);
            registry.register_update_target(all[2]);
        }

        assert_eq!(seen, vec![all[0], all[1]]);

        let mut next_frame = Vec::new();
        registry.for_each_update_target(|id| next_frame.push(id));
        assert_eq!(next_frame, all);
    }

    //--- Dispatch ---------------------------------------------------------

    #[test]
    fn dispatch_stops_at_first_handler() {
        let all = ids(2);
        let mut registry = TargetRegistry::new();
        registry.register_event_target(all[0]);
        registry.register_event_target(all[1]);

        let mut received = Vec::new();
        let outcome = registry.dispatch_event(&"click", |id, _| {
            received.push(id);
            EventResponse::Handled
        });

        assert_eq!(received, vec![all[0]]);
        assert_eq!(outcome.handled_by, Some(all[0]));
        assert_eq!(outcome.delivered, 1);
    }

    #[test]
    fn dispatch_reaches_everyone_when_unhandled() {
        let all = ids(3);
        let mut registry = TargetRegistry::new();
        for &id in &all {
            registry.register_event_target(id);
        }

        let outcome = registry.dispatch_event(&42u32, |_, _| EventResponse::Ignored);

        assert!(!outcome.is_handled());
        assert_eq!(outcome.delivered, 3);
    }
}

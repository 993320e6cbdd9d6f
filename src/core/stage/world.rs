//=========================================================================
// Stage World
//=========================================================================
//
// Owns the tree, the registry and the scene stack, and runs frames.
//
// Tick order:
//   1. events: each one folded into the input snapshot, then dispatched
//      to event targets until one handles it. Nodes of scenes covered by
//      an opaque scene are skipped.
//   2. update pass over a snapshot of the update targets
//   3. physics step
//   4. scenes: advance, apply queued transitions, reap exited scenes
//   5. draw pass, bottom scene first
//
// Behaviors are leased out of their node while they run, so a behavior
// gets `&mut NodeTree` and can restructure the tree around itself
// (including detaching or destroying its own node).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::{error, info, trace};

//=== Internal Dependencies ===============================================

use super::{FrameReport, StageContext};
use crate::core::collaborators::Renderer;
use crate::core::config::WorldProperties;
use crate::core::error::StageError;
use crate::core::input::{InputEvent, StateTracker};
use crate::core::node::{EventContext, NodeId, NodeTree, UpdateContext};
use crate::core::registry::{DispatchOutcome, TargetKind, TargetRegistry};
use crate::core::scene::{
    Scene, SceneKey, SceneStack, SceneState, SceneTransition, SceneWorld, TransitionQueue,
};

//=== Stage ===============================================================

/// A retained-mode 2D world driven one frame at a time.
pub struct Stage<K: SceneKey> {
    tree: NodeTree,
    registry: TargetRegistry,
    scenes: SceneStack<K>,
    transitions: TransitionQueue<K>,
    context: StageContext,
    frame: u64,
}

impl<K: SceneKey> Stage<K> {
    //--- Construction -----------------------------------------------------

    pub fn with_context(context: StageContext) -> Self {
        Self {
            tree: NodeTree::new(),
            registry: TargetRegistry::new(),
            scenes: SceneStack::new(),
            transitions: TransitionQueue::new(),
            context,
            frame: 0,
        }
    }

    //--- Scenes -----------------------------------------------------------

    /// Registers a scene and builds its subtree. The scene stays off stage
    /// until pushed.
    pub fn register_scene<T>(&mut self, key: K, scene: T) -> Result<NodeId, StageError>
    where
        T: Scene<K> + 'static,
    {
        let (scenes, mut world) = self.split();
        scenes.register_scene(key, scene, &mut world)
    }

    /// Queues a stack change; applied during the next tick.
    pub fn request(&mut self, transition: SceneTransition<K>) {
        self.transitions.push(transition);
    }

    /// Applies queued stack changes now instead of waiting for a tick.
    pub fn flush_transitions(&mut self) -> usize {
        let (scenes, mut world) = self.split();
        scenes.process_transitions(&mut world)
    }

    pub fn scenes(&self) -> &SceneStack<K> {
        &self.scenes
    }

    pub fn scene_state(&self, key: K) -> Option<SceneState> {
        self.scenes.state_of(key)
    }

    pub fn scene_root(&self, key: K) -> Option<NodeId> {
        self.scenes.root_of(key)
    }

    //--- Tree Access ------------------------------------------------------

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Tree plus registry, for structural edits that must keep both in step.
    pub fn tree_mut(&mut self) -> (&mut NodeTree, &mut TargetRegistry) {
        (&mut self.tree, &mut self.registry)
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StageError> {
        self.tree.add_child(parent, child, &mut self.registry)
    }

    pub fn detach(&mut self, id: NodeId) -> bool {
        self.tree.detach(id, &mut self.registry)
    }

    pub fn destroy(&mut self, id: NodeId) -> bool {
        self.tree.destroy(id, &mut self.registry)
    }

    //--- Context Access ---------------------------------------------------

    pub fn properties(&self) -> &WorldProperties {
        &self.context.properties
    }

    pub fn input(&self) -> &StateTracker {
        &self.context.input
    }

    /// Renderer, e.g. for registering shapes before the first frame.
    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        &mut *self.context.renderer
    }

    pub fn context(&self) -> &StageContext {
        &self.context
    }

    /// Updates the device resolution after a window resize. View size is
    /// unchanged, so device-to-view mapping rescales.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            trace!("Ignoring degenerate resize {}x{}", width, height);
            return;
        }

        info!("Device resized to {}x{}", width, height);
        self.context.properties.device_width = width;
        self.context.properties.device_height = height;
    }

    /// Ticks completed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    //=====================================================================
    // Frame Driver
    //=====================================================================

    /// Runs one frame. See the module header for the pass order.
    pub fn tick(&mut self, dt: Duration, events: &[InputEvent]) -> FrameReport {
        let mut report = FrameReport::default();

        //--- 1. Events ------------------------------------------------------
        self.context.input.begin_frame();
        for event in events {
            if matches!(event, InputEvent::Unidentified) {
                continue;
            }

            self.context.input.apply(event);
            let outcome = self.dispatch_event(event);
            report.events_dispatched += 1;
            if outcome.is_handled() {
                report.events_handled += 1;
            }
        }
        self.context.input.end_frame();

        //--- 2. Updates -----------------------------------------------------
        let (updated, failed) = self.update_targets(dt);
        report.updated = updated;
        report.failed_updates = failed;

        //--- 3. Physics -----------------------------------------------------
        if let Some(physics) = self.context.physics.as_mut() {
            physics.step(dt);
        }

        //--- 4. Scenes ------------------------------------------------------
        let (scenes, mut world) = self.split();
        scenes.advance(dt, &mut world);
        scenes.process_transitions(&mut world);
        scenes.reap(&mut world);

        //--- 5. Draw --------------------------------------------------------
        report.drawn = self.draw();

        self.frame += 1;
        trace!("Frame {} complete: {:?}", self.frame, report);
        report
    }

    /// Delivers one event to event targets in registration order, stopping
    /// at the first that handles it.
    ///
    /// Inactive nodes are skipped, as are nodes under a scene covered by an
    /// opaque scene above it.
    pub fn dispatch_event(&mut self, event: &InputEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let covered = self.scenes.covered_roots();
        let mut pass = self.registry.pass(TargetKind::Event);

        while let Some(id) = pass.next_live(&self.registry) {
            if !self.tree.is_active(id) {
                continue;
            }
            if !covered.is_empty()
                && self.tree.root_of(id).is_some_and(|root| covered.contains(&root))
            {
                trace!("Skipping {:?}, its scene is covered", id);
                continue;
            }
            let Some(mut lease) = self.tree.lease_behavior(id) else {
                continue;
            };

            let mut ctx = EventContext {
                node: id,
                tree: &mut self.tree,
                registry: &mut self.registry,
                properties: &self.context.properties,
                input: &self.context.input,
            };
            let response = lease.behavior.handle_event(&mut ctx, event);
            self.tree.return_behavior(lease);

            outcome.delivered += 1;
            if response.is_handled() {
                trace!("{:?} handled by {:?}", event.kind(), id);
                outcome.handled_by = Some(id);
                break;
            }
        }

        outcome
    }

    /// Runs `update` on every live, active update target.
    ///
    /// Returns `(updated, failed)`. Failures are logged and do not stop
    /// the pass.
    fn update_targets(&mut self, dt: Duration) -> (usize, usize) {
        let mut updated = 0;
        let mut failed = 0;
        let mut pass = self.registry.pass(TargetKind::Update);

        while let Some(id) = pass.next_live(&self.registry) {
            if !self.tree.is_active(id) {
                continue;
            }
            let Some(mut lease) = self.tree.lease_behavior(id) else {
                continue;
            };

            let mut ctx = UpdateContext {
                node: id,
                tree: &mut self.tree,
                registry: &mut self.registry,
                properties: &self.context.properties,
                input: &self.context.input,
            };
            let result = lease.behavior.update(&mut ctx, dt);
            self.tree.return_behavior(lease);

            updated += 1;
            if let Err(err) = result {
                failed += 1;
                error!(
                    "Update failed on node {:?} ({}): {}",
                    id,
                    self.tree.name(id).unwrap_or("<destroyed>"),
                    err
                );
            }
        }

        (updated, failed)
    }

    fn draw(&mut self) -> usize {
        let renderer = &mut *self.context.renderer;
        renderer.begin_frame();
        let drawn = self.scenes.draw(&self.tree, renderer);
        renderer.end_frame();
        drawn
    }

    fn split(&mut self) -> (&mut SceneStack<K>, SceneWorld<'_, K>) {
        let world = SceneWorld {
            tree: &mut self.tree,
            registry: &mut self.registry,
            properties: &self.context.properties,
            input: &self.context.input,
            renderer: &mut *self.context.renderer,
            transitions: &mut self.transitions,
        };
        (&mut self.scenes, world)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

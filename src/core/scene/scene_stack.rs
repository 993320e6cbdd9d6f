//=========================================================================
// Scene Stack
//=========================================================================
//
// Manages scene registration, stack operations, and animated lifecycle.
//
// Scenes are stored in a HashMap by key and referenced via a stack of
// keys, so they keep their subtree and state between activations. Stack
// membership follows the controller:
//
//   Push    → key appended, controller notified TransitionStartIn
//   Remove  → controller notified TransitionStartOut (key stays stacked)
//   reap()  → ExitedStage keys popped, controller recycled to OffStage
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::controller::SceneController;
use super::state::{NotifyOutcome, SceneState};
use super::transition_queue::TransitionQueue;
use super::{Scene, SceneContext};
use crate::core::collaborators::Renderer;
use crate::core::config::WorldProperties;
use crate::core::error::StageError;
use crate::core::input::StateTracker;
use crate::core::node::{NodeId, NodeTree};
use crate::core::registry::TargetRegistry;

//=== Scene Transition ====================================================

/// Encapsulates scene stack operations.
///
/// Scenes are managed via a stack where transitions control the flow
/// between game states (menus, gameplay, pause, etc.). Every change is
/// animated by the affected scenes' controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneTransition<K: SceneKey> {
    /// Adds a scene to the top of the stack and animates it in.
    Push(K),

    /// Animates a scene out; it leaves the stack once fully exited.
    Remove(K),

    /// Animates the first scene out and the second in, in its place.
    Replace(K, K),

    /// Animates every stacked scene out.
    Clear,

    /// No transition occurs.
    #[default]
    Empty,
}

//=== Scene Key Trait =====================================================

/// Marker trait for scene identifiers.
///
/// Typically implemented by game-specific enums.
pub trait SceneKey: Clone + Copy + Eq + Hash + Debug + Send + 'static {}

//=== SceneWorld ==========================================================

/// Borrowed stage state the stack operates on.
pub struct SceneWorld<'a, K: SceneKey> {
    pub tree: &'a mut NodeTree,
    pub registry: &'a mut TargetRegistry,
    pub properties: &'a WorldProperties,
    pub input: &'a StateTracker,
    pub renderer: &'a mut dyn Renderer,
    pub transitions: &'a mut TransitionQueue<K>,
}

impl<K: SceneKey> SceneWorld<'_, K> {
    fn context(&mut self, key: K, root: NodeId, state: SceneState) -> SceneContext<'_, K> {
        SceneContext {
            key,
            root,
            state,
            tree: &mut *self.tree,
            registry: &mut *self.registry,
            properties: self.properties,
            input: self.input,
            renderer: &mut *self.renderer,
            transitions: &mut *self.transitions,
        }
    }
}

//=== SceneSlot ===========================================================

struct SceneSlot<K: SceneKey> {
    scene: Box<dyn Scene<K>>,
    controller: SceneController,
}

//=== Scene Stack =========================================================

/// Owns registered scenes and the ordered stack of those on stage.
pub struct SceneStack<K: SceneKey> {
    scenes: HashMap<K, SceneSlot<K>>,
    stack: Vec<K>,
}

impl<K: SceneKey> SceneStack<K> {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            scenes: HashMap::new(),
            stack: Vec::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a scene: creates its root, runs `build`, parks it
    /// `OffStage`. Returns the root id.
    ///
    /// Re-registering a key replaces the old scene and destroys its
    /// subtree.
    pub fn register_scene<T>(
        &mut self,
        key: K,
        scene: T,
        world: &mut SceneWorld<'_, K>,
    ) -> Result<NodeId, StageError>
    where
        T: Scene<K> + 'static,
    {
        let mut scene: Box<dyn Scene<K>> = Box::new(scene);
        let config = scene.transition(world.properties);

        let root = world.tree.create(format!("{:?}", key));
        let controller = SceneController::new(root, &config, world.properties);
        controller.park(world.tree);

        let built = {
            let mut ctx = world.context(key, root, SceneState::OffStage);
            scene.build(&mut ctx)
        };
        if let Err(err) = built {
            warn!("Scene {:?} failed to build: {}", key, err);
            world.tree.destroy(root, world.registry);
            return Err(err);
        }

        if let Some(mut old) = self.scenes.insert(key, SceneSlot { scene, controller }) {
            warn!("Scene {:?} was already registered and has been replaced", key);

            let old_root = old.controller.root();
            if self.stack.contains(&key) {
                self.stack.retain(|&k| k != key);
                let mut ctx = world.context(key, old_root, old.controller.state());
                old.scene.on_exit(&mut ctx);
            }
            world.tree.destroy(old_root, world.registry);
        }

        debug!("Registered scene {:?} with root {:?}", key, root);
        Ok(root)
    }

    //--- Transition Processing --------------------------------------------

    /// Applies every queued transition in FIFO order.
    ///
    /// Returns the number of requests processed.
    pub fn process_transitions(&mut self, world: &mut SceneWorld<'_, K>) -> usize {
        let batch = world.transitions.take();
        let count = batch.len();

        for transition in batch {
            match transition {
                SceneTransition::Push(key) => self.push_internal(key, None, world),
                SceneTransition::Remove(key) => self.remove_internal(key, world),
                SceneTransition::Replace(old_key, new_key) => {
                    self.replace_internal(old_key, new_key, world)
                }
                SceneTransition::Clear => self.clear_internal(world),
                SceneTransition::Empty => {}
            }
        }

        count
    }

    //--- Per-Frame --------------------------------------------------------

    /// Runs scene hooks and advances controllers.
    ///
    /// Active scenes get `update` and, while `OnStage`, `should_exit`.
    /// Controllers of active scenes advance, and so do the controllers of
    /// any scene mid-transition so a covered scene can finish animating.
    pub fn advance(&mut self, dt: Duration, world: &mut SceneWorld<'_, K>) -> usize {
        let active = self.collect_active_scenes();
        let keys = self.stack.clone();
        let mut advanced = 0;

        for key in keys {
            let Some(slot) = self.scenes.get_mut(&key) else {
                continue;
            };

            let is_active = active.contains(&key);
            let state = slot.controller.state();
            if !is_active && !state.is_transitioning() {
                continue;
            }

            let root = slot.controller.root();
            let mut exit = false;
            if is_active && state.is_visible() {
                let mut ctx = world.context(key, root, state);
                slot.scene.update(&mut ctx, dt);
                if state == SceneState::OnStage {
                    exit = slot.scene.should_exit(&mut ctx, dt);
                }
            }

            slot.controller
                .update(dt, world.tree, world.registry, |_, _| exit);
            advanced += 1;
        }

        advanced
    }

    /// Pops scenes that finished exiting and recycles them to `OffStage`.
    ///
    /// Returns the popped keys, bottom to top.
    pub fn reap(&mut self, world: &mut SceneWorld<'_, K>) -> Vec<K> {
        let exited: Vec<K> = self
            .stack
            .iter()
            .copied()
            .filter(|key| self.state_of(*key) == Some(SceneState::ExitedStage))
            .collect();

        for &key in &exited {
            self.stack.retain(|&k| k != key);

            let Some(slot) = self.scenes.get_mut(&key) else {
                continue;
            };
            if let Err(err) = slot
                .controller
                .notify(SceneState::OffStage, world.tree, world.registry)
            {
                warn!("Scene {:?} could not be recycled: {}", key, err);
            }

            let mut ctx = world.context(key, slot.controller.root(), slot.controller.state());
            slot.scene.on_exit(&mut ctx);
            info!("Popped scene {:?} from stack", key);
        }

        exited
    }

    /// Draws every visible stacked scene, bottom to top.
    pub fn draw(&self, tree: &NodeTree, renderer: &mut dyn Renderer) -> usize {
        self.stack
            .iter()
            .filter_map(|key| self.scenes.get(key))
            .map(|slot| tree.draw_subtree(slot.controller.root(), renderer))
            .sum()
    }

    //--- Inspection -------------------------------------------------------

    /// Foreground scene.
    pub fn top(&self) -> Option<K> {
        self.stack.last().copied()
    }

    pub fn state_of(&self, key: K) -> Option<SceneState> {
        self.scenes.get(&key).map(|slot| slot.controller.state())
    }

    pub fn root_of(&self, key: K) -> Option<NodeId> {
        self.scenes.get(&key).map(|slot| slot.controller.root())
    }

    pub fn controller(&self, key: K) -> Option<&SceneController> {
        self.scenes.get(&key).map(|slot| &slot.controller)
    }

    /// Whether `key` is on the stack.
    pub fn contains(&self, key: K) -> bool {
        self.stack.contains(&key)
    }

    pub fn is_registered(&self, key: K) -> bool {
        self.scenes.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Stacked keys, bottom to top.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.stack.iter().copied()
    }

    /// Scenes that receive updates this tick, bottom to top.
    pub fn active_scenes(&self) -> Vec<K> {
        self.collect_active_scenes()
    }

    /// Roots of stacked scenes below the topmost opaque scene.
    pub fn covered_roots(&self) -> Vec<NodeId> {
        let active = self.collect_active_scenes();
        self.stack
            .iter()
            .filter(|key| !active.contains(*key))
            .filter_map(|&key| self.root_of(key))
            .collect()
    }

    //--- Internal Helpers -------------------------------------------------

    fn push_internal(&mut self, key: K, index: Option<usize>, world: &mut SceneWorld<'_, K>) {
        let Some(slot) = self.scenes.get_mut(&key) else {
            warn!("Attempted to push unregistered scene {:?}", key);
            return;
        };

        if self.stack.contains(&key) {
            let state = slot.controller.state();
            if state.is_exiting() || state == SceneState::ExitedStage {
                debug!("Scene {:?} pushed while exiting, reversing", key);
                if let Err(err) =
                    slot.controller
                        .notify(SceneState::TransitionStartIn, world.tree, world.registry)
                {
                    warn!("Cannot reverse scene {:?}: {}", key, err);
                }
            } else {
                warn!("Scene {:?} is already in the stack, skipping push", key);
            }
            return;
        }

        match slot
            .controller
            .notify(SceneState::TransitionStartIn, world.tree, world.registry)
        {
            Ok(_) => {
                let index = index.unwrap_or(self.stack.len()).min(self.stack.len());
                self.stack.insert(index, key);
                info!("Pushed scene {:?} onto stack at position {}", key, index);

                let mut ctx = world.context(key, slot.controller.root(), slot.controller.state());
                slot.scene.on_enter(&mut ctx);
            }
            Err(err) => warn!("Cannot push scene {:?}: {}", key, err),
        }
    }

    fn remove_internal(&mut self, key: K, world: &mut SceneWorld<'_, K>) {
        if !self.stack.contains(&key) {
            debug!("Scene {:?} not found in stack, skipping removal", key);
            return;
        }
        let Some(slot) = self.scenes.get_mut(&key) else {
            return;
        };

        match slot
            .controller
            .notify(SceneState::TransitionStartOut, world.tree, world.registry)
        {
            Ok(NotifyOutcome::Accepted) => debug!("Scene {:?} animating out", key),
            Ok(NotifyOutcome::Ignored) => {}
            Err(err) => warn!("Cannot remove scene {:?}: {}", key, err),
        }
    }

    fn replace_internal(&mut self, old_key: K, new_key: K, world: &mut SceneWorld<'_, K>) {
        let Some(pos) = self.stack.iter().position(|&k| k == old_key) else {
            warn!("Scene {:?} not found in stack, skipping replacement", old_key);
            return;
        };

        if self.stack.contains(&new_key) {
            warn!("Scene {:?} is already in the stack, skipping replacement", new_key);
            return;
        }

        if !self.scenes.contains_key(&new_key) {
            warn!("Attempted to replace with unregistered scene {:?}", new_key);
            return;
        }

        debug!("Replacing scene {:?} with {:?} at position {}", old_key, new_key, pos);
        self.remove_internal(old_key, world);
        self.push_internal(new_key, Some(pos + 1), world);
    }

    fn clear_internal(&mut self, world: &mut SceneWorld<'_, K>) {
        debug!("Clearing all scenes from stack");
        for key in self.stack.clone() {
            self.remove_internal(key, world);
        }
    }

    fn collect_active_scenes(&self) -> Vec<K> {
        let mut active = Vec::new();

        // Iterate stack top-down, stop at first opaque scene
        for &key in self.stack.iter().rev() {
            active.insert(0, key);

            if let Some(slot) = self.scenes.get(&key) {
                if !slot.scene.is_transparent() {
                    break;
                }
            }
        }

        active
    }
}

impl<K: SceneKey> Default for SceneStack<K> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

//=========================================================================
// Scene System
//=========================================================================
//
// Scenes are subtrees that animate on and off stage.
//
// Architecture:
//   SceneStack
//     ├─ scenes: HashMap<K, SceneSlot>
//     │    ├─ scene: Box<dyn Scene<K>>   (user code)
//     │    └─ controller: SceneController (state machine + tween)
//     └─ stack: Vec<K>                   (bottom → top)
//
// Flow per tick:
//   advance()             → Scene::update / should_exit, controller tweens
//   process_transitions() → queued Push / Remove / Replace / Clear
//   reap()                → pop ExitedStage scenes, recycle to OffStage
//
//=========================================================================

//=== Module Declarations =================================================

mod controller;
mod scene_stack;
mod state;
mod transition_queue;
mod tween;

//=== Public API ==========================================================

pub use controller::{ExitTimer, SceneController, SlideDirection, TransitionConfig};
pub use scene_stack::{SceneKey, SceneStack, SceneTransition, SceneWorld};
pub use state::{NotifyOutcome, SceneState};
pub use transition_queue::TransitionQueue;
pub use tween::{Easing, Tween, TweenStep};

//=== External Dependencies ===============================================

use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::collaborators::Renderer;
use crate::core::config::WorldProperties;
use crate::core::error::StageError;
use crate::core::input::StateTracker;
use crate::core::node::{Behavior, NodeId, NodeTree};
use crate::core::registry::TargetRegistry;

//=== SceneContext ========================================================

/// Everything a scene can reach from its hooks.
pub struct SceneContext<'a, K: SceneKey> {
    pub key: K,

    /// Root node of the scene's subtree.
    pub root: NodeId,

    /// Controller state when the hook was invoked.
    pub state: SceneState,

    pub tree: &'a mut NodeTree,
    pub registry: &'a mut TargetRegistry,
    pub properties: &'a WorldProperties,
    pub input: &'a StateTracker,
    pub renderer: &'a mut dyn Renderer,
    transitions: &'a mut TransitionQueue<K>,
}

impl<K: SceneKey> SceneContext<'_, K> {
    /// Queues a stack change for the end of the tick.
    pub fn request(&mut self, transition: SceneTransition<K>) {
        self.transitions.push(transition);
    }

    /// Creates a behavior-less node under the scene root.
    pub fn create_child(&mut self, name: &str) -> Result<NodeId, StageError> {
        let id = self.tree.create(name);
        self.tree.add_child(self.root, id, self.registry)?;
        Ok(id)
    }

    /// Creates a node with `behavior` under the scene root.
    pub fn spawn_child<B>(&mut self, name: &str, behavior: B) -> Result<NodeId, StageError>
    where
        B: Behavior + 'static,
    {
        let id = self.tree.spawn(name, behavior);
        self.tree.add_child(self.root, id, self.registry)?;
        Ok(id)
    }
}

//=== Scene Trait =========================================================

/// Defines scene behavior with lifecycle hooks and update logic.
///
/// Scenes are registered in the [`SceneStack`] and brought on stage via
/// [`SceneTransition`] requests. Each scene keeps its subtree and its own
/// state between activations.
///
/// # Minimal Implementation
///
/// Only `update()` is required:
///
/// ```rust
/// # use aetheric_stage::prelude::*;
/// # use std::time::Duration;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum GameScene { Main }
/// # impl SceneKey for GameScene {}
/// struct MyScene;
///
/// impl Scene<GameScene> for MyScene {
///     fn update(&mut self, _ctx: &mut SceneContext<'_, GameScene>, _dt: Duration) {}
/// }
/// ```
pub trait Scene<K: SceneKey>: Send {
    /// Populates the scene root once, at registration.
    fn build(&mut self, _ctx: &mut SceneContext<'_, K>) -> Result<(), StageError> {
        Ok(())
    }

    /// Called when the scene is pushed and starts animating in.
    fn on_enter(&mut self, _ctx: &mut SceneContext<'_, K>) {}

    /// Called when the scene has animated out and left the stack.
    fn on_exit(&mut self, _ctx: &mut SceneContext<'_, K>) {}

    /// Called every tick while the scene is active.
    fn update(&mut self, ctx: &mut SceneContext<'_, K>, dt: Duration);

    /// Polled every tick while `OnStage` and active; `true` starts the exit.
    fn should_exit(&mut self, _ctx: &mut SceneContext<'_, K>, _dt: Duration) -> bool {
        false
    }

    /// Whether scenes below this one stay active.
    ///
    /// Transparent scenes (e.g. pause overlays) let the stack below keep
    /// updating. Opaque scenes block it.
    fn is_transparent(&self) -> bool {
        false
    }

    /// Entry/exit animation, read once at registration.
    fn transition(&self, props: &WorldProperties) -> TransitionConfig {
        TransitionConfig::from_properties(props)
    }
}

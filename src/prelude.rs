//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_stage::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime
pub use crate::engine::{Engine, EngineBuilder};
pub use crate::core::stage::{FrameReport, Stage, StageBuilder, StageContext};

// Configuration & errors
pub use crate::core::config::{ViewOrigin, WorldProperties};
pub use crate::core::error::{BehaviorError, BehaviorResult, StageError};

// Collaborators
pub use crate::core::collaborators::{
    DrawMode, PhysicsStepper, RecordingRenderer, RenderPayload, Renderer, Rgba, ShapeId,
};

// Nodes
pub use crate::core::node::{
    Behavior, Capabilities, EventContext, EventResponse, NodeId, NodeTree, Transform,
    UpdateContext,
};
pub use crate::core::registry::{DispatchOutcome, TargetRegistry};

// Scenes
pub use crate::core::scene::{
    Easing, ExitTimer, Scene, SceneContext, SceneKey, SceneState, SceneTransition,
    SlideDirection, TransitionConfig,
};

// Input
pub use crate::core::input::{InputEvent, KeyCode, Modifiers, MouseButton, StateTracker};

// Geometry
pub use kurbo::{Affine, Point, Vec2};

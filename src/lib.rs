//=========================================================================
// Aetheric Stage - Library Root
//
// Retained-mode 2D scene graph with animated scene transitions.
//
// Responsibilities:
// - Expose the headless core (`core`): node tree, target registry,
//   scene stack, coordinate mapping and the `Stage` frame driver
// - Expose the windowed runtime (`Engine`, `EngineBuilder`)
// - Keep the winit platform layer private
//
// Typical usage:
// ```no_run
// use aetheric_stage::prelude::*;
//
// let mut stage: Stage<Screen> = StageBuilder::new()
//     .with_renderer(RecordingRenderer::new())
//     .build()?;
// stage.register_scene(Screen::Title, TitleScene::default())?;
// stage.request(SceneTransition::Push(Screen::Title));
// let report = stage.tick(step, &events);
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds everything that runs without a window. Tests and tools
// drive `core::stage::Stage` directly.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` owns the winit window and input conversion. `engine` wires
// it to the logic thread.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use crate::core::error::{BehaviorError, BehaviorResult, StageError};
pub use crate::core::platform_bridge::PlatformError;
pub use crate::core::stage::{Stage, StageBuilder};
pub use engine::{Engine, EngineBuilder};

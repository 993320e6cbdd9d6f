//=========================================================================
// Input System
//=========================================================================
//
// Input event model and the per-frame input snapshot.
//
// The platform layer converts native events into `InputEvent`s; the stage
// feeds each one into the `StateTracker` and then dispatches it through
// the target registry.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod event;
mod state_tracker;

//=== Public API ==========================================================

pub use event::{InputEvent, InputKind, KeyCode, Modifiers, MouseButton};
pub use state_tracker::StateTracker;

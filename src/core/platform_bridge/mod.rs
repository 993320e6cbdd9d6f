//=========================================================================
// Platform Bridge
//=========================================================================
//
// Contract between the windowing layer and the logic thread.
//
// The platform thread only ever sends `PlatformEvent`s; the logic thread
// only ever reads them through the `EventCollector`. Neither side sees
// the other's types.
//
// Components:
// - `interface`: event and error types (the contract)
// - `event_collector`: logic-side draining and flattening
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Internal API ========================================================

pub(crate) use event_collector::{EventCollector, TickControl};
pub(crate) use interface::PlatformEvent;

//=== Public API ==========================================================

pub use interface::PlatformError;

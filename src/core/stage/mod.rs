//=========================================================================
// Stage
//=========================================================================
//
// The world a frame runs against: node tree, target registry, scene stack
// and the collaborators supplied at construction.
//
// Architecture:
//   StageBuilder ──build()──> Stage<K>
//                               ├─ tree: NodeTree
//                               ├─ registry: TargetRegistry
//                               ├─ scenes: SceneStack<K>
//                               ├─ transitions: TransitionQueue<K>
//                               └─ context: StageContext
//                                    ├─ properties, input snapshot
//                                    └─ renderer, physics stepper
//
// Frame order (Stage::tick):
//   events → update pass → physics → scenes → draw
//
//=========================================================================

//=== Module Declarations =================================================

mod context;
mod frame;
mod world;

//=== Public API ==========================================================

pub use context::{StageBuilder, StageContext};
pub use frame::FrameReport;
pub use world::Stage;

//=========================================================================
// Integration Test Support
//=========================================================================
//
// Shared scene keys, logging behaviors and stage construction.
//
//=========================================================================

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use aetheric_stage::prelude::*;

/// One 60Hz tick as configured by the default `ms_per_update`.
pub const STEP: Duration = Duration::from_micros(16_600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Menu,
    Game,
    Pause,
}

impl SceneKey for Screen {}

//--- Shared Log ----------------------------------------------------------

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn clear(log: &Log) {
    log.lock().unwrap().clear();
}

fn push(log: &Log, entry: String) {
    log.lock().unwrap().push(entry);
}

//--- Tracer Behavior -----------------------------------------------------

/// Logs every hook as `"<tag>:<hook>"`.
pub struct Tracer {
    pub tag: &'static str,
    pub caps: Capabilities,
    pub response: EventResponse,
    pub log: Log,
}

impl Tracer {
    pub fn new(tag: &'static str, log: &Log) -> Self {
        Self {
            tag,
            caps: Capabilities::UPDATE | Capabilities::EVENTS,
            response: EventResponse::Ignored,
            log: Arc::clone(log),
        }
    }

    pub fn handling(mut self) -> Self {
        self.response = EventResponse::Handled;
        self
    }
}

impl Behavior for Tracer {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn on_attach(&mut self, _node: NodeId) {
        push(&self.log, format!("{}:attach", self.tag));
    }

    fn on_detach(&mut self, _node: NodeId) {
        push(&self.log, format!("{}:detach", self.tag));
    }

    fn update(&mut self, _ctx: &mut UpdateContext<'_>, _dt: Duration) -> BehaviorResult {
        push(&self.log, format!("{}:update", self.tag));
        Ok(())
    }

    fn handle_event(&mut self, _ctx: &mut EventContext<'_>, _event: &InputEvent) -> EventResponse {
        push(&self.log, format!("{}:event", self.tag));
        self.response
    }
}

//--- Stage Construction --------------------------------------------------

pub fn stage() -> Stage<Screen> {
    stage_with(RecordingRenderer::new())
}

pub fn stage_with(renderer: RecordingRenderer) -> Stage<Screen> {
    StageBuilder::new()
        .with_properties(WorldProperties::with_resolution(800, 600))
        .with_renderer(renderer)
        .build()
        .expect("stage builds")
}

/// Ticks `frames` times with no input.
pub fn run(stage: &mut Stage<Screen>, frames: usize) {
    for _ in 0..frames {
        stage.tick(STEP, &[]);
    }
}

pub fn space_down() -> InputEvent {
    InputEvent::KeyDown {
        key: KeyCode::Space,
        modifiers: Modifiers::NONE,
    }
}

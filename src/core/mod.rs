//=========================================================================
// Core Systems Orchestrator
//
// Drives the stage on the logic (non-platform) thread.
//
// Responsibilities:
// - Own the `Stage` for the lifetime of the run
// - Receive platform messages over the crossbeam channel
// - Tick the stage at a fixed rate (TPS) with a fixed step
// - Stop when the window closes or the platform disconnects
//
// Notes:
// The orchestrator never touches the window. Input reaches it only as
// `PlatformEvent`s, so the stage can be ticked headless in tests with
// exactly the same code path.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod collaborators;
pub mod config;
pub mod coords;
pub mod error;
pub mod input;
pub mod node;
pub(crate) mod platform_bridge;
pub mod registry;
pub mod scene;
pub mod stage;

//=== External Dependencies ===============================================

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use platform_bridge::{EventCollector, PlatformEvent, TickControl};
use scene::SceneKey;
use stage::Stage;

//=== CoreSystemsOrchestrator =============================================

/// Owns the stage until the logic thread is spawned.
pub(crate) struct CoreSystemsOrchestrator<K: SceneKey> {
    stage: Stage<K>,
}

impl<K: SceneKey> CoreSystemsOrchestrator<K> {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(stage: Stage<K>) -> Self {
        Self { stage }
    }

    pub(crate) fn stage(&self) -> &Stage<K> {
        &self.stage
    }

    /// Mutable stage access before the thread starts (scene registration,
    /// initial push).
    pub(crate) fn stage_mut(&mut self) -> &mut Stage<K> {
        &mut self.stage
    }

    //--- spawn_core_thread() ---------------------------------------------

    /// Spawns the logic thread ticking the stage at `tps`.
    ///
    /// Each tick:
    ///  1. Drains platform messages (exit on close/disconnect)
    ///  2. Applies any resize, then runs `Stage::tick` with the fixed step
    ///  3. Sleeps out the rest of the tick
    pub(crate) fn spawn_core_thread(
        self,
        receiver: Receiver<PlatformEvent>,
        tps: f64,
    ) -> thread::JoinHandle<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / tps);

        thread::spawn(move || {
            let mut stage = self.stage;
            let mut collector = EventCollector::new(receiver);
            info!("Core thread started ({} TPS)", tps);

            loop {
                let frame_start = Instant::now();

                if Self::run_frame(&mut stage, &mut collector, frame_duration) == TickControl::Exit {
                    info!("Core thread exiting after {} frames", stage.frame());
                    break;
                }

                let elapsed = frame_start.elapsed();
                if elapsed < frame_duration {
                    thread::sleep(frame_duration - elapsed);
                } else {
                    debug!(
                        "Tick overran by {:.2}ms",
                        (elapsed - frame_duration).as_secs_f64() * 1000.0
                    );
                }
            }
        })
    }

    //--- run_frame() ------------------------------------------------------

    /// One logic tick: collect, resize, tick.
    fn run_frame(
        stage: &mut Stage<K>,
        collector: &mut EventCollector,
        dt: Duration,
    ) -> TickControl {
        if collector.collect_frame() == TickControl::Exit {
            return TickControl::Exit;
        }

        if let Some((width, height)) = collector.take_resize() {
            stage.resize(width, height);
        }

        let events = collector.take_events();
        let report = stage.tick(dt, &events);
        if report.failed_updates > 0 {
            warn!(
                "{} of {} updates failed this frame",
                report.failed_updates, report.updated
            );
        }

        TickControl::Continue
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collaborators::RecordingRenderer;
    use crate::core::config::WorldProperties;
    use crate::core::input::{InputEvent, KeyCode, Modifiers};
    use crate::core::stage::StageBuilder;
    use crossbeam_channel::unbounded;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestScene {
        Main,
    }

    impl SceneKey for TestScene {}

    const STEP: Duration = Duration::from_millis(16);

    fn stage() -> Stage<TestScene> {
        StageBuilder::new()
            .with_properties(WorldProperties::with_resolution(800, 600))
            .with_renderer(RecordingRenderer::new())
            .build()
            .unwrap()
    }

    type Orchestrator = CoreSystemsOrchestrator<TestScene>;

    #[test]
    fn frame_feeds_collected_input_to_stage() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);
        let mut stage = stage();

        tx.send(PlatformEvent::Inputs(vec![InputEvent::KeyDown {
            key: KeyCode::Enter,
            modifiers: Modifiers::NONE,
        }]))
        .unwrap();

        assert_eq!(Orchestrator::run_frame(&mut stage, &mut collector, STEP), TickControl::Continue);
        assert!(stage.input().is_key_down(KeyCode::Enter));
        assert_eq!(stage.frame(), 1);
    }

    #[test]
    fn frame_applies_resize_before_tick() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);
        let mut stage = stage();

        tx.send(PlatformEvent::Resized { width: 1280, height: 720 }).unwrap();
        Orchestrator::run_frame(&mut stage, &mut collector, STEP);

        assert_eq!(stage.properties().device_width, 1280);
        assert_eq!(stage.properties().device_height, 720);
    }

    #[test]
    fn frame_exits_without_ticking_on_close() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);
        let mut stage = stage();

        tx.send(PlatformEvent::WindowClosed).unwrap();

        assert_eq!(Orchestrator::run_frame(&mut stage, &mut collector, STEP), TickControl::Exit);
        assert_eq!(stage.frame(), 0);
    }

    #[test]
    fn core_thread_stops_when_platform_disconnects() {
        let (tx, rx) = unbounded();
        let mut orchestrator = Orchestrator::new(stage());
        orchestrator.stage_mut().resize(640, 480);

        let handle = orchestrator.spawn_core_thread(rx, 240.0);
        drop(tx);

        assert!(handle.join().is_ok());
    }
}

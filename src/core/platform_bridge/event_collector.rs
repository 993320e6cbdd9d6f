//=========================================================================
// Event Collector
//=========================================================================
//
// Drains platform messages once per tick.
//
// Architecture:
//   Receiver<PlatformEvent> → collect_frame() → events + resize → TickControl
//
// Draining is bounded so a flooded channel cannot starve the tick; the
// remainder is picked up next tick. Input batches are flattened in
// arrival order because the stage dispatches events one at a time.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::PlatformEvent;
use crate::core::input::InputEvent;

//=== TickControl =========================================================

/// Update loop control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickControl {
    Continue,
    Exit,
}

//=== EventCollector ======================================================

/// Collects platform events for one logic tick.
pub(crate) struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    events: Vec<InputEvent>,
    resized: Option<(u32, u32)>,
}

impl EventCollector {
    const MAX_MESSAGES_PER_FRAME: usize = 100;

    pub(crate) fn new(receiver: Receiver<PlatformEvent>) -> Self {
        Self {
            receiver,
            events: Vec::with_capacity(32),
            resized: None,
        }
    }

    /// Collects pending platform messages (bounded to prevent starvation).
    pub(crate) fn collect_frame(&mut self) -> TickControl {
        self.events.clear();
        self.resized = None;

        let mut drained = 0;
        while drained < Self::MAX_MESSAGES_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(message) => {
                    if self.handle_message(message) == TickControl::Exit {
                        return TickControl::Exit;
                    }
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= Self::MAX_MESSAGES_PER_FRAME {
            warn!("Platform backlog: drained {} messages this tick", drained);
        }

        TickControl::Continue
    }

    #[cfg(test)]
    pub(crate) fn events(&self) -> &[InputEvent] {
        &self.events
    }

    /// Takes the collected events, leaving an empty buffer.
    pub(crate) fn take_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Latest resize reported this tick, if any.
    pub(crate) fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.resized.take()
    }

    fn handle_message(&mut self, message: PlatformEvent) -> TickControl {
        match message {
            PlatformEvent::Inputs(batch) => {
                self.events.extend(batch);
                TickControl::Continue
            }
            PlatformEvent::Resized { width, height } => {
                self.resized = Some((width, height));
                TickControl::Continue
            }
            PlatformEvent::WindowClosed => TickControl::Exit,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{KeyCode, Modifiers};
    use crossbeam_channel::unbounded;

    fn key(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn collect_handles_empty_queue() {
        let (_tx, rx) = unbounded::<PlatformEvent>();
        let mut collector = EventCollector::new(rx);

        assert_eq!(collector.collect_frame(), TickControl::Continue);
        assert!(collector.events().is_empty());
        assert_eq!(collector.take_resize(), None);
    }

    #[test]
    fn collect_flattens_batches_in_order() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::Inputs(vec![key(KeyCode::KeyA)])).unwrap();
        tx.send(PlatformEvent::Inputs(vec![
            InputEvent::MouseMoved { x: 10.0, y: 20.0 },
            key(KeyCode::KeyB),
        ]))
        .unwrap();

        assert_eq!(collector.collect_frame(), TickControl::Continue);
        assert_eq!(
            collector.take_events(),
            vec![
                key(KeyCode::KeyA),
                InputEvent::MouseMoved { x: 10.0, y: 20.0 },
                key(KeyCode::KeyB),
            ]
        );
    }

    #[test]
    fn collect_keeps_latest_resize() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::Resized { width: 640, height: 480 }).unwrap();
        tx.send(PlatformEvent::Resized { width: 1024, height: 768 }).unwrap();

        collector.collect_frame();
        assert_eq!(collector.take_resize(), Some((1024, 768)));
        assert_eq!(collector.take_resize(), None);
    }

    #[test]
    fn collect_returns_exit_on_window_closed() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::WindowClosed).unwrap();

        assert_eq!(collector.collect_frame(), TickControl::Exit);
    }

    #[test]
    fn collect_clears_previous_events() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        tx.send(PlatformEvent::Inputs(vec![key(KeyCode::Space)])).unwrap();
        collector.collect_frame();
        assert_eq!(collector.events().len(), 1);

        collector.collect_frame();
        assert!(collector.events().is_empty());
    }

    #[test]
    fn collect_is_bounded_per_tick() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);

        for _ in 0..EventCollector::MAX_MESSAGES_PER_FRAME + 5 {
            tx.send(PlatformEvent::Inputs(vec![key(KeyCode::KeyQ)])).unwrap();
        }

        collector.collect_frame();
        assert_eq!(collector.events().len(), EventCollector::MAX_MESSAGES_PER_FRAME);

        collector.collect_frame();
        assert_eq!(collector.events().len(), 5);
    }

    #[test]
    fn collect_returns_exit_on_disconnect() {
        let (tx, rx) = unbounded::<PlatformEvent>();
        let mut collector = EventCollector::new(rx);

        drop(tx);

        assert_eq!(collector.collect_frame(), TickControl::Exit);
    }
}

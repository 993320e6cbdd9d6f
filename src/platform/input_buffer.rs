//=========================================================================
// Input Buffer
//=========================================================================
//
// Holds converted input between redraws.
//
// Order is preserved because the stage dispatches events one at a time
// and a press followed by a move is not the same as a move followed by a
// press. Within that order the buffer trims noise:
//
//   - consecutive cursor moves collapse into the latest position
//   - consecutive wheel deltas are summed
//   - an event identical to the one before it (key repeat) is dropped
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::input::InputEvent;

//=== InputBuffer =========================================================

pub(crate) struct InputBuffer {
    events: Vec<InputEvent>,
}

impl InputBuffer {
    pub(crate) fn new() -> Self {
        Self {
            events: Vec::with_capacity(64),
        }
    }

    pub(crate) fn push(&mut self, event: InputEvent) {
        match (self.events.last_mut(), event) {
            (Some(last @ InputEvent::MouseMoved { .. }), InputEvent::MouseMoved { .. }) => {
                *last = event;
            }
            (
                Some(InputEvent::MouseWheel { dx, dy }),
                InputEvent::MouseWheel { dx: more_x, dy: more_y },
            ) => {
                *dx += more_x;
                *dy += more_y;
            }
            (Some(last), _) if *last == event => {}
            _ => self.events.push(event),
        }
    }

    /// Takes everything buffered, or `None` when there is nothing to send.
    pub(crate) fn drain(&mut self) -> Option<Vec<InputEvent>> {
        if self.events.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.events))
        }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{KeyCode, Modifiers};

    fn key_down(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    fn mouse_move(x: f32, y: f32) -> InputEvent {
        InputEvent::MouseMoved { x, y }
    }

    #[test]
    fn repeated_event_is_dropped() {
        let mut buffer = InputBuffer::new();
        buffer.push(key_down(KeyCode::KeyA));
        buffer.push(key_down(KeyCode::KeyA));
        buffer.push(key_down(KeyCode::KeyB));
        assert_eq!(buffer.drain().map(|events| events.len()), Some(2));
    }

    #[test]
    fn consecutive_moves_keep_latest() {
        let mut buffer = InputBuffer::new();
        buffer.push(mouse_move(10.0, 10.0));
        buffer.push(mouse_move(20.0, 30.0));

        assert_eq!(buffer.drain(), Some(vec![mouse_move(20.0, 30.0)]));
    }

    #[test]
    fn moves_split_by_a_press_are_kept_apart() {
        let mut buffer = InputBuffer::new();
        buffer.push(mouse_move(1.0, 1.0));
        buffer.push(key_down(KeyCode::Space));
        buffer.push(mouse_move(2.0, 2.0));

        assert_eq!(
            buffer.drain(),
            Some(vec![mouse_move(1.0, 1.0), key_down(KeyCode::Space), mouse_move(2.0, 2.0)])
        );
    }

    #[test]
    fn wheel_deltas_are_summed() {
        let mut buffer = InputBuffer::new();
        buffer.push(InputEvent::MouseWheel { dx: 0.0, dy: 1.0 });
        buffer.push(InputEvent::MouseWheel { dx: 0.5, dy: 1.0 });

        assert_eq!(buffer.drain(), Some(vec![InputEvent::MouseWheel { dx: 0.5, dy: 2.0 }]));
    }

    #[test]
    fn drain_empties_the_buffer() {
        let mut buffer = InputBuffer::new();
        assert_eq!(buffer.drain(), None);

        buffer.push(key_down(KeyCode::Enter));
        assert!(buffer.drain().is_some());
        assert!(buffer.is_empty());
        assert_eq!(buffer.drain(), None);
    }
}

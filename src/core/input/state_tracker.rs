//=========================================================================
// State Tracker
//=========================================================================
//
// Input snapshot the stage keeps up to date while dispatching events.
//
// Architecture:
//   InputEvent → apply() → held sets + per-frame deltas → queries
//
// Frame lifecycle: begin_frame() → apply()* → end_frame() → query
//
// Behaviors read the tracker through their contexts, so "is this key
// held" and "where is the pointer" are answered without every node
// tracking events itself.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::event::{InputEvent, KeyCode, Modifiers, MouseButton};

//=== StateTracker ========================================================

/// Held keys/buttons plus what changed during the current frame.
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    //--- Persistent State -------------------------------------------------
    keys_down: HashSet<KeyCode>,
    buttons_down: HashSet<MouseButton>,
    mouse_position: (f32, f32),
    modifiers: Modifiers,

    //--- Frame Deltas -----------------------------------------------------
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    buttons_pressed: HashSet<MouseButton>,
    buttons_released: HashSet<MouseButton>,
    wheel: (f32, f32),
    mouse_delta: (f32, f32),
    frame_start_position: (f32, f32),
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Frame Processing -------------------------------------------------

    /// Drops last frame's deltas.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.wheel = (0.0, 0.0);
        self.frame_start_position = self.mouse_position;
    }

    /// Folds one event into the snapshot.
    pub fn apply(&mut self, event: &InputEvent) {
        if let Some(modifiers) = event.modifiers() {
            self.modifiers = modifiers;
        }

        match *event {
            InputEvent::KeyDown { key, .. } => {
                if self.keys_down.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            InputEvent::KeyUp { key, .. } => {
                if self.keys_down.remove(&key) {
                    self.keys_released.insert(key);
                }
            }
            InputEvent::MouseButtonDown { button, .. } => {
                if self.buttons_down.insert(button) {
                    self.buttons_pressed.insert(button);
                }
            }
            InputEvent::MouseButtonUp { button, .. } => {
                if self.buttons_down.remove(&button) {
                    self.buttons_released.insert(button);
                }
            }
            InputEvent::MouseMoved { x, y } => {
                self.mouse_position = (x, y);
            }
            InputEvent::MouseWheel { dx, dy } => {
                self.wheel.0 += dx;
                self.wheel.1 += dy;
            }
            InputEvent::Unidentified => {}
        }
    }

    /// Computes frame-level derived values (pointer delta).
    pub fn end_frame(&mut self) {
        self.mouse_delta = (
            self.mouse_position.0 - self.frame_start_position.0,
            self.mouse_position.1 - self.frame_start_position.1,
        );
    }

    //=====================================================================
    // Query API - Keyboard
    //=====================================================================

    /// Key went down this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Key is held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Key went up this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    //=====================================================================
    // Query API - Mouse
    //=====================================================================

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    pub fn is_button_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }

    /// Pointer position in device pixels.
    pub fn mouse_position(&self) -> (f32, f32) {
        self.mouse_position
    }

    /// Pointer movement over the last completed frame.
    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    /// Wheel movement accumulated this frame.
    pub fn wheel_delta(&self) -> (f32, f32) {
        self.wheel
    }

    //=====================================================================
    // Query API - Modifiers
    //=====================================================================

    /// Modifiers reported by the most recent key or button event.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn keys_down(&self) -> impl Iterator<Item = &KeyCode> {
        self.keys_down.iter()
    }

    pub fn buttons_down(&self) -> impl Iterator<Item = &MouseButton> {
        self.buttons_down.iter()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(key: KeyCode) -> InputEvent {
        InputEvent::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    fn key_up(key: KeyCode) -> InputEvent {
        InputEvent::KeyUp {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    fn frame(tracker: &mut StateTracker, events: &[InputEvent]) {
        tracker.begin_frame();
        for event in events {
            tracker.apply(event);
        }
        tracker.end_frame();
    }

    //=====================================================================
    // Keyboard
    //=====================================================================

    #[test]
    fn press_is_reported_for_one_frame() {
        let mut tracker = StateTracker::new();

        frame(&mut tracker, &[key_down(KeyCode::Space)]);
        assert!(tracker.is_key_pressed(KeyCode::Space));
        assert!(tracker.is_key_down(KeyCode::Space));

        frame(&mut tracker, &[]);
        assert!(!tracker.is_key_pressed(KeyCode::Space));
        assert!(tracker.is_key_down(KeyCode::Space));
    }

    #[test]
    fn repeat_key_down_is_not_a_new_press() {
        let mut tracker = StateTracker::new();
        frame(&mut tracker, &[key_down(KeyCode::KeyA)]);
        frame(&mut tracker, &[key_down(KeyCode::KeyA)]);
        assert!(!tracker.is_key_pressed(KeyCode::KeyA));
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut tracker = StateTracker::new();
        frame(&mut tracker, &[key_up(KeyCode::KeyA)]);
        assert!(!tracker.is_key_released(KeyCode::KeyA));
    }

    #[test]
    fn modifiers_follow_latest_event() {
        let mut tracker = StateTracker::new();
        frame(
            &mut tracker,
            &[InputEvent::KeyDown {
                key: KeyCode::KeyS,
                modifiers: Modifiers::CTRL,
            }],
        );
        assert!(tracker.modifiers().ctrl());
    }

    //=====================================================================
    // Mouse
    //=====================================================================

    #[test]
    fn mouse_position_and_delta() {
        let mut tracker = StateTracker::new();
        frame(&mut tracker, &[InputEvent::MouseMoved { x: 10.0, y: 10.0 }]);
        frame(
            &mut tracker,
            &[
                InputEvent::MouseMoved { x: 12.0, y: 11.0 },
                InputEvent::MouseMoved { x: 15.0, y: 14.0 },
            ],
        );

        assert_eq!(tracker.mouse_position(), (15.0, 14.0));
        assert_eq!(tracker.mouse_delta(), (5.0, 4.0));
    }

    #[test]
    fn button_press_and_release_within_one_frame() {
        let mut tracker = StateTracker::new();
        frame(
            &mut tracker,
            &[
                InputEvent::MouseButtonDown {
                    button: MouseButton::Left,
                    modifiers: Modifiers::NONE,
                },
                InputEvent::MouseButtonUp {
                    button: MouseButton::Left,
                    modifiers: Modifiers::NONE,
                },
            ],
        );

        assert!(tracker.is_button_pressed(MouseButton::Left));
        assert!(tracker.is_button_released(MouseButton::Left));
        assert!(!tracker.is_button_down(MouseButton::Left));
    }

    #[test]
    fn wheel_accumulates_per_frame() {
        let mut tracker = StateTracker::new();
        frame(
            &mut tracker,
            &[
                InputEvent::MouseWheel { dx: 0.0, dy: 1.0 },
                InputEvent::MouseWheel { dx: 0.0, dy: 2.0 },
            ],
        );
        assert_eq!(tracker.wheel_delta(), (0.0, 3.0));

        frame(&mut tracker, &[]);
        assert_eq!(tracker.wheel_delta(), (0.0, 0.0));
    }
}

use std::collections::HashSet;

use crate::coords::Vec2;

use super::frame::InputFrame;
use super::types::{ButtonState, InputEvent, Key, Modifiers, MouseButton, WheelDelta};

/// Pixels per wheel line when converting touchpad deltas.
pub const SCROLL_LINE_PX: f32 = 20.0;

/// Input state sampled at frame boundaries.
///
/// Events are folded into a pending frame as they arrive. Once per frame the
/// loop calls [`decay`](Self::decay) then [`latch`](Self::latch): the previous
/// frame's transitions are dropped and the pending ones become visible. A
/// "just pressed" entry is therefore seen by exactly one update.
#[derive(Debug, Default)]
pub struct InputLatch {
    keys_held: HashSet<Key>,
    buttons_held: HashSet<MouseButton>,
    modifiers: Modifiers,
    focused: bool,
    pointer_pos: Option<Vec2>,

    pending: InputFrame,
    visible: InputFrame,
}

impl InputLatch {
    pub fn new() -> Self {
        Self {
            focused: true,
            ..Self::default()
        }
    }

    /// Folds a platform event into held state and the pending frame.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, state, repeat } => match state {
                ButtonState::Pressed => {
                    if self.keys_held.insert(key) && !repeat {
                        self.pending.keys_pressed.insert(key);
                    }
                }
                ButtonState::Released => {
                    if self.keys_held.remove(&key) {
                        self.pending.keys_released.insert(key);
                    }
                }
            },

            InputEvent::PointerButton { button, state } => match state {
                ButtonState::Pressed => {
                    if self.buttons_held.insert(button) {
                        self.pending.buttons_pressed.insert(button);
                    }
                }
                ButtonState::Released => {
                    if self.buttons_held.remove(&button) {
                        self.pending.buttons_released.insert(button);
                    }
                }
            },

            InputEvent::PointerMoved(pos) => {
                if let Some(prev) = self.pointer_pos {
                    self.pending.pointer_delta = self.pending.pointer_delta + (pos - prev);
                }
                self.pointer_pos = Some(pos);
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Wheel(delta) => {
                let lines = match delta {
                    WheelDelta::Lines(v) => v,
                    WheelDelta::Pixels(v) => Vec2::new(v.x / SCROLL_LINE_PX, v.y / SCROLL_LINE_PX),
                };
                self.pending.scroll_delta = self.pending.scroll_delta + lines;
            }

            InputEvent::ModifiersChanged(m) => {
                self.modifiers = m;
            }

            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // Releases are never delivered to an unfocused window.
                    self.keys_held.clear();
                    self.buttons_held.clear();
                    self.modifiers = Modifiers::default();
                }
            }
        }
    }

    /// Drops the transitions the previous update saw. Held state is untouched.
    pub fn decay(&mut self) {
        self.visible.clear();
    }

    /// Publishes everything received since the last latch.
    pub fn latch(&mut self) {
        std::mem::swap(&mut self.visible, &mut self.pending);
        self.pending.clear();
    }

    // ── held state ──

    #[inline]
    pub fn is_held(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }

    #[inline]
    pub fn is_button_held(&self, button: MouseButton) -> bool {
        self.buttons_held.contains(&button)
    }

    #[inline]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    #[inline]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Pointer position in surface pixels; `None` while outside the surface.
    #[inline]
    pub fn pointer_position(&self) -> Option<Vec2> {
        self.pointer_pos
    }

    // ── this frame ──

    #[inline]
    pub fn just_pressed(&self, key: Key) -> bool {
        self.visible.keys_pressed.contains(&key)
    }

    #[inline]
    pub fn just_released(&self, key: Key) -> bool {
        self.visible.keys_released.contains(&key)
    }

    #[inline]
    pub fn button_just_pressed(&self, button: MouseButton) -> bool {
        self.visible.buttons_pressed.contains(&button)
    }

    #[inline]
    pub fn button_just_released(&self, button: MouseButton) -> bool {
        self.visible.buttons_released.contains(&button)
    }

    #[inline]
    pub fn any_just_pressed(&self) -> bool {
        !self.visible.keys_pressed.is_empty() || !self.visible.buttons_pressed.is_empty()
    }

    #[inline]
    pub fn pointer_delta(&self) -> Vec2 {
        self.visible.pointer_delta
    }

    /// Wheel motion this frame, in lines (+Y is away from the user).
    #[inline]
    pub fn scroll_delta(&self) -> Vec2 {
        self.visible.scroll_delta
    }

    #[inline]
    pub fn frame(&self) -> &InputFrame {
        &self.visible
    }

    // ── snapshots ──

    /// Held keys in a stable order.
    pub fn held_keys(&self) -> Vec<Key> {
        sorted(&self.keys_held)
    }

    /// Keys pressed this frame in a stable order.
    pub fn pressed_keys(&self) -> Vec<Key> {
        sorted(&self.visible.keys_pressed)
    }

    pub fn released_keys(&self) -> Vec<Key> {
        sorted(&self.visible.keys_released)
    }

    pub fn held_buttons(&self) -> Vec<MouseButton> {
        sorted(&self.buttons_held)
    }
}

fn sorted<T: Ord + Copy>(set: &HashSet<T>) -> Vec<T> {
    let mut v: Vec<T> = set.iter().copied().collect();
    v.sort_unstable();
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: Key) -> InputEvent {
        InputEvent::Key {
            key,
            state: ButtonState::Pressed,
            repeat: false,
        }
    }

    fn release(key: Key) -> InputEvent {
        InputEvent::Key {
            key,
            state: ButtonState::Released,
            repeat: false,
        }
    }

    fn next_frame(latch: &mut InputLatch) {
        latch.decay();
        latch.latch();
    }

    // ── visibility ──

    #[test]
    fn just_pressed_is_seen_by_exactly_one_frame() {
        let mut l = InputLatch::new();
        l.apply_event(press(Key::Space));
        assert!(!l.just_pressed(Key::Space));

        next_frame(&mut l);
        assert!(l.just_pressed(Key::Space));
        assert!(l.is_held(Key::Space));

        next_frame(&mut l);
        assert!(!l.just_pressed(Key::Space));
        assert!(l.is_held(Key::Space));
    }

    #[test]
    fn press_and_release_within_one_frame() {
        let mut l = InputLatch::new();
        l.apply_event(press(Key::A));
        l.apply_event(release(Key::A));
        next_frame(&mut l);
        assert!(l.just_pressed(Key::A));
        assert!(l.just_released(Key::A));
        assert!(!l.is_held(Key::A));
    }

    #[test]
    fn repeats_do_not_retrigger() {
        let mut l = InputLatch::new();
        l.apply_event(press(Key::W));
        next_frame(&mut l);
        l.apply_event(InputEvent::Key {
            key: Key::W,
            state: ButtonState::Pressed,
            repeat: true,
        });
        next_frame(&mut l);
        assert!(!l.just_pressed(Key::W));
        assert!(l.is_held(Key::W));
    }

    // ── decay ──

    #[test]
    fn decay_clears_transitions_and_is_idempotent() {
        let mut l = InputLatch::new();
        l.apply_event(InputEvent::PointerMoved(Vec2::new(10.0, 10.0)));
        l.apply_event(press(Key::D));
        l.apply_event(InputEvent::PointerButton {
            button: MouseButton::Left,
            state: ButtonState::Pressed,
        });
        l.apply_event(InputEvent::PointerMoved(Vec2::new(13.0, 6.0)));
        next_frame(&mut l);
        assert_eq!(l.pointer_delta(), Vec2::new(3.0, -4.0));

        l.decay();
        assert!(l.frame().is_empty());
        assert!(!l.any_just_pressed());
        assert!(l.is_held(Key::D));
        assert!(l.is_button_held(MouseButton::Left));

        l.decay();
        assert!(l.frame().is_empty());
        assert!(l.is_held(Key::D));
    }

    #[test]
    fn events_after_latch_wait_for_next_frame() {
        let mut l = InputLatch::new();
        next_frame(&mut l);
        l.apply_event(press(Key::E));
        assert!(!l.any_just_pressed());
        next_frame(&mut l);
        assert!(l.just_pressed(Key::E));
    }

    // ── pointer & wheel ──

    #[test]
    fn first_move_sets_position_without_delta() {
        let mut l = InputLatch::new();
        l.apply_event(InputEvent::PointerMoved(Vec2::new(50.0, 50.0)));
        next_frame(&mut l);
        assert_eq!(l.pointer_delta(), Vec2::ZERO);
        assert_eq!(l.pointer_position(), Some(Vec2::new(50.0, 50.0)));

        l.apply_event(InputEvent::PointerLeft);
        assert_eq!(l.pointer_position(), None);
    }

    #[test]
    fn wheel_pixels_convert_to_lines() {
        let mut l = InputLatch::new();
        l.apply_event(InputEvent::Wheel(WheelDelta::Lines(Vec2::new(0.0, 1.0))));
        l.apply_event(InputEvent::Wheel(WheelDelta::Pixels(Vec2::new(0.0, 2.0 * SCROLL_LINE_PX))));
        next_frame(&mut l);
        assert_eq!(l.scroll_delta(), Vec2::new(0.0, 3.0));
    }

    // ── focus ──

    #[test]
    fn focus_loss_clears_held_state() {
        let mut l = InputLatch::new();
        l.apply_event(press(Key::Shift));
        l.apply_event(InputEvent::ModifiersChanged(Modifiers {
            shift: true,
            ..Modifiers::default()
        }));
        l.apply_event(InputEvent::Focused(false));
        assert!(!l.is_held(Key::Shift));
        assert!(!l.modifiers().any());
        assert!(!l.is_focused());
    }

    #[test]
    fn snapshots_are_sorted() {
        let mut l = InputLatch::new();
        for k in [Key::Z, Key::A, Key::Escape, Key::M] {
            l.apply_event(press(k));
        }
        next_frame(&mut l);
        assert_eq!(l.held_keys(), vec![Key::Escape, Key::A, Key::M, Key::Z]);
        assert_eq!(l.pressed_keys(), l.held_keys());
    }
}

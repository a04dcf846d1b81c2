use std::collections::HashSet;

use crate::coords::Vec2;

use super::types::{Key, MouseButton};

/// Per-frame input transitions.
///
/// Filled while events arrive, then handed to the frame that consumes it.
#[derive(Debug, Default, Clone)]
pub struct InputFrame {
    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,

    /// Accumulated pointer motion, surface pixels.
    pub pointer_delta: Vec2,

    /// Accumulated wheel motion, in lines.
    pub scroll_delta: Vec2,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.pointer_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn is_empty(&self) -> bool {
        self.keys_pressed.is_empty()
            && self.keys_released.is_empty()
            && self.buttons_pressed.is_empty()
            && self.buttons_released.is_empty()
            && self.pointer_delta == Vec2::ZERO
            && self.scroll_delta == Vec2::ZERO
    }
}

//! Keyboard state with level-triggered (`is_held`) and edge-triggered
//! (`is_just_pressed`) queries.
//!
//! Edge state is cleared by `end_frame()`, which the host loop calls only
//! after at least one fixed step has run, so a press landing on a frame with
//! zero steps is not lost.

use std::collections::HashSet;

use crate::entity::SteerInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Escape,
    F3,
}

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// W/A/S/D as player steering. Opposite keys held together cancel out
    /// in `Entity::behave`.
    pub fn steer(&self) -> SteerInput {
        SteerInput {
            left: self.is_held(Key::A),
            right: self.is_held(Key::D),
            up: self.is_held(Key::W),
            down: self.is_held(Key::S),
        }
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}

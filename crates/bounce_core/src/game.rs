//! The update/draw/layout contract between a game and its host loop.
//!
//! The host calls `update` once per fixed step, `draw` once per rendered
//! frame, and `layout` whenever the window size changes. How often and on
//! which thread these run is the host's business.

use crate::input::InputState;

/// One sprite placed by its center, in logical screen pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    pub sprite: String,
    pub center_x: f32,
    pub center_y: f32,
}

/// Sprites in painter's order: later entries draw on top.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub sprites: Vec<SpriteDraw>,
}

impl DrawList {
    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    pub fn draw_sprite(&mut self, sprite: &str, center_x: f32, center_y: f32) {
        self.sprites.push(SpriteDraw {
            sprite: sprite.to_string(),
            center_x,
            center_y,
        });
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

pub trait Game {
    /// Advances the simulation by one fixed step. An `Err` stops the host.
    fn update(&mut self, input: &InputState) -> Result<(), String>;

    fn draw(&self, list: &mut DrawList);

    /// Maps the window's inner size to the logical screen size.
    fn layout(&self, outside_width: u32, outside_height: u32) -> (u32, u32);
}

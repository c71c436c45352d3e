//! CPU-side sprite mesh, rebuilt from the game's `DrawList` every frame.

use std::sync::Arc;

use bounce_core::{AssetRegistry, DrawList};

use crate::vertex::SpriteVertex;

/// A contiguous run of indices that share one texture binding.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct SpriteBatch {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl SpriteBatch {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.draw_calls.clear();
    }

    /// Sprites missing from the registry are skipped with a warning.
    pub fn rebuild(&mut self, list: &DrawList, assets: &AssetRegistry) {
        self.clear();
        for draw in &list.sprites {
            let Some(image) = assets.sprite(&draw.sprite) else {
                log::warn!("Skipping draw of unknown sprite '{}'", draw.sprite);
                continue;
            };
            self.push_quad(
                &draw.sprite,
                (draw.center_x, draw.center_y),
                (image.width as f32, image.height as f32),
            );
        }
    }

    pub fn push_quad(&mut self, texture_key: &str, center: (f32, f32), size: (f32, f32)) {
        let (cx, cy) = center;
        let half_w = size.0 * 0.5;
        let half_h = size.1 * 0.5;
        let base = self.vertices.len() as u32;

        // y grows downward: the first vertex is the top-left corner.
        self.vertices.extend_from_slice(&[
            SpriteVertex {
                position: [cx - half_w, cy - half_h],
                tex_coords: [0.0, 0.0],
            },
            SpriteVertex {
                position: [cx + half_w, cy - half_h],
                tex_coords: [1.0, 0.0],
            },
            SpriteVertex {
                position: [cx + half_w, cy + half_h],
                tex_coords: [1.0, 1.0],
            },
            SpriteVertex {
                position: [cx - half_w, cy + half_h],
                tex_coords: [0.0, 1.0],
            },
        ]);

        let index_start = self.indices.len() as u32;
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        self.push_draw_call(texture_key, index_start, 6);
    }

    /// Merges into the previous call when the texture matches and the index
    /// ranges are contiguous.
    fn push_draw_call(&mut self, texture_key: &str, index_start: u32, index_count: u32) {
        if let Some(last) = self.draw_calls.last_mut() {
            let contiguous = last.index_start + last.index_count == index_start;
            if *last.texture_key == *texture_key && contiguous {
                last.index_count += index_count;
                return;
            }
        }
        self.draw_calls.push(DrawCall {
            texture_key: Arc::from(texture_key),
            index_start,
            index_count,
        });
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_centered_on_position() {
        let mut batch = SpriteBatch::default();
        batch.push_quad("ship.png", (100.0, 50.0), (16.0, 8.0));
        assert_eq!(batch.quad_count(), 1);
        assert_eq!(batch.vertices[0].position, [92.0, 46.0]);
        assert_eq!(batch.vertices[2].position, [108.0, 54.0]);
        assert_eq!(batch.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn consecutive_same_texture_quads_share_a_draw_call() {
        let mut batch = SpriteBatch::default();
        batch.push_quad("a.png", (0.0, 0.0), (1.0, 1.0));
        batch.push_quad("a.png", (5.0, 0.0), (1.0, 1.0));
        batch.push_quad("b.png", (0.0, 5.0), (1.0, 1.0));
        batch.push_quad("a.png", (5.0, 5.0), (1.0, 1.0));

        let calls: Vec<(&str, u32, u32)> = batch
            .draw_calls
            .iter()
            .map(|c| (&*c.texture_key, c.index_start, c.index_count))
            .collect();
        assert_eq!(calls, vec![("a.png", 0, 12), ("b.png", 12, 6), ("a.png", 18, 6)]);
    }

    #[test]
    fn rebuild_skips_unknown_sprites_and_resets() {
        let assets = AssetRegistry::default();
        let mut list = DrawList::default();
        list.draw_sprite("ghost.png", 1.0, 1.0);

        let mut batch = SpriteBatch::default();
        batch.push_quad("old.png", (0.0, 0.0), (1.0, 1.0));
        batch.rebuild(&list, &assets);
        assert_eq!(batch.quad_count(), 0);
        assert!(batch.draw_calls.is_empty());
        assert!(batch.indices.is_empty());
    }
}

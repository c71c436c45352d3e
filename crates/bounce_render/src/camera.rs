use glam::{Mat4, Vec4};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Surface rectangle, in physical pixels, that shows the logical screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Maps the logical screen (origin top-left, y down) onto clip space.
pub struct Camera2D {
    pub logical_size: (u32, u32),
}

impl Camera2D {
    pub fn new(logical_width: u32, logical_height: u32) -> Self {
        Self {
            logical_size: (logical_width, logical_height),
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh(
            0.0,
            self.logical_size.0 as f32,
            self.logical_size.1 as f32,
            0.0,
            -1.0,
            1.0,
        )
    }

    pub fn build_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.projection().to_cols_array_2d(),
        }
    }

    pub fn to_clip(&self, x: f32, y: f32) -> (f32, f32) {
        let clip = self.projection() * Vec4::new(x, y, 0.0, 1.0);
        (clip.x, clip.y)
    }

    /// Largest centred rectangle with the logical aspect ratio that fits in
    /// `surface`. The bars around it keep the clear colour.
    pub fn viewport(&self, surface: (u32, u32)) -> Viewport {
        let logical_w = self.logical_size.0.max(1) as f32;
        let logical_h = self.logical_size.1.max(1) as f32;
        let (surface_w, surface_h) = (surface.0 as f32, surface.1 as f32);
        let scale = (surface_w / logical_w).min(surface_h / logical_h);
        let width = logical_w * scale;
        let height = logical_h * scale;
        Viewport {
            x: (surface_w - width) * 0.5,
            y: (surface_h - height) * 0.5,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-5 && (a.1 - b.1).abs() < 1e-5
    }

    #[test]
    fn top_left_maps_to_upper_left_of_clip_space() {
        let camera = Camera2D::new(600, 400);
        assert!(close(camera.to_clip(0.0, 0.0), (-1.0, 1.0)));
        assert!(close(camera.to_clip(600.0, 400.0), (1.0, -1.0)));
        assert!(close(camera.to_clip(300.0, 200.0), (0.0, 0.0)));
    }

    #[test]
    fn viewport_letterboxes_to_the_logical_aspect() {
        let camera = Camera2D::new(600, 400);
        let exact = Viewport {
            x: 0.0,
            y: 0.0,
            width: 1200.0,
            height: 800.0,
        };
        assert_eq!(camera.viewport((1200, 800)), exact);
        assert_eq!(
            camera.viewport((1200, 1000)),
            Viewport { y: 100.0, ..exact }
        );
        assert_eq!(
            camera.viewport((1500, 800)),
            Viewport { x: 150.0, ..exact }
        );
    }
}

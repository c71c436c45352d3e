//! Debug text drawn via egui on top of the sprites.
//!
//! The status line (`TPS -- FPS -- Sounds`) is always shown in the top-left
//! corner; F3 toggles a detail window. egui needs a split render:
//!
//!   1. `prepare()` -- run UI logic, tessellate
//!   2. `upload()`  -- push textures and buffers (borrows the encoder)
//!   3. `paint()`   -- draw into a render pass obtained with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui dropped

use bounce_core::time::TimeState;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub active_sounds: usize,
    pub entity_count: usize,
    pub sprite_count: usize,
    /// Output device name, `None` when running without sound.
    pub audio_device: Option<String>,
}

pub fn status_line(time: &TimeState, stats: &OverlayStats) -> String {
    format!(
        "TPS: {:.2} -- FPS: {:.2} -- Sounds: {}",
        time.measured_tps, time.smoothed_fps, stats.active_sounds
    )
}

pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub details_visible: bool,
}

impl DebugOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            details_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.egui_winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle_details(&mut self) {
        self.details_visible = !self.details_visible;
        log::info!(
            "Debug details: {}",
            if self.details_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        time: &TimeState,
        stats: &OverlayStats,
    ) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let details_visible = self.details_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Area::new(egui::Id::new("status_line"))
                .fixed_pos([4.0, 4.0])
                .interactable(false)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(status_line(time, stats))
                            .monospace()
                            .color(egui::Color32::WHITE),
                    );
                });

            if details_visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 30.0])
                    .show(ctx, |ui| {
                        ui.label(format!("Frame time: {:.2} ms", time.smoothed_frame_time_ms));
                        ui.label(format!("Steps this frame: {}", time.steps_this_frame));
                        ui.label(format!("Total steps: {}", time.fixed_step_count));
                        ui.label(format!("Frame: {}", time.frame_count));
                        ui.separator();
                        ui.label(format!("Entities: {}", stats.entity_count));
                        ui.label(format!("Sprites drawn: {}", stats.sprite_count));
                        ui.label(match &stats.audio_device {
                            Some(name) => format!("Audio: {name}"),
                            None => "Audio: none (silent)".to_string(),
                        });
                    });
            }
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta)
    }

    /// Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_matches_debug_print_format() {
        let mut time = TimeState::with_tick_rate(64);
        for _ in 0..128 {
            time.advance(1.0 / 128.0);
            while time.should_step() {}
            time.end_frame();
        }
        let stats = OverlayStats {
            active_sounds: 3,
            ..OverlayStats::default()
        };
        assert_eq!(
            status_line(&time, &stats),
            "TPS: 64.00 -- FPS: 128.00 -- Sounds: 3"
        );
    }
}

//! Bounce -- main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. The game advances in
//! fixed ticks inside `RedrawRequested` (see `TimeState`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- one `Game::update` per tick
//!   3. `Game::draw` into a `DrawList`, rebuilt into the sprite mesh
//!   4. Upload camera uniform, issue draw calls, composite the egui overlay
//!
//! Sound plays on the cpal callback thread; the loop only starts and purges
//! players.

mod game;

use std::path::PathBuf;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use bounce_audio::AudioContext;
use bounce_core::config::load_config_or_default;
use bounce_core::input::{InputState, Key};
use bounce_core::time::TimeState;
use bounce_core::{AssetRegistry, DrawList, Game, GameConfig};
use bounce_devtools::{DebugOverlay, OverlayStats};
use bounce_platform::PlatformConfig;
use bounce_render::{Camera2D, GpuContext, SpriteBatch, SpriteRenderer};
use game::BounceGame;

const CONFIG_PATH: &str = "assets/bounce.json";
const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Everything that needs a live window.
struct HostState {
    window: Arc<Window>,
    gpu: GpuContext,
    camera: Camera2D,
    renderer: SpriteRenderer,
    batch: SpriteBatch,
    draw_list: DrawList,
    debug_overlay: DebugOverlay,
    time: TimeState,
    input: InputState,
}

impl HostState {
    fn new(
        window: Arc<Window>,
        config: &GameConfig,
        game: &BounceGame,
        assets: &AssetRegistry,
    ) -> Result<Self, String> {
        let gpu = GpuContext::new(Arc::clone(&window), config.vsync)?;
        let (width, height) = game.layout(gpu.size.0, gpu.size.1);
        let camera = Camera2D::new(width, height);
        let mut renderer = SpriteRenderer::new(&gpu, &camera);
        renderer.upload_sprites(&gpu, assets);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);

        Ok(Self {
            window,
            gpu,
            camera,
            renderer,
            batch: SpriteBatch::default(),
            draw_list: DrawList::default(),
            debug_overlay,
            time: TimeState::with_tick_rate(config.tick_rate),
            input: InputState::new(),
        })
    }
}

struct App {
    config: GameConfig,
    assets: Arc<AssetRegistry>,
    game: BounceGame,
    state: Option<HostState>,
    exit_error: Option<String>,
}

impl App {
    fn new(config: GameConfig, assets: Arc<AssetRegistry>, game: BounceGame) -> Self {
        Self {
            config,
            assets,
            game,
            state: None,
            exit_error: None,
        }
    }

    /// Stops the loop. `main` reports the error once the loop has returned.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: String) {
        record_exit_error(&mut self.exit_error, err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let (width, height) = self.config.window_size();
        let platform = PlatformConfig {
            title: self.config.title.clone(),
            width,
            height,
            min_size: Some((self.config.width, self.config.height)),
        };
        let state = bounce_platform::create_window(event_loop, &platform)
            .and_then(|window| HostState::new(window, &self.config, &self.game, &self.assets));
        match state {
            Ok(state) => self.state = Some(state),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    let (logical_w, logical_h) = self.game.layout(w, h);
                    state.camera = Camera2D::new(logical_w, logical_h);
                    log::info!("Resized to {w}x{h}");
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(key),
                            ElementState::Released => state.input.key_up(key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                state.time.begin_frame();
                while state.time.should_step() {
                    if state.input.is_just_pressed(Key::Escape) {
                        log::info!("Escape pressed, exiting.");
                        event_loop.exit();
                        return;
                    }
                    if state.input.is_just_pressed(Key::F3) {
                        state.debug_overlay.toggle_details();
                    }
                    if let Err(err) = self.game.update(&state.input) {
                        record_exit_error(&mut self.exit_error, err);
                        event_loop.exit();
                        return;
                    }
                }
                state.time.end_frame();
                // A press that lands on a frame with no ticks must survive
                // until a tick sees it.
                if state.time.steps_this_frame > 0 {
                    state.input.end_frame();
                }

                state.draw_list.clear();
                self.game.draw(&mut state.draw_list);
                state.batch.rebuild(&state.draw_list, &self.assets);
                state.renderer.prepare(&state.gpu, &state.batch, &state.camera);

                let Some((output, view)) = state.gpu.begin_frame() else {
                    return;
                };

                let stats = OverlayStats {
                    active_sounds: self.game.active_sounds(),
                    entity_count: self.game.entities().len(),
                    sprite_count: state.batch.quad_count(),
                    audio_device: self.game.audio().device_name().map(str::to_string),
                };
                let (egui_primitives, egui_textures_delta) =
                    state
                        .debug_overlay
                        .prepare(&state.window, &state.time, &stats);
                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [state.gpu.size.0, state.gpu.size.1],
                    pixels_per_point: state.window.scale_factor() as f32,
                };

                let mut encoder =
                    state
                        .gpu
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Render Encoder"),
                        });

                let viewport = state.camera.viewport(state.gpu.size);
                state
                    .renderer
                    .render(&mut encoder, &view, viewport, CLEAR_COLOR);

                state.debug_overlay.upload(
                    &state.gpu.device,
                    &state.gpu.queue,
                    &mut encoder,
                    &egui_primitives,
                    &egui_textures_delta,
                    &screen_descriptor,
                );

                {
                    let mut egui_pass = encoder
                        .begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("egui Render Pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Load,
                                    store: wgpu::StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: None,
                            ..Default::default()
                        })
                        .forget_lifetime();

                    state
                        .debug_overlay
                        .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
                }

                state.debug_overlay.cleanup(&egui_textures_delta);

                state.gpu.queue.submit(std::iter::once(encoder.finish()));
                output.present();
            }

            _ => {}
        }
    }
}

/// Keeps the first failure; later ones are follow-on noise from the same
/// shutdown.
fn record_exit_error(slot: &mut Option<String>, err: String) {
    if slot.is_none() {
        *slot = Some(err);
    } else {
        log::debug!("Ignoring follow-on error during shutdown: {err}");
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

fn run() -> Result<(), String> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));
    let config = load_config_or_default(&config_path)?;

    let (assets, report) = AssetRegistry::load(&config.sprites_dir, &config.sounds_dir)?;
    for (path, reason) in report.failures() {
        log::warn!("Skipped {}: {reason}", path.display());
    }
    log::info!(
        "Loaded {} sprites and {} sounds",
        assets.sprite_count(),
        assets.sound_count()
    );
    let assets = Arc::new(assets);

    let audio = AudioContext::new(config.sample_rate);
    let game = BounceGame::new(&config, Arc::clone(&assets), audio)?;

    let event_loop = EventLoop::new().map_err(|e| format!("Failed to create event loop: {e}"))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, assets, game);
    event_loop
        .run_app(&mut app)
        .map_err(|e| format!("Event loop error: {e}"))?;
    app.exit_error.map_or(Ok(()), Err)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Bounce starting...");

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_exit_error_is_the_one_reported() {
        let mut slot = None;
        record_exit_error(&mut slot, "Failed to create surface: lost".to_string());
        record_exit_error(&mut slot, "Failed to create device".to_string());
        assert_eq!(slot.as_deref(), Some("Failed to create surface: lost"));
    }

    #[test]
    fn only_movement_and_control_keys_are_mapped() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::F3), Some(Key::F3));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::Space), None);
    }
}

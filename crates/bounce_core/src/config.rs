use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Demo settings. Every field has a default, so an absent or partial JSON
/// file still yields a runnable configuration.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Logical screen size returned by `Game::layout`.
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Window size is the logical size times this factor.
    #[serde(default = "default_window_scale")]
    pub window_scale: u32,
    #[serde(default = "default_sprites_dir")]
    pub sprites_dir: PathBuf,
    #[serde(default = "default_sounds_dir")]
    pub sounds_dir: PathBuf,
    #[serde(default = "default_bounce_sound")]
    pub bounce_sound: String,
    #[serde(default = "default_player_sprite")]
    pub player_sprite: String,
    /// Omit or set to null to run with the player only.
    #[serde(default = "default_bouncer_sprite")]
    pub bouncer_sprite: Option<String>,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Present in step with the display refresh.
    #[serde(default = "default_vsync")]
    pub vsync: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            window_scale: default_window_scale(),
            sprites_dir: default_sprites_dir(),
            sounds_dir: default_sounds_dir(),
            bounce_sound: default_bounce_sound(),
            player_sprite: default_player_sprite(),
            bouncer_sprite: default_bouncer_sprite(),
            sample_rate: default_sample_rate(),
            tick_rate: default_tick_rate(),
            vsync: default_vsync(),
        }
    }
}

impl GameConfig {
    pub fn window_size(&self) -> (u32, u32) {
        (
            self.width.saturating_mul(self.window_scale),
            self.height.saturating_mul(self.window_scale),
        )
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Missing file means defaults; a present but broken file is an error.
pub fn load_config_or_default(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return Ok(GameConfig::default());
    }
    load_config_from_path(path)
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.width == 0 || config.height == 0 {
        return Err("Config validation failed: width and height must be > 0".to_string());
    }
    if config.window_scale == 0 {
        return Err("Config validation failed: window_scale must be > 0".to_string());
    }
    let scaled_w = config.width.checked_mul(config.window_scale);
    let scaled_h = config.height.checked_mul(config.window_scale);
    if scaled_w.is_none() || scaled_h.is_none() {
        return Err(format!(
            "Config validation failed: {}x{} at window_scale {} overflows the window size",
            config.width, config.height, config.window_scale
        ));
    }
    if config.sample_rate == 0 {
        return Err("Config validation failed: sample_rate must be > 0".to_string());
    }
    if config.tick_rate == 0 {
        return Err("Config validation failed: tick_rate must be > 0".to_string());
    }
    Ok(())
}

fn default_title() -> String {
    "Bounce".to_string()
}

const fn default_width() -> u32 {
    600
}

const fn default_height() -> u32 {
    400
}

const fn default_window_scale() -> u32 {
    2
}

fn default_sprites_dir() -> PathBuf {
    PathBuf::from("assets/sprites")
}

fn default_sounds_dir() -> PathBuf {
    PathBuf::from("assets/sounds")
}

fn default_bounce_sound() -> String {
    "test.wav".to_string()
}

fn default_player_sprite() -> String {
    "ship.png".to_string()
}

fn default_bouncer_sprite() -> Option<String> {
    Some("powerup.png".to_string())
}

const fn default_sample_rate() -> u32 {
    44_100
}

const fn default_tick_rate() -> u32 {
    crate::time::DEFAULT_TICK_RATE
}

const fn default_vsync() -> bool {
    true
}

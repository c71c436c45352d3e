use std::sync::Arc;
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Smallest inner size the user can drag the window down to.
    pub min_size: Option<(u32, u32)>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Bounce".to_string(),
            width: 1200,
            height: 800,
            min_size: None,
        }
    }
}

pub fn window_attributes(config: &PlatformConfig) -> WindowAttributes {
    let attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(config.width, config.height));
    match config.min_size {
        Some((width, height)) => attrs.with_min_inner_size(LogicalSize::new(width, height)),
        None => attrs,
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, String> {
    let window = event_loop
        .create_window(window_attributes(config))
        .map_err(|e| format!("Failed to create window: {e}"))?;
    log::info!("Window created: {}x{}", config.width, config.height);
    Ok(Arc::new(window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::Size;

    #[test]
    fn attributes_carry_title_and_sizes() {
        let config = PlatformConfig {
            title: "Bounce test".to_string(),
            width: 1200,
            height: 800,
            min_size: Some((600, 400)),
        };
        let attrs = window_attributes(&config);
        assert_eq!(attrs.title, "Bounce test");
        assert_eq!(
            attrs.inner_size,
            Some(Size::Logical(LogicalSize::new(1200.0, 800.0)))
        );
        assert_eq!(
            attrs.min_inner_size,
            Some(Size::Logical(LogicalSize::new(600.0, 400.0)))
        );
    }

    #[test]
    fn no_minimum_by_default() {
        let attrs = window_attributes(&PlatformConfig::default());
        assert_eq!(attrs.min_inner_size, None);
    }
}

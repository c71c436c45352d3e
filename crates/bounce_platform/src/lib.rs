pub mod window;

pub use window::{create_window, window_attributes, PlatformConfig};

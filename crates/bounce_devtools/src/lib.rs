pub mod debug_overlay;

pub use debug_overlay::{status_line, DebugOverlay, OverlayStats};

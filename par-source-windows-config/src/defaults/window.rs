//! Default values for satellite window settings.

use crate::types::WindowSize;

pub fn window_name_prefix() -> String {
    "_rstudio_satellite_source_window_".to_string()
}

pub fn default_window_size() -> WindowSize {
    WindowSize::new(800, 800)
}

pub fn tile_offset() -> i32 {
    50 // Keeps a new window from exactly covering the one it was tiled from
}

pub fn close_grace_period_ms() -> u64 {
    2500
}

pub fn window_title() -> String {
    "Source".to_string()
}

//! Default values for configuration fields.
//!
//! Used as `#[serde(default = "...")]` targets so that partially specified
//! YAML files fill in the remaining fields.

mod window;

pub use window::*;

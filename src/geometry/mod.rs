//! Satellite window geometry: value types and the change tracker.
//!
//! Geometry is persisted per window id so that a reopened window lands where
//! it was and keeps its ordinal slot across restarts. The tracker only asks
//! for a save when some live window actually moved or resized.

pub mod storage;

pub use storage::{FileGeometryStore, GeometryFile};

use crate::ids::WindowId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Screen position in logical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by `delta` on both axes, clamping at the edges of `i32`
    pub const fn offset(self, delta: i32) -> Self {
        Self {
            x: self.x.saturating_add(delta),
            y: self.y.saturating_add(delta),
        }
    }
}

/// Window size in logical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<par_source_windows_config::WindowSize> for Size {
    fn from(size: par_source_windows_config::WindowSize) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Live bounds of a window as reported by the window system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenGeometry {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Persisted geometry record for one satellite window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteWindowGeometry {
    /// Stable slot number, reused when the same id is reopened
    pub ordinal: u32,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl SatelliteWindowGeometry {
    pub fn from_screen(ordinal: u32, bounds: ScreenGeometry) -> Self {
        Self {
            ordinal,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Geometry records keyed by window id
pub type GeometryMap = BTreeMap<WindowId, SatelliteWindowGeometry>;

/// Tracks the last-persisted geometry and the highest ordinal ever seen
#[derive(Debug, Clone, Default)]
pub struct GeometryTracker {
    persisted: GeometryMap,
    max_ordinal: u32,
}

impl GeometryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the tracker from geometry read back from storage
    pub fn from_persisted(persisted: GeometryMap) -> Self {
        let max_ordinal = persisted.values().map(|g| g.ordinal).max().unwrap_or(0);
        Self {
            persisted,
            max_ordinal,
        }
    }

    pub fn get(&self, window_id: &WindowId) -> Option<&SatelliteWindowGeometry> {
        self.persisted.get(window_id)
    }

    pub fn geometry(&self) -> &GeometryMap {
        &self.persisted
    }

    pub fn max_ordinal(&self) -> u32 {
        self.max_ordinal
    }

    /// Allocate the next ordinal (current max + 1)
    pub fn next_ordinal(&mut self) -> u32 {
        self.max_ordinal += 1;
        self.max_ordinal
    }

    /// Raise the running maximum to cover an ordinal allocated elsewhere
    pub fn observe_ordinal(&mut self, ordinal: u32) {
        self.max_ordinal = self.max_ordinal.max(ordinal);
    }

    /// Compare live window geometry against the persisted map.
    ///
    /// `live` yields `(id, ordinal, bounds)` for every open window. If any
    /// record is new or differs, the whole map is replaced with the staged
    /// one and `true` is returned so the caller persists it. Otherwise the
    /// persisted map is left untouched.
    pub fn refresh<I>(&mut self, live: I) -> bool
    where
        I: IntoIterator<Item = (WindowId, u32, ScreenGeometry)>,
    {
        let mut staged = GeometryMap::new();
        let mut changed = false;

        for (id, ordinal, bounds) in live {
            let candidate = SatelliteWindowGeometry::from_screen(ordinal, bounds);
            if self.persisted.get(&id) != Some(&candidate) {
                crate::debug_log!("GEOMETRY", "Window {} geometry changed: {:?}", id, candidate);
                changed = true;
            }
            self.observe_ordinal(ordinal);
            staged.insert(id, candidate);
        }

        if changed {
            self.persisted = staged;
        }
        changed
    }
}

//! Storage for the satellite geometry blob
//!
//! Geometry is stored in `~/.config/par-source-windows/source_window_geometry.yaml`
//! unless the config overrides the location.

use super::GeometryMap;
use crate::traits::GeometryPersistence;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current on-disk format version
pub const GEOMETRY_FORMAT_VERSION: u32 = 1;

/// Versioned client-state blob holding every known window's geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryFile {
    pub version: u32,
    /// When the blob was last written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub windows: GeometryMap,
}

impl GeometryFile {
    pub fn new(windows: GeometryMap) -> Self {
        Self {
            version: GEOMETRY_FORMAT_VERSION,
            saved_at: Some(Utc::now()),
            windows,
        }
    }
}

/// Load geometry from a specific file.
///
/// A missing or empty file yields an empty map.
pub fn load_geometry_from(path: &Path) -> Result<GeometryMap> {
    if !path.exists() {
        crate::debug_info!("GEOMETRY", "No geometry file at {:?}", path);
        return Ok(GeometryMap::new());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read window geometry from {:?}", path))?;

    if contents.trim().is_empty() {
        return Ok(GeometryMap::new());
    }

    let file: GeometryFile = serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse window geometry from {:?}", path))?;

    if file.version > GEOMETRY_FORMAT_VERSION {
        log::warn!(
            "Geometry file {:?} has newer format version {} (supported: {})",
            path,
            file.version,
            GEOMETRY_FORMAT_VERSION
        );
    }

    crate::debug_info!(
        "GEOMETRY",
        "Loaded geometry for {} windows from {:?}",
        file.windows.len(),
        path
    );
    Ok(file.windows)
}

/// Save geometry to a specific file, replacing it atomically
pub fn save_geometry_to(windows: &GeometryMap, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let contents = serde_yaml_ng::to_string(&GeometryFile::new(windows.clone()))
        .context("Failed to serialize window geometry")?;

    let temp_path = path.with_extension("yaml.tmp");
    std::fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write window geometry to {:?}", temp_path))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move window geometry into {:?}", path))?;

    log::info!("Saved geometry for {} windows to {:?}", windows.len(), path);
    Ok(())
}

/// Remove the geometry file. Returns false if there was nothing to remove.
pub fn clear_geometry(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(path)
        .with_context(|| format!("Failed to remove window geometry {:?}", path))?;
    log::info!("Cleared window geometry at {:?}", path);
    Ok(true)
}

/// File-backed [`GeometryPersistence`]
#[derive(Debug, Clone)]
pub struct FileGeometryStore {
    path: PathBuf,
}

impl FileGeometryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl GeometryPersistence for FileGeometryStore {
    async fn load(&self) -> Result<GeometryMap> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_geometry_from(&path))
            .await
            .context("Geometry load task failed")?
    }

    async fn save(&self, geometry: &GeometryMap) -> Result<()> {
        let path = self.path.clone();
        let geometry = geometry.clone();
        tokio::task::spawn_blocking(move || save_geometry_to(&geometry, &path))
            .await
            .context("Geometry save task failed")?
    }
}

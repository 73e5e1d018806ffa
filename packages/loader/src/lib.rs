#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Protest and country boundary loading.
//!
//! Reads the protest CSV and the country boundary `GeoJSON` described by a
//! [`MapConfig`], drops rows and features the map cannot use, and projects
//! everything into Web Mercator so points and polygons line up. Bad rows
//! are counted and skipped; only unreadable inputs are errors.

pub mod boundaries;
pub mod protests;

use std::fs::File;
use std::path::{Path, PathBuf};

use protest_map_loader_models::MapConfig;
use thiserror::Error;

pub use boundaries::{load_boundaries, load_boundaries_from_path};
pub use protests::{ProtestLoad, load_protests, load_protests_from_path};

/// Errors that can occur while loading pipeline inputs.
#[derive(Debug, Error)]
pub enum LoadError {
    /// An input file could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The protest CSV could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The boundary file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The boundary file is JSON but not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The configuration file is not valid TOML for [`MapConfig`].
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// A configured protest column is absent from the CSV header.
    #[error("Column '{column}' not found in protest CSV header")]
    MissingColumn {
        /// The configured column name.
        column: String,
    },

    /// The boundary `GeoJSON` is a bare geometry or feature.
    #[error("Boundary GeoJSON must be a FeatureCollection")]
    NotFeatureCollection,
}

/// Opens `path`, mapping failure to [`LoadError::Io`].
pub(crate) fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a [`MapConfig`] from a TOML file.
///
/// Relative input and output paths are resolved against the directory
/// containing the config file, so a config works regardless of the
/// caller's working directory.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read or is not a valid
/// config.
pub fn load_config(path: &Path) -> Result<MapConfig, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: MapConfig = toml::de::from_str(&content)?;

    if let Some(base) = path.parent() {
        resolve_paths(&mut config, base);
    }

    log::debug!("Loaded config from {}: {config:?}", path.display());
    Ok(config)
}

/// Joins every relative path in `config` onto `base`.
pub fn resolve_paths(config: &mut MapConfig, base: &Path) {
    for path in [
        &mut config.protests.path,
        &mut config.boundaries.path,
        &mut config.output.dir,
    ] {
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for building the protest map dataset.
//!
//! Runs the whole batch: load protests and boundaries, correct country
//! names, count and rank protests per country, flatten boundaries into
//! nested `xs`/`ys` arrays, and hand back a [`MapDataset`]. Each run is
//! independent; the same inputs always produce the same output.
//!
//! [`write_outputs`] serializes a dataset as `map.json` plus two `GeoJSON`
//! `FeatureCollection`s for the static site's map widgets.

pub mod export;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use protest_map_aggregate::{NameCorrectionTable, attribute_protests};
use protest_map_geometry::{flatten, sanitize};
use protest_map_loader::{LoadError, ProtestLoad, load_boundaries_from_path, load_protests_from_path};
use protest_map_loader_models::{CorrectionConfig, MapConfig};
use protest_map_protest_models::{
    Country, CountryRecord, Diagnostics, MapDataset, ProtestPoint,
};
use thiserror::Error;

/// File name of the combined JSON dataset.
pub const OUTPUT_DATASET: &str = "map.json";

/// File name of the country choropleth `GeoJSON`.
pub const OUTPUT_COUNTRIES_GEOJSON: &str = "countries.geojson";

/// File name of the protest point `GeoJSON`.
pub const OUTPUT_PROTESTS_GEOJSON: &str = "protests.geojson";

/// Errors that can occur while generating the map dataset.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// An input could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An output file or directory could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Builds the correction table described by `config`.
#[must_use]
pub fn corrections_from_config(config: &CorrectionConfig) -> NameCorrectionTable {
    let base = if config.builtin {
        NameCorrectionTable::builtin()
    } else {
        NameCorrectionTable::empty()
    };
    base.extend(&config.entries)
}

/// Loads both inputs named in `config` and builds the dataset.
///
/// # Errors
///
/// Returns [`GenerateError`] if either input cannot be read. Nothing is
/// produced when an input is missing.
pub fn run_pipeline(config: &MapConfig) -> Result<MapDataset, GenerateError> {
    let protests = load_protests_from_path(&config.protests)?;
    let countries = load_boundaries_from_path(&config.boundaries)?;
    let corrections = corrections_from_config(&config.corrections);
    log::debug!("Using {} name corrections", corrections.len());

    Ok(build_dataset(countries, &protests, &corrections))
}

/// Joins loaded protests to countries and flattens everything into output
/// records.
#[must_use]
pub fn build_dataset(
    mut countries: Vec<Country>,
    protests: &ProtestLoad,
    corrections: &NameCorrectionTable,
) -> MapDataset {
    let report = attribute_protests(&mut countries, &protests.protests, corrections);

    let flat = flatten(countries.iter().map(|c| &c.geometry));

    let countries = countries
        .into_iter()
        .zip(flat.xs.into_iter().zip(flat.ys))
        .map(|(country, (xs, ys))| CountryRecord {
            name: country.name,
            count: country.count,
            rank: country.rank,
            xs,
            ys,
        })
        .collect();

    let points = protests
        .protests
        .iter()
        .map(|p| ProtestPoint {
            x: sanitize(p.point.x()),
            y: sanitize(p.point.y()),
            fields: p.fields.clone(),
        })
        .collect();

    MapDataset {
        countries,
        protests: points,
        diagnostics: Diagnostics {
            unmatched_names: report.unmatched_names,
            countries_without_protests: report.countries_without_protests,
            dropped_rows: protests.dropped.clone(),
        },
    }
}

/// Writes `map.json`, `countries.geojson`, and `protests.geojson` into
/// `dir`, creating it if needed. Returns the written paths.
///
/// # Errors
///
/// Returns [`GenerateError`] if serialization or any write fails.
pub fn write_outputs(dataset: &MapDataset, dir: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    std::fs::create_dir_all(dir).map_err(|source| GenerateError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let outputs = [
        (OUTPUT_DATASET, serde_json::to_string(dataset)?),
        (
            OUTPUT_COUNTRIES_GEOJSON,
            export::countries_geojson(&dataset.countries)?.to_string(),
        ),
        (
            OUTPUT_PROTESTS_GEOJSON,
            export::protests_geojson(&dataset.protests).to_string(),
        ),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, content) in outputs {
        let path = dir.join(name);
        std::fs::write(&path, content).map_err(|source| GenerateError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Renders the ranking as a text table, most protests first. Ranks are
/// shown 1-based.
#[must_use]
pub fn rank_table(dataset: &MapDataset) -> String {
    let mut rows: Vec<&CountryRecord> = dataset.countries.iter().collect();
    rows.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.name.cmp(&b.name)));

    let width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Country".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:>4}  {:<width$}  {:>8}", "Rank", "Country", "Protests");
    for row in rows {
        let _ = writeln!(
            out,
            "{:>4}  {:<width$}  {:>8}",
            row.rank + 1,
            row.name,
            row.count
        );
    }
    out
}

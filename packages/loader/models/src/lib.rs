#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Protest map configuration types.
//!
//! Defines the TOML schema describing where the protest and boundary
//! inputs live, which columns and properties carry the fields the pipeline
//! needs, and where output goes. Column names drift between revisions of
//! the protest spreadsheet, so none of them are hard-coded.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level pipeline configuration, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Protest CSV input.
    pub protests: ProtestSchema,
    /// Country boundary `GeoJSON` input.
    pub boundaries: BoundarySchema,
    /// Country name corrections applied before counting.
    #[serde(default)]
    pub corrections: CorrectionConfig,
    /// Output location.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the protest CSV lives and how to read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtestSchema {
    /// Path to the CSV file.
    pub path: PathBuf,
    /// Column holding the country name.
    #[serde(default = "default_name_column")]
    pub name_column: String,
    /// Column holding the WGS84 latitude.
    #[serde(default = "default_latitude_column")]
    pub latitude_column: String,
    /// Column holding the WGS84 longitude.
    #[serde(default = "default_longitude_column")]
    pub longitude_column: String,
    /// Placeholder literals that mark a coordinate cell as invalid.
    #[serde(default = "default_sentinels")]
    pub sentinels: Vec<String>,
    /// Rows with a longitude below this value are dropped (e.g. `-20.0`
    /// for an Africa-only dataset).
    #[serde(default)]
    pub min_longitude: Option<f64>,
}

/// Where the boundary `GeoJSON` lives and which features to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySchema {
    /// Path to the `GeoJSON` `FeatureCollection`.
    pub path: PathBuf,
    /// Feature property holding the canonical country name.
    #[serde(default = "default_name_property")]
    pub name_property: String,
    /// Feature property holding the geographic region.
    #[serde(default = "default_region_property")]
    pub region_property: String,
    /// Keep only features whose region property equals this value. All
    /// features are kept when unset.
    #[serde(default)]
    pub region: Option<String>,
    /// Ramer–Douglas–Peucker tolerance in projected metres. Boundaries are
    /// kept at full resolution when unset.
    #[serde(default)]
    pub simplify_tolerance: Option<f64>,
}

/// Name correction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Whether to start from the built-in correction table.
    #[serde(default = "default_true")]
    pub builtin: bool,
    /// Additional `variant = "canonical"` pairs; these win over built-ins.
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            entries: BTreeMap::new(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives the generated files.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_name_column() -> String {
    "Name".to_string()
}

fn default_latitude_column() -> String {
    "LAT".to_string()
}

fn default_longitude_column() -> String {
    "LONG".to_string()
}

fn default_sentinels() -> Vec<String> {
    vec!["checked".to_string()]
}

fn default_name_property() -> String {
    "name_engli".to_string()
}

fn default_region_property() -> String {
    "unregion2".to_string()
}

const fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/generated")
}

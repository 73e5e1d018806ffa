#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Protest event and country boundary types.
//!
//! [`Country`] and [`Protest`] are the typed entities produced by the
//! loader after validation. [`MapDataset`] and its records are the plain
//! serializable hand-off consumed by whatever renders the map; they carry
//! no geometry library types, only nested numeric arrays.

use std::collections::BTreeMap;
use std::fmt;

use geo::{MultiPolygon, Point, Polygon};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// One coordinate axis of a single ring. `None` marks a value that was not
/// finite and serializes as `null`.
pub type RingCoords = Vec<Option<f64>>;

/// Rings of a single polygon, exterior first, holes after.
pub type PolygonCoords = Vec<RingCoords>;

/// Polygons of a single (multi-)polygon geometry.
pub type MultiPolygonCoords = Vec<PolygonCoords>;

/// Descriptive source columns as `(header, value)` pairs in header order.
pub type Fields = Vec<(String, String)>;

/// Keys a [`ProtestPoint`] uses for its projected coordinates. Descriptive
/// fields must not reuse them.
pub const POINT_COORDINATE_KEYS: [&str; 2] = ["x", "y"];

fn find_field<'a>(fields: &'a Fields, name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// A country boundary as read from the source, before flattening.
///
/// A bare polygon is kept distinct from a multi-polygon so the source shape
/// survives until serialization, where both become the same nested layout.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryGeometry {
    /// A single polygon (exterior ring plus optional holes).
    Polygon(Polygon<f64>),
    /// Several disjoint polygons forming one country (e.g. islands).
    MultiPolygon(MultiPolygon<f64>),
}

impl BoundaryGeometry {
    /// Iterates the polygons of this geometry. A bare polygon yields itself.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon<f64>> {
        let slice: &[Polygon<f64>] = match self {
            Self::Polygon(p) => std::slice::from_ref(p),
            Self::MultiPolygon(mp) => &mp.0,
        };
        slice.iter()
    }

    /// Total number of points across all rings of all polygons.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.polygons()
            .map(|p| {
                p.exterior().0.len() + p.interiors().iter().map(|r| r.0.len()).sum::<usize>()
            })
            .sum()
    }
}

impl From<Polygon<f64>> for BoundaryGeometry {
    fn from(value: Polygon<f64>) -> Self {
        Self::Polygon(value)
    }
}

impl From<MultiPolygon<f64>> for BoundaryGeometry {
    fn from(value: MultiPolygon<f64>) -> Self {
        Self::MultiPolygon(value)
    }
}

/// A country boundary keyed by its canonical name.
///
/// `count` and `rank` are zero until the aggregator fills them in.
#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    /// Canonical country name, the join key for protests.
    pub name: String,
    /// Boundary in the projected (Web Mercator) coordinate system.
    pub geometry: BoundaryGeometry,
    /// Number of protests joined to this country.
    pub count: u64,
    /// Dense descending rank over `count`; 0 is the most protests.
    pub rank: u32,
}

impl Country {
    /// Creates a country with no protests attributed yet.
    #[must_use]
    pub fn new(name: impl Into<String>, geometry: impl Into<BoundaryGeometry>) -> Self {
        Self {
            name: name.into(),
            geometry: geometry.into(),
            count: 0,
            rank: 0,
        }
    }
}

/// A single recorded protest with validated coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Protest {
    /// Country name exactly as written in the source row.
    pub country: String,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    /// Location in the same projected coordinate system as [`Country`].
    pub point: Point<f64>,
    /// Every column of the source row, passed through untouched.
    pub fields: Fields,
}

impl Protest {
    /// Value of the descriptive field `name`, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        find_field(&self.fields, name)
    }
}

/// Why a protest row was excluded at load time.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DropReason {
    /// Latitude or longitude cell was empty or absent.
    MissingCoordinate,
    /// A coordinate cell held a known placeholder literal (e.g. `checked`).
    SentinelValue,
    /// A coordinate cell did not parse as a finite number.
    Unparseable,
    /// Both coordinates were exactly zero.
    NullIsland,
    /// Longitude fell below the configured cut-off.
    OutOfBounds,
}

/// Per-country output record for the choropleth layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    /// Canonical country name.
    pub name: String,
    /// Number of protests joined to this country.
    pub count: u64,
    /// Dense descending rank; indexes an ordered color palette.
    pub rank: u32,
    /// X coordinates, nested polygon → ring → point.
    pub xs: MultiPolygonCoords,
    /// Y coordinates, same nesting as `xs`.
    pub ys: MultiPolygonCoords,
}

/// Per-protest output record for the point layer.
///
/// Serializes as one flat object: `x`, `y`, then every descriptive field in
/// source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtestPoint {
    /// Projected x, `null` when not finite.
    pub x: Option<f64>,
    /// Projected y, `null` when not finite.
    pub y: Option<f64>,
    /// Descriptive source columns, written alongside `x`/`y`.
    pub fields: Fields,
}

impl ProtestPoint {
    /// Value of the descriptive field `name`, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        find_field(&self.fields, name)
    }
}

impl Serialize for ProtestPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.fields.len()))?;
        map.serialize_entry("x", &self.x)?;
        map.serialize_entry("y", &self.y)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProtestPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ProtestPointVisitor)
    }
}

struct ProtestPointVisitor;

impl<'de> Visitor<'de> for ProtestPointVisitor {
    type Value = ProtestPoint;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a protest point object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut x: Option<Option<f64>> = None;
        let mut y: Option<Option<f64>> = None;
        let mut fields = Fields::new();

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "x" => {
                    if x.is_some() {
                        return Err(de::Error::duplicate_field("x"));
                    }
                    x = Some(map.next_value()?);
                }
                "y" => {
                    if y.is_some() {
                        return Err(de::Error::duplicate_field("y"));
                    }
                    y = Some(map.next_value()?);
                }
                _ => {
                    let value: String = map.next_value()?;
                    fields.push((key, value));
                }
            }
        }

        Ok(ProtestPoint {
            x: x.ok_or_else(|| <A::Error as de::Error>::missing_field("x"))?,
            y: y.ok_or_else(|| <A::Error as de::Error>::missing_field("y"))?,
            fields,
        })
    }
}

/// Join diagnostics carried along with the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Protest country names (after correction) matching no country, with
    /// their occurrence counts.
    pub unmatched_names: BTreeMap<String, u64>,
    /// Countries that received no protests.
    pub countries_without_protests: Vec<String>,
    /// Protest rows excluded at load time, by reason.
    pub dropped_rows: BTreeMap<DropReason, u64>,
}

/// Everything the rendering layer needs for one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDataset {
    /// Choropleth records, in boundary source order.
    pub countries: Vec<CountryRecord>,
    /// Point records, in protest source order.
    pub protests: Vec<ProtestPoint>,
    /// Join and load diagnostics.
    pub diagnostics: Diagnostics,
}

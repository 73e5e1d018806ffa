//! `GeoJSON` export of a [`MapDataset`](protest_map_protest_models::MapDataset).
//!
//! Both layers are written as `FeatureCollection`s in the projected (Web
//! Mercator) coordinate system the dataset already uses.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use protest_map_protest_models::{CountryRecord, MultiPolygonCoords, ProtestPoint};

/// Builds the choropleth layer. Each feature carries `name`, `count`,
/// `rank`, `xs`, and `ys` properties.
///
/// A country with any non-finite coordinate gets a `null` geometry; its
/// `xs`/`ys` properties still hold the full nested arrays.
///
/// # Errors
///
/// Returns an error if a record cannot be converted to a JSON object.
pub fn countries_geojson(countries: &[CountryRecord]) -> Result<GeoJson, serde_json::Error> {
    let features = countries
        .iter()
        .map(|country| -> Result<Feature, serde_json::Error> {
            let geometry = multi_polygon(&country.xs, &country.ys);
            if geometry.is_none() {
                log::warn!(
                    "{}: boundary has non-finite coordinates, exporting without geometry",
                    country.name
                );
            }
            Ok(feature(geometry, to_object(country)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(collection(features))
}

/// Builds the point layer. Every descriptive field becomes a string
/// property.
#[must_use]
pub fn protests_geojson(protests: &[ProtestPoint]) -> GeoJson {
    let features = protests
        .iter()
        .map(|p| {
            let geometry = p
                .x
                .zip(p.y)
                .map(|(x, y)| Geometry::new(Value::Point(vec![x, y])));
            let properties = p
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect();
            feature(geometry, properties)
        })
        .collect();

    collection(features)
}

/// Rebuilds a multi-polygon from split coordinate arrays, or `None` if any
/// coordinate is missing or the arrays disagree in shape.
fn multi_polygon(xs: &MultiPolygonCoords, ys: &MultiPolygonCoords) -> Option<Geometry> {
    if xs.len() != ys.len() {
        return None;
    }

    let polygons = xs
        .iter()
        .zip(ys)
        .map(|(px, py)| {
            if px.len() != py.len() {
                return None;
            }
            px.iter()
                .zip(py)
                .map(|(rx, ry)| {
                    if rx.len() != ry.len() {
                        return None;
                    }
                    rx.iter()
                        .zip(ry)
                        .map(|(x, y)| Some(vec![(*x)?, (*y)?]))
                        .collect::<Option<Vec<_>>>()
                })
                .collect::<Option<Vec<_>>>()
        })
        .collect::<Option<Vec<_>>>()?;

    Some(Geometry::new(Value::MultiPolygon(polygons)))
}

fn to_object<T: serde::Serialize>(value: &T) -> Result<JsonObject, serde_json::Error> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(map) => Ok(map),
        other => {
            let mut map = JsonObject::new();
            map.insert("value".to_string(), other);
            Ok(map)
        }
    }
}

const fn feature(geometry: Option<Geometry>, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

const fn collection(features: Vec<Feature>) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

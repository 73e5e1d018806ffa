//! Country boundary `GeoJSON` loading.
//!
//! Keeps polygon and multi-polygon features that carry a name and, when a
//! region filter is configured, belong to that region. Kept boundaries are
//! projected from WGS84 to Web Mercator and, when a tolerance is configured,
//! simplified in projected metres.

use std::io::{BufReader, Read};

use geojson::{Feature, GeoJson};
use protest_map_geometry::{project_boundary, simplify_boundary};
use protest_map_loader_models::BoundarySchema;
use protest_map_protest_models::{BoundaryGeometry, Country};

use crate::LoadError;

/// Reads country boundaries from the `GeoJSON` file at `schema.path`.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be opened or is not a
/// `GeoJSON` `FeatureCollection`.
pub fn load_boundaries_from_path(schema: &BoundarySchema) -> Result<Vec<Country>, LoadError> {
    log::info!("Loading boundaries from {}...", schema.path.display());
    load_boundaries(BufReader::new(crate::open(&schema.path)?), schema)
}

/// Reads country boundaries from a `GeoJSON` `FeatureCollection`.
///
/// Features without a polygonal geometry or a string name are skipped, as
/// are features outside the configured region.
///
/// # Errors
///
/// Returns [`LoadError`] if the input is not valid JSON, not valid
/// `GeoJSON`, or not a `FeatureCollection`.
pub fn load_boundaries<R: Read>(
    reader: R,
    schema: &BoundarySchema,
) -> Result<Vec<Country>, LoadError> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    let GeoJson::FeatureCollection(collection) = GeoJson::from_json_value(value)? else {
        return Err(LoadError::NotFeatureCollection);
    };

    let total = collection.features.len();
    let countries: Vec<Country> = collection
        .features
        .into_iter()
        .filter(|f| in_region(f, schema))
        .filter_map(|f| country_from_feature(f, schema))
        .collect();

    log::info!(
        "Loaded {} country boundaries ({} features skipped)",
        countries.len(),
        total - countries.len()
    );

    Ok(countries)
}

fn property<'a>(feature: &'a Feature, key: &str) -> Option<&'a str> {
    feature
        .properties
        .as_ref()?
        .get(key)
        .and_then(serde_json::Value::as_str)
}

fn in_region(feature: &Feature, schema: &BoundarySchema) -> bool {
    schema
        .region
        .as_deref()
        .is_none_or(|region| property(feature, &schema.region_property) == Some(region))
}

fn country_from_feature(feature: Feature, schema: &BoundarySchema) -> Option<Country> {
    let Some(name) = property(&feature, &schema.name_property).filter(|n| !n.is_empty()) else {
        log::debug!(
            "Skipping feature without a '{}' name property",
            schema.name_property
        );
        return None;
    };
    let name = name.to_string();

    let Some(geometry) = feature.geometry else {
        log::debug!("Skipping {name}: null geometry");
        return None;
    };

    let boundary = match geo::Geometry::<f64>::try_from(geometry.value) {
        Ok(geo::Geometry::Polygon(p)) => BoundaryGeometry::Polygon(p),
        Ok(geo::Geometry::MultiPolygon(mp)) => BoundaryGeometry::MultiPolygon(mp),
        Ok(_) => {
            log::warn!("Skipping {name}: geometry is not a polygon or multi-polygon");
            return None;
        }
        Err(e) => {
            log::warn!("Skipping {name}: failed to convert geometry: {e}");
            return None;
        }
    };

    let projected = project_boundary(&boundary);

    let Some(tolerance) = schema.simplify_tolerance else {
        return Some(Country::new(name, projected));
    };
    let Some(simplified) = simplify_boundary(&projected, tolerance) else {
        log::warn!("Skipping {name}: boundary cannot be simplified");
        return None;
    };
    log::debug!(
        "Simplified {name} from {} to {} points",
        projected.point_count(),
        simplified.point_count()
    );

    Some(Country::new(name, simplified))
}

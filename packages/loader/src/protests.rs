//! Protest CSV loading.
//!
//! Each row becomes a [`Protest`] only if both coordinates are present,
//! numeric, and not the `(0, 0)` placeholder. Excluded rows are tallied by
//! [`DropReason`] rather than reported as errors. Every column of a kept
//! row is carried through as a descriptive field, in header order.

use std::collections::BTreeMap;
use std::io::Read;

use geo::Point;
use protest_map_geometry::to_web_mercator;
use protest_map_loader_models::ProtestSchema;
use protest_map_protest_models::{DropReason, Fields, POINT_COORDINATE_KEYS, Protest};

use crate::LoadError;

/// Protests that survived cleaning, plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtestLoad {
    /// Valid protests in source row order.
    pub protests: Vec<Protest>,
    /// Excluded rows by reason.
    pub dropped: BTreeMap<DropReason, u64>,
}

impl ProtestLoad {
    /// Total number of excluded rows.
    #[must_use]
    pub fn dropped_total(&self) -> u64 {
        self.dropped.values().sum()
    }
}

/// Reads protests from the CSV at `schema.path`.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be opened or parsed, or a
/// configured column is missing.
pub fn load_protests_from_path(schema: &ProtestSchema) -> Result<ProtestLoad, LoadError> {
    log::info!("Loading protests from {}...", schema.path.display());
    load_protests(crate::open(&schema.path)?, schema)
}

/// Reads protests from CSV data with a header row.
///
/// # Errors
///
/// Returns [`LoadError`] if the CSV is malformed or a configured column is
/// missing from the header.
pub fn load_protests<R: Read>(reader: R, schema: &ProtestSchema) -> Result<ProtestLoad, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').to_string())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn {
                column: name.to_string(),
            })
    };
    let name_idx = column(&schema.name_column)?;
    let lat_idx = column(&schema.latitude_column)?;
    let lng_idx = column(&schema.longitude_column)?;
    let columns = field_names(&headers);

    let mut load = ProtestLoad::default();

    for result in rdr.records() {
        let record = result?;

        if record.len() > columns.len() {
            log::debug!(
                "Ignoring {} cells past the header on line {}",
                record.len() - columns.len(),
                record.position().map_or(0, csv::Position::line)
            );
        }

        let (latitude, longitude) =
            match parse_coordinates(record.get(lat_idx), record.get(lng_idx), schema) {
                Ok(coords) => coords,
                Err(reason) => {
                    *load.dropped.entry(reason).or_insert(0) += 1;
                    continue;
                }
            };

        let (x, y) = to_web_mercator(longitude, latitude);
        let fields: Fields = columns
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();

        load.protests.push(Protest {
            country: record.get(name_idx).unwrap_or_default().to_string(),
            latitude,
            longitude,
            point: Point::new(x, y),
            fields,
        });
    }

    log::info!(
        "Loaded {} protests ({} rows dropped)",
        load.protests.len(),
        load.dropped_total()
    );
    for (reason, count) in &load.dropped {
        log::debug!("Dropped {count} protest rows: {reason}");
    }

    Ok(load)
}

/// Output names for the CSV columns.
///
/// Headers are kept as-is unless they collide with a point coordinate key
/// or an earlier header, in which case a numeric suffix is added so every
/// field survives as its own key.
#[must_use]
pub fn field_names(headers: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(headers.len());

    for header in headers {
        let taken = |name: &str| {
            POINT_COORDINATE_KEYS.contains(&name) || names.iter().any(|n| n == name)
        };

        let mut name = header.clone();
        let mut suffix = 2;
        while taken(&name) {
            name = format!("{header}_{suffix}");
            suffix += 1;
        }
        if name != *header {
            log::warn!("Protest column '{header}' is exported as '{name}'");
        }
        names.push(name);
    }

    names
}

/// Validates a row's latitude/longitude cells.
///
/// # Errors
///
/// Returns the [`DropReason`] for the first check the row fails.
pub fn parse_coordinates(
    lat: Option<&str>,
    lng: Option<&str>,
    schema: &ProtestSchema,
) -> Result<(f64, f64), DropReason> {
    let latitude = parse_coordinate(lat, &schema.sentinels)?;
    let longitude = parse_coordinate(lng, &schema.sentinels)?;

    if latitude == 0.0 && longitude == 0.0 {
        return Err(DropReason::NullIsland);
    }
    if let Some(min) = schema.min_longitude
        && longitude < min
    {
        return Err(DropReason::OutOfBounds);
    }

    Ok((latitude, longitude))
}

fn parse_coordinate(cell: Option<&str>, sentinels: &[String]) -> Result<f64, DropReason> {
    let cell = cell
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(DropReason::MissingCoordinate)?;

    if sentinels.iter().any(|s| s == cell) {
        return Err(DropReason::SentinelValue);
    }

    cell.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(DropReason::Unparseable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn schema() -> ProtestSchema {
        ProtestSchema {
            path: PathBuf::from("protests.csv"),
            name_column: "Name".to_string(),
            latitude_column: "LAT".to_string(),
            longitude_column: "LONG".to_string(),
            sentinels: vec!["checked".to_string()],
            min_longitude: None,
        }
    }

    fn load(csv: &str) -> ProtestLoad {
        load_protests(csv.as_bytes(), &schema()).unwrap()
    }

    #[test]
    fn keeps_valid_rows_with_all_fields() {
        let result = load(
            "Name,LAT,LONG,Event Type,DESCRIPTION OF PROTEST\n\
             Kenya,-1.2921,36.8219,March,Fee increase\n",
        );

        assert_eq!(result.protests.len(), 1);
        let protest = &result.protests[0];
        assert_eq!(protest.country, "Kenya");
        assert!((protest.latitude - -1.2921).abs() < f64::EPSILON);
        assert!((protest.longitude - 36.8219).abs() < f64::EPSILON);
        assert_eq!(protest.field("Event Type"), Some("March"));
        assert_eq!(protest.field("DESCRIPTION OF PROTEST"), Some("Fee increase"));
        assert_eq!(protest.field("Name"), Some("Kenya"));

        let (x, y) = to_web_mercator(36.8219, -1.2921);
        assert!((protest.point.x() - x).abs() < 1e-6);
        assert!((protest.point.y() - y).abs() < 1e-6);
    }

    #[test]
    fn sentinel_longitude_is_dropped_without_error() {
        let result = load("Name,LAT,LONG\nChad,12.1,checked\nChad,12.1,15.0\n");
        assert_eq!(result.protests.len(), 1);
        assert_eq!(result.dropped.get(&DropReason::SentinelValue), Some(&1));
    }

    #[test]
    fn drops_missing_unparseable_and_null_island_rows() {
        let result = load(
            "Name,LAT,LONG\n\
             Mali,,-4.0\n\
             Mali,17.5\n\
             Mali,abc,-4.0\n\
             Mali,NaN,-4.0\n\
             Mali,0,0\n\
             Mali,0.0,-4.0\n",
        );

        assert_eq!(result.protests.len(), 1, "only the zero-latitude row survives");
        assert!((result.protests[0].latitude).abs() < f64::EPSILON);
        assert_eq!(result.dropped.get(&DropReason::MissingCoordinate), Some(&2));
        assert_eq!(result.dropped.get(&DropReason::Unparseable), Some(&2));
        assert_eq!(result.dropped.get(&DropReason::NullIsland), Some(&1));
        assert_eq!(result.dropped_total(), 5);
    }

    #[test]
    fn min_longitude_drops_far_west_rows() {
        let mut schema = schema();
        schema.min_longitude = Some(-20.0);
        let result = load_protests(
            "Name,LAT,LONG\nGhana,5.6,-0.19\nGhana,5.6,-75.0\nGhana,5.6,-20.0\n".as_bytes(),
            &schema,
        )
        .unwrap();

        assert_eq!(result.protests.len(), 2);
        assert_eq!(result.dropped.get(&DropReason::OutOfBounds), Some(&1));
    }

    #[test]
    fn non_numeric_longitude_is_not_out_of_bounds() {
        let mut schema = schema();
        schema.min_longitude = Some(-20.0);
        let result = load_protests(
            "Name,LAT,LONG\nGhana,5.6,west\nGhana,5.6,checked\nGhana,5.6,-inf\n".as_bytes(),
            &schema,
        )
        .unwrap();

        assert!(result.protests.is_empty());
        assert_eq!(result.dropped.get(&DropReason::Unparseable), Some(&2));
        assert_eq!(result.dropped.get(&DropReason::SentinelValue), Some(&1));
        assert_eq!(result.dropped.get(&DropReason::OutOfBounds), None);
    }

    #[test]
    fn fields_keep_header_order() {
        let result = load("Name,LAT,LONG,Zeta,Alpha\nChad,12.1,15.0,z,a\n");
        let keys: Vec<&str> = result.protests[0]
            .fields
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["Name", "LAT", "LONG", "Zeta", "Alpha"]);
    }

    #[test]
    fn coordinate_and_duplicate_columns_are_renamed() {
        let result = load("Name,LAT,LONG,x,Notes,Notes,x_2\nChad,12.1,15.0,campus,a,b,c\n");
        let protest = &result.protests[0];
        let keys: Vec<&str> = protest.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Name", "LAT", "LONG", "x_2", "Notes", "Notes_2", "x_2_2"]);
        assert_eq!(protest.field("x_2"), Some("campus"));
        assert_eq!(protest.field("Notes_2"), Some("b"));
        assert_eq!(protest.field("x"), None);
    }

    #[test]
    fn cells_past_the_header_are_ignored() {
        let result = load("Name,LAT,LONG\nChad,12.1,15.0,extra,more\n");
        assert_eq!(result.protests.len(), 1);
        assert_eq!(result.protests[0].fields.len(), 3);
    }

    #[test]
    fn country_name_is_kept_verbatim() {
        let result = load("Name,LAT,LONG\n\"Madagascar \",-18.9,47.5\n");
        assert_eq!(result.protests[0].country, "Madagascar ");
    }

    #[test]
    fn configured_columns_are_used() {
        let mut schema = schema();
        schema.name_column = "Country Name".to_string();
        schema.latitude_column = "Latitude".to_string();
        schema.longitude_column = "Longitude".to_string();

        let result = load_protests(
            "\u{feff}Country Name,Latitude,Longitude\nNiger,13.5,2.1\n".as_bytes(),
            &schema,
        )
        .unwrap();
        assert_eq!(result.protests[0].country, "Niger");
    }

    #[test]
    fn missing_column_is_an_error() {
        let err = load_protests("Country,LAT,LONG\nChad,1,1\n".as_bytes(), &schema()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { ref column } if column == "Name"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut schema = schema();
        schema.path = PathBuf::from("/nonexistent/protests.csv");
        assert!(matches!(
            load_protests_from_path(&schema),
            Err(LoadError::Io { .. })
        ));
    }
}

//! WGS84 to Web Mercator (EPSG:3857) projection.
//!
//! Uses the spherical formula with the 20037508.34 m half-circumference.
//! Latitudes outside `(-90, 90)` can produce non-finite `y` values; those
//! are left as-is here and nulled by [`crate::flatten`] at serialization.

use std::f64::consts::PI;

use geo::{Coord, MapCoords};
use protest_map_protest_models::BoundaryGeometry;

/// Half the equatorial circumference of the Web Mercator sphere, in metres.
pub const ORIGIN_SHIFT: f64 = 20_037_508.34;

/// Projects a longitude/latitude pair to Web Mercator `(x, y)`.
#[must_use]
pub fn to_web_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let x = lon * ORIGIN_SHIFT / 180.0;
    let y = ((90.0 + lat) * PI / 360.0).tan().ln() / (PI / 180.0);
    (x, y * ORIGIN_SHIFT / 180.0)
}

/// Projects every coordinate of a WGS84 boundary (x = longitude,
/// y = latitude) to Web Mercator, keeping its polygon/multi-polygon shape.
#[must_use]
pub fn project_boundary(geometry: &BoundaryGeometry) -> BoundaryGeometry {
    let project = |c: Coord<f64>| {
        let (x, y) = to_web_mercator(c.x, c.y);
        Coord { x, y }
    };

    match geometry {
        BoundaryGeometry::Polygon(p) => BoundaryGeometry::Polygon(p.map_coords(project)),
        BoundaryGeometry::MultiPolygon(mp) => {
            BoundaryGeometry::MultiPolygon(mp.map_coords(project))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, polygon};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn origin_maps_to_origin() {
        let (x, y) = to_web_mercator(0.0, 0.0);
        assert!(approx(x, 0.0));
        assert!(approx(y, 0.0));
    }

    #[test]
    fn antimeridian_maps_to_origin_shift() {
        let (x, _) = to_web_mercator(180.0, 0.0);
        assert!(approx(x, ORIGIN_SHIFT));
        let (x, _) = to_web_mercator(-180.0, 0.0);
        assert!(approx(x, -ORIGIN_SHIFT));
    }

    #[test]
    fn known_point_matches_epsg_3857() {
        // Nairobi
        let (x, y) = to_web_mercator(36.8219, -1.2921);
        assert!((x - 4_098_995.16).abs() < 1.0, "x = {x}");
        assert!((y - -143_848.11).abs() < 1.0, "y = {y}");
    }

    #[test]
    fn south_pole_and_beyond_are_not_finite() {
        let (_, y) = to_web_mercator(0.0, -90.0);
        assert!(y.is_infinite());
        let (_, y) = to_web_mercator(0.0, 95.0);
        assert!(y.is_nan());
    }

    #[test]
    fn projects_both_geometry_kinds() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];

        let projected = project_boundary(&BoundaryGeometry::Polygon(square.clone()));
        let BoundaryGeometry::Polygon(p) = projected else {
            panic!("expected polygon");
        };
        let corner = p.exterior().0[1];
        assert!(approx(corner.x, to_web_mercator(1.0, 0.0).0));
        assert_eq!(p.exterior().0.len(), 4);

        let projected =
            project_boundary(&BoundaryGeometry::MultiPolygon(MultiPolygon(vec![square])));
        assert!(matches!(projected, BoundaryGeometry::MultiPolygon(ref mp) if mp.0.len() == 1));
    }
}

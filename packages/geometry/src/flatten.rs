//! Flattens boundary geometries into parallel nested coordinate arrays.
//!
//! The output nesting is `geometry → polygon → ring → coordinate`, with the
//! exterior ring first in each polygon and holes after it. `xs` and `ys`
//! have identical shape. JSON has no literal for infinity or NaN, so any
//! non-finite value becomes `None` and serializes as `null`.

use geo::{LineString, Polygon};
use protest_map_protest_models::{BoundaryGeometry, MultiPolygonCoords, PolygonCoords, RingCoords};

/// Parallel `xs`/`ys` arrays for a sequence of geometries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedGeometries {
    /// One entry per input geometry.
    pub xs: Vec<MultiPolygonCoords>,
    /// One entry per input geometry, same nesting as `xs`.
    pub ys: Vec<MultiPolygonCoords>,
}

/// Maps a non-finite value to `None`.
#[must_use]
pub const fn sanitize(value: f64) -> Option<f64> {
    if value.is_finite() { Some(value) } else { None }
}

/// Flattens every geometry in order.
#[must_use]
pub fn flatten<'a, I>(geometries: I) -> FlattenedGeometries
where
    I: IntoIterator<Item = &'a BoundaryGeometry>,
{
    let (xs, ys): (Vec<_>, Vec<_>) = geometries.into_iter().map(flatten_one).unzip();
    log::debug!("Flattened {} geometries", xs.len());
    FlattenedGeometries { xs, ys }
}

/// Flattens a single geometry. A bare polygon becomes a one-element
/// multi-polygon.
#[must_use]
pub fn flatten_one(geometry: &BoundaryGeometry) -> (MultiPolygonCoords, MultiPolygonCoords) {
    geometry.polygons().map(flatten_polygon).unzip()
}

fn flatten_polygon(polygon: &Polygon<f64>) -> (PolygonCoords, PolygonCoords) {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(flatten_ring)
        .unzip()
}

fn flatten_ring(ring: &LineString<f64>) -> (RingCoords, RingCoords) {
    ring.0
        .iter()
        .map(|c| (sanitize(c.x), sanitize(c.y)))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, MultiPolygon, polygon};

    fn ring(points: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(points.to_vec())
    }

    fn unit_square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ]
    }

    /// Rebuilds `(x, y)` rings from flattened arrays.
    fn reconstruct(xs: &MultiPolygonCoords, ys: &MultiPolygonCoords) -> Vec<Vec<Vec<Coord<f64>>>> {
        xs.iter()
            .zip(ys)
            .map(|(px, py)| {
                px.iter()
                    .zip(py)
                    .map(|(rx, ry)| {
                        rx.iter()
                            .zip(ry)
                            .map(|(x, y)| Coord {
                                x: x.unwrap(),
                                y: y.unwrap(),
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn bare_polygon_is_wrapped_as_multipolygon() {
        let flat = flatten([&BoundaryGeometry::from(unit_square())]);
        assert_eq!(flat.xs.len(), 1);
        assert_eq!(flat.xs[0].len(), 1, "one polygon");
        assert_eq!(flat.xs[0][0].len(), 1, "exterior only");
        assert_eq!(
            flat.xs[0][0][0],
            vec![Some(0.0), Some(10.0), Some(10.0), Some(0.0), Some(0.0)]
        );
        assert_eq!(
            flat.ys[0][0][0],
            vec![Some(0.0), Some(0.0), Some(10.0), Some(10.0), Some(0.0)]
        );
    }

    #[test]
    fn polygon_with_hole_yields_exterior_then_hole() {
        let hole = ring(&[(2.0, 2.0), (4.0, 2.0), (4.0, 4.0), (2.0, 2.0)]);
        let polygon = Polygon::new(unit_square().exterior().clone(), vec![hole]);
        let (xs, ys) = flatten_one(&BoundaryGeometry::from(polygon));

        assert_eq!(xs[0].len(), 2);
        assert_eq!(xs[0][0].len(), 5);
        assert_eq!(xs[0][1], vec![Some(2.0), Some(4.0), Some(4.0), Some(2.0)]);
        assert_eq!(ys[0][1], vec![Some(2.0), Some(2.0), Some(4.0), Some(2.0)]);
    }

    #[test]
    fn preserves_point_count_and_order_per_ring() {
        let island = polygon![
            (x: 20.0, y: 20.0),
            (x: 21.0, y: 20.0),
            (x: 21.0, y: 22.0),
            (x: 20.0, y: 20.0),
        ];
        let hole = ring(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0), (1.0, 1.0)]);
        let mainland = Polygon::new(unit_square().exterior().clone(), vec![hole]);
        let geometries = vec![
            BoundaryGeometry::from(MultiPolygon(vec![mainland, island])),
            BoundaryGeometry::from(unit_square()),
        ];

        let flat = flatten(&geometries);

        for (i, geometry) in geometries.iter().enumerate() {
            let original: Vec<Vec<Vec<Coord<f64>>>> = geometry
                .polygons()
                .map(|p| {
                    std::iter::once(p.exterior())
                        .chain(p.interiors())
                        .map(|r| r.0.clone())
                        .collect()
                })
                .collect();

            for (j, polygon) in original.iter().enumerate() {
                for (k, ring) in polygon.iter().enumerate() {
                    assert_eq!(flat.xs[i][j][k].len(), ring.len());
                    assert_eq!(flat.ys[i][j][k].len(), ring.len());
                }
            }

            assert_eq!(reconstruct(&flat.xs[i], &flat.ys[i]), original);
        }
    }

    #[test]
    fn non_finite_values_become_null() {
        let polygon = Polygon::new(
            ring(&[
                (f64::NEG_INFINITY, 0.0),
                (1.0, f64::INFINITY),
                (f64::NAN, 1.0),
                (f64::NEG_INFINITY, 0.0),
            ]),
            vec![],
        );
        let (xs, ys) = flatten_one(&BoundaryGeometry::from(polygon));

        assert_eq!(xs[0][0], vec![None, Some(1.0), None, None]);
        assert_eq!(ys[0][0], vec![Some(0.0), None, Some(1.0), Some(0.0)]);

        let json = serde_json::to_string(&xs).unwrap();
        assert_eq!(json, "[[[null,1.0,null,null]]]");
    }

    #[test]
    fn empty_input_flattens_to_empty_arrays() {
        let flat = flatten(std::iter::empty::<&BoundaryGeometry>());
        assert!(flat.xs.is_empty());
        assert!(flat.ys.is_empty());
    }

    #[test]
    fn sanitize_keeps_finite_values() {
        assert_eq!(sanitize(-3.5), Some(-3.5));
        assert_eq!(sanitize(f64::NAN), None);
    }
}

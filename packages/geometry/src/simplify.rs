//! Ramer–Douglas–Peucker simplification of projected boundaries.

use geo::{CoordsIter, Simplify};
use protest_map_protest_models::BoundaryGeometry;

/// Simplifies `geometry` with the given tolerance, in the units of its
/// coordinates. The polygon or multi-polygon kind is preserved.
///
/// Returns `None` when the boundary cannot be simplified because it holds a
/// non-finite coordinate (e.g. a projected pole).
#[must_use]
pub fn simplify_boundary(geometry: &BoundaryGeometry, tolerance: f64) -> Option<BoundaryGeometry> {
    let finite = geometry
        .polygons()
        .flat_map(|p| p.coords_iter())
        .all(|c| c.x.is_finite() && c.y.is_finite());
    if !finite {
        return None;
    }

    Some(match geometry {
        BoundaryGeometry::Polygon(p) => BoundaryGeometry::Polygon(p.simplify(tolerance)),
        BoundaryGeometry::MultiPolygon(mp) => BoundaryGeometry::MultiPolygon(mp.simplify(tolerance)),
    })
}

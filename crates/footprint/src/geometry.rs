//! WKT polygon parsing and validation.

use geo::{Area, Geometry, Polygon};
use wkt::TryFromWkt;

use crate::error::{FootprintError, Result};

/// Parse a WKT string into a single validated polygon.
///
/// `POLYGON` is accepted as is; a `MULTIPOLYGON` with exactly one member is unwrapped.
pub fn parse_polygon(text: &str) -> Result<Polygon<f64>> {
    let geometry = <Geometry<f64> as TryFromWkt<f64>>::try_from_wkt_str(text.trim())
        .map_err(|e| FootprintError::Wkt(e.to_string()))?;

    let polygon = match geometry {
        Geometry::Polygon(p) => p,
        Geometry::MultiPolygon(mut mp) if mp.0.len() == 1 => mp.0.remove(0),
        Geometry::MultiPolygon(_) => return Err(FootprintError::NotAPolygon("MULTIPOLYGON")),
        Geometry::Point(_) => return Err(FootprintError::NotAPolygon("POINT")),
        Geometry::MultiPoint(_) => return Err(FootprintError::NotAPolygon("MULTIPOINT")),
        Geometry::LineString(_) => return Err(FootprintError::NotAPolygon("LINESTRING")),
        Geometry::MultiLineString(_) => {
            return Err(FootprintError::NotAPolygon("MULTILINESTRING"))
        }
        Geometry::GeometryCollection(_) => {
            return Err(FootprintError::NotAPolygon("GEOMETRYCOLLECTION"))
        }
        _ => return Err(FootprintError::NotAPolygon("unsupported geometry")),
    };

    validate_polygon(&polygon)?;
    Ok(polygon)
}

/// A usable footprint has a closed exterior with at least four coordinates,
/// finite coordinates everywhere and a non-zero area.
pub fn validate_polygon(polygon: &Polygon<f64>) -> Result<()> {
    let exterior = polygon.exterior();

    if exterior.0.len() < 4 {
        return Err(FootprintError::DegenerateRing("fewer than four coordinates"));
    }

    if !exterior.is_closed() {
        return Err(FootprintError::DegenerateRing("ring is not closed"));
    }

    let rings = std::iter::once(exterior).chain(polygon.interiors());
    for coord in rings.flat_map(|ring| ring.0.iter()) {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(FootprintError::NonFiniteCoordinate {
                x: coord.x,
                y: coord.y,
            });
        }
    }

    if polygon.unsigned_area() <= 0.0 {
        return Err(FootprintError::DegenerateRing("zero area"));
    }

    Ok(())
}

/// Exterior ring as `[[[x, y], ...]]`, the nesting deck.gl's `PolygonLayer` expects.
pub fn exterior_path(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    vec![polygon.exterior().0.iter().map(|c| [c.x, c.y]).collect()]
}

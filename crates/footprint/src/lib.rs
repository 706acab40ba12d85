//! Footprint: building outlines with damage predictions, ready for web mapping.
//!
//! - Reads one row per building from CSV (`id`, `label`, `prediction_class`, `geometry`).
//! - Parses the `geometry` column from WKT into `geo` polygons.
//! - Attaches a CRS (EPSG code) and reprojects to WGS-84 longitude/latitude.
//! - Derives deck.gl-friendly coordinate paths, the map centre and a
//!   confusion matrix of `label` against `prediction_class`.
//!
//! Supported CRS:
//!   EPSG:4326          WGS-84 geographic (lon, lat in degrees)
//!   EPSG:3857          Web Mercator (metres)
//!   EPSG:326zz / 327zz UTM zone zz, northern / southern hemisphere (metres)

pub mod confusion;
pub mod crs;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod record;
pub mod table;

pub use confusion::ConfusionMatrix;
pub use crs::{transform, Crs};
pub use error::{FootprintError, Result};
pub use geometry::{exterior_path, parse_polygon};
pub use layer::{fill_color, polygon_rows, PolygonRow, ViewState};
pub use record::{read_records, read_records_path, BuildingRecord};
pub use table::{Footprint, FootprintTable};

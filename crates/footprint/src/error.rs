use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FootprintError>;

#[derive(Debug, Error)]
pub enum FootprintError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid WKT: {0}")]
    Wkt(String),

    /// The WKT parsed, but to something other than a single polygon.
    #[error("expected a POLYGON, found {0}")]
    NotAPolygon(&'static str),

    #[error("polygon exterior ring is degenerate: {0}")]
    DegenerateRing(&'static str),

    #[error("non-finite coordinate ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("unsupported EPSG code {0}")]
    UnsupportedEpsg(u32),

    #[error("no CRS set on the table; call set_crs first")]
    MissingCrs,

    #[error("reprojected coordinate out of range: lon {lon}, lat {lat}")]
    OutOfRange { lon: f64, lat: f64 },

    /// Wraps any per-row failure with the row index (0-based, excluding the header) and id.
    #[error("row {index} (id {id}): {source}")]
    Row {
        index: usize,
        id: String,
        #[source]
        source: Box<FootprintError>,
    },
}

impl FootprintError {
    pub fn at_row(self, index: usize, id: &str) -> Self {
        FootprintError::Row {
            index,
            id: id.to_owned(),
            source: Box::new(self),
        }
    }
}

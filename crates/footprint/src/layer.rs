//! Browser-facing layer data: the initial camera and one serialized row per footprint.

use serde::Serialize;

use crate::geometry::exterior_path;
use crate::table::FootprintTable;

pub const DEFAULT_ZOOM: f64 = 14.0;
pub const DEFAULT_PITCH: f64 = 45.0;

/// Outline colour shared by every polygon.
pub const LINE_COLOR: [u8; 3] = [0, 0, 0];

const FILL_GREEN: u8 = 50;
const FILL_BLUE: u8 = 120;
const FILL_ALPHA: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

impl ViewState {
    /// Camera over the mean footprint centroid. The table must already be in WGS-84.
    pub fn centered_on(table: &FootprintTable, zoom: f64, pitch: f64) -> Option<Self> {
        let center = table.center()?;
        Some(Self {
            latitude: center.y(),
            longitude: center.x(),
            zoom,
            pitch,
        })
    }
}

/// RGBA fill whose red channel grows with the predicted class.
///
/// For binary predictions this is `[255 * class, 50, 120]`.
pub fn fill_color(prediction_class: u32, max_class: u32) -> [u8; 4] {
    let scale = max_class.max(1) as f64;
    let red = (255.0 * prediction_class.min(max_class.max(1)) as f64 / scale).round() as u8;
    [red, FILL_GREEN, FILL_BLUE, FILL_ALPHA]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonRow {
    pub id: String,
    pub label: u32,
    pub prediction_class: u32,
    /// `[[[lon, lat], ...]]`
    pub polygon: Vec<Vec<[f64; 2]>>,
    pub fill_color: [u8; 4],
}

pub fn polygon_rows(table: &FootprintTable) -> Vec<PolygonRow> {
    let max_class = table.max_prediction_class();
    table
        .rows
        .iter()
        .map(|row| PolygonRow {
            id: row.id.clone(),
            label: row.label,
            prediction_class: row.prediction_class,
            polygon: exterior_path(&row.geometry),
            fill_color: fill_color(row.prediction_class, max_class),
        })
        .collect()
}

//! The in-memory footprint table: parsed rows plus their CRS.

use geo::{BoundingRect, Centroid, Coord, LineString, Point, Polygon, Rect};
use geojson::{feature::Id, Feature, FeatureCollection, JsonObject};
use rayon::prelude::*;
use serde_json::Value;

use crate::confusion::ConfusionMatrix;
use crate::crs::{transform, Crs};
use crate::error::{FootprintError, Result};
use crate::geometry::parse_polygon;
use crate::record::BuildingRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub id: String,
    pub label: u32,
    pub prediction_class: u32,
    pub geometry: Polygon<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct FootprintTable {
    pub rows: Vec<Footprint>,
    /// `None` until `set_crs` is called.
    pub crs: Option<Crs>,
}

impl FootprintTable {
    /// Parse every record's WKT. Rows keep their input order; any bad row fails the table.
    pub fn from_records(records: Vec<BuildingRecord>) -> Result<Self> {
        let rows = records
            .into_par_iter()
            .enumerate()
            .map(|(index, record)| {
                let geometry =
                    parse_polygon(&record.geometry).map_err(|e| e.at_row(index, &record.id))?;
                Ok(Footprint {
                    id: record.id,
                    label: record.label,
                    prediction_class: record.prediction_class,
                    geometry,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rows, crs: None })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Declare the CRS the coordinates are already in. Coordinates are untouched.
    pub fn set_crs(mut self, crs: Crs) -> Self {
        if let Some(previous) = self.crs.replace(crs) {
            if previous != crs {
                tracing::warn!(%previous, %crs, "Overriding CRS without reprojecting");
            }
        }
        self
    }

    /// Reproject every vertex into `target`.
    ///
    /// Runs even when `target` is the current CRS, so every vertex is range
    /// checked against WGS-84 on the way through.
    pub fn to_crs(self, target: Crs) -> Result<Self> {
        let source = self.crs.ok_or(FootprintError::MissingCrs)?;

        let rows = self
            .rows
            .into_par_iter()
            .enumerate()
            .map(|(index, row)| {
                let geometry = reproject_polygon(&row.geometry, source, target)
                    .map_err(|e| e.at_row(index, &row.id))?;
                Ok(Footprint { geometry, ..row })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            rows,
            crs: Some(target),
        })
    }

    pub fn centroids(&self) -> Vec<Point<f64>> {
        self.rows
            .iter()
            .filter_map(|row| row.geometry.centroid())
            .collect()
    }

    /// Mean of all polygon centroids, as `(x, y)`; `None` for an empty table.
    pub fn center(&self) -> Option<Point<f64>> {
        let centroids = self.centroids();
        if centroids.is_empty() {
            return None;
        }

        let n = centroids.len() as f64;
        let (sum_x, sum_y) = centroids
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x(), sy + p.y()));

        Some(Point::new(sum_x / n, sum_y / n))
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.rows
            .iter()
            .filter_map(|row| row.geometry.bounding_rect())
            .reduce(|acc, r| {
                Rect::new(
                    Coord {
                        x: acc.min().x.min(r.min().x),
                        y: acc.min().y.min(r.min().y),
                    },
                    Coord {
                        x: acc.max().x.max(r.max().x),
                        y: acc.max().y.max(r.max().y),
                    },
                )
            })
    }

    pub fn max_prediction_class(&self) -> u32 {
        self.rows
            .iter()
            .map(|row| row.prediction_class)
            .max()
            .unwrap_or(0)
    }

    pub fn confusion_matrix(&self) -> ConfusionMatrix {
        ConfusionMatrix::from_pairs(self.rows.iter().map(|r| (r.label, r.prediction_class)))
    }

    pub fn to_geojson(&self) -> FeatureCollection {
        let features = self
            .rows
            .iter()
            .map(|row| {
                let mut properties = JsonObject::new();
                properties.insert("id".into(), Value::from(row.id.clone()));
                properties.insert("label".into(), Value::from(row.label));
                properties.insert(
                    "prediction_class".into(),
                    Value::from(row.prediction_class),
                );

                Feature {
                    bbox: None,
                    geometry: Some(geojson::Geometry::new(geojson::Value::from(&row.geometry))),
                    id: Some(Id::String(row.id.clone())),
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: self
                .bounds()
                .map(|r| vec![r.min().x, r.min().y, r.max().x, r.max().y]),
            features,
            foreign_members: None,
        }
    }
}

fn reproject_ring(ring: &LineString<f64>, from: Crs, to: Crs) -> Result<LineString<f64>> {
    let coords = ring
        .0
        .iter()
        .map(|&c| transform(c, from, to))
        .collect::<Result<Vec<_>>>()?;
    Ok(LineString::new(coords))
}

fn reproject_polygon(polygon: &Polygon<f64>, from: Crs, to: Crs) -> Result<Polygon<f64>> {
    let exterior = reproject_ring(polygon.exterior(), from, to)?;
    let interiors = polygon
        .interiors()
        .iter()
        .map(|ring| reproject_ring(ring, from, to))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

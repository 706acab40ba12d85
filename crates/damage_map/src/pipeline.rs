use crate::config::Settings;
use crate::render::legend::LegendEntry;
use anyhow::{Context, Result};
use footprint::{
    fill_color, polygon_rows, read_records_path, ConfusionMatrix, Crs, FootprintTable,
    PolygonRow, ViewState,
};
use std::time::{Duration, Instant};

/// Everything the dashboard renders, computed once at startup.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub title: String,
    pub table: FootprintTable,
    pub view: ViewState,
    pub rows: Vec<PolygonRow>,
    pub confusion: Option<ConfusionMatrix>,
    pub legend: Option<Vec<LegendEntry>>,
    pub class_names: Vec<String>,
    pub load_time: Duration,
}

/// Load the CSV, parse geometry, reproject to WGS-84 and derive the layer data.
pub fn load_dashboard(settings: &Settings) -> Result<Dashboard> {
    let started = Instant::now();

    // --- 1. Tabular data ---
    let records = read_records_path(&settings.input)
        .with_context(|| format!("Failed to read {}", settings.input.display()))?;
    tracing::info!(path = %settings.input.display(), rows = records.len(), "Loaded CSV");

    // --- 2. Geometry ---
    let table = FootprintTable::from_records(records).context("Failed to parse geometry")?;

    // --- 3. CRS + reprojection ---
    let table = table
        .set_crs(settings.source_crs)
        .to_crs(Crs::Wgs84)
        .with_context(|| format!("Failed to reproject from {}", settings.source_crs))?;
    if let Some(bounds) = table.bounds() {
        tracing::info!(
            from = %settings.source_crs,
            lon_min = bounds.min().x,
            lat_min = bounds.min().y,
            lon_max = bounds.max().x,
            lat_max = bounds.max().y,
            "Reprojected footprints to WGS-84"
        );
    }

    // --- 4. Display coordinates + camera ---
    let rows = polygon_rows(&table);
    let view = ViewState::centered_on(&table, settings.zoom, settings.pitch)
        .context("Input contains no footprints; nothing to centre the map on")?;

    // --- 5. Accuracy summary ---
    let confusion = settings.confusion_matrix.then(|| table.confusion_matrix());
    if let Some(matrix) = &confusion {
        tracing::info!(
            classes = ?matrix.classes,
            total = matrix.total(),
            accuracy = matrix.accuracy().unwrap_or_default(),
            "Computed confusion matrix"
        );
    }

    let load_time = started.elapsed();
    tracing::info!(
        footprints = table.len(),
        latitude = view.latitude,
        longitude = view.longitude,
        elapsed_ms = load_time.as_millis() as u64,
        "Dashboard ready"
    );

    let mut dashboard = Dashboard {
        title: settings.title.clone(),
        table,
        view,
        rows,
        confusion,
        legend: None,
        class_names: settings.class_names.clone(),
        load_time,
    };
    if settings.legend {
        dashboard.legend = Some(legend_entries(&dashboard));
    }

    Ok(dashboard)
}

impl Dashboard {
    /// Configured name for `class`, or the bare number when none was given.
    pub fn class_name(&self, class: u32) -> String {
        self.class_names
            .get(class as usize)
            .cloned()
            .unwrap_or_else(|| class.to_string())
    }
}

/// One entry per predicted class from 0 to the highest seen, coloured like the map.
fn legend_entries(dashboard: &Dashboard) -> Vec<LegendEntry> {
    let max_class = dashboard.table.max_prediction_class();
    (0..=max_class.max(1))
        .map(|class| LegendEntry {
            name: dashboard.class_name(class),
            color: fill_color(class, max_class.max(1)),
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn loads_reprojects_and_summarises() {
        let dashboard = dashboard("pipeline");

        assert_eq!(dashboard.rows.len(), 6);
        assert!(dashboard.view.longitude > -105.2 && dashboard.view.longitude < -105.1);
        assert!(dashboard.view.latitude > 39.9 && dashboard.view.latitude < 40.0);

        let matrix = dashboard.confusion.as_ref().unwrap();
        assert_eq!(matrix.total(), 6);
        assert_eq!(matrix.get(1, 0), 1);
        assert_eq!(matrix.get(0, 1), 1);

        let legend = dashboard.legend.as_ref().unwrap();
        assert_eq!(legend.len(), 2);
        assert_eq!(legend[1].name, "damaged");
        assert_eq!(legend[1].color[0], 255);
        assert_eq!(dashboard.class_name(0), "undamaged");
        assert_eq!(dashboard.class_name(4), "4");
    }

    #[test]
    fn projected_input_declared_wgs84_is_rejected() {
        let path = write_fixture("declared_wgs84");
        let mut s = settings(path.clone());
        s.source_crs = Crs::Wgs84;
        let err = load_dashboard(&s).unwrap_err();
        std::fs::remove_file(path).ok();

        let chain = format!("{err:#}");
        assert!(chain.contains("Failed to reproject from EPSG:4326"), "{chain}");
        assert!(chain.contains("out of range"), "{chain}");
    }

    #[test]
    fn optional_panels_can_be_disabled() {
        let path = write_fixture("panels");
        let mut s = settings(path.clone());
        s.confusion_matrix = false;
        s.legend = false;
        let dashboard = load_dashboard(&s).unwrap();
        std::fs::remove_file(path).ok();

        assert!(dashboard.confusion.is_none());
        assert!(dashboard.legend.is_none());
    }

    #[test]
    fn missing_input_names_the_file() {
        let err = load_dashboard(&settings(PathBuf::from("no/such/input.csv"))).unwrap_err();
        assert!(format!("{err:#}").contains("no/such/input.csv"));
    }
}

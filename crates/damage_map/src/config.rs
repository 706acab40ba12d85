use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use footprint::Crs;
use std::{net::SocketAddr, path::PathBuf};

/// `damage_map` - building damage predictions on an interactive map.
///
/// Loads a CSV of building footprints (WKT polygons with ground-truth and
/// predicted damage classes), reprojects them to WGS-84 and either serves a
/// dashboard over HTTP or writes it to disk as static files.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub dashboard: DashboardArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    /// CSV with `id`, `label`, `prediction_class` and `geometry` (WKT) columns.
    #[arg(long, env = "DAMAGE_MAP_INPUT", default_value = "marshall_fire_inference.csv")]
    pub input: PathBuf,

    /// EPSG code of the coordinates in the `geometry` column.
    ///
    /// The Marshall fire footprints are in UTM zone 13N (EPSG:32613).
    #[arg(long, env = "DAMAGE_MAP_SOURCE_EPSG", default_value_t = 32613)]
    pub source_epsg: u32,

    #[arg(
        long,
        env = "DAMAGE_MAP_TITLE",
        default_value = "Marshall Wildfire Building Damage Map"
    )]
    pub title: String,

    #[arg(long, env = "DAMAGE_MAP_ZOOM", default_value_t = 14.0)]
    pub zoom: f64,

    #[arg(long, env = "DAMAGE_MAP_PITCH", default_value_t = 45.0)]
    pub pitch: f64,

    /// Display names for classes 0, 1, ... used by the legend and the confusion matrix.
    #[arg(
        long,
        env = "DAMAGE_MAP_CLASS_NAMES",
        value_delimiter = ',',
        default_value = "undamaged,damaged"
    )]
    pub class_names: Vec<String>,

    /// Leave the confusion-matrix panel out of the dashboard.
    #[arg(long, default_value_t = false)]
    pub no_confusion_matrix: bool,

    /// Leave the legend out of the dashboard.
    #[arg(long, default_value_t = false)]
    pub no_legend: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the dashboard over HTTP until interrupted.
    Serve {
        #[arg(long, env = "DAMAGE_MAP_LISTEN_ADDR", default_value = "127.0.0.1:8501")]
        listen_addr: SocketAddr,

        /// Where the Prometheus `/metrics` endpoint listens.
        #[arg(
            long,
            env = "DAMAGE_MAP_METRICS_LISTEN_ADDR",
            default_value = "127.0.0.1:9464"
        )]
        metrics_listen_addr: SocketAddr,
    },
    /// Write `index.html`, `buildings.geojson` and `confusion_matrix.svg` to a directory.
    Export {
        #[arg(long, env = "DAMAGE_MAP_OUTPUT_DIR", default_value = "dashboard")]
        output_dir: PathBuf,
    },
}

/// Validated dashboard settings, independent of how they were supplied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input: PathBuf,
    pub source_crs: Crs,
    pub title: String,
    pub zoom: f64,
    pub pitch: f64,
    pub class_names: Vec<String>,
    pub confusion_matrix: bool,
    pub legend: bool,
}

impl DashboardArgs {
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let source_crs = Crs::from_epsg(self.source_epsg)
            .with_context(|| format!("Unsupported --source-epsg {}", self.source_epsg))?;

        if !(0.0..=24.0).contains(&self.zoom) {
            bail!("--zoom must be between 0 and 24, got {}", self.zoom);
        }
        if !(0.0..=85.0).contains(&self.pitch) {
            bail!("--pitch must be between 0 and 85, got {}", self.pitch);
        }

        Ok(Settings {
            input: self.input.clone(),
            source_crs,
            title: self.title.clone(),
            zoom: self.zoom,
            pitch: self.pitch,
            class_names: self
                .class_names
                .iter()
                .map(|name| name.trim().to_owned())
                .filter(|name| !name.is_empty())
                .collect(),
            confusion_matrix: !self.no_confusion_matrix,
            legend: !self.no_legend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("damage_map").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_the_marshall_fire_dataset() {
        let cfg = parse(&["export"]);
        let settings = cfg.dashboard.settings().unwrap();
        assert_eq!(settings.input, PathBuf::from("marshall_fire_inference.csv"));
        assert_eq!(settings.source_crs.epsg(), 32613);
        assert_eq!(settings.zoom, 14.0);
        assert_eq!(settings.pitch, 45.0);
        assert_eq!(settings.class_names, vec!["undamaged", "damaged"]);
        assert!(settings.confusion_matrix && settings.legend);
        assert!(matches!(cfg.command, Command::Export { .. }));
    }

    #[test]
    fn serve_addresses_and_flags() {
        let cfg = parse(&[
            "--no-legend",
            "--class-names",
            "none, minor ,destroyed",
            "serve",
            "--listen-addr",
            "0.0.0.0:8080",
        ]);
        let settings = cfg.dashboard.settings().unwrap();
        assert!(!settings.legend);
        assert_eq!(settings.class_names, vec!["none", "minor", "destroyed"]);
        assert!(settings.confusion_matrix);
        match cfg.command {
            Command::Serve { listen_addr, .. } => assert_eq!(listen_addr.port(), 8080),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_epsg_and_out_of_range_camera() {
        assert!(parse(&["--source-epsg", "2056", "export"])
            .dashboard
            .settings()
            .is_err());
        assert!(parse(&["--pitch", "120", "export"])
            .dashboard
            .settings()
            .is_err());
        assert!(parse(&["--zoom", "30", "export"])
            .dashboard
            .settings()
            .is_err());
        assert!(parse(&["--zoom", "24", "--pitch", "85", "export"])
            .dashboard
            .settings()
            .is_ok());
    }

    #[test]
    fn confusion_matrix_panel_can_be_turned_off() {
        let cfg = parse(&["--no-confusion-matrix", "export", "--output-dir", "out"]);
        let settings = cfg.dashboard.settings().unwrap();
        assert!(!settings.confusion_matrix);
        assert!(settings.legend);
        match cfg.command {
            Command::Export { output_dir } => assert_eq!(output_dir, PathBuf::from("out")),
            other => panic!("unexpected command {other:?}"),
        }
    }
}

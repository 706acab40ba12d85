use crate::pipeline::Dashboard;
use crate::render::page::{confusion_svg, render_page};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Write the dashboard as static files and return the paths written.
pub fn export_dashboard(dashboard: &Dashboard, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut written = Vec::new();
    let mut write = |name: &str, contents: &str| -> Result<()> {
        let path = output_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = contents.len(), "Wrote file");
        written.push(path);
        Ok(())
    };

    let page = render_page(dashboard).context("Failed to render dashboard page")?;
    write("index.html", &page)?;
    write("buildings.geojson", &dashboard.table.to_geojson().to_string())?;
    if let Some(svg) = confusion_svg(dashboard) {
        write("confusion_matrix.svg", &svg)?;
    }

    Ok(written)
}

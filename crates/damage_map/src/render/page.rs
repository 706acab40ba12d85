//! The dashboard document: a deck.gl `PolygonLayer` over a MapLibre basemap,
//! with the confusion matrix and legend as side panels.

use super::{chart::render_confusion_svg, escape_html, legend::render_legend};
use crate::pipeline::Dashboard;
use footprint::layer::LINE_COLOR;
use serde::Serialize;

const DECK_GL_JS: &str = "https://unpkg.com/deck.gl@9.0.38/dist.min.js";
const MAPLIBRE_JS: &str = "https://unpkg.com/maplibre-gl@4.7.1/dist/maplibre-gl.js";
const MAPLIBRE_CSS: &str = "https://unpkg.com/maplibre-gl@4.7.1/dist/maplibre-gl.css";
const BASEMAP_STYLE: &str = "https://basemaps.cartocdn.com/gl/dark-matter-gl-style/style.json";

#[derive(Serialize)]
struct PagePayload<'a> {
    view: &'a footprint::ViewState,
    line_color: [u8; 3],
    rows: &'a [footprint::PolygonRow],
}

/// Serialize for embedding inside `<script>`: no `<`, `>` or `&` survive, so
/// the payload can never close the element. These only occur inside JSON strings,
/// where the `\uXXXX` escapes are equivalent.
fn script_safe_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(serde_json::to_string(value)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

/// Confusion-matrix SVG labelled with the configured class names.
pub fn confusion_svg(dashboard: &Dashboard) -> Option<String> {
    let matrix = dashboard.confusion.as_ref()?;
    Some(render_confusion_svg(matrix, |class| dashboard.class_name(class)))
}

pub fn render_page(dashboard: &Dashboard) -> serde_json::Result<String> {
    let payload = script_safe_json(&PagePayload {
        view: &dashboard.view,
        line_color: LINE_COLOR,
        rows: &dashboard.rows,
    })?;

    let mut panels = String::new();
    if let Some(svg) = confusion_svg(dashboard) {
        panels.push_str("<section class=\"panel\">\n<h2>Confusion matrix</h2>\n");
        panels.push_str(&svg);
        panels.push_str("</section>\n");
    }
    if let Some(entries) = &dashboard.legend {
        panels.push_str("<section class=\"panel\">\n");
        panels.push_str(&render_legend(entries));
        panels.push_str("</section>\n");
    }

    let title = escape_html(&dashboard.title);
    let count = dashboard.rows.len();

    Ok(format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{title}</title>
  <link rel="stylesheet" href="{MAPLIBRE_CSS}" />
  <script src="{MAPLIBRE_JS}"></script>
  <script src="{DECK_GL_JS}"></script>
  <style>
    html, body {{ margin: 0; height: 100%; font-family: sans-serif; background: #0b1220; color: #e2e8f0; }}
    header {{ position: absolute; top: 0; left: 0; right: 0; z-index: 2; padding: 12px 20px; background: rgba(11, 18, 32, 0.85); }}
    header h1 {{ margin: 0; font-size: 22px; }}
    header .meta {{ font-size: 13px; color: #94a3b8; }}
    #map {{ position: absolute; inset: 0; }}
    aside {{ position: absolute; top: 76px; right: 16px; z-index: 2; display: flex; flex-direction: column; gap: 12px; max-height: calc(100% - 96px); overflow-y: auto; }}
    .panel {{ background: rgba(255, 255, 255, 0.95); color: #0b1d33; border-radius: 6px; padding: 10px 14px; }}
    .panel h2 {{ margin: 0 0 6px; font-size: 15px; }}
    .legend-title {{ font-weight: bold; margin-bottom: 6px; }}
    .legend-row {{ display: flex; align-items: center; gap: 8px; margin: 4px 0; }}
    .swatch {{ display: inline-block; width: 16px; height: 16px; border: 1px solid #000; }}
  </style>
</head>
<body>
  <header>
    <h1>{title}</h1>
    <div class="meta">{count} buildings</div>
  </header>
  <div id="map"></div>
  <aside>
{panels}  </aside>
  <script id="dashboard-data" type="application/json">{payload}</script>
  <script>
    const data = JSON.parse(document.getElementById("dashboard-data").textContent);
    const esc = (v) => String(v).replace(/[&<>"']/g, (c) => ({{
      "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;"
    }})[c]);

    const layer = new deck.PolygonLayer({{
      id: "buildings",
      data: data.rows,
      getPolygon: (d) => d.polygon,
      getFillColor: (d) => d.fill_color,
      getLineColor: data.line_color,
      lineWidthMinPixels: 1,
      stroked: true,
      filled: true,
      pickable: true,
      autoHighlight: true,
    }});

    new deck.DeckGL({{
      container: "map",
      mapStyle: "{BASEMAP_STYLE}",
      initialViewState: {{
        latitude: data.view.latitude,
        longitude: data.view.longitude,
        zoom: data.view.zoom,
        pitch: data.view.pitch,
        bearing: 0,
      }},
      controller: true,
      layers: [layer],
      getTooltip: ({{ object }}) => object && {{
        html: "<b>ID:</b> " + esc(object.id) + "<br>" +
              "<b>Label:</b> " + esc(object.label) + "<br>" +
              "<b>Prediction:</b> " + esc(object.prediction_class),
      }},
    }});
  </script>
</body>
</html>
"#
    ))
}

use super::{css_rgba, escape_html};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub name: String,
    pub color: [u8; 4],
}

/// Static legend: one swatch per predicted class.
pub fn render_legend(entries: &[LegendEntry]) -> String {
    let mut html = String::from(
        "<div class=\"legend\">\n  <div class=\"legend-title\">Predicted damage</div>\n",
    );

    for entry in entries {
        let _ = writeln!(
            html,
            "  <div class=\"legend-row\"><span class=\"swatch\" style=\"background: {}\"></span>{}</div>",
            css_rgba(entry.color),
            escape_html(&entry.name)
        );
    }

    html.push_str("</div>\n");
    html
}

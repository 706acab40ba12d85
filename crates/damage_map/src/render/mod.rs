//! HTML and SVG rendering for the dashboard. Everything here is plain string building.

pub mod chart;
pub mod legend;
pub mod page;

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `rgba(r, g, b, a)` from an RGBA byte quadruple.
pub fn css_rgba(color: [u8; 4]) -> String {
    format!(
        "rgba({}, {}, {}, {:.2})",
        color[0],
        color[1],
        color[2],
        color[3] as f64 / 255.0
    )
}

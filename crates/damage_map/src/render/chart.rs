//! Confusion-matrix heatmap as a standalone SVG document.

use super::escape_html;
use footprint::ConfusionMatrix;
use std::fmt::Write;

const CELL: f64 = 90.0;
const LEFT: f64 = 120.0;
const TOP: f64 = 70.0;
const BOTTOM: f64 = 50.0;
const RIGHT: f64 = 20.0;

/// Light and dark ends of the blue ramp.
const RAMP_LOW: [f64; 3] = [247.0, 251.0, 255.0];
const RAMP_HIGH: [f64; 3] = [8.0, 48.0, 107.0];

fn shade(t: f64) -> (String, &'static str) {
    let t = t.clamp(0.0, 1.0);
    let c: Vec<u8> = RAMP_LOW
        .iter()
        .zip(RAMP_HIGH.iter())
        .map(|(lo, hi)| (lo + (hi - lo) * t).round() as u8)
        .collect();
    let text = if t > 0.5 { "#ffffff" } else { "#0b1d33" };
    (format!("rgb({}, {}, {})", c[0], c[1], c[2]), text)
}

/// Render `matrix` with rows as actual classes and columns as predicted classes.
///
/// `class_name` maps a class id to its axis label.
pub fn render_confusion_svg<F>(matrix: &ConfusionMatrix, class_name: F) -> String
where
    F: Fn(u32) -> String,
{
    let n = matrix.classes.len();
    let width = LEFT + CELL * n as f64 + RIGHT;
    let height = TOP + CELL * n as f64 + BOTTOM;
    let max = matrix.max_count().max(1) as f64;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="sans-serif" font-size="14">"#
    );
    let _ = writeln!(
        svg,
        r##"  <rect width="{width}" height="{height}" fill="#ffffff"/>"##
    );

    // Axis titles
    let grid_mid_x = LEFT + CELL * n as f64 / 2.0;
    let grid_mid_y = TOP + CELL * n as f64 / 2.0;
    let _ = writeln!(
        svg,
        r#"  <text x="{grid_mid_x}" y="22" text-anchor="middle" font-weight="bold">Predicted</text>"#
    );
    let _ = writeln!(
        svg,
        r#"  <text x="22" y="{grid_mid_y}" text-anchor="middle" font-weight="bold" transform="rotate(-90 22 {grid_mid_y})">Actual</text>"#
    );

    for (j, &class) in matrix.classes.iter().enumerate() {
        let x = LEFT + CELL * (j as f64 + 0.5);
        let _ = writeln!(
            svg,
            r#"  <text x="{x}" y="{}" text-anchor="middle">{}</text>"#,
            TOP - 12.0,
            escape_html(&class_name(class))
        );
    }

    for (i, &actual) in matrix.classes.iter().enumerate() {
        let y = TOP + CELL * i as f64;
        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="{}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            LEFT - 10.0,
            y + CELL / 2.0,
            escape_html(&class_name(actual))
        );

        for (j, &count) in matrix.counts[i].iter().enumerate() {
            let x = LEFT + CELL * j as f64;
            let (fill, text) = shade(count as f64 / max);
            let _ = writeln!(
                svg,
                r##"  <rect class="cell" x="{x}" y="{y}" width="{CELL}" height="{CELL}" fill="{fill}" stroke="#d0d7de"/>"##
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" fill="{text}" font-size="18">{count}</text>"#,
                x + CELL / 2.0,
                y + CELL / 2.0
            );
        }
    }

    if let Some(accuracy) = matrix.accuracy() {
        let _ = writeln!(
            svg,
            r#"  <text x="{grid_mid_x}" y="{}" text-anchor="middle">Accuracy {:.1}% ({} / {})</text>"#,
            height - 18.0,
            accuracy * 100.0,
            matrix.correct(),
            matrix.total()
        );
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(class: u32) -> String {
        ["undamaged", "damaged"]
            .get(class as usize)
            .map(|s| s.to_string())
            .unwrap_or_else(|| class.to_string())
    }

    #[test]
    fn draws_one_cell_per_class_pair() {
        let m = ConfusionMatrix::from_pairs([(0, 0), (0, 0), (1, 1), (1, 0)]);
        let svg = render_confusion_svg(&m, names);

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(r#"class="cell""#).count(), 4);
        assert!(svg.contains(">damaged</text>"));
        assert!(svg.contains("Accuracy 75.0% (3 / 4)"));
    }

    #[test]
    fn largest_cell_is_darkest() {
        let (fill, text) = shade(1.0);
        assert_eq!(fill, "rgb(8, 48, 107)");
        assert_eq!(text, "#ffffff");
        assert_eq!(shade(0.0).0, "rgb(247, 251, 255)");
    }

    #[test]
    fn empty_matrix_still_renders() {
        let m = ConfusionMatrix::from_pairs(std::iter::empty());
        let svg = render_confusion_svg(&m, names);
        assert!(svg.contains("</svg>"));
        assert!(!svg.contains("Accuracy"));
    }
}

//! Minimal SVG bar chart for region revenue

use std::collections::BTreeMap;
use std::fmt::Write;

const SLOT_WIDTH: f64 = 72.0;
const BAR_WIDTH: f64 = 48.0;
const LEFT_MARGIN: f64 = 40.0;
const TOP: f64 = 60.0;
const PLOT_HEIGHT: f64 = 260.0;
const HEIGHT: f64 = 380.0;
const MIN_WIDTH: f64 = 320.0;

/// Render one bar per region, tallest bar at the largest revenue.
///
/// Negative revenue is drawn as an empty bar; the value label still shows it.
pub fn render_bar_chart(region_revenue: &BTreeMap<String, f64>, label: &str) -> String {
    let width = (LEFT_MARGIN * 2.0 + SLOT_WIDTH * region_revenue.len() as f64).max(MIN_WIDTH);
    let max = region_revenue
        .values()
        .copied()
        .fold(0.0_f64, f64::max);
    let baseline = TOP + PLOT_HEIGHT;

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = HEIGHT
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" font-family="sans-serif" font-size="18">{}</text>"#,
        width / 2.0,
        escape(label)
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="black"/>"#,
        x1 = LEFT_MARGIN,
        x2 = width - LEFT_MARGIN,
        y = baseline
    );

    for (index, (region, revenue)) in region_revenue.iter().enumerate() {
        let bar_height = if max > 0.0 {
            (revenue.max(0.0) / max) * PLOT_HEIGHT
        } else {
            0.0
        };
        let x = LEFT_MARGIN + SLOT_WIDTH * index as f64 + (SLOT_WIDTH - BAR_WIDTH) / 2.0;
        let center = x + BAR_WIDTH / 2.0;

        let _ = writeln!(
            svg,
            r#"<rect class="bar" x="{:.2}" y="{:.2}" width="{}" height="{:.2}" fill="steelblue"/>"#,
            x,
            baseline - bar_height,
            BAR_WIDTH,
            bar_height
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-family="sans-serif" font-size="10">{:.2}</text>"#,
            center,
            baseline - bar_height - 6.0,
            revenue
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-family="sans-serif" font-size="11">{}</text>"#,
            center,
            baseline + 18.0,
            escape(region)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

//! Heatmap rendering with plotters (SVG output).
//!
//! SVG backend keeps the renderer free of system font dependencies.
//! The images are informational only — nothing downstream reads them.

use anyhow::Result;
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::path::Path;

use crate::matrix::ScoreMatrix;
use crate::metric::Metric;

const UNDEFINED_CELL: RGBColor = RGBColor(220, 220, 220);

pub fn render_heatmap(path: &Path, matrix: &ScoreMatrix, metric: Metric) -> Result<()> {
    let root = SVGBackend::new(path, (900, 780)).into_drawing_area();
    root.fill(&WHITE)?;

    if matrix.is_empty() {
        root.draw(&Text::new(
            "No data",
            (450, 390),
            ("sans-serif", 20).into_font().color(&BLACK),
        ))?;
        root.present()?;
        return Ok(());
    }

    let n = matrix.len();
    let (lo, hi) = value_range(matrix);

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} Matrix", metric.label()), ("sans-serif", 20))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0..n, 0..n)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&|x| matrix.entities().get(*x).cloned().unwrap_or_default())
        .y_label_formatter(&|y| matrix.entities().get(*y).cloned().unwrap_or_default())
        .draw()?;

    for i in 0..n {
        for j in 0..n {
            let color = match matrix.get_at(i, j) {
                Some(value) => ramp_color(metric, normalize(value, lo, hi)),
                None => UNDEFINED_CELL,
            };
            chart.draw_series(std::iter::once(Rectangle::new(
                [(j, i), (j + 1, i + 1)],
                color.filled(),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

fn value_range(matrix: &ScoreMatrix) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for i in 0..matrix.len() {
        for j in 0..matrix.len() {
            if let Some(v) = matrix.get_at(i, j) {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    if lo > hi {
        (0.0, 1.0)
    } else {
        (lo, hi)
    }
}

fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        (value - lo) / (hi - lo)
    } else {
        0.5
    }
}

/// Maps a normalized value to a white-to-hue ramp; each metric keeps
/// its own hue so the image family is readable at a glance.
fn ramp_color(metric: Metric, t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let (r, g, b) = match metric {
        Metric::Rmsd => (178u8, 24u8, 43u8),
        Metric::QScore => (33, 102, 172),
        Metric::SeqIdentity => (27, 120, 55),
        Metric::TmScore => (84, 39, 136),
    };
    let lerp = |c: u8| (255.0 + (c as f64 - 255.0) * t).round() as u8;
    RGBColor(lerp(r), lerp(g), lerp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_heatmap() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("rmsd.svg");

        let mut m = ScoreMatrix::new(vec!["a".into(), "b".into(), "c".into()]);
        m.fill_diagonal(0.0);
        m.set_symmetric("a", "b", 1.5);
        // (a, c) left undefined on purpose.
        m.set_symmetric("b", "c", 2.5);

        render_heatmap(&path, &m, Metric::Rmsd).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_render_empty_matrix() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.svg");
        let m = ScoreMatrix::new(Vec::new());
        render_heatmap(&path, &m, Metric::TmScore).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_ramp_color_ends() {
        let low = ramp_color(Metric::QScore, 0.0);
        let high = ramp_color(Metric::QScore, 1.0);
        assert_eq!((low.0, low.1, low.2), (255, 255, 255));
        assert_eq!((high.0, high.1, high.2), (33, 102, 172));
    }
}

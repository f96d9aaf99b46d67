//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed rates: `o`
//! - fitted curve: `-` line
//! - km marker: `:` column

use crate::plot::CurveSpec;

/// Render a curve specification into a text block.
pub fn render_ascii_plot(spec: &CurveSpec, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = widen(spec.x_range.0, spec.x_range.1);
    let (y_min, y_max) = y_range(spec).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    if let Some(km) = spec.km_marker {
        if km.is_finite() && km >= x_min && km <= x_max {
            let x = map_x(km, x_min, x_max, width);
            for row in grid.iter_mut() {
                row[x] = ':';
            }
        }
    }

    // Draw curve before points so points overlay.
    draw_curve(&mut grid, &spec.curve, x_min, x_max, y_min, y_max);

    for &(s, rate) in &spec.scatter {
        if !(s.is_finite() && rate.is_finite()) {
            continue;
        }
        let x = map_x(s, x_min, x_max, width);
        let y = map_y(rate, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    if let Some(title) = &spec.title {
        out.push_str(title);
        out.push('\n');
    }
    out.push_str(&format!(
        "Plot: {}=[{x_min:.3}, {x_max:.3}] | {}=[{y_min:.3}, {y_max:.3}]\n",
        spec.x_label, spec.y_label
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out.push_str(&format!("- {}\n", spec.series_label));
    for line in &spec.annotation {
        out.push_str(line);
        out.push('\n');
    }

    out
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    if max > min {
        (min, max)
    } else {
        (min - 0.5, max + 0.5)
    }
}

fn y_range(spec: &CurveSpec) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in spec.scatter.iter().chain(&spec.curve) {
        if y.is_finite() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !(x.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, cx, cy, '-');
        } else {
            grid[cy][cx] = '-';
        }
        prev = Some((cx, cy));
    }
}

/// Integer line drawing (Bresenham-ish). Only fills blank or marker cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || *cell == ':' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_spec() -> CurveSpec {
        CurveSpec {
            title: None,
            x_label: "S".to_string(),
            y_label: "rate".to_string(),
            x_range: (1.0, 10.0),
            series_label: "fit".to_string(),
            curve: vec![(1.0, 100.0), (10.0, 100.0)],
            scatter: vec![(1.0, 100.0), (10.0, 110.0)],
            km_marker: None,
            annotation: vec!["R^2 = 0.500".to_string()],
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_ascii_plot(&flat_spec(), 10, 5);
        let expected = concat!(
            "Plot: S=[1.000, 10.000] | rate=[99.500, 110.500]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
            "- fit\n",
            "R^2 = 0.500\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn km_marker_draws_a_column() {
        let mut spec = flat_spec();
        spec.km_marker = Some(5.5);
        spec.title = Some("assay".to_string());
        let txt = render_ascii_plot(&spec, 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "assay");
        // Column 5 (rounded from 4.5) on every blank row.
        for row in &lines[2..6] {
            assert!(row.contains(':'), "row without marker: {row:?}");
        }
    }
}

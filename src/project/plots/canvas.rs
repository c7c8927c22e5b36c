//! Character-cell rendering of histograms, boxplots and scatter plots.

use super::Marks;
use crate::data::describe::quantile;

/// Bin count used for histograms.
pub const HIST_BINS: usize = 10;

const PLOT_WIDTH: usize = 60;
const PLOT_HEIGHT: usize = 20;
const BAR_WIDTH: usize = 40;
const CLASS_SYMBOLS: &[char] = &['o', 'x', '+', '*', '#', '@', '%', '&', '=', '~'];
const SHADES: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Position of `value` on a `cells`-wide axis spanning `[lo, hi]`.
fn cell(value: f64, lo: f64, hi: f64, cells: usize) -> usize {
    if hi <= lo {
        return cells / 2;
    }
    let position = ((value - lo) / (hi - lo) * (cells - 1) as f64).round();
    (position.max(0.0) as usize).min(cells - 1)
}

fn fmt(value: f64) -> String {
    format!("{:.3}", value)
}

/// Horizontal bars, one per bin, with the bin range and count.
pub fn render_histogram(values: &[f64], bins: usize) -> String {
    let values = finite(values);
    if values.is_empty() || bins == 0 {
        return "(no data)".to_string();
    }
    let (mut lo, mut hi) = bounds(&values);
    if hi <= lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &values {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    let peak = counts.iter().copied().max().unwrap_or(1).max(1);
    let edges: Vec<(String, String)> = (0..bins)
        .map(|i| (fmt(lo + width * i as f64), fmt(lo + width * (i + 1) as f64)))
        .collect();
    let left = edges.iter().map(|(a, _)| a.len()).max().unwrap_or(0);
    let right = edges.iter().map(|(_, b)| b.len()).max().unwrap_or(0);

    edges
        .iter()
        .zip(&counts)
        .map(|((start, end), &count)| {
            let len = (count * BAR_WIDTH).div_ceil(peak);
            format!(
                "{:>left$} - {:<right$} | {} {}",
                start,
                end,
                "#".repeat(len),
                count,
                left = left,
                right = right
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Box-and-whisker line with whiskers at 1.5 IQR and outliers marked `o`.
pub fn render_boxplot(values: &[f64]) -> String {
    let mut sorted = finite(values);
    if sorted.is_empty() {
        return "(no data)".to_string();
    }
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;
    let low_whisker = sorted
        .iter()
        .copied()
        .find(|&v| v >= low_fence)
        .unwrap_or(q1);
    let high_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= high_fence)
        .unwrap_or(q3);

    let (lo, hi) = (sorted[0], sorted[sorted.len() - 1]);
    let at = |v: f64| cell(v, lo, hi, PLOT_WIDTH);
    let mut line = vec![' '; PLOT_WIDTH];
    for slot in line.iter_mut().take(at(q1)).skip(at(low_whisker)) {
        *slot = '-';
    }
    for slot in line.iter_mut().take(at(high_whisker) + 1).skip(at(q3)) {
        *slot = '-';
    }
    for slot in line.iter_mut().take(at(q3) + 1).skip(at(q1)) {
        *slot = '=';
    }
    line[at(low_whisker)] = '+';
    line[at(high_whisker)] = '+';
    line[at(q1)] = '[';
    line[at(q3)] = ']';
    line[at(median)] = '|';
    for &v in sorted.iter().filter(|&&v| v < low_fence || v > high_fence) {
        line[at(v)] = 'o';
    }

    let drawn: String = line.into_iter().collect();
    let axis = format!(
        "{}{:>pad$}",
        fmt(lo),
        fmt(hi),
        pad = PLOT_WIDTH.saturating_sub(fmt(lo).len())
    );
    format!(
        "{}\n{}\nmin {}  q1 {}  median {}  q3 {}  max {}",
        drawn.trim_end(),
        axis,
        fmt(lo),
        fmt(q1),
        fmt(median),
        fmt(q3),
        fmt(hi)
    )
}

fn symbol(marks: &Marks, point: usize, shade_bounds: (f64, f64)) -> char {
    match marks {
        Marks::Plain => '*',
        Marks::Classes { index, .. } => index
            .get(point)
            .map(|&class| CLASS_SYMBOLS[class % CLASS_SYMBOLS.len()])
            .unwrap_or('*'),
        Marks::Shaded(levels) => levels
            .get(point)
            .map(|&level| SHADES[cell(level, shade_bounds.0, shade_bounds.1, SHADES.len())])
            .unwrap_or('*'),
    }
}

fn legend(marks: &Marks, shade_bounds: (f64, f64)) -> Option<String> {
    match marks {
        Marks::Plain => None,
        Marks::Classes { names, .. } => Some(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| format!("{} = {}", CLASS_SYMBOLS[i % CLASS_SYMBOLS.len()], name))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Marks::Shaded(_) => Some(format!(
            "{} = {} up to {} = {}",
            SHADES[0],
            fmt(shade_bounds.0),
            SHADES[SHADES.len() - 1],
            fmt(shade_bounds.1)
        )),
    }
}

/// Points on a fixed character grid with labelled axis extremes.
pub fn render_scatter(x: &[f64], y: &[f64], marks: &Marks, x_label: &str, y_label: &str) -> String {
    let points: Vec<(usize, f64, f64)> = x
        .iter()
        .zip(y)
        .enumerate()
        .filter(|(_, (a, b))| a.is_finite() && b.is_finite())
        .map(|(i, (&a, &b))| (i, a, b))
        .collect();
    if points.is_empty() {
        return "(no data)".to_string();
    }

    let xs: Vec<f64> = points.iter().map(|p| p.1).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.2).collect();
    let (x_lo, x_hi) = bounds(&xs);
    let (y_lo, y_hi) = bounds(&ys);
    let shade_bounds = match marks {
        Marks::Shaded(levels) => bounds(&finite(levels)),
        _ => (0.0, 0.0),
    };

    let mut grid = vec![vec![' '; PLOT_WIDTH]; PLOT_HEIGHT];
    for &(i, a, b) in &points {
        let col = cell(a, x_lo, x_hi, PLOT_WIDTH);
        let row = PLOT_HEIGHT - 1 - cell(b, y_lo, y_hi, PLOT_HEIGHT);
        grid[row][col] = symbol(marks, i, shade_bounds);
    }

    let top = fmt(y_hi);
    let bottom = fmt(y_lo);
    let gutter = top.len().max(bottom.len());
    let mut lines = Vec::with_capacity(PLOT_HEIGHT + 4);
    for (row, cells) in grid.into_iter().enumerate() {
        let label = match row {
            0 => top.as_str(),
            r if r == PLOT_HEIGHT - 1 => bottom.as_str(),
            _ => "",
        };
        let drawn: String = cells.into_iter().collect();
        lines.push(format!("{:>gutter$} |{}", label, drawn.trim_end(), gutter = gutter));
    }
    lines.push(format!("{:>gutter$} +{}", "", "-".repeat(PLOT_WIDTH), gutter = gutter));
    let left = fmt(x_lo);
    lines.push(format!(
        "{:>gutter$}  {}{:>pad$}",
        "",
        left,
        fmt(x_hi),
        gutter = gutter,
        pad = PLOT_WIDTH.saturating_sub(left.len())
    ));
    lines.push(format!("x: {}, y: {}", x_label, y_label));
    if let Some(legend) = legend(marks, shade_bounds) {
        lines.push(legend);
    }
    lines.join("\n")
}

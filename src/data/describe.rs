//! Tabular views of a data frame: head, column listing and descriptive statistics.

use crate::data::frame::{format_number, DataFrame};
use comfy_table::Table;

fn new_table<T: ToString>(header: Vec<T>) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(header.into_iter().map(|h| h.to_string()).collect::<Vec<_>>());
    table
}

/// First `n` rows, with a leading row-index column.
pub fn head_table(frame: &DataFrame, n: usize) -> Table {
    let head = frame.head(n);
    let mut header = vec![String::new()];
    header.extend(head.column_names().into_iter().map(str::to_string));
    let mut table = new_table(header);
    for row in 0..head.n_rows() {
        let mut cells = vec![row.to_string()];
        cells.extend(head.row(row).iter().map(|cell| {
            if cell.is_missing() {
                "NaN".to_string()
            } else {
                cell.to_string()
            }
        }));
        table.add_row(cells);
    }
    table
}

pub fn columns_table(frame: &DataFrame) -> Table {
    let mut table = new_table(vec!["Column", "Type", "Missing"]);
    for column in frame.columns() {
        table.add_row(vec![
            column.name.clone(),
            column.column_type().to_string(),
            column.missing_count().to_string(),
        ]);
    }
    table
}

/// Summary statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Count, mean, sample standard deviation, min, quartiles and max.
pub fn column_stats(values: &[f64]) -> Option<ColumnStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
    } else {
        f64::NAN
    };
    Some(ColumnStats {
        count,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Linear-interpolation quantile of sorted data.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// One column per numeric data column, one row per statistic.
pub fn stats_table(frame: &DataFrame) -> Option<Table> {
    let numeric: Vec<_> = frame
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .filter_map(|c| column_stats(&c.numbers()).map(|stats| (c.name.clone(), stats)))
        .collect();
    if numeric.is_empty() {
        return None;
    }

    let mut header = vec![String::new()];
    header.extend(numeric.iter().map(|(name, _)| name.clone()));
    let mut table = new_table(header);

    let rows: [(&str, fn(&ColumnStats) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.q25),
        ("50%", |s| s.median),
        ("75%", |s| s.q75),
        ("max", |s| s.max),
    ];
    for (label, pick) in rows {
        let mut cells = vec![label.to_string()];
        cells.extend(numeric.iter().map(|(_, stats)| format_stat(pick(stats))));
        table.add_row(cells);
    }
    Some(table)
}

fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 {
        format_number(value)
    } else {
        format!("{:.6}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame::{Cell, Column};

    #[test]
    fn test_column_stats_matches_linear_quantiles() {
        let stats = column_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert!((stats.std - 1.290_994).abs() < 1e-6);
    }

    #[test]
    fn test_stats_table_skips_text_columns() {
        let frame = DataFrame::from_columns(vec![
            Column::new("x", vec![Cell::Number(1.0), Cell::Number(2.0)]),
            Column::new("name", vec![Cell::Text("a".into()), Cell::Text("b".into())]),
        ])
        .unwrap();
        let rendered = stats_table(&frame).unwrap().to_string();
        assert!(rendered.contains("mean"));
        assert!(!rendered.contains("name"));
    }

    #[test]
    fn test_head_table_marks_missing() {
        let frame = DataFrame::from_columns(vec![Column::new(
            "x",
            vec![Cell::Missing, Cell::Number(2.0)],
        )])
        .unwrap();
        let rendered = head_table(&frame, 1).to_string();
        assert!(rendered.contains("NaN"));
        assert!(!rendered.contains('2'));
    }
}

//! In-memory tabular data: named columns of cells.

use crate::error::ShellError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Empty, `NA`, `NaN` and `null` cells are missing.
    pub fn parse(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || ["na", "nan", "null", "none"]
                .iter()
                .any(|m| trimmed.eq_ignore_ascii_case(m))
        {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Cell::Number(number),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Text(t) => write!(f, "{}", t),
        }
    }
}

/// Integral values print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Numeric,
    Text,
    Empty,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
            ColumnType::Empty => "empty",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Numeric iff every present cell is a number.
    pub fn column_type(&self) -> ColumnType {
        let mut present = self.cells.iter().filter(|c| !c.is_missing()).peekable();
        if present.peek().is_none() {
            return ColumnType::Empty;
        }
        if present.all(|c| matches!(c, Cell::Number(_))) {
            ColumnType::Numeric
        } else {
            ColumnType::Text
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type() == ColumnType::Numeric
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }

    /// Present numeric values, in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.cells.iter().filter_map(Cell::as_number).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: Vec<Column>,
}

impl DataFrame {
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, ShellError> {
        if let Some(first) = columns.first() {
            let rows = first.cells.len();
            if let Some(bad) = columns.iter().find(|c| c.cells.len() != rows) {
                return Err(ShellError::Data(format!(
                    "Column {} has {} rows, expected {}",
                    bad.name,
                    bad.cells.len(),
                    rows
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.cells.len()).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row(&self, index: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[index]).collect()
    }

    pub fn has_missing(&self) -> bool {
        self.columns.iter().any(|c| c.missing_count() > 0)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> DataFrame {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.cells.iter().take(n).cloned().collect()))
            .collect();
        DataFrame { columns }
    }

    /// Drop every row with at least one missing cell; returns the number dropped.
    pub fn drop_missing_rows(&mut self) -> usize {
        let keep: Vec<bool> = (0..self.n_rows())
            .map(|row| self.columns.iter().all(|c| !c.cells[row].is_missing()))
            .collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.cells.retain(|_| flags.next().copied().unwrap_or(false));
        }
        dropped
    }

    /// Remove columns whose name matches `predicate`; returns the removed names.
    pub fn drop_columns_where(&mut self, predicate: impl Fn(&str) -> bool) -> Vec<String> {
        let mut removed = Vec::new();
        self.columns.retain(|c| {
            if predicate(&c.name) {
                removed.push(c.name.clone());
                false
            } else {
                true
            }
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::from_columns(vec![
            Column::new("a", vec![Cell::Number(1.0), Cell::Missing, Cell::Number(3.0)]),
            Column::new(
                "b",
                vec![
                    Cell::Text("x".into()),
                    Cell::Text("y".into()),
                    Cell::Missing,
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse(" 2.5 "), Cell::Number(2.5));
        assert_eq!(Cell::parse("NaN"), Cell::Missing);
        assert_eq!(Cell::parse(""), Cell::Missing);
        assert_eq!(Cell::parse("inf"), Cell::Text("inf".into()));
        assert_eq!(Cell::parse("setosa"), Cell::Text("setosa".into()));
    }

    #[test]
    fn test_column_types() {
        let df = frame();
        assert_eq!(df.column("a").unwrap().column_type(), ColumnType::Numeric);
        assert_eq!(df.column("b").unwrap().column_type(), ColumnType::Text);
        assert_eq!(
            Column::new("e", vec![Cell::Missing]).column_type(),
            ColumnType::Empty
        );
    }

    #[test]
    fn test_drop_missing_rows() {
        let mut df = frame();
        assert_eq!(df.drop_missing_rows(), 2);
        assert_eq!(df.n_rows(), 1);
        assert!(!df.has_missing());
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = DataFrame::from_columns(vec![
            Column::new("a", vec![Cell::Number(1.0)]),
            Column::new("b", vec![]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(5.25), "5.25");
    }
}

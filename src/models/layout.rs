//! Конфигурация зала: размеры, подписи рядов, VIP/доступные/льготные места и проход.
//!
//! Инварианты проверяются один раз при построении (`LayoutBuilder::build`
//! или десериализация), дальше `LayoutConfig` считается корректным.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::models::SeatPosition;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("hall must have at least one row and one column, got {rows}x{columns}")]
    EmptyHall { rows: usize, columns: usize },

    #[error("aisle after column {aisle} is outside a {columns}-column hall")]
    AisleOutOfBounds { aisle: usize, columns: usize },

    #[error("expected {expected} row labels, got {actual}")]
    RowLabelCount { expected: usize, actual: usize },

    #[error("{field} references row {row}, hall has {rows} rows")]
    RowOutOfBounds { field: &'static str, row: usize, rows: usize },

    #[error("{field} references column {col}, hall has {columns} columns")]
    ColumnOutOfBounds { field: &'static str, col: usize, columns: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawLayoutConfig")]
pub struct LayoutConfig {
    rows: usize,
    columns: usize,
    row_labels: Vec<String>,
    vip_rows: BTreeSet<usize>,
    vip_columns: BTreeSet<usize>,
    accessible_seats: BTreeSet<SeatPosition>,
    discount_rows: BTreeSet<usize>,
    aisle_after_column: usize,
}

// Сырая форма для serde, проходит через LayoutBuilder
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLayoutConfig {
    rows: usize,
    columns: usize,
    #[serde(default)]
    row_labels: Option<Vec<String>>,
    #[serde(default)]
    vip_rows: Vec<usize>,
    #[serde(default)]
    vip_columns: Vec<usize>,
    #[serde(default)]
    accessible_seats: Vec<SeatPosition>,
    #[serde(default)]
    discount_rows: Vec<usize>,
    aisle_after_column: usize,
}

impl TryFrom<RawLayoutConfig> for LayoutConfig {
    type Error = LayoutError;

    fn try_from(raw: RawLayoutConfig) -> Result<Self, Self::Error> {
        let mut builder = LayoutConfig::builder(raw.rows, raw.columns, raw.aisle_after_column)
            .vip_rows(raw.vip_rows)
            .vip_columns(raw.vip_columns)
            .accessible_seats(raw.accessible_seats)
            .discount_rows(raw.discount_rows);
        if let Some(labels) = raw.row_labels {
            builder = builder.row_labels(labels);
        }
        builder.build()
    }
}

impl LayoutConfig {
    pub fn builder(rows: usize, columns: usize, aisle_after_column: usize) -> LayoutBuilder {
        LayoutBuilder {
            rows,
            columns,
            aisle_after_column,
            row_labels: None,
            vip_rows: BTreeSet::new(),
            vip_columns: BTreeSet::new(),
            accessible_seats: BTreeSet::new(),
            discount_rows: BTreeSet::new(),
        }
    }

    /// Стандартный зал 15x12: VIP J-L (колонки 3-10), доступные F1, F2, F11, F12,
    /// льготные ряды A-B, проход после шестой колонки.
    pub fn cinema_default() -> Self {
        Self {
            rows: 15,
            columns: 12,
            row_labels: default_row_labels(15),
            vip_rows: [9, 10, 11].into_iter().collect(),
            vip_columns: (2..=9).collect(),
            accessible_seats: [(5, 0), (5, 1), (5, 10), (5, 11)]
                .into_iter()
                .map(|(row, col)| SeatPosition::new(row, col))
                .collect(),
            discount_rows: [0, 1].into_iter().collect(),
            aisle_after_column: 5,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn aisle_after_column(&self) -> usize {
        self.aisle_after_column
    }

    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.row_labels.get(row).map(String::as_str)
    }

    pub fn middle_row(&self) -> usize {
        self.rows / 2
    }

    pub fn center_column(&self) -> f64 {
        (self.columns as f64 - 1.0) / 2.0
    }

    pub fn is_vip_row(&self, row: usize) -> bool {
        self.vip_rows.contains(&row)
    }

    pub fn has_vip_columns(&self) -> bool {
        !self.vip_columns.is_empty()
    }

    pub fn is_vip(&self, pos: SeatPosition) -> bool {
        self.vip_rows.contains(&pos.row) && self.vip_columns.contains(&pos.col)
    }

    pub fn is_accessible(&self, pos: SeatPosition) -> bool {
        self.accessible_seats.contains(&pos)
    }

    pub fn row_has_accessible(&self, row: usize) -> bool {
        self.accessible_seats.iter().any(|pos| pos.row == row)
    }

    pub fn is_discount_row(&self, row: usize) -> bool {
        self.discount_rows.contains(&row)
    }

    /// Соседние колонки, разделённые проходом.
    pub fn spans_aisle(&self, left: usize, right: usize) -> bool {
        left == self.aisle_after_column && right == self.aisle_after_column + 1
    }

    /// Колонки идут подряд: разница ровно 1 или они стоят по разные стороны прохода.
    pub fn are_adjacent(&self, left: usize, right: usize) -> bool {
        right == left + 1 || self.spans_aisle(left, right)
    }

    /// Отсортированные колонки образуют один непрерывный отрезок.
    pub fn is_contiguous(&self, sorted_cols: &[usize]) -> bool {
        sorted_cols.windows(2).all(|pair| self.are_adjacent(pair[0], pair[1]))
    }
}

#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    rows: usize,
    columns: usize,
    aisle_after_column: usize,
    row_labels: Option<Vec<String>>,
    vip_rows: BTreeSet<usize>,
    vip_columns: BTreeSet<usize>,
    accessible_seats: BTreeSet<SeatPosition>,
    discount_rows: BTreeSet<usize>,
}

impl LayoutBuilder {
    pub fn row_labels(mut self, labels: Vec<String>) -> Self {
        self.row_labels = Some(labels);
        self
    }

    pub fn vip_rows(mut self, rows: impl IntoIterator<Item = usize>) -> Self {
        self.vip_rows.extend(rows);
        self
    }

    pub fn vip_columns(mut self, columns: impl IntoIterator<Item = usize>) -> Self {
        self.vip_columns.extend(columns);
        self
    }

    pub fn accessible_seats(mut self, seats: impl IntoIterator<Item = SeatPosition>) -> Self {
        self.accessible_seats.extend(seats);
        self
    }

    pub fn discount_rows(mut self, rows: impl IntoIterator<Item = usize>) -> Self {
        self.discount_rows.extend(rows);
        self
    }

    pub fn build(self) -> Result<LayoutConfig, LayoutError> {
        let (rows, columns) = (self.rows, self.columns);

        if rows == 0 || columns == 0 {
            return Err(LayoutError::EmptyHall { rows, columns });
        }
        if self.aisle_after_column >= columns {
            return Err(LayoutError::AisleOutOfBounds {
                aisle: self.aisle_after_column,
                columns,
            });
        }

        let row_labels = self.row_labels.unwrap_or_else(|| default_row_labels(rows));
        if row_labels.len() != rows {
            return Err(LayoutError::RowLabelCount {
                expected: rows,
                actual: row_labels.len(),
            });
        }

        check_rows("vipRows", self.vip_rows.iter().copied(), rows)?;
        check_rows("discountRows", self.discount_rows.iter().copied(), rows)?;
        check_rows("accessibleSeats", self.accessible_seats.iter().map(|p| p.row), rows)?;
        check_columns("vipColumns", self.vip_columns.iter().copied(), columns)?;
        check_columns("accessibleSeats", self.accessible_seats.iter().map(|p| p.col), columns)?;

        Ok(LayoutConfig {
            rows,
            columns,
            row_labels,
            vip_rows: self.vip_rows,
            vip_columns: self.vip_columns,
            accessible_seats: self.accessible_seats,
            discount_rows: self.discount_rows,
            aisle_after_column: self.aisle_after_column,
        })
    }
}

fn check_rows(
    field: &'static str,
    mut values: impl Iterator<Item = usize>,
    rows: usize,
) -> Result<(), LayoutError> {
    match values.find(|&row| row >= rows) {
        Some(row) => Err(LayoutError::RowOutOfBounds { field, row, rows }),
        None => Ok(()),
    }
}

fn check_columns(
    field: &'static str,
    mut values: impl Iterator<Item = usize>,
    columns: usize,
) -> Result<(), LayoutError> {
    match values.find(|&col| col >= columns) {
        Some(col) => Err(LayoutError::ColumnOutOfBounds { field, col, columns }),
        None => Ok(()),
    }
}

// A..Z, затем AA, AB, ... как в Excel
fn default_row_labels(rows: usize) -> Vec<String> {
    (0..rows)
        .map(|mut index| {
            let mut label = Vec::new();
            loop {
                label.push(b'A' + (index % 26) as u8);
                if index < 26 {
                    break;
                }
                index = index / 26 - 1;
            }
            label.reverse();
            String::from_utf8_lossy(&label).into_owned()
        })
        .collect()
}

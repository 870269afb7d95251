use serde::Serialize;
use thiserror::Error;

use crate::models::{LayoutConfig, SeatGrid, SeatPosition, SeatSelection};

/// Причина отказа при ручном выборе мест.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionError {
    #[error("Invalid seat selection")]
    InvalidSelection,
    #[error("Seat out of range")]
    OutOfRange,
    #[error("One or more selected seats are not available")]
    NotAvailable,
    #[error("Group seats must be in the same row")]
    DifferentRows,
    #[error("Group seats must be adjacent")]
    NotAdjacent,
}

pub const VALID_CODE: &str = "valid";

impl SelectionError {
    pub fn code(self) -> &'static str {
        match self {
            SelectionError::InvalidSelection => "invalid_selection",
            SelectionError::OutOfRange => "out_of_range",
            SelectionError::NotAvailable => "not_available",
            SelectionError::DifferentRows => "different_rows",
            SelectionError::NotAdjacent => "not_adjacent",
        }
    }
}

/// Код результата проверки: `valid` или код причины отказа.
pub fn reason_code<T>(result: &Result<T, SelectionError>) -> &'static str {
    match result {
        Ok(_) => VALID_CODE,
        Err(e) => e.code(),
    }
}

/// Проверяет выбор мест перед бронированием.
///
/// Порядок проверок: координаты заданы, место в пределах зала, место свободно
/// (по каждому месту), затем для группы один ряд и места подряд
/// (проход между колонками не считается разрывом). Первая же ошибка
/// возвращается. При успехе отдаёт позиции, отсортированные по (ряд, колонка).
pub fn validate(
    grid: &SeatGrid,
    layout: &LayoutConfig,
    selection: &[SeatSelection],
) -> Result<Vec<SeatPosition>, SelectionError> {
    if selection.is_empty() {
        return Err(SelectionError::InvalidSelection);
    }

    let mut positions = Vec::with_capacity(selection.len());
    for requested in selection {
        let (Some(row), Some(col)) = (requested.row, requested.col) else {
            return Err(SelectionError::InvalidSelection);
        };

        let pos = match (usize::try_from(row), usize::try_from(col)) {
            (Ok(row), Ok(col)) => SeatPosition::new(row, col),
            _ => return Err(SelectionError::OutOfRange),
        };
        let seat = grid.seat(pos).ok_or(SelectionError::OutOfRange)?;

        if !seat.is_available() {
            return Err(SelectionError::NotAvailable);
        }
        positions.push(pos);
    }

    if positions.len() > 1 {
        positions.sort();

        let first_row = positions[0].row;
        if positions.iter().any(|pos| pos.row != first_row) {
            return Err(SelectionError::DifferentRows);
        }

        let cols: Vec<usize> = positions.iter().map(|pos| pos.col).collect();
        if !layout.is_contiguous(&cols) {
            return Err(SelectionError::NotAdjacent);
        }
    }

    Ok(positions)
}

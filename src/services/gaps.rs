use crate::models::{LayoutConfig, SeatGrid, SeatPosition, SeatStatus};

/// Проверяет, оставит ли гипотетическая бронь одиночное свободное место в ряду.
///
/// Бронь применяется к локальной копии статусов ряда, сама схема не меняется.
/// Места из других рядов игнорируются. Колонка прохода (`aisle_after_column`),
/// а также первая и последняя колонки ряда не проверяются.
/// Возвращает первую "зажатую" колонку или `None`.
pub fn would_create_single_gap(
    grid: &SeatGrid,
    layout: &LayoutConfig,
    row: usize,
    candidate: &[SeatPosition],
) -> Option<usize> {
    let mut statuses = grid.row_statuses(row)?;

    for pos in candidate.iter().filter(|pos| pos.row == row) {
        if let Some(status) = statuses.get_mut(pos.col) {
            *status = SeatStatus::Booked;
        }
    }

    stranded_column(&statuses, layout.aisle_after_column())
}

// Свободное место, у которого оба соседа заняты (booked или disabled)
fn stranded_column(statuses: &[SeatStatus], aisle_after_column: usize) -> Option<usize> {
    if statuses.len() < 3 {
        return None;
    }

    (1..statuses.len() - 1)
        .filter(|&col| col != aisle_after_column)
        .find(|&col| {
            statuses[col].is_available()
                && !statuses[col - 1].is_available()
                && !statuses[col + 1].is_available()
        })
}

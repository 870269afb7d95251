use serde::Serialize;
use thiserror::Error;

use crate::models::{LayoutConfig, PricingTable, Seat, SeatPosition, SeatStatus, SeatType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid has {actual} rows, layout expects {expected}")]
    RowCount { expected: usize, actual: usize },

    #[error("row {row} has {actual} seats, layout expects {expected}")]
    ColumnCount { row: usize, expected: usize, actual: usize },

    #[error("seat at row {row}, column {col} claims to be at ({seat_row}, {seat_col})")]
    MisplacedSeat { row: usize, col: usize, seat_row: usize, seat_col: usize },
}

/// Прямоугольная схема зала. Форма всегда совпадает с `LayoutConfig`,
/// по которому она построена: извне схему можно получить только через
/// `generate` или `from_rows`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeatGrid {
    rows: Vec<Vec<Seat>>,
}

impl SeatGrid {
    /// Генерирует свободный зал по конфигурации и ценам.
    pub fn generate(layout: &LayoutConfig, pricing: &PricingTable) -> Self {
        let rows = (0..layout.rows())
            .map(|row| {
                let label = layout.row_label(row).unwrap_or_default();
                (0..layout.columns())
                    .map(|col| {
                        let pos = SeatPosition::new(row, col);
                        // accessible перекрывает VIP
                        let seat_type = if layout.is_accessible(pos) {
                            SeatType::Accessible
                        } else if layout.is_vip(pos) {
                            SeatType::Vip
                        } else {
                            SeatType::Normal
                        };
                        let is_discount = layout.is_discount_row(row);
                        Seat {
                            id: format!("{}{}", label, col + 1),
                            row,
                            col,
                            seat_type,
                            status: SeatStatus::Available,
                            is_discount,
                            price: pricing.price_for(seat_type, is_discount),
                        }
                    })
                    .collect()
            })
            .collect();

        Self { rows }
    }

    /// Собирает схему из готовых рядов (например, из файла) и сверяет её с конфигурацией.
    pub fn from_rows(layout: &LayoutConfig, rows: Vec<Vec<Seat>>) -> Result<Self, GridError> {
        let grid = Self { rows };
        grid.check_shape(layout)?;
        Ok(grid)
    }

    pub fn check_shape(&self, layout: &LayoutConfig) -> Result<(), GridError> {
        if self.rows.len() != layout.rows() {
            return Err(GridError::RowCount {
                expected: layout.rows(),
                actual: self.rows.len(),
            });
        }
        for (row, seats) in self.rows.iter().enumerate() {
            if seats.len() != layout.columns() {
                return Err(GridError::ColumnCount {
                    row,
                    expected: layout.columns(),
                    actual: seats.len(),
                });
            }
            for (col, seat) in seats.iter().enumerate() {
                if seat.row != row || seat.col != col {
                    return Err(GridError::MisplacedSeat {
                        row,
                        col,
                        seat_row: seat.row,
                        seat_col: seat.col,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn row(&self, row: usize) -> Option<&[Seat]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn seat(&self, pos: SeatPosition) -> Option<&Seat> {
        self.rows.get(pos.row).and_then(|row| row.get(pos.col))
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.rows.iter().flatten()
    }

    /// Меняет статус места. Возвращает предыдущий статус или `None`, если места нет.
    pub fn set_status(&mut self, pos: SeatPosition, status: SeatStatus) -> Option<SeatStatus> {
        let seat = self.rows.get_mut(pos.row)?.get_mut(pos.col)?;
        Some(std::mem::replace(&mut seat.status, status))
    }

    /// Статусы ряда отдельной копией, для симуляций.
    pub fn row_statuses(&self, row: usize) -> Option<Vec<SeatStatus>> {
        self.row(row).map(|seats| seats.iter().map(|s| s.status).collect())
    }

    pub fn into_rows(self) -> Vec<Vec<Seat>> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_hall_follows_layout() {
        let layout = LayoutConfig::cinema_default();
        let grid = SeatGrid::generate(&layout, &PricingTable::default());

        assert_eq!(grid.row_count(), 15);
        assert_eq!(grid.column_count(), 12);
        assert!(grid.check_shape(&layout).is_ok());

        let h7 = grid.seat(SeatPosition::new(7, 6)).unwrap();
        assert_eq!(h7.id, "H7");
        assert_eq!(h7.seat_type, SeatType::Normal);
        assert_eq!(h7.price, 10.0);

        let vip = grid.seat(SeatPosition::new(10, 4)).unwrap();
        assert_eq!(vip.seat_type, SeatType::Vip);
        assert_eq!(vip.price, 15.0);

        let f1 = grid.seat(SeatPosition::new(5, 0)).unwrap();
        assert_eq!(f1.id, "F1");
        assert_eq!(f1.seat_type, SeatType::Accessible);

        let a3 = grid.seat(SeatPosition::new(0, 2)).unwrap();
        assert!(a3.is_discount);
        assert_eq!(a3.price, 7.5);

        assert!(grid.seats().all(Seat::is_available));
    }

    #[test]
    fn accessible_wins_over_vip() {
        let layout = LayoutConfig::builder(3, 4, 1)
            .vip_rows([1])
            .vip_columns([0, 1])
            .accessible_seats([SeatPosition::new(1, 0)])
            .build()
            .unwrap();
        let grid = SeatGrid::generate(&layout, &PricingTable::default());
        assert_eq!(grid.seat(SeatPosition::new(1, 0)).unwrap().seat_type, SeatType::Accessible);
        assert_eq!(grid.seat(SeatPosition::new(1, 1)).unwrap().seat_type, SeatType::Vip);
    }

    #[test]
    fn from_rows_rejects_wrong_shape() {
        let layout = LayoutConfig::cinema_default();
        let mut rows = SeatGrid::generate(&layout, &PricingTable::default()).into_rows();
        rows[3].pop();
        assert_eq!(
            SeatGrid::from_rows(&layout, rows).unwrap_err(),
            GridError::ColumnCount { row: 3, expected: 12, actual: 11 }
        );
    }

    #[test]
    fn from_rows_rejects_swapped_seats() {
        let layout = LayoutConfig::cinema_default();
        let mut rows = SeatGrid::generate(&layout, &PricingTable::default()).into_rows();
        rows[2].swap(0, 1);
        assert!(matches!(
            SeatGrid::from_rows(&layout, rows),
            Err(GridError::MisplacedSeat { row: 2, col: 0, .. })
        ));
    }

    #[test]
    fn from_rows_rejects_seats_with_foreign_columns() {
        let layout = LayoutConfig::builder(1, 3, 2).build().unwrap();
        let mut rows = SeatGrid::generate(&layout, &PricingTable::default()).into_rows();
        rows[0][1].col = 7;
        rows[0][2].col = 8;
        assert_eq!(
            SeatGrid::from_rows(&layout, rows).unwrap_err(),
            GridError::MisplacedSeat { row: 0, col: 1, seat_row: 0, seat_col: 7 }
        );
    }

    #[test]
    fn set_status_reports_previous_value() {
        let layout = LayoutConfig::cinema_default();
        let mut grid = SeatGrid::generate(&layout, &PricingTable::default());
        let pos = SeatPosition::new(1, 1);
        assert_eq!(grid.set_status(pos, SeatStatus::Booked), Some(SeatStatus::Available));
        assert_eq!(grid.set_status(pos, SeatStatus::Available), Some(SeatStatus::Booked));
        assert_eq!(grid.set_status(SeatPosition::new(99, 0), SeatStatus::Booked), None);
    }
}

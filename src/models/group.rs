use serde::{Deserialize, Serialize};

use crate::models::{Seat, SeatPosition};

/// Подобранная группа мест: один ряд, колонки подряд (или через проход).
/// Пустая группа означает "подходящих мест нет".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatGroup {
    seats: Vec<Seat>,
}

impl SeatGroup {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_seats(seats: Vec<Seat>) -> Self {
        Self { seats }
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn row(&self) -> Option<usize> {
        self.seats.first().map(|s| s.row)
    }

    pub fn positions(&self) -> Vec<SeatPosition> {
        self.seats.iter().map(Seat::position).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.seats.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn mean_column(&self) -> Option<f64> {
        if self.seats.is_empty() {
            return None;
        }
        let sum: usize = self.seats.iter().map(|s| s.col).sum();
        Some(sum as f64 / self.seats.len() as f64)
    }

    pub fn total_price(&self) -> f64 {
        self.seats.iter().map(|s| s.price).sum()
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Тип места в зале.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Normal,
    Vip,
    Accessible,
}

/// Фильтр по типу места в запросе на подбор группы.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatTypeFilter {
    #[default]
    Any,
    Normal,
    Vip,
    Accessible,
}

impl SeatTypeFilter {
    pub fn matches(self, seat_type: SeatType) -> bool {
        match self {
            SeatTypeFilter::Any => true,
            SeatTypeFilter::Normal => seat_type == SeatType::Normal,
            SeatTypeFilter::Vip => seat_type == SeatType::Vip,
            SeatTypeFilter::Accessible => seat_type == SeatType::Accessible,
        }
    }

    pub fn is_any(self) -> bool {
        self == SeatTypeFilter::Any
    }
}

impl fmt::Display for SeatTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeatTypeFilter::Any => "any",
            SeatTypeFilter::Normal => "normal",
            SeatTypeFilter::Vip => "vip",
            SeatTypeFilter::Accessible => "accessible",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown seat type filter: {0}")]
pub struct UnknownSeatType(pub String);

impl std::str::FromStr for SeatTypeFilter {
    type Err = UnknownSeatType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(SeatTypeFilter::Any),
            "normal" => Ok(SeatTypeFilter::Normal),
            "vip" => Ok(SeatTypeFilter::Vip),
            "accessible" => Ok(SeatTypeFilter::Accessible),
            other => Err(UnknownSeatType(other.to_string())),
        }
    }
}

/// Статус места. Меняется только через `SeatStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Booked,
    Disabled,
}

impl SeatStatus {
    pub fn is_available(self) -> bool {
        self == SeatStatus::Available
    }
}

/// Координаты места: (ряд, колонка), с нуля.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatPosition {
    pub row: usize,
    pub col: usize,
}

impl SeatPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: String,
    pub row: usize,
    pub col: usize,
    #[serde(rename = "type")]
    pub seat_type: SeatType,
    pub status: SeatStatus,
    pub is_discount: bool,
    pub price: f64,
}

impl Seat {
    pub fn position(&self) -> SeatPosition {
        SeatPosition::new(self.row, self.col)
    }

    pub fn is_available(&self) -> bool {
        self.status.is_available()
    }
}

/// Место из пользовательского запроса: координаты могут отсутствовать
/// или быть отрицательными, проверяет их валидатор.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeatSelection {
    pub row: Option<i64>,
    pub col: Option<i64>,
}

impl SeatSelection {
    pub fn at(row: i64, col: i64) -> Self {
        Self { row: Some(row), col: Some(col) }
    }
}

impl From<SeatPosition> for SeatSelection {
    fn from(pos: SeatPosition) -> Self {
        // usize -> i64 без потерь для любого реального зала
        Self::at(pos.row as i64, pos.col as i64)
    }
}

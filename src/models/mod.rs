pub mod seat;
pub mod layout;
pub mod pricing;
pub mod grid;
pub mod group;

pub use seat::{Seat, SeatPosition, SeatSelection, SeatStatus, SeatType, SeatTypeFilter, UnknownSeatType};
pub use layout::{LayoutBuilder, LayoutConfig, LayoutError};
pub use pricing::PricingTable;
pub use grid::{GridError, SeatGrid};
pub use group::SeatGroup;

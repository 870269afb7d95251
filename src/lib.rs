pub mod config;
pub mod models;
pub mod services;
pub mod store;

pub use models::{
    LayoutConfig, LayoutError, PricingTable, Seat, SeatGrid, SeatGroup, SeatPosition,
    SeatSelection, SeatStatus, SeatType, SeatTypeFilter,
};
pub use services::{find_best_group, reason_code, validate, would_create_single_gap, SelectionError};
pub use store::{SeatStore, StoreError};

use serde::{Deserialize, Serialize};

use crate::models::SeatType;

// Цены билетов по типу места
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    pub normal: f64,
    pub vip: f64,
    pub accessible: f64,
    pub discount: f64,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            normal: 10.00,
            vip: 15.00,
            accessible: 10.00,
            discount: 7.50,
        }
    }
}

impl PricingTable {
    // Скидка действует только для обычных мест в льготных рядах
    pub fn price_for(&self, seat_type: SeatType, is_discount: bool) -> f64 {
        match seat_type {
            SeatType::Normal if is_discount => self.discount,
            SeatType::Normal => self.normal,
            SeatType::Vip => self.vip,
            SeatType::Accessible => self.accessible,
        }
    }
}

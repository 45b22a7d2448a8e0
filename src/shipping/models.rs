//! Domain models for the shipping quote engine.
//!
//! All monetary values are integers in the smallest currency unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Grouping key used when an item has no usable rental start date.
pub const UNKNOWN_DELIVERY_KEY: &str = "unknown";

/// A rental line item as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub quantity: u32,
    /// Raw rental start timestamp, if the client sent one
    pub rental_start: Option<String>,
}

impl LineItem {
    pub fn new(quantity: u32, rental_start: Option<&str>) -> Self {
        Self {
            quantity,
            rental_start: rental_start.map(str::to_string),
        }
    }
}

/// Fee schedule applied to every delivery trip in a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfig {
    pub base_fee_per_delivery: i64,
    pub price_per_km: i64,
    pub min_fee_per_delivery: i64,
    pub max_fee_per_delivery: i64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            base_fee_per_delivery: 15_000,
            price_per_km: 5_000,
            min_fee_per_delivery: 20_000,
            max_fee_per_delivery: 100_000,
        }
    }
}

/// An item placed in a batch, remembering where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub original_index: usize,
    pub quantity: u32,
}

/// Items sharing one delivery date, priced as a single trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryBatch {
    pub key: String,
    pub items: Vec<BatchItem>,
    pub fee: i64,
}

impl DeliveryBatch {
    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// One item's portion of its batch fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub original_index: usize,
    pub quantity: u32,
    pub allocated_fee: i64,
}

/// How a single trip fee was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub base_fee: i64,
    pub distance_fee: i64,
    /// Clamped trip fee
    pub total: i64,
}

/// A priced batch together with its per-item allocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedBatch {
    pub batch: DeliveryBatch,
    pub allocations: Vec<Allocation>,
    /// Even share before the remainder is handed to the last item
    pub product_share: i64,
    pub breakdown: FeeBreakdown,
}

/// Derived figures reported alongside a quote
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuoteSummary {
    pub total_products: usize,
    pub total_quantity: u64,
    pub average_fee_per_delivery: i64,
    pub average_fee_per_product: i64,
    pub delivery_dates: Vec<String>,
}

/// Pre-discount shipping quote for one cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingQuote {
    pub batches: Vec<QuotedBatch>,
    pub total_fee: i64,
    pub delivery_count: usize,
    pub distance_km: Decimal,
    pub summary: QuoteSummary,
}

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

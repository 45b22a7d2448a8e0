//! Request DTOs for shipping API endpoints.

use serde::Deserialize;

use super::models::{FeeConfig, GeoPoint, LineItem};
use super::services::ShippingError;

/// Request to quote shipping for a cart
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteShippingRequest {
    pub items: Vec<QuoteItemRequest>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub origin: Option<GeoPoint>,
    #[serde(default)]
    pub destination: Option<GeoPoint>,
    #[serde(default)]
    pub config: Option<FeeConfigOverride>,
}

/// A cart line in the request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItemRequest {
    /// Read as a number so fractional values can be rejected explicitly
    pub quantity: f64,
    #[serde(default)]
    pub rental_period: Option<RentalPeriodRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalPeriodRequest {
    #[serde(default)]
    pub start_date: Option<String>,
}

/// Per-request fee overrides; missing fields fall back to the server default
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeConfigOverride {
    #[serde(default)]
    pub base_fee_per_delivery: Option<i64>,
    #[serde(default)]
    pub price_per_km: Option<i64>,
    #[serde(default)]
    pub min_fee_per_delivery: Option<i64>,
    #[serde(default)]
    pub max_fee_per_delivery: Option<i64>,
}

impl FeeConfigOverride {
    pub fn apply(&self, defaults: &FeeConfig) -> FeeConfig {
        FeeConfig {
            base_fee_per_delivery: self
                .base_fee_per_delivery
                .unwrap_or(defaults.base_fee_per_delivery),
            price_per_km: self.price_per_km.unwrap_or(defaults.price_per_km),
            min_fee_per_delivery: self
                .min_fee_per_delivery
                .unwrap_or(defaults.min_fee_per_delivery),
            max_fee_per_delivery: self
                .max_fee_per_delivery
                .unwrap_or(defaults.max_fee_per_delivery),
        }
    }
}

impl QuoteShippingRequest {
    /// Fee schedule for this request
    pub fn fee_config(&self, defaults: &FeeConfig) -> FeeConfig {
        self.config
            .as_ref()
            .map(|overrides| overrides.apply(defaults))
            .unwrap_or(*defaults)
    }

    /// Convert request items into engine line items, reporting every bad quantity
    pub fn line_items(&self) -> Result<Vec<LineItem>, ShippingError> {
        let mut items = Vec::with_capacity(self.items.len());
        let mut errors = Vec::new();

        for (index, item) in self.items.iter().enumerate() {
            match item.checked_quantity() {
                Some(quantity) => items.push(LineItem {
                    quantity,
                    rental_start: item
                        .rental_period
                        .as_ref()
                        .and_then(|period| period.start_date.clone()),
                }),
                None => errors.push(format!(
                    "items[{}].quantity must be a whole number >= 1 (got {})",
                    index, item.quantity
                )),
            }
        }

        if errors.is_empty() {
            Ok(items)
        } else {
            Err(ShippingError::invalid_input("Quote request rejected", errors))
        }
    }
}

impl QuoteItemRequest {
    fn checked_quantity(&self) -> Option<u32> {
        let quantity = self.quantity;
        if !quantity.is_finite() || quantity.fract() != 0.0 {
            return None;
        }
        if quantity < 1.0 || quantity > f64::from(u32::MAX) {
            return None;
        }
        Some(quantity as u32)
    }
}

/// Request for the great-circle fallback distance
#[derive(Debug, Deserialize)]
pub struct DistanceRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

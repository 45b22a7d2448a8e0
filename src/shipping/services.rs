//! Shipping quote service functions.
//!
//! Validates input, then runs the batching pipeline and aggregates the
//! result. Everything here is synchronous and side-effect free apart from
//! tracing output.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::calculators::{
    allocate_batch_fee, average_fee, calculate_delivery_fee, group_by_delivery_date, haversine_km,
};
use super::models::{FeeConfig, GeoPoint, LineItem, QuoteSummary, QuotedBatch, ShippingQuote};

/// Shipping calculation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShippingError {
    /// Request data the engine refuses to price
    #[error("Invalid input: {message}")]
    InvalidInput { message: String, errors: Vec<String> },

    /// Fee schedule is inconsistent; must be fixed by the caller
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String, errors: Vec<String> },
}

impl ShippingError {
    pub fn invalid_input(message: impl Into<String>, errors: Vec<String>) -> Self {
        ShippingError::InvalidInput {
            message: message.into(),
            errors,
        }
    }

    /// Short machine-readable name used in error responses
    pub fn error_type(&self) -> &'static str {
        match self {
            ShippingError::InvalidInput { .. } => "InvalidInput",
            ShippingError::ConfigurationError { .. } => "ConfigurationError",
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            ShippingError::InvalidInput { errors, .. } => errors,
            ShippingError::ConfigurationError { errors, .. } => errors,
        }
    }
}

/// Check a fee schedule before it is used.
///
/// Negative amounts and `min > max` are rejected. Values are never swapped
/// or adjusted.
pub fn validate_fee_config(config: &FeeConfig) -> Result<(), ShippingError> {
    let mut errors = Vec::new();

    let fields = [
        ("baseFeePerDelivery", config.base_fee_per_delivery),
        ("pricePerKm", config.price_per_km),
        ("minFeePerDelivery", config.min_fee_per_delivery),
        ("maxFeePerDelivery", config.max_fee_per_delivery),
    ];
    for (name, value) in fields {
        if value < 0 {
            errors.push(format!("{} < 0", name));
        }
    }

    if config.min_fee_per_delivery > config.max_fee_per_delivery {
        errors.push(format!(
            "minFeePerDelivery ({}) > maxFeePerDelivery ({})",
            config.min_fee_per_delivery, config.max_fee_per_delivery
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ShippingError::ConfigurationError {
            message: "Fee configuration is inconsistent".to_string(),
            errors,
        })
    }
}

fn validate_quote_input(items: &[LineItem], distance_km: Decimal) -> Result<(), ShippingError> {
    let mut errors: Vec<String> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.quantity < 1)
        .map(|(index, _)| format!("items[{}].quantity < 1", index))
        .collect();

    if distance_km < Decimal::ZERO {
        errors.push("distanceKm < 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ShippingError::invalid_input("Quote request rejected", errors))
    }
}

/// Convert a client-supplied distance into an exact decimal.
///
/// Finite distances beyond the decimal range saturate at `Decimal::MAX`,
/// which prices at the maximum fee.
pub fn distance_from_f64(distance_km: f64) -> Result<Decimal, ShippingError> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(ShippingError::invalid_input(
            "Distance must be a finite, non-negative number",
            vec![format!("distanceKm = {}", distance_km)],
        ));
    }

    Ok(Decimal::from_f64(distance_km).unwrap_or(Decimal::MAX))
}

/// Great-circle fallback distance between two validated points.
pub fn fallback_distance(origin: GeoPoint, destination: GeoPoint) -> Result<f64, ShippingError> {
    let mut errors = Vec::new();
    if !origin.is_valid() {
        errors.push(format!("origin ({}, {}) out of range", origin.lat, origin.lng));
    }
    if !destination.is_valid() {
        errors.push(format!(
            "destination ({}, {}) out of range",
            destination.lat, destination.lng
        ));
    }
    if !errors.is_empty() {
        return Err(ShippingError::invalid_input("Invalid coordinates", errors));
    }

    Ok(haversine_km(origin, destination))
}

/// Pick the distance for a quote.
///
/// An explicit `distance_km` wins; otherwise both coordinates are required
/// and the great-circle fallback is used.
pub fn resolve_distance(
    distance_km: Option<f64>,
    origin: Option<GeoPoint>,
    destination: Option<GeoPoint>,
) -> Result<Decimal, ShippingError> {
    match (distance_km, origin, destination) {
        (Some(distance), _, _) => distance_from_f64(distance),
        (None, Some(origin), Some(destination)) => {
            let distance = fallback_distance(origin, destination)?;
            debug!("Using great-circle fallback distance: {} km", distance);
            distance_from_f64(distance)
        }
        _ => Err(ShippingError::invalid_input(
            "No delivery distance supplied",
            vec!["distanceKm missing and origin/destination incomplete".to_string()],
        )),
    }
}

/// Quote shipping for a cart.
///
/// Groups items into delivery batches by UTC calendar day, prices every
/// batch as one trip over the shared `distance_km`, splits each trip fee
/// across its items and summarises the result. An empty cart produces a
/// zero quote.
///
/// # Arguments
/// * `items` - Line items in cart order
/// * `distance_km` - Delivery distance shared by every batch
/// * `config` - Fee schedule
///
/// # Returns
/// `ShippingQuote` with per-batch allocations, or an error if the config or
/// input is rejected. Nothing is computed on error.
pub fn quote_shipping(
    items: &[LineItem],
    distance_km: Decimal,
    config: &FeeConfig,
) -> Result<ShippingQuote, ShippingError> {
    validate_fee_config(config)?;
    validate_quote_input(items, distance_km)?;

    // Distance is shared by every batch in a quote
    let breakdown = calculate_delivery_fee(distance_km, config);

    let batches: Vec<QuotedBatch> = group_by_delivery_date(items)
        .into_iter()
        .map(|mut batch| {
            batch.fee = breakdown.total;
            let allocations = allocate_batch_fee(&batch);
            let product_share = batch.fee.div_euclid(batch.size().max(1) as i64);

            debug!(
                "Batch {}: {} items, fee {}, share {}",
                batch.key,
                batch.size(),
                batch.fee,
                product_share
            );

            QuotedBatch {
                batch,
                allocations,
                product_share,
                breakdown,
            }
        })
        .collect();

    let total_fee = batches
        .iter()
        .try_fold(0_i64, |total, quoted| total.checked_add(quoted.batch.fee))
        .ok_or_else(|| ShippingError::ConfigurationError {
            message: "Fee configuration overflows the quote total".to_string(),
            errors: vec![format!(
                "{} deliveries x maxFeePerDelivery ({}) exceeds i64",
                batches.len(),
                config.max_fee_per_delivery
            )],
        })?;
    let delivery_count = batches.len();
    let total_products = items.len();

    let summary = QuoteSummary {
        total_products,
        total_quantity: items.iter().map(|item| u64::from(item.quantity)).sum(),
        average_fee_per_delivery: average_fee(total_fee, delivery_count),
        average_fee_per_product: average_fee(total_fee, total_products),
        delivery_dates: batches
            .iter()
            .map(|quoted| quoted.batch.key.clone())
            .collect(),
    };

    info!(
        "Quoted {} items in {} deliveries over {} km: total fee {}",
        total_products, delivery_count, distance_km, total_fee
    );

    Ok(ShippingQuote {
        batches,
        total_fee,
        delivery_count,
        distance_km,
        summary,
    })
}

//! Core shipping calculation functions.
//!
//! Pure functions for batching and fee math - no I/O, no shared state.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::models::{
    Allocation, BatchItem, DeliveryBatch, FeeBreakdown, FeeConfig, GeoPoint, LineItem,
    UNKNOWN_DELIVERY_KEY,
};

/// Mean Earth radius used by the great-circle fallback.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Round to specified decimal places, halves away from zero.
///
/// All amounts handled here are non-negative, so this is plain round-half-up.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use rental_shipping::shipping::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(3));
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));
/// assert_eq!(round_money(dec!(1.235), 2), dec!(1.24));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Reduce a rental start timestamp to its UTC calendar day (`YYYY-MM-DD`).
///
/// Absent, blank or unparseable input maps to `"unknown"` so grouping is
/// always defined.
pub fn delivery_key(rental_start: Option<&str>) -> String {
    rental_start
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(parse_utc_date)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN_DELIVERY_KEY.to_string())
}

fn parse_utc_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }

    // Naive date-times carry no offset and are taken as UTC
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Partition line items into delivery batches keyed by delivery date.
///
/// Batches come out in the order their key is first seen; items keep their
/// input order inside a batch. Nothing is sorted by date. Fees are left at
/// zero for the caller to fill in.
pub fn group_by_delivery_date(items: &[LineItem]) -> Vec<DeliveryBatch> {
    let mut batches: Vec<DeliveryBatch> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (original_index, item) in items.iter().enumerate() {
        let key = delivery_key(item.rental_start.as_deref());
        let position = *positions.entry(key.clone()).or_insert_with(|| {
            batches.push(DeliveryBatch {
                key,
                items: Vec::new(),
                fee: 0,
            });
            batches.len() - 1
        });

        batches[position].items.push(BatchItem {
            original_index,
            quantity: item.quantity,
        });
    }

    batches
}

/// Price a single delivery trip.
///
/// `raw = base + distance * per_km`, rounded half-up and clamped into
/// `[min, max]`. Batch size never enters the calculation. Overflow saturates
/// at the maximum fee. The reported distance component is capped at the
/// maximum fee as well.
pub fn calculate_delivery_fee(distance_km: Decimal, config: &FeeConfig) -> FeeBreakdown {
    let base = Decimal::from(config.base_fee_per_delivery);
    let min = Decimal::from(config.min_fee_per_delivery);
    let max = Decimal::from(config.max_fee_per_delivery);

    let distance_part = distance_km.checked_mul(Decimal::from(config.price_per_km));

    let total = distance_part
        .and_then(|part| base.checked_add(part))
        .map(|raw| round_money(raw, 0).max(min).min(max))
        .and_then(|fee| fee.to_i64())
        .unwrap_or(config.max_fee_per_delivery);

    let distance_fee = distance_part
        .map(|part| round_money(part, 0).min(max))
        .and_then(|fee| fee.to_i64())
        .unwrap_or(config.max_fee_per_delivery);

    FeeBreakdown {
        base_fee: config.base_fee_per_delivery,
        distance_fee,
        total,
    }
}

/// Split `fee` into `count` integer shares, largest remainder to last.
///
/// Every share is `floor(fee / count)` except the last, which absorbs the
/// remainder. The shares always sum to `fee` exactly.
pub fn largest_remainder_to_last(fee: i64, count: usize) -> Vec<i64> {
    if count == 0 {
        return vec![];
    }

    let n = count as i64;
    let share = fee.div_euclid(n);

    let mut shares = vec![share; count];
    shares[count - 1] = fee - share * (n - 1);
    shares
}

/// Allocate a batch's fee across its items in batch order.
pub fn allocate_batch_fee(batch: &DeliveryBatch) -> Vec<Allocation> {
    largest_remainder_to_last(batch.fee, batch.size())
        .into_iter()
        .zip(&batch.items)
        .map(|(allocated_fee, item)| Allocation {
            original_index: item.original_index,
            quantity: item.quantity,
            allocated_fee,
        })
        .collect()
}

/// Rounded mean of `total` over `count`, zero when there is nothing to divide by.
pub fn average_fee(total: i64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }

    round_money(Decimal::from(total) / Decimal::from(count), 0)
        .to_i64()
        .unwrap_or(0)
}

/// Great-circle distance in kilometres, rounded to 2 decimal places.
///
/// Used when the caller only knows coordinates and no routed distance.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    ((EARTH_RADIUS_KM * c) * 100.0).round() / 100.0
}

//! Response DTOs for shipping API endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use super::models::{FeeBreakdown, QuoteSummary, QuotedBatch, ShippingQuote};

/// Response for a shipping quote
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteShippingResponse {
    pub success: bool,
    pub total_shipping_fee: i64,
    pub delivery_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub distance_km: Decimal,
    pub delivery_batches: Vec<DeliveryBatchResponse>,
    pub summary: QuoteSummaryResponse,
}

/// One delivery trip in the quote
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryBatchResponse {
    pub delivery_date: String,
    /// 1-based position in batch order
    pub delivery_batch: usize,
    pub products: Vec<ProductAllocationResponse>,
    pub delivery_fee: i64,
    pub breakdown: FeeBreakdownResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAllocationResponse {
    pub product_index: usize,
    pub quantity: u32,
    pub allocated_fee: i64,
    pub breakdown: ProductBreakdownResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductBreakdownResponse {
    pub delivery_fee: i64,
    pub product_share: i64,
    pub batch_size: usize,
    pub batch_quantity: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdownResponse {
    pub base_fee: i64,
    pub distance_fee: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub total_products: usize,
    pub total_quantity: u64,
    pub average_fee_per_delivery: i64,
    pub average_fee_per_product: i64,
    pub delivery_dates: Vec<String>,
}

/// Response for the great-circle distance fallback
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceResponse {
    pub success: bool,
    pub distance_km: f64,
}

/// Generic shipping error response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingErrorResponse {
    pub success: bool,
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<ShippingQuote> for QuoteShippingResponse {
    fn from(quote: ShippingQuote) -> Self {
        let delivery_batches = quote
            .batches
            .into_iter()
            .enumerate()
            .map(|(position, quoted)| DeliveryBatchResponse::from_quoted(position + 1, quoted))
            .collect();

        Self {
            success: true,
            total_shipping_fee: quote.total_fee,
            delivery_count: quote.delivery_count,
            distance_km: quote.distance_km,
            delivery_batches,
            summary: quote.summary.into(),
        }
    }
}

impl DeliveryBatchResponse {
    fn from_quoted(delivery_batch: usize, quoted: QuotedBatch) -> Self {
        let batch_size = quoted.batch.size();
        let batch_quantity = quoted.batch.total_quantity();
        let delivery_fee = quoted.batch.fee;

        let products = quoted
            .allocations
            .into_iter()
            .map(|allocation| ProductAllocationResponse {
                product_index: allocation.original_index,
                quantity: allocation.quantity,
                allocated_fee: allocation.allocated_fee,
                breakdown: ProductBreakdownResponse {
                    delivery_fee,
                    product_share: quoted.product_share,
                    batch_size,
                    batch_quantity,
                },
            })
            .collect();

        Self {
            delivery_date: quoted.batch.key,
            delivery_batch,
            products,
            delivery_fee,
            breakdown: quoted.breakdown.into(),
        }
    }
}

impl From<FeeBreakdown> for FeeBreakdownResponse {
    fn from(breakdown: FeeBreakdown) -> Self {
        Self {
            base_fee: breakdown.base_fee,
            distance_fee: breakdown.distance_fee,
            total: breakdown.total,
        }
    }
}

impl From<QuoteSummary> for QuoteSummaryResponse {
    fn from(summary: QuoteSummary) -> Self {
        Self {
            total_products: summary.total_products,
            total_quantity: summary.total_quantity,
            average_fee_per_delivery: summary.average_fee_per_delivery,
            average_fee_per_product: summary.average_fee_per_product,
            delivery_dates: summary.delivery_dates,
        }
    }
}

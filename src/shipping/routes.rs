//! HTTP handlers for the shipping API

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::AppState;

use super::models::FeeConfig;
use super::requests::{DistanceRequest, QuoteShippingRequest};
use super::responses::{DistanceResponse, QuoteShippingResponse};
use super::services;

/// Shipping routes, mounted under `/api/shipping`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shipping/quote", post(quote))
        .route("/api/shipping/distance", post(distance))
        .route("/api/shipping/config", get(default_config))
}

/// Quote shipping for a cart
async fn quote(
    State(state): State<AppState>,
    payload: std::result::Result<Json<QuoteShippingRequest>, JsonRejection>,
) -> Result<Json<QuoteShippingResponse>> {
    let Json(request) = payload?;

    let config = request.fee_config(&state.config.fee_config);
    services::validate_fee_config(&config)?;
    let items = request.line_items()?;
    let distance_km =
        services::resolve_distance(request.distance_km, request.origin, request.destination)?;

    let quote = services::quote_shipping(&items, distance_km, &config)?;
    Ok(Json(quote.into()))
}

/// Great-circle distance between two coordinates
async fn distance(
    payload: std::result::Result<Json<DistanceRequest>, JsonRejection>,
) -> Result<Json<DistanceResponse>> {
    let Json(request) = payload?;
    let distance_km = services::fallback_distance(request.origin, request.destination)?;
    tracing::debug!("Fallback distance resolved: {} km", distance_km);

    Ok(Json(DistanceResponse {
        success: true,
        distance_km,
    }))
}

/// Fee schedule applied when a request carries no overrides
async fn default_config(State(state): State<AppState>) -> Json<FeeConfig> {
    Json(state.config.fee_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;

    fn app() -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        router().with_state(AppState::new(config))
    }

    async fn send(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_quote_two_batches() {
        let (status, body) = send(
            "POST",
            "/api/shipping/quote",
            Some(json!({
                "items": [
                    { "quantity": 2, "rentalPeriod": { "startDate": "2025-11-15" } },
                    { "quantity": 1, "rentalPeriod": { "startDate": "2025-11-15" } },
                    { "quantity": 1, "rentalPeriod": { "startDate": "2025-11-18" } },
                    { "quantity": 2, "rentalPeriod": { "startDate": "2025-11-18" } }
                ],
                "distanceKm": 8.5,
                "config": {
                    "baseFeePerDelivery": 15000,
                    "pricePerKm": 5000,
                    "minFeePerDelivery": 20000,
                    "maxFeePerDelivery": 100000
                }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalShippingFee"], 115_000);
        assert_eq!(body["deliveryCount"], 2);
        assert_eq!(body["summary"]["totalProducts"], 4);
        assert_eq!(body["summary"]["totalQuantity"], 6);
        assert_eq!(body["summary"]["averageFeePerDelivery"], 57_500);
        assert_eq!(body["summary"]["averageFeePerProduct"], 28_750);
        assert_eq!(body["deliveryBatches"][1]["products"][0]["productIndex"], 2);
    }

    #[tokio::test]
    async fn test_quote_empty_cart() {
        let (status, body) = send(
            "POST",
            "/api/shipping/quote",
            Some(json!({ "items": [], "distanceKm": 5 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalShippingFee"], 0);
        assert_eq!(body["deliveryCount"], 0);
        assert_eq!(body["deliveryBatches"], json!([]));
        assert_eq!(body["summary"]["averageFeePerDelivery"], 0);
        assert_eq!(body["summary"]["averageFeePerProduct"], 0);
    }

    #[tokio::test]
    async fn test_quote_from_coordinates() {
        let (status, body) = send(
            "POST",
            "/api/shipping/quote",
            Some(json!({
                "items": [{ "quantity": 1, "rentalPeriod": { "startDate": "2025-11-15" } }],
                "origin": { "lat": 0.0, "lng": 0.0 },
                "destination": { "lat": 0.0, "lng": 0.1 }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        // 11.12 km -> 15000 + 55600 = 70600
        assert_eq!(body["distanceKm"], 11.12);
        assert_eq!(body["totalShippingFee"], 70_600);
    }

    #[tokio::test]
    async fn test_quote_rejects_fractional_quantity() {
        let (status, body) = send(
            "POST",
            "/api/shipping/quote",
            Some(json!({ "items": [{ "quantity": 1.5 }], "distanceKm": 5 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["errorType"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_quote_rejects_negative_distance() {
        let (status, body) = send(
            "POST",
            "/api/shipping/quote",
            Some(json!({ "items": [{ "quantity": 1 }], "distanceKm": -3 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_quote_rejects_malformed_body() {
        let (status, body) = send(
            "POST",
            "/api/shipping/quote",
            Some(json!({ "items": "not a list", "distanceKm": 5 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorType"], "InvalidInput");
    }

    #[tokio::test]
    async fn test_quote_rejects_inverted_config() {
        let (status, body) = send(
            "POST",
            "/api/shipping/quote",
            Some(json!({
                "items": [{ "quantity": 1 }],
                "distanceKm": 5,
                "config": { "minFeePerDelivery": 200000 }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errorType"], "ConfigurationError");
    }

    #[tokio::test]
    async fn test_quote_config_error_reported_before_item_errors() {
        let (status, body) = send(
            "POST",
            "/api/shipping/quote",
            Some(json!({
                "items": [{ "quantity": 0 }],
                "distanceKm": 5,
                "config": { "minFeePerDelivery": 200000 }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errorType"], "ConfigurationError");
    }

    #[tokio::test]
    async fn test_quote_huge_distance_prices_at_max_fee() {
        let (status, body) = send(
            "POST",
            "/api/shipping/quote",
            Some(json!({
                "items": [{ "quantity": 1, "rentalPeriod": { "startDate": "2025-11-15" } }],
                "distanceKm": 1e30
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deliveryBatches"][0]["deliveryFee"], 100_000);
        assert_eq!(body["deliveryBatches"][0]["breakdown"]["distanceFee"], 100_000);
        assert_eq!(body["totalShippingFee"], 100_000);
    }

    #[tokio::test]
    async fn test_quote_total_overflow_is_rejected() {
        let (status, body) = send(
            "POST",
            "/api/shipping/quote",
            Some(json!({
                "items": [
                    { "quantity": 1, "rentalPeriod": { "startDate": "2025-11-15" } },
                    { "quantity": 1, "rentalPeriod": { "startDate": "2025-11-16" } }
                ],
                "distanceKm": 0,
                "config": {
                    "baseFeePerDelivery": i64::MAX,
                    "pricePerKm": 0,
                    "minFeePerDelivery": 0,
                    "maxFeePerDelivery": i64::MAX
                }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errorType"], "ConfigurationError");
    }

    #[tokio::test]
    async fn test_distance_endpoint() {
        let (status, body) = send(
            "POST",
            "/api/shipping/distance",
            Some(json!({
                "origin": { "lat": 51.5074, "lng": -0.1278 },
                "destination": { "lat": 48.8566, "lng": 2.3522 }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["distanceKm"], 343.56);
    }

    #[tokio::test]
    async fn test_distance_endpoint_rejects_bad_coordinates() {
        let (status, _) = send(
            "POST",
            "/api/shipping/distance",
            Some(json!({
                "origin": { "lat": 95.0, "lng": 0.0 },
                "destination": { "lat": 0.0, "lng": 0.0 }
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_default_config_endpoint() {
        let (status, body) = send("GET", "/api/shipping/config", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["baseFeePerDelivery"], 15_000);
        assert_eq!(body["maxFeePerDelivery"], 100_000);
    }
}

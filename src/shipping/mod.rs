//! Shipping quote engine.
//!
//! Groups rental line items into delivery trips by date, prices each trip
//! once and splits the trip fee across its items with an exact-sum
//! guarantee. Served to the storefront over HTTP/JSON.

pub mod calculators;
pub mod models;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{haversine_km, largest_remainder_to_last, round_money};
pub use models::{FeeConfig, GeoPoint, LineItem, ShippingQuote};
pub use routes::router;
pub use services::{quote_shipping, validate_fee_config, ShippingError};

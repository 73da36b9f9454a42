//! Catalog product

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sellable digital product
///
/// The catalog is read-only for this service; prices always come from here,
/// never from the cart the browser sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit price in BRL
    pub price: Decimal,
}

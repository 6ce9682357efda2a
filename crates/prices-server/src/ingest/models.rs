//! Price domain types

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};

/// One parsed CSV row, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub product_id: i64,
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    pub create_date: NaiveDate,
}

/// A row of the `prices` table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredPrice {
    pub id: i32,
    pub product_id: i32,
    pub name: String,
    pub category: String,
    pub price: BigDecimal,
    pub create_date: NaiveDate,
}

/// Whole-table statistics returned after an import
///
/// `total_items` counts only the rows inserted by the import that produced
/// this summary; the other two fields cover every row in the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionSummary {
    pub total_items: u64,
    pub total_categories: i64,
    #[serde(serialize_with = "serialize_decimal_as_number")]
    pub total_price: BigDecimal,
}

fn serialize_decimal_as_number<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(value.to_f64().unwrap_or_default())
}

//! CSV rendering of stored prices
//!
//! Output follows the import layout so an export can be uploaded again:
//! `product_id,name,category,id,price,create_date`. The store id sits in the
//! column the parser ignores.

use csv::Writer;

use super::models::StoredPrice;
use super::parser::DATE_FORMAT;

pub const EXPORT_HEADER: [&str; 6] = ["product_id", "name", "category", "id", "price", "create_date"];

/// Render `prices` as CSV bytes, header first
pub fn render_csv(prices: &[StoredPrice]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for price in prices {
        writer.write_record([
            price.product_id.to_string(),
            price.name.clone(),
            price.category.clone(),
            price.id.to_string(),
            price.price.round(2).with_scale(2).to_string(),
            price.create_date.format(DATE_FORMAT).to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

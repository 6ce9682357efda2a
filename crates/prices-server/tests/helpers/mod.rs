//! Test helpers for prices server integration tests
//!
//! - app construction around a test pool
//! - zip and multipart request builders
//! - response body decoding

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use prices_server::{api, config::Config, ingest::archive};
use serde_json::Value;
use sqlx::PgPool;

pub const BOUNDARY: &str = "prices-test-boundary";

pub const PRICES_URI: &str = "/api/v0/prices";

/// Header plus two valid rows: prices 10.00 and 20.50 in two categories
pub const SAMPLE_CSV: &str = "product_id,name,category,id,price,create_date\n\
                              1,apple,fruit,1,10.00,2024-01-01\n\
                              2,bread,bakery,2,20.50,2024-01-02\n";

pub fn setup_test_app(pool: PgPool) -> Router {
    setup_test_app_with(pool, Config::default())
}

pub fn setup_test_app_with(pool: PgPool, config: Config) -> Router {
    api::create_router(pool, &config)
}

pub fn zip_with(entry_name: &str, csv: &str) -> Vec<u8> {
    archive::pack(entry_name, csv.as_bytes()).unwrap()
}

/// A `multipart/form-data` body holding a single part
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/zip\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(PRICES_URI)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body("file", filename, content)))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn count_prices(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM prices")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Route writes on `prices` into `prices_data` while every read of
/// `prices` raises an error
pub const FAILING_READS_SQL: &str = r#"
    ALTER TABLE prices RENAME TO prices_data;

    CREATE FUNCTION prices_unreadable() RETURNS SETOF prices_data AS $$
    BEGIN
        RAISE EXCEPTION 'prices are unreadable';
    END
    $$ LANGUAGE plpgsql;

    CREATE VIEW prices AS SELECT * FROM prices_unreadable();

    CREATE FUNCTION prices_write() RETURNS trigger AS $$
    BEGIN
        INSERT INTO prices_data (product_id, name, category, price, create_date)
        VALUES (NEW.product_id, NEW.name, NEW.category, NEW.price, NEW.create_date);
        RETURN NEW;
    END
    $$ LANGUAGE plpgsql;

    CREATE TRIGGER prices_write INSTEAD OF INSERT ON prices
        FOR EACH ROW EXECUTE FUNCTION prices_write();
"#;

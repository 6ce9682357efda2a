//! Integration tests for the prices API endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use prices_server::{config::Config, ingest::archive};
use sqlx::PgPool;
use tower::ServiceExt; // for `oneshot`

mod helpers;
use helpers::*;

#[sqlx::test(migrations = "../../migrations")]
async fn test_upload_returns_summary(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let response = app
        .oneshot(upload_request("prices.zip", &zip_with("data.csv", SAMPLE_CSV)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["total_items"], 2);
    assert_eq!(json["total_categories"], 2);
    assert_eq!(json["total_price"].as_f64(), Some(30.5));

    assert_eq!(count_prices(&pool).await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_short_row_is_skipped(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let csv = "product_id,name,category,id,price,create_date\n\
               1,apple,fruit,1,10.00,2024-01-01\n\
               2,bread,bakery,2,20.50\n";

    let response = app
        .oneshot(upload_request("prices.zip", &zip_with("data.csv", csv)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total_items"], 1);

    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM prices")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(names, vec!["apple".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_non_numeric_price_is_stored_as_zero(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let csv = "product_id,name,category,id,price,create_date\n\
               7,pear,fruit,1,cheap,2024-03-01\n";

    let response = app
        .oneshot(upload_request("prices.zip", &zip_with("data.csv", csv)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total_items"], 1);
    assert_eq!(json["total_price"].as_f64(), Some(0.0));

    let is_zero: bool = sqlx::query_scalar("SELECT price = 0 FROM prices WHERE product_id = 7")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(is_zero);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_non_archive_upload_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let response = app
        .oneshot(upload_request("prices.zip", b"definitely not a zip archive"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "INVALID_ARCHIVE");

    assert_eq!(count_prices(&pool).await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_missing_entry_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let response = app
        .oneshot(upload_request("prices.zip", &zip_with("readme.txt", SAMPLE_CSV)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "ENTRY_NOT_FOUND");
    assert_eq!(count_prices(&pool).await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_non_zip_filename_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let response = app
        .oneshot(upload_request("prices.csv", &zip_with("data.csv", SAMPLE_CSV)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_UPLOAD");
    assert_eq!(count_prices(&pool).await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_non_multipart_request_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PRICES_URI)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_UPLOAD");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_missing_file_field_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool);
    let body = multipart_body("attachment", "prices.zip", &zip_with("data.csv", SAMPLE_CSV));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PRICES_URI)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_nested_entry_is_found(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let response = app
        .oneshot(upload_request("prices.zip", &zip_with("foo/data.csv", SAMPLE_CSV)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(count_prices(&pool).await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_oversized_upload_is_rejected(pool: PgPool) {
    let mut config = Config::default();
    config.import.max_upload_bytes = 64;
    let app = setup_test_app_with(pool.clone(), config);

    let padding = "9,filler,misc,9,1.00,2024-01-01\n".repeat(64);
    let csv = format!("{}{}", SAMPLE_CSV, padding);

    let response = app
        .oneshot(upload_request("prices.zip", &zip_with("data.csv", &csv)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(count_prices(&pool).await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_aggregation_failure_returns_500_and_keeps_batch(pool: PgPool) {
    sqlx::raw_sql(FAILING_READS_SQL).execute(&pool).await.unwrap();
    let app = setup_test_app(pool.clone());

    let response = app
        .oneshot(upload_request("prices.zip", &zip_with("data.csv", SAMPLE_CSV)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"]["message"], "Internal Server Error");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prices_data")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_request_deadline_returns_408_and_rolls_back(pool: PgPool) {
    let mut config = Config::default();
    config.server.request_timeout_secs = 1;
    let app = setup_test_app_with(pool.clone(), config);

    // Hold the table so the import blocks until the deadline fires
    let mut blocker = pool.begin().await.unwrap();
    sqlx::query("LOCK TABLE prices IN ACCESS EXCLUSIVE MODE")
        .execute(&mut *blocker)
        .await
        .unwrap();

    let response = app
        .oneshot(upload_request("prices.zip", &zip_with("data.csv", SAMPLE_CSV)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    blocker.rollback().await.unwrap();
    assert_eq!(count_prices(&pool).await, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_export_then_reimport(pool: PgPool) {
    let app = setup_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(upload_request("prices.zip", &zip_with("data.csv", SAMPLE_CSV)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get_request(PRICES_URI)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"prices.zip\""
    );

    let exported = body_bytes(response).await;
    let entry = archive::unpack(&exported, "data.csv").unwrap();
    assert_eq!(entry.name, "data.csv");

    let response = app
        .oneshot(upload_request("prices.zip", &exported))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total_items"], 2);

    let rows: Vec<(i32, String, String, String, String)> = sqlx::query_as(
        "SELECT product_id, name, category, price::TEXT, create_date::TEXT FROM prices ORDER BY id",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0..2], rows[2..4]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_export_empty_store(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app.oneshot(get_request(PRICES_URI)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entry = archive::unpack(&body_bytes(response).await, "data.csv").unwrap();
    assert_eq!(entry.contents, b"product_id,name,category,id,price,create_date\n");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_other_methods_are_not_allowed(pool: PgPool) {
    let app = setup_test_app(pool);

    for method in ["PUT", "DELETE", "PATCH"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(PRICES_URI)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", method);
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_health_check(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "connected");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_root_reports_service(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app.oneshot(get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Prices Server");
    assert_eq!(json["status"], "running");
}

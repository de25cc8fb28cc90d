//! CSV upload behavior: per-row validation, campaign resolution by name,
//! duplicate counting (duplicates are still imported) and spend ingestion.

mod test_utils;

use axum::http::StatusCode;
use serde_json::json;

use crm::models::Role;
use test_utils::*;

const LEAD_HEADER: &str =
    "full_name,phone,email,country,city,language,source,campaign_name,utm_source,utm_medium,utm_campaign";

#[tokio::test]
async fn lead_rows_import_with_per_row_errors() {
    let TestApp { app, state } = setup_app().await;
    let admin = create_user(&state.db, Role::Admin, None).await;
    let token = token_for(admin);

    let csv = format!(
        "{LEAD_HEADER}\n\
         Ada Lovelace,+15550000001,ada@example.com,UK,London,en,meta,,,,\n\
         No Contact,,,UK,London,en,,,,,\n\
         ,+15550000002,,,,,,,,,"
    );
    // Row 3 has a phone but an empty full_name

    let (status, body) = upload_csv(&app, "/api/csv-upload/leads", &token, &csv).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 1);
    assert_eq!(body["duplicates"], 0);

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["row"], 2);
    assert!(
        errors[0]["message"]
            .as_str()
            .unwrap()
            .contains("phone or an email")
    );
    assert_eq!(errors[1]["row"], 3);

    // The imported lead is visible through the API with its CSV source
    let (status, leads) = request(&app, "GET", "/api/leads", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let lead = &leads.as_array().unwrap()[0];
    assert_eq!(lead["full_name"], "Ada Lovelace");
    assert_eq!(lead["source"], "meta");
}

#[tokio::test]
async fn unknown_campaign_rejects_the_row() {
    let TestApp { app, state } = setup_app().await;
    let admin = create_user(&state.db, Role::Admin, None).await;
    let token = token_for(admin);

    // Create one campaign; reference another
    let (status, _) = request(
        &app,
        "POST",
        "/api/campaigns",
        Some(&token),
        Some(json!({ "name": "Known Campaign" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let csv = format!(
        "{LEAD_HEADER}\n\
         With Campaign,+15550000003,,,,,csv,Known Campaign,,,\n\
         Ghost Campaign,+15550000004,,,,,csv,No Such Campaign,,,"
    );

    let (status, body) = upload_csv(&app, "/api/csv-upload/leads", &token, &csv).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 1);

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["row"], 2);
    assert!(
        errors[0]["message"]
            .as_str()
            .unwrap()
            .contains("No Such Campaign")
    );
}

#[tokio::test]
async fn duplicates_are_counted_but_still_imported() {
    let TestApp { app, state } = setup_app().await;
    let admin = create_user(&state.db, Role::Admin, None).await;
    let token = token_for(admin);

    let csv = format!(
        "{LEAD_HEADER}\n\
         First Import,+15550000005,dup@example.com,,,,,,,,"
    );
    let (status, body) = upload_csv(&app, "/api/csv-upload/leads", &token, &csv).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 1);
    assert_eq!(body["duplicates"], 0);

    // Same email again: flagged as a duplicate AND imported
    let csv = format!(
        "{LEAD_HEADER}\n\
         Second Import,+15550000006,dup@example.com,,,,,,,,"
    );
    let (status, body) = upload_csv(&app, "/api/csv-upload/leads", &token, &csv).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 1);
    assert_eq!(body["duplicates"], 1);
    assert!(body["errors"].as_array().unwrap().is_empty());

    let (_, leads) = request(&app, "GET", "/api/leads", Some(&token), None).await;
    assert_eq!(leads.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn lead_upload_rejects_sales_role() {
    let TestApp { app, state } = setup_app().await;
    let sales = create_user(&state.db, Role::Sales, None).await;

    let csv = format!("{LEAD_HEADER}\nSomeone,+15550000007,,,,,,,,,");
    let (status, body) =
        upload_csv(&app, "/api/csv-upload/leads", &token_for(sales), &csv).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn missing_required_header_is_a_file_error() {
    let TestApp { app, state } = setup_app().await;
    let admin = create_user(&state.db, Role::Admin, None).await;

    let csv = "name,telephone\nAda,+15550000008";
    let (status, body) =
        upload_csv(&app, "/api/csv-upload/leads", &token_for(admin), csv).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn spend_rows_import_per_campaign_day() {
    let TestApp { app, state } = setup_app().await;
    let marketing = create_user(&state.db, Role::Marketing, None).await;
    let admin = create_user(&state.db, Role::Admin, None).await;

    let (status, campaign) = request(
        &app,
        "POST",
        "/api/campaigns",
        Some(&token_for(admin)),
        Some(json!({ "name": "Spring Promo", "platform": "meta" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let campaign_id = campaign["id"].as_str().unwrap().to_string();

    let csv = "Date,Campaign,Spend,Currency\n\
               2026-03-01,Spring Promo,1234.56,USD\n\
               2026-03-02,Spring Promo,not-a-number,USD\n\
               2026-03-03,Unknown Campaign,10.00,USD\n\
               03/04/2026,Spring Promo,10.00,USD";

    let (status, body) =
        upload_csv(&app, "/api/csv-upload/spend", &token_for(marketing), csv).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 1);

    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 3);
    assert_eq!(errors[0]["row"], 2);
    assert!(errors[0]["message"].as_str().unwrap().contains("spend"));
    assert_eq!(errors[1]["row"], 3);
    assert_eq!(errors[2]["row"], 4);
    assert!(errors[2]["message"].as_str().unwrap().contains("date"));

    // The imported record reads back through the campaign spend endpoint
    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/campaigns/{}/spend", campaign_id),
        Some(&token_for(admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["spend_date"], "2026-03-01");
    assert_eq!(records[0]["amount_cents"], 123456);
    assert_eq!(records[0]["currency"], "USD");
}

#[tokio::test]
async fn spend_upload_rejects_manager_role() {
    let TestApp { app, state } = setup_app().await;
    let manager = create_user(&state.db, Role::Manager, None).await;

    let csv = "Date,Campaign,Spend,Currency\n2026-03-01,Any,1.00,USD";
    let (status, _) =
        upload_csv(&app, "/api/csv-upload/spend", &token_for(manager), csv).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_multipart_field_is_rejected() {
    let TestApp { app, state } = setup_app().await;
    let admin = create_user(&state.db, Role::Admin, None).await;

    use axum::{body::Body, http::Request, http::header};
    use tower::ServiceExt;

    const BOUNDARY: &str = "test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"wrongField\"\r\n\r\ndata\r\n--{b}--\r\n",
        b = BOUNDARY
    );

    let request = Request::builder()
        .method("POST")
        .uri("/api/csv-upload/leads")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(admin)))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

//! Lead and deal endpoint behavior: creation defaults, validation, partial
//! updates (including the unvalidated won/lost combinations) and the admin
//! delete route.

mod test_utils;

use axum::http::StatusCode;
use serde_json::json;

use crm::models::Role;
use test_utils::*;

#[tokio::test]
async fn lead_requires_phone_or_email() {
    let TestApp { app, state } = setup_app().await;
    let admin = create_user(&state.db, Role::Admin, None).await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/leads",
        Some(&token_for(admin)),
        Some(json!({ "full_name": "No Contact" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn sales_created_lead_defaults_to_self_ownership() {
    let TestApp { app, state } = setup_app().await;
    let sales = create_user(&state.db, Role::Sales, None).await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/leads",
        Some(&token_for(sales)),
        Some(json!({ "full_name": "Walk In", "phone": "+15550001111" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["owner_user_id"], sales.to_string());
    assert_eq!(body["status"], "new");
    assert_eq!(body["source"], "manual");
}

#[tokio::test]
async fn lead_patch_updates_status_and_clears_fields() {
    let TestApp { app, state } = setup_app().await;
    let admin = create_user(&state.db, Role::Admin, None).await;
    let lead = create_lead(&state.db, None, None).await;

    let token = token_for(admin);

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/leads/{}", lead),
        Some(&token),
        Some(json!({ "status": "qualified", "city": "Lisbon" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "qualified");
    assert_eq!(body["city"], "Lisbon");

    // Explicit null clears an optional field; absent fields stay put
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/leads/{}", lead),
        Some(&token),
        Some(json!({ "city": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["city"].is_null());
    assert_eq!(body["status"], "qualified");
}

#[tokio::test]
async fn lead_delete_requires_admin_role() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let sales = create_user(db, Role::Sales, None).await;
    let admin = create_user(db, Role::Admin, None).await;
    let lead = create_lead(db, Some(sales), None).await;

    // Even the owning sales user cannot delete
    let (status, body) = request(
        &app,
        "DELETE",
        &format!("/api/leads/{}", lead),
        Some(&token_for(sales)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/leads/{}", lead),
        Some(&token_for(admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn deal_update_applies_any_state_combination() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let admin = create_user(db, Role::Admin, None).await;
    let lead = create_lead(db, None, None).await;
    let (pipeline_id, stage_id) = create_pipeline(db).await;
    let deal = create_deal(db, lead, pipeline_id, stage_id, admin).await;

    let token = token_for(admin);

    // Mark won
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/deals/{}", deal),
        Some(&token),
        Some(json!({ "won": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "won");

    // No transition validation: a lost_reason lands on a won deal and the
    // derived state keeps reporting won
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/deals/{}", deal),
        Some(&token),
        Some(json!({ "lost_reason": "budget cut" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["won"], true);
    assert_eq!(body["lost_reason"], "budget cut");
    assert_eq!(body["state"], "won");

    // Clearing won with the reason still set derives lost
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/api/deals/{}", deal),
        Some(&token),
        Some(json!({ "won": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "lost");
}

#[tokio::test]
async fn deal_stage_must_belong_to_its_pipeline() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let admin = create_user(db, Role::Admin, None).await;
    let lead = create_lead(db, None, None).await;
    let (pipeline_id, stage_id) = create_pipeline(db).await;
    let (_other_pipeline, other_stage) = create_pipeline(db).await;

    let token = token_for(admin);

    // Creating with a stage from another pipeline fails
    let (status, body) = request(
        &app,
        "POST",
        "/api/deals",
        Some(&token),
        Some(json!({
            "lead_id": lead,
            "pipeline_id": pipeline_id,
            "stage_id": other_stage,
            "title": "Mismatched"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    // Moving an existing deal to a foreign stage fails the same way
    let deal = create_deal(db, lead, pipeline_id, stage_id, admin).await;
    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/deals/{}", deal),
        Some(&token),
        Some(json!({ "stage_id": other_stage })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pipelines_list_stages_in_order() {
    let TestApp { app, state } = setup_app().await;
    let admin = create_user(&state.db, Role::Admin, None).await;
    let token = token_for(admin);

    let (status, body) = request(
        &app,
        "POST",
        "/api/pipelines",
        Some(&token),
        Some(json!({ "name": "Enterprise", "stages": ["Intake", "Demo", "Contract"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let positions: Vec<i64> = body["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["position"].as_i64().unwrap())
        .collect();
    assert_eq!(positions, vec![0, 1, 2]);

    let (status, body) = request(&app, "GET", "/api/pipelines", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body.as_array().unwrap()[0]["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Intake", "Demo", "Contract"]);
}

#[tokio::test]
async fn pipeline_creation_is_admin_only() {
    let TestApp { app, state } = setup_app().await;
    let sales = create_user(&state.db, Role::Sales, None).await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/pipelines",
        Some(&token_for(sales)),
        Some(json!({ "name": "Rogue", "stages": ["One"] })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn duplicate_campaign_name_conflicts() {
    let TestApp { app, state } = setup_app().await;
    let admin = create_user(&state.db, Role::Admin, None).await;
    let token = token_for(admin);

    let (status, _) = request(
        &app,
        "POST",
        "/api/campaigns",
        Some(&token),
        Some(json!({ "name": "Spring Promo", "platform": "meta" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
        &app,
        "POST",
        "/api/campaigns",
        Some(&token),
        Some(json!({ "name": "Spring Promo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn campaign_creation_rejects_sales_role() {
    let TestApp { app, state } = setup_app().await;
    let sales = create_user(&state.db, Role::Sales, None).await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/campaigns",
        Some(&token_for(sales)),
        Some(json!({ "name": "Not Allowed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

//! End-to-end access-control tests covering the visibility rule table:
//! sales/marketing ownership, manager team co-membership, admin bypass, and
//! the not-found-before-forbidden ordering on nested resources.

mod test_utils;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crm::models::Role;
use test_utils::*;

#[tokio::test]
async fn sales_sees_own_lead_only() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let sales = create_user(db, Role::Sales, None).await;
    let other_sales = create_user(db, Role::Sales, None).await;
    let own_lead = create_lead(db, Some(sales), None).await;
    let other_lead = create_lead(db, Some(other_sales), None).await;
    let unowned_lead = create_lead(db, None, None).await;

    let token = token_for(sales);

    let (status, body) =
        request(&app, "GET", &format!("/api/leads/{}", own_lead), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], own_lead.to_string());

    let (status, body) =
        request(&app, "GET", &format!("/api/leads/{}", other_lead), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // Unowned leads are invisible to sales as well
    let (status, _) =
        request(&app, "GET", &format!("/api/leads/{}", unowned_lead), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The list endpoint applies the same rule
    let (status, body) = request(&app, "GET", "/api/leads", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![own_lead.to_string().as_str()]);
}

#[tokio::test]
async fn manager_sees_team_and_unowned_leads() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let team = create_team(db, "East").await;
    let other_team = create_team(db, "West").await;
    let manager = create_user(db, Role::Manager, Some(team)).await;
    let teammate = create_user(db, Role::Sales, Some(team)).await;
    let outsider = create_user(db, Role::Sales, Some(other_team)).await;
    let teamless = create_user(db, Role::Sales, None).await;

    let team_lead = create_lead(db, Some(teammate), Some(team)).await;
    let outside_lead = create_lead(db, Some(outsider), Some(other_team)).await;
    let teamless_lead = create_lead(db, Some(teamless), None).await;
    let unowned_lead = create_lead(db, None, None).await;

    let token = token_for(manager);

    let (status, _) =
        request(&app, "GET", &format!("/api/leads/{}", team_lead), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        request(&app, "GET", &format!("/api/leads/{}", unowned_lead), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        request(&app, "GET", &format!("/api/leads/{}", outside_lead), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An owner with no team is not a co-member
    let (status, _) =
        request(&app, "GET", &format!("/api/leads/{}", teamless_lead), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(&app, "GET", "/api/leads", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<String> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap().to_string())
        .collect();
    assert!(ids.contains(&team_lead.to_string()));
    assert!(ids.contains(&unowned_lead.to_string()));
    assert!(!ids.contains(&outside_lead.to_string()));
    assert!(!ids.contains(&teamless_lead.to_string()));
}

#[tokio::test]
async fn manager_without_team_sees_nothing() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let manager = create_user(db, Role::Manager, None).await;
    let unowned_lead = create_lead(db, None, None).await;

    let token = token_for(manager);

    let (status, _) =
        request(&app, "GET", &format!("/api/leads/{}", unowned_lead), Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(&app, "GET", "/api/leads", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_sees_everything() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let admin = create_user(db, Role::Admin, None).await;
    let sales = create_user(db, Role::Sales, None).await;
    let lead = create_lead(db, Some(sales), None).await;

    let token = token_for(admin);

    let (status, _) =
        request(&app, "GET", &format!("/api/leads/{}", lead), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&app, "GET", "/api/leads", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_lead_is_not_found_never_forbidden() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let sales = create_user(db, Role::Sales, None).await;
    let token = token_for(sales);
    let missing = Uuid::new_v4();

    // Lead endpoints
    let (status, body) =
        request(&app, "GET", &format!("/api/leads/{}", missing), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    // Note listing and creation report 404 for the missing lead, not 403
    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/leads/{}/notes", missing),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/leads/{}/notes", missing),
        Some(&token),
        Some(json!({ "body": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn note_creation_checks_access_and_rejects_empty_body() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let owner = create_user(db, Role::Sales, None).await;
    let stranger = create_user(db, Role::Sales, None).await;
    let lead = create_lead(db, Some(owner), None).await;

    // A non-owner gets 403 on an existing lead
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/leads/{}/notes", lead),
        Some(&token_for(stranger)),
        Some(json!({ "body": "sneaky note" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner cannot store an empty note
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/leads/{}/notes", lead),
        Some(&token_for(owner)),
        Some(json!({ "body": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    // And a valid note lands
    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/leads/{}/notes", lead),
        Some(&token_for(owner)),
        Some(json!({ "body": "called, follow up Friday" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["body"], "called, follow up Friday");
    assert_eq!(body["user_id"], owner.to_string());
}

#[tokio::test]
async fn deal_creation_requires_lead_access() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let owner = create_user(db, Role::Sales, None).await;
    let stranger = create_user(db, Role::Sales, None).await;
    let lead = create_lead(db, Some(owner), None).await;
    let (pipeline_id, stage_id) = create_pipeline(db).await;

    let payload = json!({
        "lead_id": lead,
        "pipeline_id": pipeline_id,
        "stage_id": stage_id,
        "title": "Big deal"
    });

    // The lead exists, but a sales user who does not own it is rejected
    let (status, body) = request(
        &app,
        "POST",
        "/api/deals",
        Some(&token_for(stranger)),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    // The owner succeeds
    let (status, body) = request(
        &app,
        "POST",
        "/api/deals",
        Some(&token_for(owner)),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created_by"], owner.to_string());
    assert_eq!(body["state"], "open");
}

#[tokio::test]
async fn deal_delete_is_creator_only_for_sales() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let team = create_team(db, "East").await;
    let owner = create_user(db, Role::Sales, Some(team)).await;
    let colleague = create_user(db, Role::Sales, Some(team)).await;
    let lead = create_lead(db, Some(owner), Some(team)).await;
    let (pipeline_id, stage_id) = create_pipeline(db).await;
    let deal = create_deal(db, lead, pipeline_id, stage_id, owner).await;

    // A different sales user cannot delete someone else's deal, even on a
    // lead they could otherwise never see
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/deals/{}", deal),
        Some(&token_for(colleague)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The creator can
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/deals/{}", deal),
        Some(&token_for(owner)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/deals/{}", deal),
        Some(&token_for(owner)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deal_delete_admin_bypasses_creator_rule() {
    let TestApp { app, state } = setup_app().await;
    let db = &state.db;

    let admin = create_user(db, Role::Admin, None).await;
    let owner = create_user(db, Role::Sales, None).await;
    let lead = create_lead(db, Some(owner), None).await;
    let (pipeline_id, stage_id) = create_pipeline(db).await;
    let deal = create_deal(db, lead, pipeline_id, stage_id, owner).await;

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/deals/{}", deal),
        Some(&token_for(admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let TestApp { app, .. } = setup_app().await;

    let (status, body) = request(&app, "GET", "/api/leads", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn token_for_deleted_user_is_unauthorized() {
    let TestApp { app, .. } = setup_app().await;

    let token = token_for(Uuid::new_v4());
    let (status, _) = request(&app, "GET", "/api/leads", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

#[tokio::test]
async fn creator_is_recorded_and_not_a_member() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;

    let res = app.post("/projects", &creator, json!({ "title": "Launch" })).await?;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["creator_id"], creator.id.as_str());

    let project_id = res.body["data"]["id"].as_str().unwrap_or_default().to_string();
    assert!(app.member_ids(&creator, &project_id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn project_title_is_required() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;

    let res = app.post("/projects", &creator, json!({})).await?;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.body["field_errors"].get("title").is_some());
    Ok(())
}

#[tokio::test]
async fn listing_is_paginated_with_optional_includes() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;
    for n in 0..3 {
        let project_id = app.create_project(&creator, &format!("Project {}", n)).await?;
        app.create_task(&creator, &project_id, "First task").await?;
    }

    let page = app.get("/projects?per_page=2&page=2", &creator).await?;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["meta"]["total"], 3);
    assert_eq!(page.body["meta"]["per_page"], 2);
    assert_eq!(page.body["meta"]["current_page"], 2);
    assert_eq!(page.body["meta"]["last_page"], 2);
    assert_eq!(page.body["data"].as_array().map(Vec::len), Some(1));
    assert!(page.body["data"][0].get("tasks").is_none());

    let included = app.get("/projects?include=tasks,members", &creator).await?;
    assert_eq!(included.status, StatusCode::OK);
    assert_eq!(included.body["data"][0]["tasks"].as_array().map(Vec::len), Some(1));
    assert_eq!(included.body["data"][0]["members"], json!([]));

    let unknown = app.get("/projects?include=owner", &creator).await?;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn only_the_creator_may_update_or_delete() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;
    let other = app.register("other").await?;
    let project_id = app.create_project(&creator, "Launch").await?;
    let uri = format!("/projects/{}", project_id);

    let denied = app
        .request(Method::PUT, &uri, Some(&other.token), Some(json!({ "title": "Hijacked" })))
        .await?;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["message"], "This action is unauthorized.");

    let renamed = app.patch(&uri, &creator, Some(json!({ "title": "Relaunch" }))).await?;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["data"]["title"], "Relaunch");

    let delete_denied = app.delete(&uri, &other).await?;
    assert_eq!(delete_denied.status, StatusCode::FORBIDDEN);

    let deleted = app.delete(&uri, &creator).await?;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.get(&uri, &creator).await?;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn project_with_tasks_cannot_be_deleted() -> Result<()> {
    let app = TestApp::new();
    let creator = app.register("creator").await?;
    let project_id = app.create_project(&creator, "Launch").await?;
    let task_id = app.create_task(&creator, &project_id, "Blocker").await?;
    let uri = format!("/projects/{}", project_id);

    let refused = app.delete(&uri, &creator).await?;
    assert_eq!(refused.status, StatusCode::CONFLICT);

    app.delete(&format!("/tasks/{}", task_id), &creator).await?;
    let deleted = app.delete(&uri, &creator).await?;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn unknown_ids_are_not_found() -> Result<()> {
    let app = TestApp::new();
    let user = app.register("user").await?;

    let missing = app.get(&format!("/projects/{}", Uuid::new_v4()), &user).await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let malformed = app.get("/projects/42", &user).await?;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);
    Ok(())
}

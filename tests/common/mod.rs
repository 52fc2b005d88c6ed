#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use taskboard_api::app::{app, AppState};
use taskboard_api::database::MemoryStore;

/// In-process server backed by a fresh in-memory store
pub struct TestApp {
    router: Router,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub const PASSWORD: &str = "correct-horse-battery";

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            router: app(AppState::new(store)),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> Result<TestResponse> {
        self.request(Method::GET, uri, Some(&user.token), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(&user.token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, user: &TestUser, body: Option<Value>) -> Result<TestResponse> {
        self.request(Method::PATCH, uri, Some(&user.token), body).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, Some(&user.token), None).await
    }

    /// Register a user with a unique email and return its token
    pub async fn register(&self, name: &str) -> Result<TestUser> {
        let email = format!("{}-{}@example.com", name, Uuid::new_v4().simple());
        let res = self
            .request(
                Method::POST,
                "/register",
                None,
                Some(json!({ "name": name, "email": email, "password": PASSWORD })),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "register failed: {:?}", res);

        Ok(TestUser {
            id: string_at(&res.body, "/user/id")?,
            email,
            token: string_at(&res.body, "/token")?,
        })
    }

    pub async fn create_project(&self, creator: &TestUser, title: &str) -> Result<String> {
        let res = self.post("/projects", creator, json!({ "title": title })).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create project failed: {:?}", res);
        string_at(&res.body, "/data/id")
    }

    pub async fn create_task(&self, creator: &TestUser, project_id: &str, title: &str) -> Result<String> {
        let res = self
            .post("/tasks", creator, json!({ "title": title, "project_id": project_id }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create task failed: {:?}", res);
        string_at(&res.body, "/data/id")
    }

    pub async fn attach(&self, actor: &TestUser, project_id: &str, member: &TestUser) -> Result<TestResponse> {
        let uri = format!("/projects/{}/members/{}", project_id, member.id);
        self.request(Method::POST, &uri, Some(&actor.token), None).await
    }

    pub async fn detach(&self, actor: &TestUser, project_id: &str, member: &TestUser) -> Result<TestResponse> {
        let uri = format!("/projects/{}/members/{}", project_id, member.id);
        self.delete(&uri, actor).await
    }

    pub async fn assign(&self, actor: &TestUser, task_id: &str, user: &TestUser) -> Result<TestResponse> {
        let uri = format!("/tasks/{}/assign/{}", task_id, user.id);
        self.patch(&uri, actor, None).await
    }

    /// Member ids as reported by the project resource
    pub async fn member_ids(&self, viewer: &TestUser, project_id: &str) -> Result<Vec<String>> {
        let res = self.get(&format!("/projects/{}", project_id), viewer).await?;
        let members = res.body["data"]["members"]
            .as_array()
            .context("project resource has no members array")?;
        Ok(members
            .iter()
            .filter_map(|m| m["id"].as_str().map(str::to_string))
            .collect())
    }

    /// Assignee id as reported by the task resource
    pub async fn assignee_id(&self, viewer: &TestUser, task_id: &str) -> Result<Option<String>> {
        let res = self.get(&format!("/tasks/{}", task_id), viewer).await?;
        Ok(res.body["data"]["assigned_to"]["id"].as_str().map(str::to_string))
    }
}

pub fn string_at(body: &Value, pointer: &str) -> Result<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .with_context(|| format!("missing string at {} in {}", pointer, body))
}

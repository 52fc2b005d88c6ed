use std::collections::HashMap;

use uuid::Uuid;

use crate::config;
use crate::database::models::{Project, Task, User};
use crate::database::EntityStore;
use crate::error::ApiError;
use crate::filter::{FilterError, PageRequest};

const MAX_TITLE_LENGTH: usize = 255;

/// Route ids that are not UUIDs cannot name anything
fn parse_id(raw: &str, kind: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("{} not found", kind)))
}

pub async fn find_project(store: &dyn EntityStore, raw: &str) -> Result<Project, ApiError> {
    let id = parse_id(raw, "Project")?;
    store
        .load_project(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

pub async fn find_task(store: &dyn EntityStore, raw: &str) -> Result<Task, ApiError> {
    let id = parse_id(raw, "Task")?;
    store
        .load_task(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))
}

pub async fn find_user(store: &dyn EntityStore, raw: &str) -> Result<User, ApiError> {
    let id = parse_id(raw, "User")?;
    store
        .load_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

fn parse_page_number(field: &str, raw: Option<&str>) -> Result<Option<u32>, FilterError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| FilterError::InvalidPage(format!("{}={}", field, value))),
    }
}

/// Page request from raw `page` and `per_page` query values, clamped to config
pub fn page_request(page: Option<&str>, per_page: Option<&str>) -> Result<PageRequest, ApiError> {
    let api = &config::config().api;
    Ok(PageRequest::new(
        parse_page_number("page", page)?,
        parse_page_number("per_page", per_page)?,
        api.default_per_page,
        api.max_per_page,
    ))
}

/// Collects per-field messages and turns them into a single 422
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: HashMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Trimmed, non-empty value of a required text field
    pub fn required(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.add(field, format!("The {} field is required.", field));
                None
            }
        }
    }

    /// Required title, at most 255 characters
    pub fn title(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let title = self.required(field, value)?;
        if title.chars().count() > MAX_TITLE_LENGTH {
            self.add(field, format!("The {} may not be greater than {} characters.", field, MAX_TITLE_LENGTH));
            return None;
        }
        Some(title)
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let email = self.required(field, value)?;
        if !looks_like_email(&email) {
            self.add(field, format!("The {} must be a valid email address.", field));
            return None;
        }
        Some(email.to_lowercase())
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(ApiError::unprocessable_entity("The given data was invalid.", self.errors))
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !value.chars().any(char::is_whitespace)
}

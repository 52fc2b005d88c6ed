// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every route here runs behind `jwt_auth_middleware`, which puts the caller's
// `Actor` and `User` into request extensions. Ids in the path are resolved
// to entities (404 when absent) before any policy is consulted.

pub mod auth;     // Session and current user
pub mod me;       // The caller's own tasks
pub mod members;  // Project membership
pub mod projects; // Project CRUD
pub mod tasks;    // Task CRUD and assignment

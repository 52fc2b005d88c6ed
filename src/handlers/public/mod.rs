// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition. Everything else sits behind the JWT middleware.

pub mod auth;

// handlers/mod.rs - HTTP handlers by security tier
//
// Public (no auth) → Protected (JWT auth)

pub mod protected; // Bearer token required
pub mod public;    // Registration and login
pub mod utils;     // Id resolution, paging and field validation

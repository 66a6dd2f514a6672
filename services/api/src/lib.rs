//! Internship-matching API
//!
//! Authenticates users, stores profiles and internship listings, and
//! brokers recommendation requests to an external scoring service.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod recommendations;
pub mod repositories;
pub mod routes;
pub mod scoring;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;

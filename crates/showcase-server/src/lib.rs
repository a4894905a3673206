//! Showcase Server - judging API for the Showcase hackathon platform
//!
//! This crate exposes judge assignments, submissions, evaluation status,
//! the leaderboard and completion certificates over HTTP, backed by
//! PostgreSQL. The judging rules themselves live in `showcase_scoring`.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod queries;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;

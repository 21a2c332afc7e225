//! JSON API over trivia questions and categories backed by SQLite.

pub mod config;
pub mod db;
pub mod pagination;
pub mod server;
pub mod telemetry;

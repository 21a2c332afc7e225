pub mod app;
mod deserializers;
pub mod error;
mod extract;
mod routes;


pub use app::{router, run_server, AppState};
pub use error::ApiError;

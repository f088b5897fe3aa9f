//! HTTP surface for the time API.

mod handlers;
mod server;

pub use handlers::AppState;
pub use server::{router, HttpServer};

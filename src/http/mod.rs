//! HTTP API and viewer page

pub mod handler;
pub mod server;

pub use server::{router, AppState, HttpServer};

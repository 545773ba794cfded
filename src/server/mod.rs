//! HTTP surface: routing and snapshot rendering.

pub mod http;
pub mod render;

pub use http::{AppState, create_router};

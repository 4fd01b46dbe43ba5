// Presentation layer - HTTP surface over the refresh cycle
pub mod app_state;
pub mod handlers;
pub mod routes;

//! # Dayline App
//!
//! HTTP boundary over the calendar engine: route handlers, dependency
//! wiring, and process startup helpers.

pub mod context;
pub mod routes;

pub use context::AppContext;
pub use routes::router;

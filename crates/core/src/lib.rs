//! # Dayline Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits) for providers and storage
//! - The sync orchestrator service
//! - The timeline layout engine
//!
//! ## Architecture Principles
//! - Only depends on `dayline-common` and `dayline-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod sync;
pub mod timeline;

// Re-export specific items to avoid ambiguity
pub use sync::ports::{
    CalendarProvider, EventRepository, SecretStore, SourceCatalog, SyncStateRepository,
};
pub use sync::SyncService;
pub use timeline::build_timeline;

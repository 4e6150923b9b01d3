//! Calendar provider implementations.

pub mod feed;
pub mod google;

pub use feed::FeedCalendarProvider;
pub use google::GoogleCalendarProvider;

//! Video discovery over the YouTube Data API: query building, paginated search
//! sessions, result normalization and the listings behind each dashboard tab.

pub mod analytics;
pub mod constants;
pub mod error;
pub mod filters;
pub mod format;
pub mod normalize;
pub mod query;
pub mod scroll;
pub mod service;
pub mod session;
pub mod youtube;

#[cfg(test)]
mod test_support;

//! The crawl/resume traversal and the pieces it is built from.

pub mod engine;
pub mod failure;
pub mod lifecycle;
pub mod resume;
pub mod state;
pub mod throttle;

#[cfg(test)]
mod tests;

pub use engine::CrawlEngine;
pub use failure::{ConnectionFailureClassifier, FailureClassifier};
pub use lifecycle::{PageLease, PageLifecycle, close_session};
pub use resume::{ResumeState, ResumeStateBuilder};
pub use state::{CrawlState, PageIndexCounter, VisitedSet};
pub use throttle::ThrottleGate;

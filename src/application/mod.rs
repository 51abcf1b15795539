// Application layer - the operations a presentation layer calls.
// Nothing in here prompts or prints; callers render the returned data.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;

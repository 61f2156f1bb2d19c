//! Error handling for streaming sessions.
//!
//! - **Error Categories**: what kind of failure ended a session, and whether
//!   the controller retries it
//! - **`StreamError`**: the single error type delivered to error callbacks
//!
//! | Category | Description | Retried |
//! |----------|-------------|---------|
//! | Capability | Response exposes no byte stream | No |
//! | Establishment | Request failed before data arrived | Yes, up to `retry` |
//! | Read | Open stream failed mid-way | No |
//! | Cancellation | Caller cancelled via the handle | No |
//!
//! Transport failures themselves are [`crate::traits::HttpError`].

mod category;
mod stream;

pub use category::ErrorCategory;
pub use stream::{StreamError, CANCELLED_MESSAGE, UNSUPPORTED_MESSAGE};

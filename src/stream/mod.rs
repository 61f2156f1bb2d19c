//! Cancellable, retryable streaming of HTTP response bodies.
//!
//! [`stream`] issues a request through an [`crate::traits::HttpClient`] and
//! pumps the decoded body to a chunk callback on a dedicated task. The three
//! callbacks map to "yield item", "end normally" and "end with failure".
//!
//! # Lifecycle
//!
//! ```text
//! Pending -> Active -> Completed
//!              |  \--> Failed
//!              |   \-> Cancelled
//!              +-- retry (Active -> Active)
//! ```
//!
//! Only establishment failures are retried. Once bytes have been delivered a
//! read failure ends the session, since restarting would duplicate or lose
//! data.

mod controller;
mod decoder;
mod session;

pub use controller::stream;
pub use decoder::Utf8Decoder;
pub use session::{CancelHandle, SessionState, StreamHandle};

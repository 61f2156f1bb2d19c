//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (buffered and streaming)

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError, Response, StreamingResponse};

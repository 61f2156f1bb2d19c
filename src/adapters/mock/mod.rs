//! Mock implementations for testing.
//!
//! Test doubles for the trait abstractions, enabling unit testing without
//! network dependencies.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with scripted responses

pub mod http;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};

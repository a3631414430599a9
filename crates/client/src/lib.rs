//! Remote data collaborator for the vendor management backend.
//!
//! [`Backend`] is the seam the services depend on; [`HttpBackend`] talks to
//! the real API over HTTP.

#![warn(missing_docs)]

mod backend;
mod config;
mod error;
mod http;

pub use backend::{endpoints, Ack, Backend};
pub use config::{ClientConfig, DEFAULT_ANALYZE_TIMEOUT, DEFAULT_TIMEOUT};
pub use error::{ApiError, Result};
pub use http::HttpBackend;

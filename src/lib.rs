//! Request construction and dispatch core for a REST API tester.
//!
//! The crate turns a user-authored request description into an HTTP call and
//! normalizes whatever comes back into a single outcome value.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - **models**: Request descriptions, compiled requests and dispatch outcomes
//! - **variables**: `{{name}}` placeholder substitution
//! - **auth**: Authorization headers derived from an auth config
//! - **compiler**: Pure compilation of a description against environment bindings
//! - **executor**: The HTTP dispatcher with timeouts and cancellation
//! - **environment**: Named variable sets with one active environment
//! - **history**: Bounded, newest-first log of completed dispatches
//! - **collections**: Saved requests and named collections
//! - **storage**: The key-value store everything persists through
//! - **export**: cURL, fetch and Python renderings of a compiled request
//! - **config**: Global settings
//! - **client**: The facade that runs the whole pipeline
//!
//! # Pipeline
//!
//! A send takes these steps:
//! 1. Snapshot the active environment's bindings
//! 2. Compile the description: resolve placeholders, append query parameters,
//!    attach auth and default content type, drop the body for methods that
//!    carry none
//! 3. Dispatch with a timeout and a cancel handle
//! 4. Normalize the result into `Success` (any HTTP status) or `Failure`
//!    (network, timeout, aborted)
//! 5. Record the outcome in history
//!
//! # Example
//!
//! ```
//! use apicraft::compiler::compile;
//! use apicraft::models::{AuthConfig, HttpMethod, RequestDescription};
//! use apicraft::variables::Bindings;
//!
//! let mut bindings = Bindings::new();
//! bindings.insert("host".to_string(), "api.example.com".to_string());
//! bindings.insert("token".to_string(), "secret".to_string());
//!
//! let description = RequestDescription::new(HttpMethod::GET, "https://{{host}}/users")
//!     .with_param("page", "1")
//!     .with_auth(AuthConfig::Bearer { token: "{{token}}".to_string() });
//!
//! let request = compile(&description, &bindings);
//! assert_eq!(request.url, "https://api.example.com/users?page=1");
//! assert_eq!(request.header("authorization"), Some("Bearer secret"));
//! ```

pub mod auth;
pub mod client;
pub mod collections;
pub mod compiler;
pub mod config;
pub mod environment;
pub mod executor;
pub mod export;
pub mod history;
pub mod models;
pub mod storage;
pub mod variables;

pub use client::{ApiClient, ClientError};
pub use compiler::compile;
pub use executor::{CancelHandle, Dispatcher, InFlight};
pub use models::{
    CompiledRequest, FailureKind, HttpMethod, RequestDescription, ResponseOutcome,
};

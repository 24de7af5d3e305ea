//! Data models for requests and dispatch outcomes.
//!
//! This module contains the core data structures shared by the compiler, the
//! dispatcher, history and collections.

pub mod request;
pub mod response;

pub use request::{
    AuthConfig, BodyType, CompiledRequest, HttpMethod, KeyValuePair, RequestDescription,
    DEFAULT_TIMEOUT_MS,
};
pub use response::{
    FailureKind, ResponseBody, ResponseData, ResponseFailure, ResponseFormat, ResponseOutcome,
};

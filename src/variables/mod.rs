//! Variable resolution for request descriptions.
//!
//! Environments supply `{{name}}` bindings; this module substitutes them into
//! URLs, header and parameter values, and bodies.

pub mod substitution;

pub use substitution::{
    find_placeholders, resolve, resolve_optional, unresolved_placeholders, Bindings,
};

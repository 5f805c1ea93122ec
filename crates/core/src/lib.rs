//! Domain types shared by the providers, pipeline and API crates.
//!
//! Has no internal dependencies so every other crate can build on it.

pub mod error;
pub mod naming;
pub mod pipeline;
pub mod requests;
pub mod types;

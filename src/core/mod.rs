//! Core rule evaluation
//!
//! - [`rules`] - patterns, guards, the matcher and its decision cache
//! - [`validation`] - resource path and capture name validation
//! - [`loader`] - TOML / JSON rule documents

pub mod loader;
pub mod rules;
pub mod validation;

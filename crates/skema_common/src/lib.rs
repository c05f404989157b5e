//! Shared foundational types for the Skema design database.
//!
//! This crate provides interned identifiers for entity names and the
//! common result types used throughout the database core.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{InternalError, SkemaResult};

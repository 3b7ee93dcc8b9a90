//! Domains module containing business logic organized by bounded contexts.
//!
//! The server has a single domain today: pluggable tools.

pub mod tools;

//! Use-case services over the repositories.
//!
//! # Responsibility
//! - Orchestrate repository calls into batch load use-cases.
//! - Own transaction boundaries so repositories stay single-statement.

pub mod loader;

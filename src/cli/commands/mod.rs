//! CLI command implementations.

pub mod aggregate;
pub mod quote;
pub mod run;
pub mod validate;

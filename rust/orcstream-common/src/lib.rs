//! Core definitions (error types and result helpers), relied upon by all orcstream-* crates.

pub mod error;
pub mod result;

pub use result::Result;

//! CLI entry checks
//!
//! Steps that run once before any command is dispatched.

pub mod bootstrap;
pub mod preflight;

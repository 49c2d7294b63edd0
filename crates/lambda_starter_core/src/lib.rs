//! Shared Lambda starter primitives.
//!
//! This crate owns the canonical event shape, the execution context, the
//! response envelope, and event classification/routing. It intentionally
//! excludes Lambda runtime and HTTP concerns; those live in `lambda_starter`.

pub mod clock;
pub mod config;
pub mod context;
pub mod contract;
pub mod dispatch;
pub mod error;

//! Lambda runtime integration for the starter function.
//!
//! This crate owns the handler facade, the example service, the adapters that
//! turn Lambda invocations, fixtures and HTTP requests into canonical events,
//! and the local emulation server. Transport-free contracts live in
//! `lambda_starter_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod local;
pub mod logging;
pub mod responses;
pub mod services;

//! HTTP emulation of the Lambda trigger surface for local development.

pub mod server;

pub use server::{route, serve, LocalState};

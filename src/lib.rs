//! Session and data-access layer for the commerce platform admin console,
//! plus the CLI command surface that exercises it.
pub mod api;
pub mod config;
pub mod console;
pub mod guard;
pub mod normalize;
pub mod poller;
pub mod session;

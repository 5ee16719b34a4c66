#![deny(missing_docs)]

//! Core library for the LDAP HTTP gateway.

/// HTTP routing and REST handlers.
pub mod api;
/// Flag- and environment-driven configuration management.
pub mod config;
/// Directory connection, search session, and result aggregation.
pub mod directory;
/// Structured logging and tracing setup.
pub mod logging;
/// Request-to-query translation helpers.
pub mod query;

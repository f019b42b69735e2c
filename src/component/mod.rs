//! The animation component: configuration, asynchronous initialization and the per-tick
//! lifecycle that ties a backend, the frame clock and a display node together.

/// Constructor options.
pub mod config;
pub(crate) mod init;
/// State machine and public operations.
pub mod lifecycle;

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, request span, timeout)
//!     → strategy (rule lookup, redirect / proxy / fallback)
//!     → response.rs (strategy errors → status codes)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use server::{shutdown_signal, AppState, HttpServer};

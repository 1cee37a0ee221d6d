//! Reverse proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request + rewritten target URL
//!     → reverse.rs (parse target, carry query, read body once)
//!     → headers.rs (copy headers, rewrite Host)
//!     → upstream.rs (send over the shared client)
//!     → upstream status/headers/body streamed back unchanged
//! ```
//!
//! # Design Decisions
//! - The target must be an absolute URL; anything else is InvalidTarget
//! - Failures are typed (unreachable, timeout, bad target) and mapped to
//!   gateway responses by the HTTP layer
//! - Transport sits behind a trait so it can be replaced in tests

pub mod headers;
pub mod reverse;
pub mod upstream;

pub use headers::reverse_proxy_headers;
pub use reverse::{upstream_url, ReverseProxy};
pub use upstream::{HttpUpstream, UpstreamClient, UpstreamError, UpstreamRequest};

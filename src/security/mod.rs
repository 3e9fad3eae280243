//! Request filtering subsystem.
//!
//! # Data Flow
//! ```text
//! Request that missed the static asset lookup:
//!     → headers.rs (framing headers on whatever comes back)
//!     → gate.rs (run installed filters in order)
//!         → bots.rs (user-agent pattern)
//!         → geo.rs (country allow-list, optional)
//!         → origin.rs (referer prefix with exemptions)
//!     → loader endpoint / SPA fallback
//! ```
//!
//! # Design Decisions
//! - Each filter only reads the request; no per-request state
//! - First rejection wins and is terminal (403)
//! - Bot matching reads the raw `User-Agent` bytes, so nothing is unreadable
//! - An unreadable country header is rejected; an empty one counts as missing
//! - An unreadable `Referer` fails the prefix test; an unreadable `Host`
//!   falls back to the URI authority, and with neither the request is unguarded

pub mod bots;
pub mod gate;
pub mod geo;
pub mod headers;
pub mod origin;
pub mod rejection;

use axum::body::Body;
use axum::http::Request;

pub use bots::BotFilter;
pub use gate::{gate_middleware, Gate};
pub use geo::GeoFilter;
pub use headers::{security_headers_middleware, SecurityHeaders};
pub use origin::OriginFilter;
pub use rejection::Rejection;

/// A single stage of the gate.
pub trait RequestFilter: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Let the request through or reject it.
    fn check(&self, req: &Request<Body>) -> Result<(), Rejection>;
}

/// Header value as text, `None` when missing or not visible ASCII.
pub(crate) fn header_str<'a>(req: &'a Request<Body>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

//! Edge gate: static SPA delivery behind request-level access filters.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

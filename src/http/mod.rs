//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, transport middleware)
//!     → request.rs (request ID, trace span)
//!     → assets.rs (static file hit? serve and stop)
//!     → security (framing headers, bot/geo/origin filters)
//!     → handlers.rs (loader probe or SPA fallback)
//!     → Send to client
//! ```

pub mod assets;
pub mod handlers;
pub mod request;
pub mod server;

pub use handlers::LoaderStatus;
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::HttpServer;

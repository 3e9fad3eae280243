//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files, and
//! every section falls back to defaults so a minimal (or absent) file works.

use serde::{Deserialize, Serialize};

/// Bot signature used when none is configured.
pub const DEFAULT_BOT_PATTERN: &str = "(bot|crawl|spider|slurp|bing|ahrefs|semrush|facebookexternalhit|python-requests|curl|wget|java|headless|node)";

/// Root configuration for the edge gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Static asset delivery and the SPA document.
    pub assets: AssetsConfig,

    /// Headers injected into every gated response.
    pub headers: HeadersConfig,

    /// User-agent based bot rejection.
    pub bots: BotConfig,

    /// Country allow-list.
    pub geo: GeoConfig,

    /// Referer-based origin check.
    pub origin: OriginConfig,

    /// Loader probe endpoint.
    pub loader: LoaderConfig,

    /// Shape of 403 bodies.
    pub rejection: RejectionConfig,

    /// Transport-level middleware.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// TCP port. The `PORT` environment variable takes precedence.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory served verbatim.
    pub public_root: String,

    /// SPA document, relative to `public_root`.
    pub index_file: String,

    /// `max-age` for asset hits, in seconds.
    pub max_age_secs: u64,

    /// Append `immutable` to the asset `Cache-Control`.
    pub immutable: bool,

    /// Emit a weak ETag on asset hits.
    pub etag: bool,

    /// Keep `Last-Modified` on asset hits.
    pub last_modified: bool,

    /// `Cache-Control` for the SPA fallback document, if any.
    pub index_cache_control: Option<String>,
}

impl AssetsConfig {
    /// `Cache-Control` value attached to asset hits.
    pub fn cache_control(&self) -> String {
        if self.immutable {
            format!("public, max-age={}, immutable", self.max_age_secs)
        } else {
            format!("public, max-age={}", self.max_age_secs)
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            public_root: "public".to_string(),
            index_file: "index.html".to_string(),
            max_age_secs: 31_536_000,
            immutable: true,
            etag: true,
            last_modified: true,
            index_cache_control: None,
        }
    }
}

/// Framing headers. The defaults allow embedding from any origin.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HeadersConfig {
    pub enabled: bool,
    pub frame_options: String,
    pub content_security_policy: String,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frame_options: "ALLOWALL".to_string(),
            content_security_policy: "frame-ancestors *".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    pub enabled: bool,

    /// Regex matched case-insensitively against `User-Agent`.
    pub pattern: String,

    pub message: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pattern: DEFAULT_BOT_PATTERN.to_string(),
            message: "Bots not allowed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeoConfig {
    pub enabled: bool,

    /// Header set by the fronting proxy (e.g. Cloudflare).
    pub header: String,

    /// Two-letter country codes let through.
    pub allowed_countries: Vec<String>,

    /// Value the proxy uses when it could not geolocate the client.
    pub unknown_sentinel: String,

    /// Treat a missing header like the unknown sentinel.
    pub allow_missing: bool,

    pub message: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            header: "cf-ipcountry".to_string(),
            allowed_countries: vec!["JP".to_string()],
            unknown_sentinel: "UNKNOWN".to_string(),
            allow_missing: true,
            message: "Access blocked by country".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    pub enabled: bool,

    /// Referer prefix that grants access.
    pub allowed_origin: String,

    /// Path suffixes that are always public.
    pub exempt_extensions: Vec<String>,

    /// Exact paths that are always public.
    pub exempt_paths: Vec<String>,

    pub message: String,

    /// Distinct message for `?loader=true` requests, when set.
    pub loader_query_message: Option<String>,

    /// Only enforce the referer check when `Host` contains this value.
    pub host_guard: Option<String>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origin: "https://greencrafter.space".to_string(),
            exempt_extensions: [
                ".html", ".css", ".js", ".webp", ".jpg", ".png", ".svg", ".mp3", ".mp4",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            exempt_paths: vec!["/".to_string()],
            message: "Direct access not allowed".to_string(),
            loader_query_message: Some("Direct loader access blocked".to_string()),
            host_guard: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub path: String,

    /// Mark the probe response `Cache-Control: no-store`.
    pub no_store: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            path: "/frontend-loader".to_string(),
            no_store: false,
        }
    }
}

/// Body encoding for 403 responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectionFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RejectionConfig {
    pub format: RejectionFormat,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Answer CORS with `Access-Control-Allow-Origin: *`.
    pub cors_any_origin: bool,

    /// Gzip responses when the client accepts it.
    pub compression: bool,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_any_origin: true,
            compression: true,
            max_body_bytes: 10 * 1024,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

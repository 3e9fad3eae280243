//! User-agent based bot rejection.

use axum::body::Body;
use axum::http::{header, Request};
use regex::bytes::{Regex, RegexBuilder};

use crate::config::BotConfig;
use crate::security::{Rejection, RequestFilter};

/// Rejects requests whose `User-Agent` matches the bot signature.
/// The raw header bytes are matched, so non-ASCII bytes cannot hide a
/// token. A missing agent is matched as the empty string.
#[derive(Debug, Clone)]
pub struct BotFilter {
    pattern: Regex,
    message: String,
}

impl BotFilter {
    pub fn new(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            pattern,
            message: message.into(),
        })
    }

    pub fn from_config(config: &BotConfig) -> Result<Self, regex::Error> {
        Self::new(&config.pattern, config.message.clone())
    }

    pub fn is_bot(&self, user_agent: impl AsRef<[u8]>) -> bool {
        self.pattern.is_match(user_agent.as_ref())
    }
}

impl RequestFilter for BotFilter {
    fn name(&self) -> &'static str {
        "bots"
    }

    fn check(&self, req: &Request<Body>) -> Result<(), Rejection> {
        let ua = req
            .headers()
            .get(header::USER_AGENT)
            .map(|v| v.as_bytes())
            .unwrap_or_default();
        if self.is_bot(ua) {
            return Err(Rejection::new(self.name(), self.message.clone()));
        }
        Ok(())
    }
}

use reqwest::Url;
use thiserror::Error;
use tracing::{error, Level};

pub const DEFAULT_API_BASE: &str = "/api/";

/// Uploads larger than this are rejected before any request is made.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("relative api base `{0}` needs a page origin")]
    MissingOrigin(String),
    #[error("invalid api base `{base}`: {reason}")]
    InvalidBase { base: String, reason: String },
    #[error("unknown log level `{0}`")]
    UnknownLevel(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: Url,
    pub log_level: Level,
}

impl AppConfig {
    /// Reads the build-time settings and resolves the api base against the
    /// page origin. An unusable base falls back to the default one.
    pub fn load() -> Result<Self, ConfigError> {
        let origin = web_sys::window().and_then(|window| window.location().origin().ok());

        let base = option_env!("EQUIPMENT_API_BASE").unwrap_or(DEFAULT_API_BASE);
        let api_base = resolve_api_base(base, origin.as_deref()).or_else(|err| {
            error!("{err}, using {DEFAULT_API_BASE}");
            resolve_api_base(DEFAULT_API_BASE, origin.as_deref())
        })?;

        Ok(Self {
            api_base,
            log_level: log_level(),
        })
    }
}

/// Max tracing level, read before anything else so that config loading
/// itself is logged.
pub fn log_level() -> Level {
    match option_env!("EQUIPMENT_LOG_LEVEL").map(parse_level) {
        Some(Ok(level)) => level,
        Some(Err(err)) => {
            // Tracing isn't installed yet at this point.
            web_sys::console::warn_1(&format!("{err}, using info").into());
            Level::INFO
        }
        None => Level::INFO,
    }
}

/// Turns the configured base into an absolute url ending with `/`, so that
/// joining a relative endpoint path keeps the base path.
pub fn resolve_api_base(base: &str, origin: Option<&str>) -> Result<Url, ConfigError> {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    };

    let invalid = |reason: String| ConfigError::InvalidBase {
        base: base.clone(),
        reason,
    };

    if !base.starts_with('/') {
        return Url::parse(&base).map_err(|err| invalid(err.to_string()));
    }

    let origin = origin.ok_or_else(|| ConfigError::MissingOrigin(base.clone()))?;
    let origin = Url::parse(origin).map_err(|err| invalid(err.to_string()))?;
    origin.join(&base).map_err(|err| invalid(err.to_string()))
}

pub fn parse_level(level: &str) -> Result<Level, ConfigError> {
    level
        .trim()
        .parse::<Level>()
        .map_err(|_| ConfigError::UnknownLevel(level.to_string()))
}

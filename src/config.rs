use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "HealthBot";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent sent to third-party services (Nominatim requires one).
pub const USER_AGENT: &str = "HealthBot/1.0";

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";

/// Frontend origins allowed by CORS when none are configured.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "https://healthbot007.netlify.app",
];

/// Environment variable holding the tracing filter.
pub const LOG_FILTER_VAR: &str = "HEALTHBOT_LOG";

/// Default tracing filter, overridden by `RUST_LOG`.
pub fn default_log_filter() -> &'static str {
    "healthbot=info,tower_http=info"
}

/// Tracing filter from `HEALTHBOT_LOG`, else the default.
///
/// Read separately from [`AppConfig`] so the subscriber can be installed
/// before the rest of the configuration is parsed and validated.
pub fn log_filter_from<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(LOG_FILTER_VAR)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default_log_filter().to_string())
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory holding model, scaler and encoder artifacts.
    pub models_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub groq_api_key: Option<String>,
    pub groq_url: String,
    pub overpass_url: String,
    pub nominatim_url: String,
    pub tts_url: String,
    /// Optional JSON object of keyword → canned health tip.
    pub health_tips_path: Option<PathBuf>,
    pub http_timeout: Duration,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            models_dir: PathBuf::from("models"),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            groq_api_key: None,
            groq_url: DEFAULT_GROQ_URL.to_string(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            tts_url: DEFAULT_TTS_URL.to_string(),
            health_tips_path: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            log_filter: default_log_filter().to_string(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unparseable values fall back to defaults with a warning rather than
    /// aborting startup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let host = match get("HEALTHBOT_HOST") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid HEALTHBOT_HOST, using default");
                defaults.host
            }),
            None => defaults.host,
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid PORT, using default");
                defaults.port
            }),
            None => defaults.port,
        };

        let http_timeout = match get("HEALTHBOT_HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %raw, "Invalid HEALTHBOT_HTTP_TIMEOUT_SECS, using default");
                    defaults.http_timeout
                }
            },
            None => defaults.http_timeout,
        };

        let allowed_origins = match get("HEALTHBOT_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => defaults.allowed_origins,
        };

        Self {
            host,
            port,
            models_dir: get("HEALTHBOT_MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.models_dir),
            allowed_origins,
            // The frontend build historically exported the key under its own prefix.
            groq_api_key: get("GROQ_API_KEY").or_else(|| get("REACT_APP_GROQ_API_KEY")),
            groq_url: get("HEALTHBOT_GROQ_URL").unwrap_or(defaults.groq_url),
            overpass_url: get("HEALTHBOT_OVERPASS_URL").unwrap_or(defaults.overpass_url),
            nominatim_url: get("HEALTHBOT_NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            tts_url: get("HEALTHBOT_TTS_URL").unwrap_or(defaults.tts_url),
            health_tips_path: get("HEALTHBOT_HEALTH_TIPS").map(PathBuf::from),
            http_timeout,
            log_filter: log_filter_from(&lookup),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from, in order of precedence:
//!
//! 1. Environment variables (BIRDIE_*)
//! 2. TOML config file (if BIRDIE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Text and routing for push notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Notification title.
    #[serde(default = "default_notification_title")]
    pub title: String,

    /// Body used when the push payload is absent or empty.
    #[serde(default = "default_notification_body")]
    pub default_body: String,

    /// Icon and badge path.
    #[serde(default = "default_icon")]
    pub icon: String,

    /// Action identifier that opens a window when clicked.
    #[serde(default = "default_open_action")]
    pub open_action: String,

    #[serde(default = "default_open_action_title")]
    pub open_action_title: String,

    /// Action identifier that only dismisses the notification.
    #[serde(default = "default_close_action")]
    pub close_action: String,

    #[serde(default = "default_close_action_title")]
    pub close_action_title: String,

    /// Path opened for `open_action`.
    #[serde(default = "default_open_url")]
    pub open_url: String,

    /// Vibration pattern in milliseconds.
    #[serde(default = "default_vibrate")]
    pub vibrate: Vec<u64>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_notification_title(),
            default_body: default_notification_body(),
            icon: default_icon(),
            open_action: default_open_action(),
            open_action_title: default_open_action_title(),
            close_action: default_close_action(),
            close_action_title: default_close_action_title(),
            open_url: default_open_url(),
            vibrate: default_vibrate(),
        }
    }
}

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding every cache store.
    ///
    /// Set via BIRDIE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Address the proxy listens on.
    ///
    /// Set via BIRDIE_LISTEN_ADDR environment variable.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Origin the client shell sees; intercepted URLs are built against it.
    #[serde(default = "default_public_origin")]
    pub public_origin: String,

    /// Origin serving the application shell and static assets.
    #[serde(default = "default_static_origin")]
    pub static_origin: String,

    /// REST API base; `/api/*` is forwarded here without the `/api` prefix.
    #[serde(default = "default_api_upstream")]
    pub api_upstream: String,

    /// User-Agent string for upstream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Version stamp appended to both store names.
    ///
    /// Bumping it retires every store of the previous version on activation.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    #[serde(default = "default_static_cache_prefix")]
    pub static_cache_prefix: String,

    #[serde(default = "default_api_cache_prefix")]
    pub api_cache_prefix: String,

    /// Path prefix identifying API requests.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// API read endpoints served network-first with cache fallback.
    #[serde(default = "default_api_cache_patterns")]
    pub api_cache_patterns: Vec<String>,

    /// Asset paths pre-cached on install.
    #[serde(default = "default_static_manifest")]
    pub static_manifest: Vec<String>,

    /// Document served to offline navigations.
    #[serde(default = "default_root_document")]
    pub root_document: String,

    /// Background sync tag that triggers deferred replay.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// Reject API fallback entries older than this many seconds.
    ///
    /// Unset means cached API data is served regardless of age.
    #[serde(default)]
    pub api_fallback_max_age_secs: Option<u64>,

    #[serde(default)]
    pub notification: NotificationConfig,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./birdie-cache.sqlite")
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".into()
}

fn default_public_origin() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_static_origin() -> String {
    "http://127.0.0.1:3000".into()
}

fn default_api_upstream() -> String {
    "http://127.0.0.1:8000".into()
}

fn default_user_agent() -> String {
    "birdie/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cache_version() -> String {
    "v1.0.0".into()
}

fn default_static_cache_prefix() -> String {
    "badminton-app".into()
}

fn default_api_cache_prefix() -> String {
    "badminton-api".into()
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_api_cache_patterns() -> Vec<String> {
    ["/api/users/me", "/api/matches", "/api/tournaments", "/api/leaderboard"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_static_manifest() -> Vec<String> {
    ["/", "/static/js/bundle.js", "/static/css/main.css", "/manifest.json", "/icon.png", "/favicon.png"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_root_document() -> String {
    "/".into()
}

fn default_sync_tag() -> String {
    "background-sync-matches".into()
}

fn default_notification_title() -> String {
    "Badminton App".into()
}

fn default_notification_body() -> String {
    "New badminton activity!".into()
}

fn default_icon() -> String {
    "/icon.png".into()
}

fn default_open_action() -> String {
    "explore".into()
}

fn default_open_action_title() -> String {
    "View Details".into()
}

fn default_close_action() -> String {
    "close".into()
}

fn default_close_action_title() -> String {
    "Close".into()
}

fn default_open_url() -> String {
    "/".into()
}

fn default_vibrate() -> Vec<u64> {
    vec![100, 50, 100]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            listen_addr: default_listen_addr(),
            public_origin: default_public_origin(),
            static_origin: default_static_origin(),
            api_upstream: default_api_upstream(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            cache_version: default_cache_version(),
            static_cache_prefix: default_static_cache_prefix(),
            api_cache_prefix: default_api_cache_prefix(),
            api_prefix: default_api_prefix(),
            api_cache_patterns: default_api_cache_patterns(),
            static_manifest: default_static_manifest(),
            root_document: default_root_document(),
            sync_tag: default_sync_tag(),
            api_fallback_max_age_secs: None,
            notification: NotificationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Current name of the static asset store, e.g. `badminton-app-v1.0.0`.
    pub fn static_cache_name(&self) -> String {
        format!("{}-{}", self.static_cache_prefix, self.cache_version)
    }

    /// Current name of the API response store, e.g. `badminton-api-v1.0.0`.
    pub fn api_cache_name(&self) -> String {
        format!("{}-{}", self.api_cache_prefix, self.cache_version)
    }

    pub fn api_fallback_max_age(&self) -> Option<Duration> {
        self.api_fallback_max_age_secs.map(Duration::from_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or parsed, or if
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered figment `load` extracts from.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("BIRDIE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("BIRDIE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

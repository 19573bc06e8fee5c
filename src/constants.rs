//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Content type sent with every query unless the caller overrides it
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Directory (under the home directory) holding settings and saved connections
pub const CONFIG_DIR_NAME: &str = ".api-explorer";

/// File holding saved connections and the active connection id
pub const CONNECTIONS_FILE: &str = "connections.yaml";

/// Optional settings file
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Log file written by the binary
pub const LOG_FILE: &str = "api-explorer.log";

/// Prefix for friendly-name cache keys
pub const NAME_CACHE_PREFIX: &str = "ai-suggestions:";

/// Gemini REST endpoint used for name suggestions
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Environment variable overriding the configured Gemini key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Number of products kept in the financial report ranking
pub const TOP_PRODUCTS_LIMIT: usize = 10;

/// Application name
pub const APP_NAME: &str = "API Insights";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

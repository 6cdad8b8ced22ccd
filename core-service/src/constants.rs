//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through the environment; the helpers below
//! read the variable and fall back to the default when it is unset or invalid.

/// Default remote scorer base URL
///
/// For development the ML engine listens on port 3100.
pub const DEFAULT_SCORER_URL: &str = "http://localhost:3100";

/// Hard timeout for one remote scoring call (milliseconds)
pub const DEFAULT_SCORER_TIMEOUT_MS: u64 = 800;

/// Reputation record time-to-live (seconds)
pub const DEFAULT_REPUTATION_TTL_SECS: u64 = 5 * 60;

/// Trailing window used by the velocity check (seconds)
pub const VELOCITY_WINDOW_SECS: i64 = 60;

/// Maximum number of behavioral profiles kept in memory
pub const DEFAULT_PROFILE_CAPACITY: usize = 10_000;

/// Profiles idle for longer than this are evicted (seconds)
pub const DEFAULT_PROFILE_IDLE_TTL_SECS: u64 = 60 * 60;

/// Consecutive remote failures that trip the breaker (0 = breaker disabled)
pub const DEFAULT_BREAKER_FAILURE_THRESHOLD: u32 = 0;

/// How long a tripped breaker stays open (seconds)
pub const DEFAULT_BREAKER_RESET_SECS: u64 = 30;

/// Period of the background sweep over expired reputation and idle profiles (seconds)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Scored transactions kept per node for history views
pub const NODE_HISTORY_LIMIT: usize = 100;

/// Batch summaries kept by the aggregator for trend views
pub const STATS_HISTORY_LIMIT: usize = 60;

/// Capacity of the observer broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Scorer-version tag for results produced by the local heuristics
pub const FALLBACK_SCORER_VERSION: &str = "heuristic-fallback";

/// Provenance reported for federated reputation matches
pub const FEDERATION_SOURCE: &str = "FEDERATION_NETWORK";

/// Default value for missing optional transaction fields
pub const UNKNOWN_FIELD: &str = "Unknown";

/// Library version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get remote scorer URL from environment or use default
pub fn get_scorer_url() -> String {
    std::env::var("SCORER_URL")
        .unwrap_or_else(|_| DEFAULT_SCORER_URL.to_string())
}

/// Get remote scorer timeout from environment or use default
pub fn get_scorer_timeout_ms() -> u64 {
    env_parse("SCORER_TIMEOUT_MS").unwrap_or(DEFAULT_SCORER_TIMEOUT_MS)
}

/// Check if remote scoring is enabled
pub fn is_scorer_enabled() -> bool {
    env_flag("SCORER_ENABLED", true)
}

/// Get reputation TTL from environment or use default
pub fn get_reputation_ttl_secs() -> u64 {
    env_parse("REPUTATION_TTL_SECS").unwrap_or(DEFAULT_REPUTATION_TTL_SECS)
}

/// Get profile capacity from environment or use default
pub fn get_profile_capacity() -> usize {
    env_parse("PROFILE_CAPACITY").unwrap_or(DEFAULT_PROFILE_CAPACITY)
}

/// Get profile idle TTL from environment or use default
pub fn get_profile_idle_ttl_secs() -> u64 {
    env_parse("PROFILE_IDLE_TTL_SECS").unwrap_or(DEFAULT_PROFILE_IDLE_TTL_SECS)
}

/// Check if the random-noise fallback rules are enabled
pub fn is_noise_enabled() -> bool {
    env_flag("NOISE_ENABLED", false)
}

/// Get the noise PRNG seed, if one is configured
pub fn get_noise_seed() -> Option<u64> {
    env_parse("NOISE_SEED")
}

/// Get breaker failure threshold from environment or use default
pub fn get_breaker_failure_threshold() -> u32 {
    env_parse("BREAKER_FAILURE_THRESHOLD").unwrap_or(DEFAULT_BREAKER_FAILURE_THRESHOLD)
}

/// Get breaker reset window from environment or use default
pub fn get_breaker_reset_secs() -> u64 {
    env_parse("BREAKER_RESET_SECS").unwrap_or(DEFAULT_BREAKER_RESET_SECS)
}

/// Get sweep period from environment or use default
pub fn get_sweep_interval_secs() -> u64 {
    env_parse::<u64>("SWEEP_INTERVAL_SECS")
        .filter(|s| *s > 0)
        .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(default)
}

//! Environment variable helpers

use std::path::Path;

/// Load `.env.local` and `.env` from `project_root`
///
/// Variables already present in the process environment win, then
/// `.env.local`, then `.env`. Missing files are skipped.
pub fn load_dotenv(project_root: &Path) {
    // dotenvy never overwrites, so the most specific file goes first
    let _ = dotenvy::from_path(project_root.join(".env.local"));
    let _ = dotenvy::from_path(project_root.join(".env"));
}

/// Get an environment variable with a default value
///
/// # Example
/// ```
/// use weave::config::env;
///
/// let debug: bool = env("WEAVE_DEBUG_EXAMPLE", false);
/// assert!(!debug);
/// ```
pub fn env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_optional(key).unwrap_or(default)
}

/// Get an optional environment variable
///
/// # Example
/// ```
/// use weave::config::env_optional;
///
/// let name: Option<String> = env_optional("WEAVE_UNSET_EXAMPLE");
/// assert!(name.is_none());
/// ```
pub fn env_optional<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Get a boolean flag, accepting `true/false`, `1/0`, `yes/no` and `on/off`
pub fn env_flag(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    parse_flag(&value)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

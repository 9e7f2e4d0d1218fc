//! Injector configuration
//!
//! Settings that shape an [`Injector`](crate::Injector) at construction time,
//! as opposed to the bindings that describe the object graph.
//!
//! # Example
//!
//! ```rust
//! use weave::{Injector, InjectorConfig};
//!
//! let config = InjectorConfig::from_env().debug(true);
//! let injector = Injector::create_with(config, |_binder| {}).unwrap();
//! assert!(injector.is_debug());
//! ```

pub mod env;

pub use env::{env, env_flag, env_optional, load_dotenv};

/// Environment variable that turns on instance recording
pub const DEBUG_ENV: &str = "WEAVE_DEBUG";

/// Construction-time settings for an injector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectorConfig {
    /// Record every resolved instance so [`Injector::dump`](crate::Injector::dump)
    /// can render the object graph
    pub debug: bool,
}

impl InjectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from the process environment
    ///
    /// `WEAVE_DEBUG` accepts `1/0`, `true/false`, `yes/no` and `on/off`.
    /// Unset or unparseable values leave the default in place.
    pub fn from_env() -> Self {
        Self {
            debug: env_flag(DEBUG_ENV).unwrap_or(false),
        }
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_quiet() {
        assert!(!InjectorConfig::default().debug);
        assert!(InjectorConfig::new().debug(true).debug);
    }
}

//! Run configuration
//!
//! A [`RunConfig`] is built exactly once at startup from a [`ConfigSource`]
//! and then passed by reference to everything that needs it. The library
//! ships the environment source; interactive prompting lives in the binary.

use crate::error::{Error, Result};
use crate::mask::Censor;
use crate::record::RecordType;
use std::fmt;
use std::net::IpAddr;

/// Environment variable names
pub mod env {
    pub const API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
    pub const NEW_IP: &str = "NEW_IP";
    pub const OLD_IP: &str = "OLD_IP";
    pub const TARGET_DOMAIN: &str = "TARGET_DOMAIN";
    pub const DRY_RUN: &str = "DRY_RUN";
    pub const DEBUG: &str = "DEBUG";
    pub const CENSOR: &str = "CENSOR";
    pub const RECORD_TYPES: &str = "RECORD_TYPES";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const API_BASE: &str = "CLOUDFLARE_API_BASE";

    /// Variables without which a run cannot start
    pub const REQUIRED: &[&str] = &[API_TOKEN, NEW_IP];
}

/// Provider API token
///
/// Debug output never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<REDACTED>)")
    }
}

/// Immutable settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Provider API token
    pub api_token: ApiToken,

    /// Override for the provider API base URL
    pub api_base: Option<String>,

    /// IP every A record is pinned to, and the replacement for `match_ip`
    pub desired_ip: String,

    /// IP to replace inside non-A records
    pub match_ip: Option<String>,

    /// Only process the zone with exactly this name
    pub target_domain: Option<String>,

    /// Preview changes without calling the provider
    pub dry_run: bool,

    /// Verbose logging
    pub debug: bool,

    /// Mask identifiers and names in console output
    pub censor: bool,

    /// Record types to reconcile, in fetch order, without duplicates
    pub record_types: Vec<RecordType>,

    /// Log level name (trace, debug, info, warn, error)
    pub log_level: String,
}

impl RunConfig {
    /// Minimal configuration with defaults for everything optional
    pub fn new(api_token: impl Into<String>, desired_ip: impl Into<String>) -> Self {
        Self {
            api_token: ApiToken::new(api_token),
            api_base: None,
            desired_ip: desired_ip.into(),
            match_ip: None,
            target_domain: None,
            dry_run: false,
            debug: false,
            censor: true,
            record_types: RecordType::SUPPORTED.to_vec(),
            log_level: default_log_level(),
        }
    }

    pub fn with_match_ip(mut self, match_ip: impl Into<String>) -> Self {
        self.match_ip = Some(match_ip.into());
        self
    }

    pub fn with_target_domain(mut self, domain: impl Into<String>) -> Self {
        self.target_domain = Some(domain.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_censor(mut self, censor: bool) -> Self {
        self.censor = censor;
        self
    }

    pub fn with_record_types(mut self, record_types: Vec<RecordType>) -> Self {
        self.record_types = record_types;
        self
    }

    /// Masking switch for this run
    pub fn censor(&self) -> Censor {
        Censor::new(self.censor)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_token.is_empty() {
            return Err(Error::config(format!(
                "{} is required. Set it via: export {}=your_token",
                env::API_TOKEN,
                env::API_TOKEN
            )));
        }

        let token_lower = self.api_token.expose().to_lowercase();
        if token_lower.contains("your_token") || token_lower.contains("replace_me") {
            return Err(Error::config(format!(
                "{} appears to be a placeholder. Use an actual API token.",
                env::API_TOKEN
            )));
        }

        if self.desired_ip.is_empty() {
            return Err(Error::config(format!(
                "{} is required. Set it via: export {}=203.0.113.10",
                env::NEW_IP,
                env::NEW_IP
            )));
        }

        if self.desired_ip.parse::<IpAddr>().is_err() {
            return Err(Error::config(format!(
                "{} is not a valid IP address: '{}'",
                env::NEW_IP,
                self.desired_ip
            )));
        }

        if self.record_types.is_empty() {
            return Err(Error::config(format!(
                "{} must name at least one record type",
                env::RECORD_TYPES
            )));
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(Error::config(format!(
                    "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    env::LOG_LEVEL,
                    self.log_level
                )));
            }
        }

        Ok(())
    }
}

/// Anything that can produce the run configuration
pub trait ConfigSource {
    /// Build and validate a [`RunConfig`]
    fn load(&self) -> Result<RunConfig>;
}

/// Unparsed settings as collected from a source
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    pub api_token: Option<String>,
    pub api_base: Option<String>,
    pub new_ip: Option<String>,
    pub old_ip: Option<String>,
    pub target_domain: Option<String>,
    pub dry_run: Option<String>,
    pub debug: Option<String>,
    pub censor: Option<String>,
    pub record_types: Option<String>,
    pub log_level: Option<String>,
}

impl RawSettings {
    /// Collect settings through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_token: lookup(env::API_TOKEN),
            api_base: lookup(env::API_BASE),
            new_ip: lookup(env::NEW_IP),
            old_ip: lookup(env::OLD_IP),
            target_domain: lookup(env::TARGET_DOMAIN),
            dry_run: lookup(env::DRY_RUN),
            debug: lookup(env::DEBUG),
            censor: lookup(env::CENSOR),
            record_types: lookup(env::RECORD_TYPES),
            log_level: lookup(env::LOG_LEVEL),
        }
    }

    /// Names of required settings that are absent or blank
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if non_empty(self.api_token.as_deref()).is_none() {
            missing.push(env::API_TOKEN);
        }
        if non_empty(self.new_ip.as_deref()).is_none() {
            missing.push(env::NEW_IP);
        }
        missing
    }

    /// Parse and validate into a [`RunConfig`]
    pub fn into_config(self) -> Result<RunConfig> {
        if let Some(name) = self.missing_required().first() {
            return Err(Error::config(format!(
                "Missing required environment variable: {}",
                name
            )));
        }

        let record_types = match non_empty(self.record_types.as_deref()) {
            Some(list) => parse_record_types(list)?,
            None => RecordType::SUPPORTED.to_vec(),
        };

        let config = RunConfig {
            api_token: ApiToken::new(self.api_token.unwrap_or_default().trim()),
            api_base: non_empty(self.api_base.as_deref()).map(str::to_string),
            desired_ip: self.new_ip.unwrap_or_default().trim().to_string(),
            match_ip: non_empty(self.old_ip.as_deref()).map(str::to_string),
            target_domain: non_empty(self.target_domain.as_deref()).map(str::to_string),
            dry_run: parse_flag(self.dry_run.as_deref(), false),
            debug: parse_flag(self.debug.as_deref(), false),
            censor: parse_flag(self.censor.as_deref(), true),
            record_types,
            log_level: non_empty(self.log_level.as_deref())
                .map(str::to_string)
                .unwrap_or_else(default_log_level),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Configuration read from process environment variables
pub struct EnvConfigSource {
    lookup: Box<dyn Fn(&str) -> Option<String>>,
}

impl EnvConfigSource {
    /// Read from the real process environment
    pub fn process() -> Self {
        Self {
            lookup: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Read through a custom lookup (used by tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Collect the raw settings without validating them
    pub fn raw(&self) -> RawSettings {
        RawSettings::from_lookup(|key| (self.lookup)(key))
    }
}

impl ConfigSource for EnvConfigSource {
    fn load(&self) -> Result<RunConfig> {
        self.raw().into_config()
    }
}

/// Interpret a boolean-ish setting (`1`, `true`, `yes`)
pub fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match non_empty(value) {
        Some(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"),
        None => default,
    }
}

/// Parse a comma-separated record type list, dropping duplicates
pub fn parse_record_types(list: &str) -> Result<Vec<RecordType>> {
    let mut types = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let record_type: RecordType = name.parse()?;
        if !types.contains(&record_type) {
            types.push(record_type);
        }
    }
    if types.is_empty() {
        return Err(Error::config(format!(
            "{} must name at least one record type",
            env::RECORD_TYPES
        )));
    }
    Ok(types)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn default_log_level() -> String {
    "info".to_string()
}

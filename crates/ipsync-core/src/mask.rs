//! Display masking for sensitive values
//!
//! Masking is for console output only. Stored data, comparisons and
//! reports always use the real values.

use crate::config::RunConfig;

/// What kind of value is being masked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskKind {
    /// Provider identifiers (zone / record ids)
    Identifier,
    /// Dot-separated domain names
    Name,
    /// API tokens and keys
    Secret,
    /// Email addresses
    Email,
    /// IP addresses
    Ip,
    /// Anything else
    Other,
}

/// Mask `value` according to `kind`
pub fn mask(value: &str, kind: MaskKind) -> String {
    let chars: Vec<char> = value.chars().collect();
    match kind {
        MaskKind::Identifier | MaskKind::Secret => {
            if chars.len() > 8 {
                format!("{}...{}", head(&chars, 4), tail(&chars, 4))
            } else {
                "****".to_string()
            }
        }
        MaskKind::Name => {
            if !value.contains('.') {
                return mask(value, MaskKind::Other);
            }
            let mut labels: Vec<&str> = value.split('.').collect();
            let tld = labels.pop().unwrap_or_default();
            let mut masked: Vec<String> = labels.into_iter().map(mask_label).collect();
            masked.push(tld.to_string());
            masked.join(".")
        }
        MaskKind::Email => match value.rsplit_once('@') {
            Some((_, domain)) => {
                let domain: Vec<char> = domain.chars().collect();
                format!("{}***@***{}", head(&chars, 1), tail(&domain, 3))
            }
            None => "***".to_string(),
        },
        MaskKind::Ip => match value.rsplit_once('.') {
            Some((_, last)) => format!("{}.*.*.{}", head(&chars, 3), last),
            None => "***".to_string(),
        },
        MaskKind::Other => {
            if chars.len() > 4 {
                format!("{}***{}", head(&chars, 2), tail(&chars, 2))
            } else {
                "***".to_string()
            }
        }
    }
}

fn mask_label(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= 2 {
        "*".repeat(chars.len())
    } else {
        format!("{}***", head(&chars, 2))
    }
}

fn head(chars: &[char], n: usize) -> String {
    chars.iter().take(n).collect()
}

fn tail(chars: &[char], n: usize) -> String {
    chars[chars.len().saturating_sub(n)..].iter().collect()
}

/// Run-scoped masking switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Censor {
    enabled: bool,
}

impl Censor {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Mask `value` when censoring is on; empty values pass through
    pub fn apply(&self, value: &str, kind: MaskKind) -> String {
        if !self.enabled || value.is_empty() {
            value.to_string()
        } else {
            mask(value, kind)
        }
    }

    /// Effective configuration as printable `(name, value)` pairs
    ///
    /// The API token is always masked, even with censoring off.
    pub fn describe_config(&self, config: &RunConfig) -> Vec<(&'static str, String)> {
        let optional = |value: Option<&str>, kind| {
            value
                .map(|v| self.apply(v, kind))
                .unwrap_or_else(|| "<unset>".to_string())
        };
        let types: Vec<&str> = config.record_types.iter().map(|t| t.as_str()).collect();

        vec![
            (
                "CLOUDFLARE_API_TOKEN",
                mask(config.api_token.expose(), MaskKind::Secret),
            ),
            ("NEW_IP", self.apply(&config.desired_ip, MaskKind::Ip)),
            ("OLD_IP", optional(config.match_ip.as_deref(), MaskKind::Ip)),
            (
                "TARGET_DOMAIN",
                optional(config.target_domain.as_deref(), MaskKind::Other),
            ),
            ("DRY_RUN", config.dry_run.to_string()),
            ("DEBUG", config.debug.to_string()),
            ("CENSOR", self.enabled.to_string()),
            ("RECORD_TYPES", types.join(",")),
        ]
    }
}

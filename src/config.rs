//! Environment configuration

use crate::{Result, StorefrontError};
use url::Url;

pub const PAYFAST_LIVE_URL: &str = "https://www.payfast.co.za/eng/process";
pub const PAYFAST_SANDBOX_URL: &str = "https://sandbox.payfast.co.za/eng/process";
pub const SHIPLOGIC_DEFAULT_URL: &str = "https://api.shiplogic.com";

/// Settings read once at startup. Integration settings are optional so a
/// deployment can run a subset of the handlers; the handler that needs a
/// missing value answers with `MissingConfig`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub port: u16,
    pub supabase_url: Option<String>,
    pub supabase_service_key: Option<String>,
    pub admin_secret: Option<String>,
    pub payfast: PayfastConfig,
    pub shiplogic_url: String,
    pub shiplogic_api_key: Option<String>,
    pub status_webhook_url: Option<String>,
    pub invoice_webhook_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PayfastConfig {
    pub merchant_id: Option<String>,
    pub merchant_key: Option<String>,
    pub passphrase: Option<String>,
    pub sandbox: bool,
    pub return_url: Option<String>,
    pub cancel_url: Option<String>,
    pub notify_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl Config {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> std::result::Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::Invalid { field: "PORT", reason: format!("not a port number: {p}") })?,
            None => 8888,
        };

        let config = Self {
            port,
            supabase_url: get("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            supabase_service_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            admin_secret: get("ADMIN_SECRET"),
            payfast: PayfastConfig {
                merchant_id: get("PAYFAST_MERCHANT_ID"),
                merchant_key: get("PAYFAST_MERCHANT_KEY"),
                passphrase: get("PAYFAST_PASSPHRASE"),
                sandbox: get("PAYFAST_SANDBOX").map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes")).unwrap_or(false),
                return_url: get("PAYFAST_RETURN_URL"),
                cancel_url: get("PAYFAST_CANCEL_URL"),
                notify_url: get("PAYFAST_NOTIFY_URL"),
            },
            shiplogic_url: get("SHIPLOGIC_API_URL").unwrap_or_else(|| SHIPLOGIC_DEFAULT_URL.to_string()).trim_end_matches('/').to_string(),
            shiplogic_api_key: get("SHIPLOGIC_API_KEY"),
            status_webhook_url: get("N8N_ORDER_STATUS_WEBHOOK_URL"),
            invoice_webhook_url: get("N8N_INVOICE_WEBHOOK_URL"),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        let urls = [
            ("SUPABASE_URL", self.supabase_url.as_deref()),
            ("SHIPLOGIC_API_URL", Some(self.shiplogic_url.as_str())),
            ("PAYFAST_RETURN_URL", self.payfast.return_url.as_deref()),
            ("PAYFAST_CANCEL_URL", self.payfast.cancel_url.as_deref()),
            ("PAYFAST_NOTIFY_URL", self.payfast.notify_url.as_deref()),
            ("N8N_ORDER_STATUS_WEBHOOK_URL", self.status_webhook_url.as_deref()),
            ("N8N_INVOICE_WEBHOOK_URL", self.invoice_webhook_url.as_deref()),
        ];
        for (field, value) in urls {
            if let Some(value) = value {
                validate_url(field, value)?;
            }
        }
        Ok(())
    }

    pub fn payfast_process_url(&self) -> &'static str {
        if self.payfast.sandbox { PAYFAST_SANDBOX_URL } else { PAYFAST_LIVE_URL }
    }
}

fn validate_url(field: &'static str, value: &str) -> std::result::Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid { field, reason: e.to_string() })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::Invalid { field, reason: format!("unsupported scheme {scheme}") }),
    }
}

/// Unwraps an optional setting or fails with `MissingConfig`.
pub fn require<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    value.as_deref().ok_or(StorefrontError::MissingConfig(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8888);
        assert_eq!(config.shiplogic_url, SHIPLOGIC_DEFAULT_URL);
        assert!(config.supabase_url.is_none());
        assert_eq!(config.payfast_process_url(), PAYFAST_LIVE_URL);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup(&[("ADMIN_SECRET", "  "), ("SUPABASE_URL", "https://db.example.com/")])).unwrap();
        assert!(config.admin_secret.is_none());
        assert_eq!(config.supabase_url.as_deref(), Some("https://db.example.com"));
    }

    #[test]
    fn test_sandbox_flag() {
        let config = Config::from_lookup(lookup(&[("PAYFAST_SANDBOX", "TRUE")])).unwrap();
        assert_eq!(config.payfast_process_url(), PAYFAST_SANDBOX_URL);
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("N8N_INVOICE_WEBHOOK_URL", "ftp://hooks")])).is_err());
        assert!(Config::from_lookup(lookup(&[("SUPABASE_URL", "not a url")])).is_err());
    }

    #[test]
    fn test_require() {
        let missing: Option<String> = None;
        assert!(matches!(require(&missing, "ADMIN_SECRET"), Err(StorefrontError::MissingConfig("ADMIN_SECRET"))));
        assert_eq!(require(&Some("x".to_string()), "ADMIN_SECRET").unwrap(), "x");
    }
}

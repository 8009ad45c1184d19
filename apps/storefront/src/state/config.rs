//! # Configuration State
//!
//! Storefront settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`STOREFRONT_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Read-only after initialization, so no mutex.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use storefront_core::{MOBILE_BREAKPOINT_PX, PRODUCTS_PER_PAGE};

use crate::backend::{GoogleIdentity, LocalBackendConfig};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Shown in the header and order emails.
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Shop grid page size.
    pub products_per_page: usize,

    /// Viewport width (px) at or below which Google sign-in uses a redirect.
    pub mobile_breakpoint_px: u32,

    /// Explicit database file. `None` means the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Secret for signing id tokens. Never sent to the UI.
    #[serde(skip_serializing, default)]
    pub jwt_secret: String,

    /// Id token lifetime.
    pub token_lifetime_secs: i64,

    /// Account the local Google provider signs in as, if any.
    pub google_email: Option<String>,
    pub google_display_name: Option<String>,
}

impl Default for ConfigState {
    /// Development defaults: INR, 8 products per page, 768px breakpoint.
    fn default() -> Self {
        ConfigState {
            store_name: "Araj Dry Fruits & Spices".to_string(),
            currency_code: "INR".to_string(),
            currency_symbol: "₹".to_string(),
            currency_decimals: 2,
            products_per_page: PRODUCTS_PER_PAGE,
            mobile_breakpoint_px: MOBILE_BREAKPOINT_PX,
            database_path: None,
            jwt_secret: LocalBackendConfig::default().jwt_secret,
            token_lifetime_secs: 3600,
            google_email: None,
            google_display_name: None,
        }
    }
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `STOREFRONT_STORE_NAME`
    /// - `STOREFRONT_CURRENCY_CODE`, `STOREFRONT_CURRENCY_SYMBOL`
    /// - `STOREFRONT_PRODUCTS_PER_PAGE`
    /// - `STOREFRONT_MOBILE_BREAKPOINT`
    /// - `STOREFRONT_DB_PATH`
    /// - `STOREFRONT_JWT_SECRET`, `STOREFRONT_TOKEN_LIFETIME_SECS`
    /// - `STOREFRONT_GOOGLE_EMAIL`, `STOREFRONT_GOOGLE_NAME`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigState::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(name) = lookup("STOREFRONT_STORE_NAME") {
            config.store_name = name;
        }
        if let Some(code) = lookup("STOREFRONT_CURRENCY_CODE") {
            config.currency_code = code;
        }
        if let Some(symbol) = lookup("STOREFRONT_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }
        if let Some(per_page) = parse_var(&lookup, "STOREFRONT_PRODUCTS_PER_PAGE") {
            config.products_per_page = per_page;
        }
        if let Some(breakpoint) = parse_var(&lookup, "STOREFRONT_MOBILE_BREAKPOINT") {
            config.mobile_breakpoint_px = breakpoint;
        }
        if let Some(path) = lookup("STOREFRONT_DB_PATH") {
            config.database_path = Some(PathBuf::from(path));
        }
        if let Some(secret) = lookup("STOREFRONT_JWT_SECRET") {
            config.jwt_secret = secret;
        }
        if let Some(lifetime) = parse_var(&lookup, "STOREFRONT_TOKEN_LIFETIME_SECS") {
            config.token_lifetime_secs = lifetime;
        }
        config.google_email = lookup("STOREFRONT_GOOGLE_EMAIL");
        config.google_display_name = lookup("STOREFRONT_GOOGLE_NAME");

        config
    }

    /// Resolves the database file.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/in.araj.storefront/storefront.db`
    /// - **Windows**: `%APPDATA%\araj\storefront\data\storefront.db`
    /// - **Linux**: `~/.local/share/storefront/storefront.db`
    pub fn database_path(&self) -> Result<PathBuf, std::io::Error> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = ProjectDirs::from("in", "araj", "storefront").ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine app data directory",
            )
        })?;

        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join("storefront.db"))
    }

    /// Settings for the local auth backend.
    pub fn backend_config(&self) -> LocalBackendConfig {
        LocalBackendConfig {
            jwt_secret: self.jwt_secret.clone(),
            token_lifetime_secs: self.token_lifetime_secs,
            ..LocalBackendConfig::default()
        }
    }

    /// The configured Google account, when an email is set.
    pub fn google_identity(&self) -> Option<GoogleIdentity> {
        self.google_email.as_ref().map(|email| GoogleIdentity {
            email: email.clone(),
            display_name: self.google_display_name.clone(),
        })
    }

    /// Formats a paise amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(89_900), "₹899.00");
    /// ```
    pub fn format_currency(&self, paise: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = paise / divisor;
        let frac = (paise % divisor).abs();

        format!(
            "{}{}{}",
            if paise < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConfigState::from_lookup(lookup(&[]));
        assert_eq!(config.products_per_page, 8);
        assert_eq!(config.mobile_breakpoint_px, 768);
        assert_eq!(config.currency_code, "INR");
        assert!(config.google_identity().is_none());
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = ConfigState::from_lookup(lookup(&[
            ("STOREFRONT_PRODUCTS_PER_PAGE", "12"),
            ("STOREFRONT_MOBILE_BREAKPOINT", "wide"),
            ("STOREFRONT_DB_PATH", "/tmp/shop.db"),
            ("STOREFRONT_GOOGLE_EMAIL", "ravi@gmail.com"),
        ]));

        assert_eq!(config.products_per_page, 12);
        assert_eq!(config.mobile_breakpoint_px, 768);
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/shop.db"));
        assert_eq!(
            config.google_identity().map(|g| g.email),
            Some("ravi@gmail.com".to_string())
        );
    }

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(89_900), "₹899.00");
        assert_eq!(config.format_currency(5), "₹0.05");
        assert_eq!(config.format_currency(-1234), "-₹12.34");
    }

    #[test]
    fn test_secret_not_serialized() {
        let json = serde_json::to_string(&ConfigState::default()).unwrap();
        assert!(!json.contains("jwtSecret"));
    }
}

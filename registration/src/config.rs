//! Application configuration with TOML file and environment support.
//!
//! Built once at start-up and handed to every controller as `Arc<AppConfig>`.

use std::path::Path;
use std::time::Duration;

use asty_types::{address::parse_address, network::BASE_MAINNET, Address, ChainId, MAX_DECIMALS};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Prefix of the environment variables read by [`AppConfig::apply_env`].
pub const ENV_PREFIX: &str = "ASTY_";

/// Configuration for the registration flow.
///
/// Can be loaded from a TOML file via [`AppConfig::from_toml_file`],
/// overlaid from the environment, or built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// ERC-20 token paid as the membership fee.
    #[serde(default)]
    pub deposit_token: Option<Address>,

    #[serde(default = "default_decimals")]
    pub deposit_token_decimals: u8,

    #[serde(default = "default_symbol")]
    pub deposit_token_symbol: String,

    /// Referral contract receiving deposits and paying rewards.
    #[serde(default)]
    pub referral_contract: Option<Address>,

    /// Chain the referral contract lives on.
    #[serde(default = "default_chain_id")]
    pub target_chain_id: ChainId,

    /// Charge the reduced test amount instead of the membership fee.
    #[serde(default)]
    pub testnet: bool,

    /// Membership fee in whole tokens.
    #[serde(default = "default_membership_fee")]
    pub membership_fee: u64,

    /// Bound on every contract read, transaction submission and network switch.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// Bound on waiting for a transaction receipt.
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,

    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional fee taken by the payment widget operator. Kept last so it
    /// serializes as a trailing TOML table.
    #[serde(default)]
    pub platform_fee: Option<PlatformFeeConfig>,
}

/// Platform fee attached to the payment configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFeeConfig {
    /// Amount in smallest deposit-token units.
    pub amount: u64,
    pub recipient: Address,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_decimals() -> u8 {
    6
}

fn default_symbol() -> String {
    "USDC".to_string()
}

fn default_chain_id() -> ChainId {
    BASE_MAINNET
}

fn default_membership_fee() -> u64 {
    30
}

fn default_read_timeout_secs() -> u64 {
    30
}

fn default_receipt_timeout_secs() -> u64 {
    300
}

fn default_receipt_poll_interval_ms() -> u64 {
    2_000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            deposit_token: None,
            deposit_token_decimals: default_decimals(),
            deposit_token_symbol: default_symbol(),
            referral_contract: None,
            target_chain_id: default_chain_id(),
            testnet: false,
            membership_fee: default_membership_fee(),
            read_timeout_secs: default_read_timeout_secs(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            platform_fee: None,
        }
    }
}

// ── Impl ───────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        check_decimals("deposit_token_decimals", config.deposit_token_decimals)?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Overlay values from the process environment (`ASTY_*`).
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// Unset or empty variables leave the field untouched; malformed values
    /// are an error.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = var("DEPOSIT_TOKEN") {
            self.deposit_token = Some(env_address("DEPOSIT_TOKEN", &v)?);
        }
        if let Some(v) = var("DEPOSIT_TOKEN_DECIMALS") {
            let decimals = env_number("DEPOSIT_TOKEN_DECIMALS", &v)?;
            check_decimals(&format!("{ENV_PREFIX}DEPOSIT_TOKEN_DECIMALS"), decimals)?;
            self.deposit_token_decimals = decimals;
        }
        if let Some(v) = var("DEPOSIT_TOKEN_SYMBOL") {
            self.deposit_token_symbol = v;
        }
        if let Some(v) = var("REFERRAL_CONTRACT") {
            self.referral_contract = Some(env_address("REFERRAL_CONTRACT", &v)?);
        }
        if let Some(v) = var("CHAIN_ID") {
            self.target_chain_id = env_number("CHAIN_ID", &v)?;
        }
        if let Some(v) = var("TESTNET") {
            self.testnet = env_bool("TESTNET", &v)?;
        }

        let fee_amount = var("PLATFORM_FEE_AMOUNT")
            .map(|v| env_number::<u64>("PLATFORM_FEE_AMOUNT", &v))
            .transpose()?;
        let fee_recipient = var("PLATFORM_FEE_RECIPIENT")
            .map(|v| env_address("PLATFORM_FEE_RECIPIENT", &v))
            .transpose()?;
        match (fee_amount, fee_recipient) {
            (Some(amount), Some(recipient)) => {
                self.platform_fee = Some(PlatformFeeConfig { amount, recipient });
            }
            (None, None) => {}
            _ => tracing::warn!("platform fee needs both amount and recipient; ignoring"),
        }

        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}

fn env_address(key: &str, value: &str) -> Result<Address, ConfigError> {
    parse_address(value).map_err(|e| ConfigError::InvalidValue {
        key: format!("{ENV_PREFIX}{key}"),
        reason: e.to_string(),
    })
}

fn env_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: format!("{ENV_PREFIX}{key}"),
            reason: format!("expected true/false, got {value:?}"),
        }),
    }
}

/// Token units are `10^decimals`, which must fit in a `U256`.
fn check_decimals(key: &str, decimals: u8) -> Result<(), ConfigError> {
    if decimals > MAX_DECIMALS {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("{decimals} exceeds the maximum of {MAX_DECIMALS}"),
        });
    }
    Ok(())
}

fn env_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
        key: format!("{ENV_PREFIX}{key}"),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const TOKEN: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
    const CONTRACT: &str = "0x1111111111111111111111111111111111111111";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.target_chain_id, 8453);
        assert_eq!(config.deposit_token_decimals, 6);
        assert_eq!(config.membership_fee, 30);
        assert!(config.deposit_token.is_none());
        assert!(config.referral_contract.is_none());
        assert!(config.platform_fee.is_none());
        assert_eq!(config.read_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn parses_toml() {
        let toml = format!(
            r#"
            deposit_token = "{TOKEN}"
            referral_contract = "{CONTRACT}"
            target_chain_id = 84532
            testnet = true

            [platform_fee]
            amount = 5000
            recipient = "{CONTRACT}"
            "#
        );
        let config = AppConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.deposit_token, Some(parse_address(TOKEN).unwrap()));
        assert_eq!(config.target_chain_id, 84532);
        assert!(config.testnet);
        assert_eq!(config.platform_fee.unwrap().amount, 5000);
    }

    #[test]
    fn toml_round_trip() {
        let config = AppConfig {
            deposit_token: Some(parse_address(TOKEN).unwrap()),
            referral_contract: Some(parse_address(CONTRACT).unwrap()),
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("asty.toml");
        std::fs::write(&path, "membership_fee = 50\n").unwrap();
        let config = AppConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.membership_fee, 50);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::from_toml_file("/nonexistent/asty.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn env_overlay() {
        let mut config = AppConfig::default();
        config
            .apply_env_with(env(&[
                ("ASTY_DEPOSIT_TOKEN", TOKEN),
                ("ASTY_REFERRAL_CONTRACT", CONTRACT),
                ("ASTY_CHAIN_ID", "84532"),
                ("ASTY_TESTNET", "true"),
                ("ASTY_DEPOSIT_TOKEN_SYMBOL", "USDT"),
            ]))
            .unwrap();
        assert!(config.deposit_token.is_some());
        assert!(config.referral_contract.is_some());
        assert_eq!(config.target_chain_id, 84532);
        assert!(config.testnet);
        assert_eq!(config.deposit_token_symbol, "USDT");
    }

    #[test]
    fn env_rejects_malformed_address() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_with(env(&[("ASTY_REFERRAL_CONTRACT", "0x1234")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ASTY_REFERRAL_CONTRACT"));
    }

    #[test]
    fn env_rejects_unknown_boolean() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_with(env(&[("ASTY_TESTNET", "garbage")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ASTY_TESTNET"));
        assert!(!config.testnet);

        config.apply_env_with(env(&[("ASTY_TESTNET", "YES")])).unwrap();
        assert!(config.testnet);
        config.apply_env_with(env(&[("ASTY_TESTNET", "0")])).unwrap();
        assert!(!config.testnet);
    }

    #[test]
    fn env_rejects_oversized_decimals() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_with(env(&[("ASTY_DEPOSIT_TOKEN_DECIMALS", "78")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ASTY_DEPOSIT_TOKEN_DECIMALS"));
        assert_eq!(config.deposit_token_decimals, 6);

        config
            .apply_env_with(env(&[("ASTY_DEPOSIT_TOKEN_DECIMALS", "77")]))
            .unwrap();
        assert_eq!(config.deposit_token_decimals, 77);
    }

    #[test]
    fn toml_rejects_oversized_decimals() {
        let err = AppConfig::from_toml_str("deposit_token_decimals = 80\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "deposit_token_decimals"));
        assert_eq!(
            AppConfig::from_toml_str("deposit_token_decimals = 18\n")
                .unwrap()
                .deposit_token_decimals,
            18
        );
    }

    #[test]
    fn partial_platform_fee_is_ignored() {
        let mut config = AppConfig::default();
        config
            .apply_env_with(env(&[("ASTY_PLATFORM_FEE_AMOUNT", "100")]))
            .unwrap();
        assert!(config.platform_fee.is_none());

        config
            .apply_env_with(env(&[
                ("ASTY_PLATFORM_FEE_AMOUNT", "100"),
                ("ASTY_PLATFORM_FEE_RECIPIENT", CONTRACT),
            ]))
            .unwrap();
        assert_eq!(config.platform_fee.unwrap().amount, 100);
    }
}

use crate::{Error, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// number of threads config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Thread {
    /// number of http server threads
    pub http: usize,
}

/// network config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Network {
    /// server bind host
    pub host: String,
    /// server bind port
    pub port: u16,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// payment gateway type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gateway {
    Razorpay,
    /// offline gateway, orders never leave the process
    Local,
}

impl Default for Gateway {
    fn default() -> Self {
        Self::Razorpay
    }
}

/// Razorpay setting
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Razorpay {
    /// api base url
    pub url: String,
    pub key_id: String,
    /// api key secret, also signs payment callbacks
    pub key_secret: String,
    /// request timeout in seconds, 0 disables
    pub timeout: u64,
}

impl Default for Razorpay {
    fn default() -> Self {
        Self {
            url: payment_gateway::razorpay::DEFAULT_URL.to_owned(),
            key_id: "".to_owned(),
            key_secret: "".to_owned(),
            timeout: 10,
        }
    }
}

/// Local gateway setting
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Local {
    /// callback signing secret
    pub secret: String,
}

impl Default for Local {
    fn default() -> Self {
        Self {
            secret: "local".to_owned(),
        }
    }
}

/// auth config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Auth {
    /// jwt secret
    pub secret: String,

    /// jwt token expiry in seconds
    pub token_expiry: usize,

    /// shared key required to register an administrator, empty disables it
    pub admin_secret_key: String,

    pub min_password_len: usize,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            secret: "test".to_owned(),
            token_expiry: 24 * 60 * 60,
            admin_secret_key: "".to_owned(),
            min_password_len: 6,
        }
    }
}

impl Auth {
    /// check the register secret for administrator accounts
    pub fn check_admin_key(&self, key: Option<&str>) -> Result<()> {
        if self.admin_secret_key.is_empty() {
            return Err(Error::Forbidden("Administrator registration is disabled"));
        }
        match key {
            Some(key)
                if payment_gateway::signature::secret_eq(
                    self.admin_secret_key.as_bytes(),
                    key.as_bytes(),
                ) =>
            {
                Ok(())
            }
            _ => Err(Error::Forbidden("Invalid Admin Secret Key")),
        }
    }
}

/// donation config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Donation {
    /// base currency used when the donor omits one
    pub currency: String,
    /// minor units per major unit, 100 for paise
    pub minor_unit: i64,
    /// pending orders older than this many seconds are failed by `expire-pending`, 0 means all
    pub pending_expiry: u64,
}

impl Default for Donation {
    fn default() -> Self {
        Self {
            currency: "INR".to_owned(),
            minor_unit: 100,
            pending_expiry: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Setting {
    /// database url
    /// https://www.sea-ql.org/SeaORM/docs/install-and-config/connection/
    pub db_url: String,

    pub thread: Thread,
    pub network: Network,

    pub gateway: Gateway,
    pub razorpay: Option<Razorpay>,
    pub local: Local,

    pub auth: Auth,
    pub donation: Donation,
}

impl Default for Setting {
    fn default() -> Self {
        Self {
            db_url: "sqlite://givebox.sqlite?mode=rwc".to_string(),
            thread: Default::default(),
            network: Default::default(),
            gateway: Default::default(),
            razorpay: None,
            local: Default::default(),
            auth: Default::default(),
            donation: Default::default(),
        }
    }
}

impl Setting {
    /// read config from file and env
    pub fn read<P: AsRef<Path>>(file: P, env_prefix: Option<String>) -> Result<Self> {
        let path = file
            .as_ref()
            .to_str()
            .ok_or_else(|| Error::Message("invalid config path".to_owned()))?;
        let mut config = Config::builder().add_source(File::with_name(path));
        if let Some(prefix) = env_prefix {
            config = config.add_source(Self::env_source(&prefix));
        }

        let config = config.build()?;
        let mut setting: Setting = config.try_deserialize()?;
        setting.validate()?;
        Ok(setting)
    }

    fn env_source(prefix: &str) -> Environment {
        Environment::with_prefix(prefix)
            .try_parsing(true)
            .prefix_separator("_")
            .separator("__")
    }

    /// read config from env
    pub fn from_env(env_prefix: String) -> Result<Self> {
        let mut config = Config::builder();
        config = config.add_source(Self::env_source(&env_prefix));

        let config = config.build()?;
        let mut setting: Setting = config.try_deserialize()?;
        setting.validate()?;
        Ok(setting)
    }

    /// config from str
    pub fn from_str(s: &str, format: FileFormat) -> Result<Self> {
        let builder = Config::builder();
        let config = builder.add_source(File::from_str(s, format)).build()?;
        let mut setting: Setting = config.try_deserialize()?;
        setting.validate()?;
        Ok(setting)
    }

    fn validate(&mut self) -> Result<()> {
        if self.donation.minor_unit <= 0 {
            return Err(Error::Message(
                "donation.minor_unit must be greater than zero".to_owned(),
            ));
        }
        self.donation.currency = crate::currency_code(&self.donation.currency)
            .ok_or_else(|| {
                Error::Message("donation.currency must be a three letter code".to_owned())
            })?;
        Ok(())
    }
}

//! Server configuration, loaded from environment variables at startup.
//!
//! `.env` files are read by `dotenvy` in `main` before this module runs, so
//! every value here comes from the process environment with actual variables
//! taking precedence over `.env` entries. Twilio credentials are required and
//! their absence fails startup; everything else has a default. Secret fields
//! are zeroized when the configuration is dropped.

use std::time::Duration;

use thiserror::Error;
use url::Url;
use zeroize::Zeroize;

use crate::core::chat::ChatConfig;
use crate::core::twilio::TwilioConfig;
use crate::core::{chat, twilio};

/// Assistant name used when `DEFAULT_ASSISTANT_NAME` is not set.
pub const DEFAULT_ASSISTANT_NAME: &str = "Xpectrum Assistant";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

/// Configuration loading errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVariable(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        reason: String,
    },
}

/// Chat API keys, one per assistant plus a fallback.
///
/// Key selection is a substring match on the active assistant's display name,
/// falling back to the default key for names that match no dedicated entry.
/// A lookup that lands on an unset key yields `None`; the orchestrator treats
/// that as a task-level error rather than a startup failure.
#[derive(Debug, Clone, Default)]
pub struct AssistantKeys {
    pub hrms: Option<String>,
    pub hospitality: Option<String>,
    pub default: Option<String>,
}

impl AssistantKeys {
    /// Resolve the API key for `assistant_name`.
    pub fn key_for(&self, assistant_name: &str) -> Option<&str> {
        if assistant_name.contains("HRMS") {
            self.hrms.as_deref()
        } else if assistant_name.contains("Hospitality") {
            self.hospitality.as_deref()
        } else {
            self.default.as_deref()
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Twilio settings
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    /// The provisioned caller number; informational, echoed at startup.
    pub twilio_phone_number: String,
    pub twilio_api_base_url: String,

    // Chat API settings
    pub chat_api_base_url: String,
    pub chat_request_timeout: Duration,
    pub default_assistant_name: String,
    pub assistant_keys: AssistantKeys,
}

/// Zeroize all secret fields when the configuration is dropped, so sensitive
/// data does not linger in freed memory.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        self.twilio_auth_token.zeroize();
        if let Some(ref mut key) = self.assistant_keys.hrms {
            key.zeroize();
        }
        if let Some(ref mut key) = self.assistant_keys.hospitality {
            key.zeroize();
        }
        if let Some(ref mut key) = self.assistant_keys.default {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment.
    ///
    /// Fails if Twilio credentials are absent, the port is unparseable, or a
    /// base URL override is not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let twilio_account_sid = require("TWILIO_ACCOUNT_SID")?;
        let twilio_auth_token = require("TWILIO_AUTH_TOKEN")?;

        let twilio_api_base_url = validated_url(
            "TWILIO_API_BASE_URL",
            optional("TWILIO_API_BASE_URL")
                .unwrap_or_else(|| twilio::DEFAULT_TWILIO_API_BASE_URL.to_string()),
        )?;
        let chat_api_base_url = validated_url(
            "NEXT_AGI_API_BASE_URL",
            optional("NEXT_AGI_API_BASE_URL")
                .unwrap_or_else(|| chat::DEFAULT_CHAT_API_BASE_URL.to_string()),
        )?;

        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_port(optional("PORT"))?,
            twilio_account_sid,
            twilio_auth_token,
            twilio_phone_number: optional("TWILIO_PHONE_NUMBER").unwrap_or_default(),
            twilio_api_base_url,
            chat_api_base_url,
            chat_request_timeout: Duration::from_secs(parse_timeout_secs(optional(
                "CHAT_REQUEST_TIMEOUT_SECS",
            ))?),
            default_assistant_name: optional("DEFAULT_ASSISTANT_NAME")
                .unwrap_or_else(|| DEFAULT_ASSISTANT_NAME.to_string()),
            assistant_keys: AssistantKeys {
                hrms: optional("NEXT_AGI_API_KEY_HRMS"),
                hospitality: optional("NEXT_AGI_API_KEY_HOSPITALITY"),
                default: optional("NEXT_AGI_API_KEY_DEFAULT"),
            },
        })
    }

    /// The listen address as "host:port".
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Chat client configuration derived from this server configuration.
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            base_url: self.chat_api_base_url.clone(),
            request_timeout: self.chat_request_timeout,
        }
    }

    /// Twilio client configuration derived from this server configuration.
    pub fn twilio_config(&self) -> TwilioConfig {
        TwilioConfig {
            account_sid: self.twilio_account_sid.clone(),
            auth_token: self.twilio_auth_token.clone(),
            base_url: self.twilio_api_base_url.clone(),
        }
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVariable(name))
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_port(raw: Option<String>) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            name: "PORT",
            reason: format!("'{value}' is not a valid port number"),
        }),
    }
}

fn parse_timeout_secs(raw: Option<String>) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(chat::DEFAULT_REQUEST_TIMEOUT_SECS),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            name: "CHAT_REQUEST_TIMEOUT_SECS",
            reason: format!("'{value}' is not a valid number of seconds"),
        }),
    }
}

fn validated_url(name: &'static str, value: String) -> Result<String, ConfigError> {
    Url::parse(&value).map_err(|e| ConfigError::InvalidValue {
        name,
        reason: format!("'{value}' is not a valid URL: {e}"),
    })?;
    Ok(value)
}

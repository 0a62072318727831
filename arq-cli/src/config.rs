//! Configuration file support for ARQ CLI tools
//!
//! Sender and receiver coordinate entirely out of band: message count,
//! window size, payload size, and timeout are agreed here, never negotiated
//! on the wire. `validate` fails fast on parameters the protocol would
//! otherwise silently misbehave on.

use arq::RETRANSMIT_TIMEOUT_US;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Transfer scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Alternating-bit, one frame in flight.
    StopWait,
    /// Stenning sliding window.
    Sliding,
}

/// Sender configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Peer address to send frames to
    pub remote: SocketAddr,
    /// Optional local bind address
    pub bind: Option<SocketAddr>,
    /// Transfer scheme
    pub mode: Mode,
    /// Total number of messages
    pub count: u64,
    /// Window size (sliding mode)
    #[serde(default = "default_window")]
    pub window_size: u32,
    /// Payload size in bytes
    #[serde(default = "default_payload_len")]
    pub payload_len: usize,
    /// Retransmission threshold in microseconds
    #[serde(default = "default_timeout_us")]
    pub timeout_us: u64,
}

/// Receiver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Listen address
    pub listen: SocketAddr,
    /// Transfer scheme
    pub mode: Mode,
    /// Total number of messages (must match the sender's)
    pub count: u64,
    /// Window size (must match the sender's)
    #[serde(default = "default_window")]
    pub window_size: u32,
    /// Payload size in bytes (must match the sender's)
    #[serde(default = "default_payload_len")]
    pub payload_len: usize,
}

fn default_window() -> u32 {
    4
}

fn default_payload_len() -> usize {
    32
}

fn default_timeout_us() -> u64 {
    RETRANSMIT_TIMEOUT_US
}

/// Combined configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sender: Option<SenderConfig>,
    pub receiver: Option<ReceiverConfig>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

fn validate_transfer(
    mode: Mode,
    count: u64,
    window_size: u32,
    payload_len: usize,
) -> Result<(), ConfigError> {
    if count == 0 {
        return Err(ConfigError::Invalid("count must be at least 1".into()));
    }
    if payload_len == 0 {
        return Err(ConfigError::Invalid(
            "payload_len must be at least 1".into(),
        ));
    }
    if mode == Mode::Sliding && window_size == 0 {
        return Err(ConfigError::Invalid(
            "window_size must be at least 1".into(),
        ));
    }
    Ok(())
}

impl SenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_us == 0 {
            return Err(ConfigError::Invalid("timeout_us must be non-zero".into()));
        }
        validate_transfer(self.mode, self.count, self.window_size, self.payload_len)
    }
}

impl ReceiverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_transfer(self.mode, self.count, self.window_size, self.payload_len)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> SenderConfig {
        SenderConfig {
            remote: "127.0.0.1:9000".parse().unwrap(),
            bind: None,
            mode: Mode::Sliding,
            count: 100,
            window_size: 4,
            payload_len: 32,
            timeout_us: 1500,
        }
    }

    #[test]
    fn valid_config_passes() {
        sender().validate().unwrap();
    }

    #[test]
    fn zero_window_rejected_in_sliding_mode() {
        let mut cfg = sender();
        cfg.window_size = 0;
        assert!(cfg.validate().is_err());

        cfg.mode = Mode::StopWait;
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_count_rejected() {
        let mut cfg = sender();
        cfg.count = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn serialize_deserialize() {
        let config = Config {
            sender: Some(sender()),
            receiver: None,
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        let parsed_sender = parsed.sender.unwrap();
        assert_eq!(parsed_sender.mode, Mode::Sliding);
        assert_eq!(parsed_sender.count, 100);
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let text = r#"
            [receiver]
            listen = "0.0.0.0:9000"
            mode = "sliding"
            count = 10
        "#;
        let parsed: Config = toml::from_str(text).unwrap();
        let receiver = parsed.receiver.unwrap();
        assert_eq!(receiver.window_size, 4);
        assert_eq!(receiver.payload_len, 32);
    }
}

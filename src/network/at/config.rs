//! Driver configuration.
//!
//! The same engine serves three deployments, picked by [`Mode`] when the
//! [`Modem`](super::Modem) is built:
//!
//! - **Station**: join an existing network and make outbound requests over a
//!   single connection.
//! - **Access-point server**: bring up soft-AP plus station, enable
//!   multiplexing and listen for inbound HTTP requests.
//! - **Reconnect**: re-join a network on a modem that is already configured.
//!
//! Configuration can be built in code or loaded from a JSON blob, for
//! instance one kept in a storage region:
//!
//! ```rust
//! use esplink::network::at::config::{Mode, ModemConfig};
//!
//! let json = br#"{"mode":"access_point_server","ssid":"lab","password":"secret","server_port":8080}"#;
//! let config = ModemConfig::from_json(json).unwrap();
//! assert_eq!(config.mode, Mode::AccessPointServer);
//! assert_eq!(config.server_port, 8080);
//! assert_eq!(config.timeouts.join_ms, 9000);
//! ```

use heapless::String;
use serde::Deserialize;

/// Longest SSID accepted by the modem.
pub const MAX_SSID_LEN: usize = 32;
/// Longest WPA passphrase accepted by the modem.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Which of the driver's flows the modem is set up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Station, single connection, outbound requests.
    Station,
    /// Soft-AP plus station, multiplexed, HTTP server.
    AccessPointServer,
    /// Join only, for a modem that kept its earlier configuration.
    Reconnect,
}

impl Mode {
    /// True when the modem reports and expects explicit link ids.
    pub fn is_multiplexed(self) -> bool {
        matches!(self, Mode::AccessPointServer)
    }
}

/// Per-flow timeouts, in milliseconds.
///
/// Defaults are the values the driver has been run with on ESP8266
/// modules; association with an access point is by far the slowest step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Plain `OK` acknowledgements.
    pub ack_ms: u32,
    /// Mode and DHCP changes.
    pub mode_ms: u32,
    /// Joining an access point, until `WIFI GOT IP`.
    pub join_ms: u32,
    /// Address query.
    pub address_ms: u32,
    /// Opening a TCP connection.
    pub connect_ms: u32,
    /// Data-ready prompt and send acknowledgement.
    pub send_ms: u32,
    /// Application-level marker in the reply.
    pub reply_ms: u32,
    /// Remote side closing the connection.
    pub close_ms: u32,
    /// Reboot after a factory restore.
    pub settle_ms: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            ack_ms: 1000,
            mode_ms: 2000,
            join_ms: 9000,
            address_ms: 5000,
            connect_ms: 5000,
            send_ms: 5000,
            reply_ms: 5000,
            close_ms: 8000,
            settle_ms: 2000,
        }
    }
}

const fn default_port() -> u16 {
    80
}

/// Everything the driver needs to bring the modem up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModemConfig {
    /// Selected flow set.
    pub mode: Mode,
    /// Network to join.
    pub ssid: String<MAX_SSID_LEN>,
    /// Passphrase for `ssid`.
    pub password: String<MAX_PASSWORD_LEN>,
    /// Port the HTTP server listens on in access-point server mode.
    #[serde(default = "default_port")]
    pub server_port: u16,
    /// Timeouts for each step.
    #[serde(default)]
    pub timeouts: Timeouts,
}

/// Errors building a [`ModemConfig`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    /// The JSON blob could not be parsed.
    Parse,
    /// SSID or password exceeds what the modem accepts.
    CredentialsTooLong,
    /// SSID or password contains a `"`, which would break the join command.
    InvalidCredentials,
}

impl ModemConfig {
    /// Builds a configuration with default port and timeouts.
    pub fn new(mode: Mode, ssid: &str, password: &str) -> Result<Self, ConfigError> {
        let config = Self {
            mode,
            ssid: String::try_from(ssid).map_err(|_| ConfigError::CredentialsTooLong)?,
            password: String::try_from(password).map_err(|_| ConfigError::CredentialsTooLong)?,
            server_port: default_port(),
            timeouts: Timeouts::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &[u8]) -> Result<Self, ConfigError> {
        let (config, _) =
            serde_json_core::from_slice::<Self>(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the server port.
    pub fn with_server_port(mut self, port: u16) -> Self {
        self.server_port = port;
        self
    }

    /// Replaces the timeouts.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ssid.contains('"') || self.password.contains('"') {
            return Err(ConfigError::InvalidCredentials);
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Mode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Mode::Station => defmt::write!(f, "Station"),
            Mode::AccessPointServer => defmt::write!(f, "AccessPointServer"),
            Mode::Reconnect => defmt::write!(f, "Reconnect"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConfigError::Parse => defmt::write!(f, "Parse"),
            ConfigError::CredentialsTooLong => defmt::write!(f, "CredentialsTooLong"),
            ConfigError::InvalidCredentials => defmt::write!(f, "InvalidCredentials"),
        }
    }
}

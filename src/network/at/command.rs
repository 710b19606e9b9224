//! Outbound AT command vocabulary.

use crate::network::error::Error;
use core::fmt::Write;
use heapless::String;

/// Longest command line the driver builds, without the trailing CR-LF.
pub const MAX_COMMAND_LEN: usize = 128;

/// A rendered command line.
pub type CommandLine = String<MAX_COMMAND_LEN>;

/// Commands the driver sends to the modem.
///
/// `link` fields carry the connection id in multiplexed mode and are `None`
/// in single-connection mode, where the modem rejects an explicit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `AT+RESTORE`: factory reset, the modem reboots afterwards.
    Restore,
    /// `ATE1`: echo commands back.
    EchoOn,
    /// `AT+GMR`: print firmware version.
    Version,
    /// `AT+CWMODE_CUR=1`: station only.
    StationMode,
    /// `AT+CWMODE_CUR=3`: soft access point plus station.
    SoftApStationMode,
    /// `AT+CWDHCP_CUR=1,1`: DHCP client on for the station interface.
    StationDhcp,
    /// `AT+CWJAP_CUR="<ssid>","<password>"`.
    JoinAp {
        /// Network name.
        ssid: &'a str,
        /// Passphrase.
        password: &'a str,
    },
    /// `AT+CIPMUX=<0|1>`.
    Multiplex(bool),
    /// `AT+CIFSR`: print local addresses.
    LocalAddress,
    /// `AT+CIPSERVER=1,<port>`.
    Server {
        /// Listening TCP port.
        port: u16,
    },
    /// `AT+CIPSTART=[<id>,]"TCP","<host>",<port>`.
    OpenTcp {
        /// Link id in multiplexed mode.
        link: Option<u8>,
        /// Remote host name or address.
        host: &'a str,
        /// Remote TCP port.
        port: u16,
    },
    /// `AT+CIPSEND=[<id>,]<length>`: announce a payload, modem answers `>`.
    Send {
        /// Link id in multiplexed mode.
        link: Option<u8>,
        /// Number of bytes that will follow the prompt.
        length: usize,
    },
    /// `AT+CIPCLOSE[=<id>]`.
    Close {
        /// Link id in multiplexed mode.
        link: Option<u8>,
    },
}

impl Command<'_> {
    /// Renders the command without its line terminator.
    pub fn render(&self) -> Result<CommandLine, Error> {
        let mut line = CommandLine::new();
        self.write_to(&mut line).map_err(|_| Error::BufferOverflow)?;
        Ok(line)
    }

    fn write_to(&self, out: &mut CommandLine) -> core::fmt::Result {
        match *self {
            Command::Restore => out.write_str("AT+RESTORE"),
            Command::EchoOn => out.write_str("ATE1"),
            Command::Version => out.write_str("AT+GMR"),
            Command::StationMode => out.write_str("AT+CWMODE_CUR=1"),
            Command::SoftApStationMode => out.write_str("AT+CWMODE_CUR=3"),
            Command::StationDhcp => out.write_str("AT+CWDHCP_CUR=1,1"),
            Command::JoinAp { ssid, password } => {
                write!(out, "AT+CWJAP_CUR=\"{}\",\"{}\"", ssid, password)
            }
            Command::Multiplex(on) => write!(out, "AT+CIPMUX={}", u8::from(on)),
            Command::LocalAddress => out.write_str("AT+CIFSR"),
            Command::Server { port } => write!(out, "AT+CIPSERVER=1,{}", port),
            Command::OpenTcp { link, host, port } => {
                out.write_str("AT+CIPSTART=")?;
                if let Some(id) = link {
                    write!(out, "{},", id)?;
                }
                write!(out, "\"TCP\",\"{}\",{}", host, port)
            }
            Command::Send { link, length } => match link {
                Some(id) => write!(out, "AT+CIPSEND={},{}", id, length),
                None => write!(out, "AT+CIPSEND={}", length),
            },
            Command::Close { link } => match link {
                Some(id) => write!(out, "AT+CIPCLOSE={}", id),
                None => out.write_str("AT+CIPCLOSE"),
            },
        }
    }
}

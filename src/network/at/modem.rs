//! Session driver: sequences AT commands over the protocol engine.

use super::buffer::{DEFAULT_CAPACITY, ResponseBuffer};
use super::command::Command;
use super::config::{Mode, ModemConfig, Timeouts};
use super::frame::{self, IPD_PREFIX, InboundFrame};
use super::framer::LineFramer;
use super::matcher::await_terminator;
use super::{CLOSED, GOT_IP, MAX_SEND_LEN, OK, OUTBOUND_LINK_ID, PROMPT, SEND_OK};
use crate::network::application::http::Request;
use crate::network::error::Error;
use crate::network::{SerialPort, Write};
use crate::system::clock::{Clock, Deadline};
use crate::system::console::{self, OutputFn};

/// The one inbound connection the driver tracks.
///
/// Set from every decoded frame and overwritten by the next one. Once a
/// request has arrived there is always a session; it is never cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// Link id responses are sent to.
    pub link_id: u8,
    /// Payload length announced by the latest frame.
    pub length: usize,
}

/// Server-side state.
///
/// `Idle -> FrameReceived -> {ResponseSent | ConnectionClosed} -> Idle`.
/// The two terminal states are only ever observed in a [`ResponseReport`];
/// the driver itself is back to `Idle` as soon as `respond` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundState {
    /// Waiting for a frame.
    Idle,
    /// A frame was decoded and is waiting for a response.
    FrameReceived,
    /// Content was written to the stored link.
    ResponseSent,
    /// The modem refused the send, so the link was closed instead.
    ConnectionClosed,
}

/// Client-side state: `Opening -> (Sending | Closing) -> Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundState {
    /// Connection requested, payload announced.
    Opening,
    /// Prompt received, payload written.
    Sending,
    /// No prompt, connection being closed.
    Closing,
    /// Exchange finished either way.
    Done,
}

/// Result of a join sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JoinReport {
    /// Commands written.
    pub issued: u8,
    /// Commands whose expected marker arrived in time.
    pub acknowledged: u8,
    /// Whether the access point reported an address.
    pub joined: bool,
}

impl JoinReport {
    /// True when every command was acknowledged.
    pub fn is_complete(&self) -> bool {
        self.issued == self.acknowledged
    }
}

/// Result of an outbound exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundReport {
    /// Branch taken after `Opening`: [`OutboundState::Sending`] or
    /// [`OutboundState::Closing`].
    pub path: OutboundState,
    /// `OK` after the open command.
    pub connected: bool,
    /// `OK` after the payload.
    pub acknowledged: bool,
    /// Application marker seen in the reply.
    pub replied: bool,
    /// `CLOSED` seen, or `OK` to our own close.
    pub closed: bool,
}

/// Result of answering an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseReport {
    /// Link the response went to.
    pub link_id: u8,
    /// [`InboundState::ResponseSent`] or [`InboundState::ConnectionClosed`].
    pub outcome: InboundState,
    /// `SEND OK` after content, or `OK` after the close.
    pub confirmed: bool,
}

/// Counters for the diagnostic side of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// Terminator waits started.
    pub waits: u32,
    /// Waits that ended at their deadline.
    pub timeouts: u32,
    /// Frames decoded.
    pub frames: u32,
    /// `+IPD` lines that could not be decoded.
    pub malformed_frames: u32,
    /// Times the response buffer wrapped.
    pub overflows: u32,
}

/// Driver for an AT-command Wi-Fi modem.
///
/// Owns the serial port, the clock and the response buffer. Every method
/// takes `&mut self`, so the matcher and the framer can never run at the
/// same time; interleaving client and server traffic is up to the caller.
///
/// `N` is the response buffer capacity.
pub struct Modem<P, C, const N: usize = DEFAULT_CAPACITY> {
    port: P,
    clock: C,
    config: ModemConfig,
    buffer: ResponseBuffer<N>,
    framer: LineFramer,
    session: Option<Session>,
    state: InboundState,
    output_fn: Option<OutputFn>,
    stats: Stats,
    // a wait left its reply in the buffer; framing must start clean
    waited: bool,
}

impl<P, C, const N: usize> core::fmt::Debug for Modem<P, C, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Modem")
            .field("mode", &self.config.mode)
            .field("session", &self.session)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<P: SerialPort, C: Clock, const N: usize> Modem<P, C, N> {
    /// Creates a driver. Nothing is sent until a flow is started.
    pub fn new(port: P, clock: C, config: ModemConfig) -> Self {
        Self {
            port,
            clock,
            config,
            buffer: ResponseBuffer::new(),
            framer: LineFramer::new(),
            session: None,
            state: InboundState::Idle,
            output_fn: None,
            stats: Stats::default(),
            waited: false,
        }
    }

    /// Installs the diagnostic sink that receives every modem response.
    pub fn set_output_function(&mut self, output_fn: OutputFn) {
        self.output_fn = Some(output_fn);
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// The tracked inbound connection, once a request has arrived.
    pub fn session(&self) -> Option<Session> {
        self.session
    }

    pub fn state(&self) -> InboundState {
        self.state
    }

    pub fn stats(&self) -> Stats {
        Stats {
            overflows: self.buffer.overflows(),
            ..self.stats
        }
    }

    /// Bytes collected by the most recent wait, until the next poll.
    pub fn last_response(&self) -> &[u8] {
        self.buffer.contents()
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Gives back the port and clock.
    pub fn release(self) -> (P, C) {
        (self.port, self.clock)
    }

    /// Waits for `terminator`; see [`await_terminator`].
    pub fn wait_for(&mut self, timeout_ms: u32, terminator: &[u8]) -> bool {
        let found = await_terminator(
            &mut self.buffer,
            &mut self.port,
            &self.clock,
            timeout_ms,
            terminator,
            self.output_fn,
        );
        self.waited = true;
        self.stats.waits = self.stats.waits.wrapping_add(1);
        if !found {
            self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("timed out after {=u32} ms waiting for {=[u8]:a}", timeout_ms, terminator);
            console::emit(self.output_fn, "\r\n[timeout waiting for ");
            console::emit_bytes(self.output_fn, terminator);
            console::emit(self.output_fn, "]\r\n");
        }
        found
    }

    /// Writes one command line terminated by CR-LF.
    pub fn send_command(&mut self, command: &Command<'_>) -> Result<(), Error> {
        let line = command.render()?;
        #[cfg(feature = "defmt")]
        defmt::debug!("-> {=str}", line.as_str());
        self.write_all(line.as_bytes())?;
        self.write_all(b"\r\n")?;
        self.flush()
    }

    /// Sends `command` and waits once for `terminator`.
    ///
    /// A timeout is not an error: it is logged, counted and returned as
    /// `false` so the caller can carry on.
    pub fn exchange(
        &mut self,
        command: &Command<'_>,
        timeout_ms: u32,
        terminator: &[u8],
    ) -> Result<bool, Error> {
        self.send_command(command)?;
        Ok(self.wait_for(timeout_ms, terminator))
    }

    /// Runs the bring-up sequence for the configured [`Mode`].
    ///
    /// Each command gets exactly one wait. A missed acknowledgement does not
    /// stop the sequence; the report says how many went through.
    pub fn join(&mut self) -> Result<JoinReport, Error> {
        let config = self.config.clone();
        let t = config.timeouts;
        let join = Command::JoinAp {
            ssid: &config.ssid,
            password: &config.password,
        };
        let mut report = JoinReport::default();

        match config.mode {
            Mode::Station => {
                self.reset(&mut report, &t)?;
                self.step(&mut report, &Command::EchoOn, t.ack_ms, OK)?;
                self.step(&mut report, &Command::Version, t.ack_ms, OK)?;
                self.step(&mut report, &Command::StationMode, t.mode_ms, OK)?;
                self.step(&mut report, &Command::StationDhcp, t.mode_ms, OK)?;
                report.joined = self.step(&mut report, &join, t.join_ms, GOT_IP)?;
                self.step(&mut report, &Command::Multiplex(false), t.ack_ms, OK)?;
                self.step(&mut report, &Command::LocalAddress, t.address_ms, OK)?;
            }
            Mode::AccessPointServer => {
                self.reset(&mut report, &t)?;
                self.step(&mut report, &Command::EchoOn, t.ack_ms, OK)?;
                self.step(&mut report, &Command::Version, t.ack_ms, OK)?;
                self.step(&mut report, &Command::SoftApStationMode, t.mode_ms, OK)?;
                if !config.ssid.is_empty() {
                    self.step(&mut report, &Command::StationDhcp, t.mode_ms, OK)?;
                    report.joined = self.step(&mut report, &join, t.join_ms, GOT_IP)?;
                }
                self.step(&mut report, &Command::Multiplex(true), t.ack_ms, OK)?;
                let server = Command::Server {
                    port: config.server_port,
                };
                self.step(&mut report, &server, t.ack_ms, OK)?;
                self.step(&mut report, &Command::LocalAddress, t.address_ms, OK)?;
            }
            Mode::Reconnect => {
                report.joined = self.step(&mut report, &join, t.join_ms, GOT_IP)?;
            }
        }

        console::emit(
            self.output_fn,
            if report.is_complete() {
                "\r\n[modem ready]\r\n"
            } else {
                "\r\n[modem ready, some steps unacknowledged]\r\n"
            },
        );
        Ok(report)
    }

    /// Re-issues only the join command, whatever the configured mode.
    pub fn reconnect(&mut self) -> Result<JoinReport, Error> {
        let config = self.config.clone();
        let join = Command::JoinAp {
            ssid: &config.ssid,
            password: &config.password,
        };
        let mut report = JoinReport::default();
        report.joined = self.step(&mut report, &join, config.timeouts.join_ms, GOT_IP)?;
        Ok(report)
    }

    /// Opens a TCP connection to `host:port`, sends `payload` and waits for
    /// the reply to contain `reply_marker` and the connection to close.
    ///
    /// If the modem never prompts for data the connection is closed instead
    /// and nothing is sent.
    pub fn send_request(
        &mut self,
        host: &str,
        port: u16,
        payload: &[u8],
        reply_marker: &[u8],
    ) -> Result<OutboundReport, Error> {
        if payload.is_empty() || payload.len() > MAX_SEND_LEN {
            return Err(Error::ProtocolError);
        }
        let t = self.config.timeouts;
        let link = self.link(OUTBOUND_LINK_ID);
        let mut report = OutboundReport {
            path: OutboundState::Opening,
            connected: false,
            acknowledged: false,
            replied: false,
            closed: false,
        };

        let mut state = OutboundState::Opening;
        loop {
            state = match state {
                OutboundState::Opening => {
                    let open = Command::OpenTcp { link, host, port };
                    report.connected = self.exchange(&open, t.connect_ms, OK)?;
                    let announce = Command::Send {
                        link,
                        length: payload.len(),
                    };
                    if self.exchange(&announce, t.send_ms, PROMPT)? {
                        OutboundState::Sending
                    } else {
                        OutboundState::Closing
                    }
                }
                OutboundState::Sending => {
                    report.path = OutboundState::Sending;
                    self.write_all(payload)?;
                    self.flush()?;
                    report.acknowledged = self.wait_for(t.send_ms, OK);
                    report.replied = self.wait_for(t.reply_ms, reply_marker);
                    report.closed = self.wait_for(t.close_ms, CLOSED);
                    OutboundState::Done
                }
                OutboundState::Closing => {
                    report.path = OutboundState::Closing;
                    report.closed = self.exchange(&Command::Close { link }, t.ack_ms, OK)?;
                    OutboundState::Done
                }
                OutboundState::Done => break,
            };
        }
        Ok(report)
    }

    /// Encodes `request` for `host` and runs [`send_request`](Self::send_request).
    pub fn send_http(
        &mut self,
        host: &str,
        port: u16,
        request: &Request<'_>,
        reply_marker: &[u8],
    ) -> Result<OutboundReport, Error> {
        let encoded = request.encode(host)?;
        self.send_request(host, port, &encoded, reply_marker)
    }

    /// Advances the line framer by at most one byte.
    ///
    /// When the byte completes an `+IPD` line that decodes, the session is
    /// overwritten with its link id, the driver waits once for `OK` and the
    /// frame is returned. Lines that are not frames are ignored; frames that
    /// do not decode are dropped and counted.
    pub fn poll(&mut self) -> Option<InboundFrame> {
        if self.waited {
            self.waited = false;
            self.buffer.reset();
            self.framer.clear();
        }
        if !self
            .framer
            .next_byte(&mut self.buffer, &mut self.port, self.output_fn)
        {
            return None;
        }

        let line = self.framer.line(&self.buffer);
        if !line.starts_with(IPD_PREFIX) {
            return None;
        }
        let decoded = if self.config.mode.is_multiplexed() {
            frame::decode(line)
        } else {
            frame::decode_single(line)
        };
        let Some(frame) = decoded else {
            self.stats.malformed_frames = self.stats.malformed_frames.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("dropping malformed frame");
            console::emit(self.output_fn, "[malformed frame dropped]\r\n");
            return None;
        };

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "frame link={=u8} len={=usize} target={}",
            frame.link_id,
            frame.length,
            frame.target
        );
        self.session = Some(Session {
            link_id: frame.link_id,
            length: frame.length,
        });
        self.state = InboundState::FrameReceived;
        self.stats.frames = self.stats.frames.wrapping_add(1);
        self.wait_for(self.config.timeouts.ack_ms, OK);
        Some(frame)
    }

    /// Polls until a frame is decoded or `timeout_ms` passes.
    pub fn listen(&mut self, timeout_ms: u32) -> Option<InboundFrame> {
        let deadline = Deadline::after(&self.clock, timeout_ms);
        while !deadline.expired(&self.clock) {
            if let Some(frame) = self.poll() {
                return Some(frame);
            }
        }
        None
    }

    /// Sends `header` followed by `body` to the session's link.
    ///
    /// The combined length is announced first. If the modem does not prompt
    /// for data the link is closed instead and no content is written.
    /// Returns [`Error::NotOpen`] if no request has arrived yet.
    pub fn respond(&mut self, header: &[u8], body: &[u8]) -> Result<ResponseReport, Error> {
        let session = self.session.ok_or(Error::NotOpen)?;
        let length = header.len() + body.len();
        if length == 0 || length > MAX_SEND_LEN {
            return Err(Error::ProtocolError);
        }
        let t = self.config.timeouts;
        let link = self.link(session.link_id);

        let announce = Command::Send { link, length };
        let result = self.exchange(&announce, t.send_ms, PROMPT).and_then(|prompted| {
            if prompted {
                self.write_all(header)?;
                self.write_all(body)?;
                self.flush()?;
                Ok((InboundState::ResponseSent, self.wait_for(t.send_ms, SEND_OK)))
            } else {
                let closed = self.exchange(&Command::Close { link }, t.ack_ms, OK)?;
                Ok((InboundState::ConnectionClosed, closed))
            }
        });
        self.state = InboundState::Idle;
        let (outcome, confirmed) = result?;

        Ok(ResponseReport {
            link_id: session.link_id,
            outcome,
            confirmed,
        })
    }

    fn reset(&mut self, report: &mut JoinReport, t: &Timeouts) -> Result<(), Error> {
        self.step(report, &Command::Restore, t.ack_ms, OK)?;
        self.clock.delay_ms(t.settle_ms);
        Ok(())
    }

    fn step(
        &mut self,
        report: &mut JoinReport,
        command: &Command<'_>,
        timeout_ms: u32,
        terminator: &[u8],
    ) -> Result<bool, Error> {
        report.issued += 1;
        let found = self.exchange(command, timeout_ms, terminator)?;
        if found {
            report.acknowledged += 1;
        }
        Ok(found)
    }

    /// Link argument for commands: explicit only when multiplexed.
    fn link(&self, id: u8) -> Option<u8> {
        self.config.mode.is_multiplexed().then_some(id)
    }

    fn write_all(&mut self, mut bytes: &[u8]) -> Result<(), Error> {
        while !bytes.is_empty() {
            match self.port.write(bytes) {
                Ok(0) | Err(_) => return Err(Error::WriteError),
                Ok(n) => bytes = &bytes[n..],
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.port.flush().map_err(|_| Error::WriteError)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InboundState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            InboundState::Idle => defmt::write!(f, "Idle"),
            InboundState::FrameReceived => defmt::write!(f, "FrameReceived"),
            InboundState::ResponseSent => defmt::write!(f, "ResponseSent"),
            InboundState::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OutboundState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            OutboundState::Opening => defmt::write!(f, "Opening"),
            OutboundState::Sending => defmt::write!(f, "Sending"),
            OutboundState::Closing => defmt::write!(f, "Closing"),
            OutboundState::Done => defmt::write!(f, "Done"),
        }
    }
}

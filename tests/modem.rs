#[path = "modem/mock.rs"]
mod mock;

use esplink::network::application::http::{Request, ResponseHeader};
use esplink::network::at::{
    InboundState, Mode, Modem, ModemConfig, OutboundState, RequestTarget, Timeouts,
};
use esplink::network::error::Error;
use mock::{MockPort, TickClock};
use std::sync::{Mutex, OnceLock};

const OK: &[u8] = b"\r\nOK\r\n";
const PROMPT: &[u8] = b"\r\nOK\r\n> ";

fn config(mode: Mode) -> ModemConfig {
    ModemConfig::new(mode, "home", "pw").unwrap()
}

fn modem(mode: Mode, port: MockPort) -> Modem<MockPort, TickClock> {
    Modem::new(port, TickClock::new(), config(mode))
}

fn named(name: &str) -> RequestTarget {
    RequestTarget::Named(name.try_into().unwrap())
}

// --- Join ---

#[test]
fn station_join_sequence() {
    let port = MockPort::new()
        .on("AT+RESTORE", OK)
        .on("ATE1", OK)
        .on("AT+GMR", b"AT version:1.2.0.0\r\nOK\r\n")
        .on("AT+CWMODE_CUR=1", OK)
        .on("AT+CWDHCP_CUR", OK)
        .on("AT+CWJAP_CUR", b"WIFI CONNECTED\r\nWIFI GOT IP\r\n\r\nOK\r\n")
        .on("AT+CIPMUX=0", OK)
        .on("AT+CIFSR", b"+CIFSR:STAIP,\"192.168.1.7\"\r\n\r\nOK\r\n");
    let mut modem = modem(Mode::Station, port);

    let report = modem.join().unwrap();
    assert_eq!(report.issued, 8);
    assert_eq!(report.acknowledged, 8);
    assert!(report.joined);
    assert!(report.is_complete());

    assert_eq!(
        modem.port().commands(),
        vec![
            "AT+RESTORE",
            "ATE1",
            "AT+GMR",
            "AT+CWMODE_CUR=1",
            "AT+CWDHCP_CUR=1,1",
            "AT+CWJAP_CUR=\"home\",\"pw\"",
            "AT+CIPMUX=0",
            "AT+CIFSR",
        ]
    );
    assert_eq!(modem.port().unused_replies(), 0);
    // restore is followed by the reboot settle delay
    assert!(modem.clock().elapsed() >= u64::from(Timeouts::default().settle_ms));
}

#[test]
fn join_continues_after_missed_acknowledgement() {
    // No reply to AT+GMR.
    let port = MockPort::new()
        .on("AT+RESTORE", OK)
        .on("ATE1", OK)
        .on("AT+CWMODE_CUR=1", OK)
        .on("AT+CWDHCP_CUR", OK)
        .on("AT+CWJAP_CUR", b"WIFI GOT IP\r\n")
        .on("AT+CIPMUX=0", OK)
        .on("AT+CIFSR", OK);
    let mut modem = modem(Mode::Station, port);

    let report = modem.join().unwrap();
    assert_eq!(report.issued, 8);
    assert_eq!(report.acknowledged, 7);
    assert!(report.joined);
    assert!(!report.is_complete());
    assert_eq!(modem.port().commands().len(), 8);
    assert_eq!(modem.stats().timeouts, 1);
}

#[test]
fn failed_join_is_reported_not_fatal() {
    let port = MockPort::new()
        .on("AT+CWJAP_CUR", b"+CWJAP:1\r\n\r\nFAIL\r\n")
        .on("AT+CIPMUX=0", OK);
    let mut modem = modem(Mode::Station, port);

    let report = modem.join().unwrap();
    assert!(!report.joined);
    assert_eq!(report.issued, 8);
    assert!(modem.port().written().contains("AT+CIFSR\r\n"));
}

#[test]
fn access_point_server_join_sequence() {
    let config = config(Mode::AccessPointServer).with_server_port(8080);
    let port = MockPort::new()
        .on("AT+RESTORE", OK)
        .on("ATE1", OK)
        .on("AT+GMR", OK)
        .on("AT+CWMODE_CUR=3", OK)
        .on("AT+CWDHCP_CUR", OK)
        .on("AT+CWJAP_CUR", b"WIFI GOT IP\r\n")
        .on("AT+CIPMUX=1", OK)
        .on("AT+CIPSERVER", OK)
        .on("AT+CIFSR", OK);
    let mut modem: Modem<_, _> = Modem::new(port, TickClock::new(), config);

    let report = modem.join().unwrap();
    assert!(report.is_complete());
    assert_eq!(
        modem.port().commands(),
        vec![
            "AT+RESTORE",
            "ATE1",
            "AT+GMR",
            "AT+CWMODE_CUR=3",
            "AT+CWDHCP_CUR=1,1",
            "AT+CWJAP_CUR=\"home\",\"pw\"",
            "AT+CIPMUX=1",
            "AT+CIPSERVER=1,8080",
            "AT+CIFSR",
        ]
    );
}

#[test]
fn access_point_server_without_ssid_skips_join() {
    let config = ModemConfig::new(Mode::AccessPointServer, "", "").unwrap();
    let mut modem: Modem<_, _> = Modem::new(MockPort::new(), TickClock::new(), config);

    let report = modem.join().unwrap();
    assert!(!report.joined);
    let commands = modem.port().commands();
    assert!(!commands.iter().any(|c| c.starts_with("AT+CWJAP")));
    assert!(commands.contains(&"AT+CIPSERVER=1,80".to_owned()));
}

#[test]
fn reconnect_mode_only_joins() {
    let port = MockPort::new().on("AT+CWJAP_CUR", b"WIFI GOT IP\r\n");
    let mut modem = modem(Mode::Reconnect, port);

    let report = modem.join().unwrap();
    assert_eq!(report.issued, 1);
    assert!(report.joined);
    assert_eq!(modem.port().commands(), vec!["AT+CWJAP_CUR=\"home\",\"pw\""]);
}

#[test]
fn reconnect_from_any_mode() {
    let port = MockPort::new().on("AT+CWJAP_CUR", b"WIFI GOT IP\r\n");
    let mut modem = modem(Mode::AccessPointServer, port);

    let report = modem.reconnect().unwrap();
    assert!(report.joined);
    assert_eq!(modem.port().commands().len(), 1);
}

#[test]
fn write_failure_propagates() {
    let mut modem = modem(Mode::Station, MockPort::new().failing_writes());
    assert_eq!(modem.join(), Err(Error::WriteError));
}

// --- Outbound ---

const REPLY: &[u8] = b"\r\nRecv 70 bytes\r\n\r\nSEND OK\r\n\r\n+IPD,60:HTTP/1.1 200 OK\r\n\r\n{\"json\":true}CLOSED\r\n";

#[test]
fn outbound_exchange_sends_payload() {
    let payload = b"POST /log HTTP/1.1\r\nHost: 10.0.0.2\r\n\r\n";
    let port = MockPort::new()
        .on("AT+CIPSTART", b"CONNECT\r\n\r\nOK\r\n")
        .on("AT+CIPSEND", PROMPT)
        .on("POST /log", REPLY);
    let mut modem = modem(Mode::Station, port);

    let report = modem.send_request("10.0.0.2", 80, payload, b"json").unwrap();
    assert_eq!(report.path, OutboundState::Sending);
    assert!(report.connected);
    assert!(report.acknowledged);
    assert!(report.replied);
    assert!(report.closed);

    let written = modem.port().written();
    assert!(written.starts_with("AT+CIPSTART=\"TCP\",\"10.0.0.2\",80\r\n"));
    assert!(written.contains(&format!("AT+CIPSEND={}\r\n", payload.len())));
    assert!(written.ends_with(core::str::from_utf8(payload).unwrap()));
    assert_eq!(modem.port().count("AT+CIPCLOSE"), 0);
    assert_eq!(modem.port().unread(), 2);
}

#[test]
fn missing_prompt_closes_exactly_once() {
    let payload = b"GET / HTTP/1.1\r\n\r\n";
    let port = MockPort::new()
        .on("AT+CIPSTART", OK)
        .on("AT+CIPCLOSE", OK);
    let mut modem = modem(Mode::Station, port);

    let report = modem.send_request("10.0.0.2", 80, payload, b"json").unwrap();
    assert_eq!(report.path, OutboundState::Closing);
    assert!(report.connected);
    assert!(report.closed);
    assert!(!report.acknowledged);

    assert_eq!(modem.port().count("AT+CIPCLOSE\r\n"), 1);
    assert!(!modem.port().written().contains("GET / HTTP/1.1"));
    // open, announce, close: one wait each
    let stats = modem.stats();
    assert_eq!(stats.waits, 3);
    assert_eq!(stats.timeouts, 1);
}

#[test]
fn multiplexed_outbound_uses_reserved_link() {
    let port = MockPort::new()
        .on("AT+CIPSTART", OK)
        .on("AT+CIPCLOSE", OK);
    let mut modem = modem(Mode::AccessPointServer, port);

    modem.send_request("example.com", 8080, b"x", b"json").unwrap();
    let commands = modem.port().commands();
    assert_eq!(commands[0], "AT+CIPSTART=4,\"TCP\",\"example.com\",8080");
    assert_eq!(commands[1], "AT+CIPSEND=4,1");
    assert_eq!(commands[2], "AT+CIPCLOSE=4");
}

#[test]
fn send_http_encodes_request() {
    let port = MockPort::new()
        .on("AT+CIPSTART", OK)
        .on("AT+CIPSEND", PROMPT)
        .on("GET /api", REPLY);
    let mut modem = modem(Mode::Station, port);

    let request = Request::get("/api");
    let report = modem.send_http("10.0.0.2", 80, &request, b"json").unwrap();
    assert_eq!(report.path, OutboundState::Sending);
    assert!(modem
        .port()
        .written()
        .contains("GET /api HTTP/1.1\r\nHost: 10.0.0.2\r\nConnection: close\r\n\r\n"));
}

#[test]
fn empty_payload_is_rejected_before_opening() {
    let mut modem = modem(Mode::Station, MockPort::new());
    assert_eq!(
        modem.send_request("10.0.0.2", 80, b"", b"json"),
        Err(Error::ProtocolError)
    );
    assert!(modem.port().written().is_empty());
}

// --- Inbound ---

#[test]
fn second_frame_overwrites_session() {
    let port = MockPort::new()
        .feed(b"0,CONNECT\r\n\r\n+IPD,0,18:GET /temp HTTP/1.1\r\nOK\r\n")
        .feed(b"3,CONNECT\r\n\r\n+IPD,3,16:GET / HTTP/1.1\r\nOK\r\n")
        .on("AT+CIPSEND=3", PROMPT)
        .on("HTTP/1.1 200", b"\r\nSEND OK\r\n");
    let mut modem = modem(Mode::AccessPointServer, port);

    let first = modem.listen(1000).unwrap();
    assert_eq!(first.link_id, 0);
    assert_eq!(first.target, named("temp"));
    assert_eq!(modem.session().unwrap().link_id, 0);

    let second = modem.listen(1000).unwrap();
    assert_eq!(second.link_id, 3);
    assert_eq!(second.target, RequestTarget::Root);
    assert_eq!(modem.session().unwrap().link_id, 3);
    assert_eq!(modem.state(), InboundState::FrameReceived);

    let body = b"<h1>hi</h1>";
    let header = ResponseHeader::html(body.len()).encode().unwrap();
    let report = modem.respond(header.as_bytes(), body).unwrap();
    assert_eq!(report.link_id, 3);
    assert_eq!(report.outcome, InboundState::ResponseSent);
    assert!(report.confirmed);
    assert_eq!(modem.state(), InboundState::Idle);

    let written = modem.port().written();
    let expected_len = header.len() + body.len();
    assert!(written.starts_with(&format!("AT+CIPSEND=3,{}\r\n", expected_len)));
    assert!(!written.contains("AT+CIPSEND=0"));
    assert!(written.ends_with("<h1>hi</h1>"));
    assert_eq!(modem.stats().frames, 2);
}

#[test]
fn frame_right_after_acknowledgement() {
    let port = MockPort::new()
        .feed(b"+IPD,0,14:GET / HTTP/1.1\r\nOK\r\n+IPD,1,18:GET /temp HTTP/1.1\r\nOK\r\n");
    let mut modem = modem(Mode::AccessPointServer, port);

    assert_eq!(modem.listen(1000).unwrap().link_id, 0);
    assert_eq!(modem.last_response(), b"OK\r\n");
    let second = modem.listen(1000).unwrap();
    assert_eq!(second.link_id, 1);
    assert_eq!(second.target, named("temp"));
    assert_eq!(modem.stats().malformed_frames, 0);
}

#[test]
fn refused_send_closes_stored_link() {
    let port = MockPort::new()
        .feed(b"+IPD,2,18:GET /temp HTTP/1.1\r\nOK\r\n")
        .on("AT+CIPCLOSE=2", b"2,CLOSED\r\n\r\nOK\r\n");
    let mut modem = modem(Mode::AccessPointServer, port);

    modem.listen(1000).unwrap();
    let report = modem.respond(b"HTTP/1.1 200 OK\r\n\r\n", b"22.5").unwrap();
    assert_eq!(report.outcome, InboundState::ConnectionClosed);
    assert!(report.confirmed);
    assert_eq!(modem.state(), InboundState::Idle);

    let written = modem.port().written();
    assert_eq!(modem.port().count("AT+CIPCLOSE=2\r\n"), 1);
    assert!(!written.contains("22.5"));
    // the session is kept after closing
    assert_eq!(modem.session().unwrap().link_id, 2);
}

#[test]
fn respond_before_any_request_is_not_open() {
    let mut modem = modem(Mode::AccessPointServer, MockPort::new());
    assert_eq!(modem.respond(b"h", b"b"), Err(Error::NotOpen));
    assert!(modem.port().written().is_empty());
}

#[test]
fn malformed_frames_are_dropped() {
    let port = MockPort::new()
        .feed(b"+IPD,x,5:GET /\r\n")
        .feed(b"+IPD,1,0:GET / HTTP/1.1\r\n")
        .feed(b"+IPD,1,10GET / HTTP/1.1\r\n")
        .feed(b"busy p...\r\n")
        .feed(b"+IPD,1,22:GET /status HTTP/1.1\r\nOK\r\n");
    let mut modem = modem(Mode::AccessPointServer, port);

    let frame = modem.listen(1000).unwrap();
    assert_eq!(frame.link_id, 1);
    assert_eq!(frame.target, named("status"));
    let stats = modem.stats();
    assert_eq!(stats.malformed_frames, 3);
    assert_eq!(stats.frames, 1);
}

#[test]
fn single_connection_frames_use_implicit_link() {
    let port = MockPort::new()
        .feed(b"+IPD,24:GET /status HTTP/1.1\r\nOK\r\n")
        .on("AT+CIPSEND", PROMPT)
        .on("HTTP", b"SEND OK\r\n");
    let mut modem = modem(Mode::Station, port);

    let frame = modem.listen(1000).unwrap();
    assert_eq!(frame.link_id, 0);
    assert_eq!(frame.length, 24);
    assert_eq!(frame.target, named("status"));

    let report = modem.respond(b"HTTP/1.1 200 OK\r\n\r\n", b"up").unwrap();
    assert_eq!(report.outcome, InboundState::ResponseSent);
    assert_eq!(modem.port().commands(), vec!["AT+CIPSEND=21"]);
}

#[test]
fn listen_times_out_on_noise() {
    let port = MockPort::new().feed(b"WIFI DISCONNECT\r\nWIFI CONNECTED\r\n");
    let mut modem = modem(Mode::AccessPointServer, port);

    assert!(modem.listen(200).is_none());
    assert!(modem.session().is_none());
    assert_eq!(modem.state(), InboundState::Idle);
    assert_eq!(modem.port().unread(), 0);
}

#[test]
fn frame_after_buffer_wrap_still_decodes() {
    let port = MockPort::new()
        .feed(&[b'#'; 32])
        .feed(b"+IPD,1,9:GET /a HTTP\r\nOK\r\n");
    let mut modem: Modem<_, _, 32> = Modem::new(port, TickClock::new(), config(Mode::AccessPointServer));

    let frame = modem.listen(1000).unwrap();
    assert_eq!(frame.target, named("a"));
    assert_eq!(modem.stats().overflows, 1);
}

// --- Diagnostics ---

static CAPTURED: OnceLock<Mutex<String>> = OnceLock::new();

fn capture(text: &str) {
    CAPTURED
        .get_or_init(|| Mutex::new(String::new()))
        .lock()
        .unwrap()
        .push_str(text);
}

#[test]
fn responses_are_echoed_to_output_function() {
    let port = MockPort::new().on("AT+CWJAP_CUR", b"WIFI CONNECTED\r\nWIFI GOT IP\r\n");
    let mut modem = modem(Mode::Reconnect, port);
    modem.set_output_function(capture);

    modem.join().unwrap();
    assert_eq!(modem.last_response(), b"WIFI CONNECTED\r\nWIFI GOT IP\r\n");
    let captured = CAPTURED.get().unwrap().lock().unwrap().clone();
    assert!(captured.contains("WIFI CONNECTED\r\nWIFI GOT IP\r\n"));
    assert!(captured.contains("[modem ready]"));
}

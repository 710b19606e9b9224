//! Diagnostic console sink.
//!
//! The driver echoes every modem response it consumes to an optional output
//! function so an operator can watch the conversation on a debug UART. The
//! sink is for visibility only and takes no part in the protocol.

/// Function signature for diagnostic output handlers.
///
/// # Examples
///
/// ```rust
/// use esplink::system::console::OutputFn;
///
/// let uart_output: OutputFn = |text| {
///     print!("{}", text);
/// };
/// ```
pub type OutputFn = fn(&str);

/// Writes `text` to the sink, if one is installed.
pub(crate) fn emit(sink: Option<OutputFn>, text: &str) {
    if let Some(output) = sink {
        output(text);
    }
}

/// Writes raw modem bytes to the sink.
///
/// Modem output is ASCII in practice; anything after the first invalid
/// UTF-8 sequence is cut off rather than replaced.
pub(crate) fn emit_bytes(sink: Option<OutputFn>, bytes: &[u8]) {
    let Some(output) = sink else {
        return;
    };
    output(printable(bytes));
}

/// Longest valid UTF-8 prefix of `bytes`.
pub(crate) fn printable(bytes: &[u8]) -> &str {
    match core::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
    }
}

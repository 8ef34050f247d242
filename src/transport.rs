use crate::error::ErrorKind;
use crate::request::Request;

/// Outcome of a single transmit attempt, as classified by the transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransmitOutcome {
    /// the slave responded and the response payload was applied
    Success,
    /// no response arrived within the transport's timeout window
    Timeout,
    /// the transport rejected the request parameters
    InvalidArgument,
    /// the slave rejected the function code as unsupported
    UnsupportedFunction,
    /// the response was malformed or did not match the request
    InvalidResponse,
    /// a failure the transport could not classify further
    Failure,
}

/// The low-level request transmission primitive.
///
/// Implementations own the wire: serial framing, CRC/LRC checksums, PDU
/// construction, and the per-attempt timeout all live behind this trait.
/// The access layer counts attempts and decides whether to retry; it never
/// touches bytes beyond the request payload.
///
/// For read requests the transport writes the response payload into
/// [`Request::payload`]; for write requests it reads the outgoing image from
/// it. Implementations are shared by immutable reference across every device
/// handle built on them, and the access layer assumes at most one request is
/// in flight per transport at a time; concurrent callers are not serialized
/// here.
pub trait Transport {
    /// execute one request/response round trip
    fn transmit(&self, request: &mut Request) -> TransmitOutcome;
}

/// Lifecycle of a communication stack handle.
///
/// The typed operations never call these; application wiring creates and
/// starts the stack before building device handles against it, and stops it
/// when polling ends.
pub trait Lifecycle: Sized {
    /// link configuration consumed when the stack is created
    type Settings;

    /// create the communication stack
    ///
    /// Fails with [`ErrorKind::PortNotSupported`] when the requested
    /// communication mode is unavailable, [`ErrorKind::InvalidState`] when
    /// the stack cannot be set up, or [`ErrorKind::Failure`] otherwise.
    fn create(settings: Self::Settings) -> Result<Self, ErrorKind>;

    /// start the communication stack
    ///
    /// Returns [`ErrorKind::InvalidArgument`] when the stack rejects its
    /// configuration.
    fn start(&mut self) -> ErrorKind;

    /// stop the communication stack
    ///
    /// Returns [`ErrorKind::InvalidState`] when the stack was never started.
    fn stop(&mut self) -> ErrorKind;
}

/// Serial link parameters for lifecycle implementations that open a serial
/// port. The access layer itself never reads these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialSettings {
    /// path of the serial device, e.g. `/dev/ttyUSB0` on Linux or `COM3` on
    /// Windows
    pub path: String,
    /// baud rate of the link
    pub baud_rate: u32,
    /// number of data bits per character
    pub data_bits: u8,
    /// number of stop bits per character
    pub stop_bits: u8,
    /// parity checking mode
    pub parity: Parity,
}

/// Parity checking mode of a serial link
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parity {
    /// no parity bit
    None,
    /// odd parity
    Odd,
    /// even parity
    Even,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            path: "/dev/ttyUSB0".to_string(),
            baud_rate: 19200,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
        }
    }
}

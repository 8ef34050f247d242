use std::fmt::{Display, Formatter};

/// The closed set of outcomes every request resolves to.
///
/// One enumeration unifies three origins: local transport failures,
/// slave-reported rejections, and local misuse of the typed operations.
/// `Ok` is part of the set: write operations return an `ErrorKind` directly
/// and read operations pair one with the decoded data in
/// [`SlaveReturn`](crate::SlaveReturn).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// the request succeeded and the response payload is valid
    Ok,
    /// the request parameters violate a precondition
    InvalidArgument,
    /// the slave response was malformed or did not match the request
    InvalidResponse,
    /// the slave rejected the function code as unsupported
    SlaveNotSupported,
    /// the transport does not support the requested communication mode
    PortNotSupported,
    /// the transport or device is not in a state where the operation is legal
    InvalidState,
    /// no response was received within the transport's timeout window after
    /// exhausting the retry budget
    Timeout,
    /// an undifferentiated failure the transport could not classify further
    Failure,
}

impl ErrorKind {
    /// true when the request succeeded
    pub fn is_ok(self) -> bool {
        self == ErrorKind::Ok
    }

    /// true for every kind except [`ErrorKind::Ok`]
    pub fn is_err(self) -> bool {
        !self.is_ok()
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Ok => f.write_str("request succeeded"),
            ErrorKind::InvalidArgument => {
                f.write_str("request parameters violate a precondition")
            }
            ErrorKind::InvalidResponse => {
                f.write_str("slave response was malformed or did not match the request")
            }
            ErrorKind::SlaveNotSupported => {
                f.write_str("slave rejected the function code as unsupported")
            }
            ErrorKind::PortNotSupported => {
                f.write_str("transport does not support the requested communication mode")
            }
            ErrorKind::InvalidState => {
                f.write_str("transport or device is not in a state where the operation is legal")
            }
            ErrorKind::Timeout => {
                f.write_str("no response was received after exhausting the retry budget")
            }
            ErrorKind::Failure => f.write_str("undifferentiated transport failure"),
        }
    }
}

/// Errors that indicate faulty internal logic while moving bytes through a
/// payload buffer. These never occur when the buffer is sized from the value
/// type's width; they surface as [`ErrorKind::Failure`] at the API boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InternalError {
    /// attempted to write more bytes than the payload buffer has room for
    InsufficientWriteSpace(usize, usize), // requested / remaining
    /// attempted to read more bytes than the payload buffer holds
    InsufficientBytesForRead(usize, usize), // requested / remaining
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InternalError::InsufficientWriteSpace(requested, remaining) => write!(
                f,
                "attempted to write {requested} bytes with {remaining} bytes remaining"
            ),
            InternalError::InsufficientBytesForRead(requested, remaining) => write!(
                f,
                "attempted to read {requested} bytes with only {remaining} remaining"
            ),
        }
    }
}

impl std::error::Error for InternalError {}

impl From<InternalError> for ErrorKind {
    fn from(_: InternalError) -> Self {
        ErrorKind::Failure
    }
}

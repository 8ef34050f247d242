use crate::constants;
use crate::error::ErrorKind;

/// Modbus slave address, a type-safe wrapper around `u8`.
///
/// The value 0 is the Modbus broadcast address; it is passed through to the
/// transport without validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlaveAddress {
    /// underlying raw value
    pub value: u8,
}

impl SlaveAddress {
    /// create the address from its raw value
    pub const fn new(value: u8) -> Self {
        Self { value }
    }
}

impl std::fmt::Display for SlaveAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04X}", self.value)
    }
}

/// Paired outcome and data returned by every read operation.
///
/// `data` is meaningful only when `error` is [`ErrorKind::Ok`]; on any other
/// outcome it holds the type's default value. Callers must check `error`
/// before trusting `data`. Failures never panic, they come back through this
/// pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlaveReturn<T> {
    /// outcome of the request
    pub error: ErrorKind,
    /// decoded payload, valid only when `error == ErrorKind::Ok`
    pub data: T,
}

impl<T> SlaveReturn<T>
where
    T: Default,
{
    pub(crate) fn ok(data: T) -> Self {
        Self {
            error: ErrorKind::Ok,
            data,
        }
    }

    pub(crate) fn err(error: ErrorKind) -> Self {
        Self {
            error,
            data: T::default(),
        }
    }

    /// view the pair as a std `Result`
    pub fn into_result(self) -> Result<T, ErrorKind> {
        if self.error.is_ok() {
            Ok(self.data)
        } else {
            Err(self.error)
        }
    }
}

pub(crate) fn coil_to_u16(value: bool) -> u16 {
    if value {
        constants::coil::ON
    } else {
        constants::coil::OFF
    }
}

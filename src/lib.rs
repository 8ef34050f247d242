//! A master-side access layer for the Modbus RTU/ASCII register model.
//!
//! Application code declares a fixed-size value (an integer, a float, or a
//! bit) and reads or writes it at a register or coil address on a remote
//! slave device, without hand-building protocol requests. The crate maps
//! each value type to the correct function code and register/coil count,
//! moves the raw bytes in and out of the request payload, and retries
//! timed-out requests a bounded number of times.
//!
//! Wire concerns live elsewhere: serial framing, CRC/LRC checksums, and
//! PDU construction all belong to the [`Transport`] implementation that the
//! application supplies, together with the per-attempt timeout. This crate
//! only decides *what* to ask for and *how often* to ask again.
//!
//! # Example
//!
//! ```no_run
//! use regbus::*;
//!
//! // the application supplies the wire transport
//! struct Stub;
//!
//! impl Transport for Stub {
//!     fn transmit(&self, _request: &mut Request) -> TransmitOutcome {
//!         TransmitOutcome::Timeout
//!     }
//! }
//!
//! let transport = Stub;
//! let device = SlaveDevice::new(&transport, SlaveAddress::new(0x01), 2);
//!
//! let voltage: SlaveReturn<f32> = device.read_holding(0x0010);
//! if voltage.error.is_ok() {
//!     println!("voltage: {}", voltage.data);
//! }
//! ```

mod constants;
mod decode;
mod device;
mod error;
mod function;
mod request;
mod transport;
mod types;
mod value;

mod util {
    pub(crate) mod cursor;
}

pub use crate::decode::*;
pub use crate::device::*;
pub use crate::error::*;
pub use crate::function::*;
pub use crate::request::Request;
pub use crate::transport::*;
pub use crate::types::*;
pub use crate::util::cursor::{ReadCursor, WriteCursor};
pub use crate::value::*;

use crate::constants::MAX_VALUE_WIDTH;
use crate::decode::AppDecodeLevel;
use crate::error::ErrorKind;
use crate::function::FunctionCode;
use crate::request::{self, Request};
use crate::transport::Transport;
use crate::types::{SlaveAddress, SlaveReturn};
use crate::util::cursor::{ReadCursor, WriteCursor};
use crate::value::{RegisterValue, Value};

/// The six typed operations a slave device exposes.
///
/// Device implementations satisfy this capability trait so that callers can
/// be generic over *any* device rather than holding a concrete type.
/// [`SlaveDevice`] is the stock implementation; a device that needs custom
/// access logic implements the trait itself.
pub trait SlaveAccess {
    /// write a value to the holding registers starting at `reg`
    fn write_holding<V: RegisterValue>(&self, reg: u16, value: V) -> ErrorKind;

    /// read a value from the holding registers starting at `reg`
    fn read_holding<V: RegisterValue>(&self, reg: u16) -> SlaveReturn<V>;

    /// write a value to `count` coils starting at `reg`
    ///
    /// Two shapes are legal: a `bool` with `count == 1` (write single coil),
    /// or a register-sized value carrying a coil bitmap with `1 < count <=`
    /// the value's bit width (write multiple coils). Every other combination
    /// is [`ErrorKind::InvalidArgument`] and never reaches the transport.
    fn write_coils<V: Value>(&self, reg: u16, value: V, count: u16) -> ErrorKind;

    /// read `count` coils starting at `reg`
    ///
    /// A `bool` with `count == 1` decodes the single status byte; any other
    /// value type receives the raw payload image.
    fn read_coils<V: Value>(&self, reg: u16, count: u16) -> SlaveReturn<V>;

    /// read a value from the input registers starting at `reg`
    fn read_inputs<V: Value>(&self, reg: u16) -> SlaveReturn<V>;

    /// read a value from the discrete inputs starting at `reg`
    ///
    /// Discrete inputs are bit-addressed: a non-bool value covers one input
    /// per bit of its image, a `bool` covers a single input.
    fn read_discrete_inputs<V: Value>(&self, reg: u16) -> SlaveReturn<V>;
}

/// Per-device facade over a shared transport.
///
/// Binds a slave address and a retry budget at construction time, immutably,
/// and turns each typed operation into exactly one dispatched request. The
/// handle holds no other state: there is no caching, no reordering, and no
/// session to keep alive, so one handle is typically created per physical
/// device and reused for the life of the application.
pub struct SlaveDevice<'a, T: Transport> {
    transport: &'a T,
    address: SlaveAddress,
    retries: u8,
    decode: AppDecodeLevel,
}

impl<'a, T: Transport> SlaveDevice<'a, T> {
    /// create a handle for the device at `address`
    ///
    /// `retries` is the number of additional attempts permitted after the
    /// first transmit of a request times out; zero disables retrying.
    pub fn new(transport: &'a T, address: SlaveAddress, retries: u8) -> Self {
        Self {
            transport,
            address,
            retries,
            decode: AppDecodeLevel::Nothing,
        }
    }

    /// address the handle was bound to
    pub fn address(&self) -> SlaveAddress {
        self.address
    }

    /// change how much of each request is decoded into the log
    pub fn set_decode_level(&mut self, decode: AppDecodeLevel) {
        self.decode = decode;
    }

    fn dispatch(
        &self,
        function: FunctionCode,
        start: u16,
        count: u16,
        payload: &mut [u8],
    ) -> ErrorKind {
        let mut request = Request {
            slave: self.address,
            function,
            start,
            count,
            payload,
        };
        request::send(self.transport, &mut request, self.retries, self.decode)
    }

    fn read<V: Value>(&self, function: FunctionCode, start: u16, count: u16) -> SlaveReturn<V> {
        let mut buffer = [0u8; MAX_VALUE_WIDTH];
        let payload = &mut buffer[..V::WIDTH];

        let error = self.dispatch(function, start, count, payload);
        if error.is_err() {
            return SlaveReturn::err(error);
        }

        decode_payload(payload)
    }
}

impl<'a, T: Transport> SlaveAccess for SlaveDevice<'a, T> {
    fn write_holding<V: RegisterValue>(&self, reg: u16, value: V) -> ErrorKind {
        let mut buffer = [0u8; MAX_VALUE_WIDTH];
        let payload = &mut buffer[..V::WIDTH];

        let mut cursor = WriteCursor::new(payload);
        if let Err(err) = value.encode(&mut cursor) {
            return err.into();
        }

        let function = if V::REGISTERS > 1 {
            FunctionCode::WriteMultipleRegisters
        } else {
            FunctionCode::WriteSingleRegister
        };

        self.dispatch(function, reg, V::REGISTERS, payload)
    }

    fn read_holding<V: RegisterValue>(&self, reg: u16) -> SlaveReturn<V> {
        self.read(FunctionCode::ReadHoldingRegisters, reg, V::REGISTERS)
    }

    fn write_coils<V: Value>(&self, reg: u16, value: V, count: u16) -> ErrorKind {
        let mut buffer = [0u8; MAX_VALUE_WIDTH];

        if count == 1 {
            let image = match value.single_coil_image() {
                Some(image) => image,
                None => return ErrorKind::InvalidArgument,
            };
            let payload = &mut buffer[..2];
            let mut cursor = WriteCursor::new(payload);
            if let Err(err) = cursor.write_u16(image) {
                return err.into();
            }
            return self.dispatch(FunctionCode::WriteSingleCoil, reg, 1, payload);
        }

        // a bitmap write draws its bits from the value image
        if V::IS_BIT || count == 0 || count > V::BIT_WIDTH {
            return ErrorKind::InvalidArgument;
        }

        let payload = &mut buffer[..V::WIDTH];
        let mut cursor = WriteCursor::new(payload);
        if let Err(err) = value.encode(&mut cursor) {
            return err.into();
        }

        self.dispatch(FunctionCode::WriteMultipleCoils, reg, count, payload)
    }

    fn read_coils<V: Value>(&self, reg: u16, count: u16) -> SlaveReturn<V> {
        self.read(FunctionCode::ReadCoils, reg, count)
    }

    fn read_inputs<V: Value>(&self, reg: u16) -> SlaveReturn<V> {
        self.read(FunctionCode::ReadInputRegisters, reg, V::REGISTERS)
    }

    fn read_discrete_inputs<V: Value>(&self, reg: u16) -> SlaveReturn<V> {
        let count = if V::IS_BIT { 1 } else { V::BIT_WIDTH };
        self.read(FunctionCode::ReadDiscreteInputs, reg, count)
    }
}

fn decode_payload<V: Value>(payload: &[u8]) -> SlaveReturn<V> {
    let mut cursor = ReadCursor::new(payload);
    match V::decode(&mut cursor) {
        Ok(data) => SlaveReturn::ok(data),
        Err(err) => SlaveReturn::err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransmitOutcome;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    struct Issued {
        function: u8,
        start: u16,
        count: u16,
        payload: Vec<u8>,
    }

    /// records every request and answers with a scripted payload
    struct Recording {
        issued: RefCell<Vec<Issued>>,
        response: Vec<u8>,
    }

    impl Recording {
        fn new() -> Self {
            Self {
                issued: RefCell::new(Vec::new()),
                response: Vec::new(),
            }
        }

        fn respond_with(response: &[u8]) -> Self {
            Self {
                issued: RefCell::new(Vec::new()),
                response: response.to_vec(),
            }
        }

        fn single(&self) -> Issued {
            let issued = self.issued.borrow();
            assert_eq!(issued.len(), 1);
            issued[0].clone()
        }

        fn count(&self) -> usize {
            self.issued.borrow().len()
        }
    }

    impl Transport for Recording {
        fn transmit(&self, request: &mut Request) -> TransmitOutcome {
            self.issued.borrow_mut().push(Issued {
                function: request.function.get_value(),
                start: request.start,
                count: request.count,
                payload: request.payload.to_vec(),
            });
            if !self.response.is_empty() {
                request.payload.copy_from_slice(&self.response);
            }
            TransmitOutcome::Success
        }
    }

    fn device(transport: &Recording) -> SlaveDevice<'_, Recording> {
        SlaveDevice::new(transport, SlaveAddress::new(0x11), 0)
    }

    #[test]
    fn single_register_writes_use_function_0x06() {
        let transport = Recording::new();
        assert!(device(&transport).write_holding(0x0040, 0xBEEFu16).is_ok());

        let issued = transport.single();
        assert_eq!(issued.function, 0x06);
        assert_eq!(issued.start, 0x0040);
        assert_eq!(issued.count, 1);
        assert_eq!(issued.payload, 0xBEEFu16.to_ne_bytes());
    }

    #[test]
    fn multi_register_writes_use_function_0x10() {
        let transport = Recording::new();
        assert!(device(&transport)
            .write_holding(0x0002, 0xDEAD_BEEFu32)
            .is_ok());

        let issued = transport.single();
        assert_eq!(issued.function, 0x10);
        assert_eq!(issued.count, 2);
        assert_eq!(issued.payload, 0xDEAD_BEEFu32.to_ne_bytes());
    }

    #[test]
    fn holding_reads_use_function_0x03_and_width_derived_counts() {
        let transport = Recording::respond_with(&1.5f64.to_ne_bytes());
        let read: SlaveReturn<f64> = device(&transport).read_holding(0x0100);
        assert_eq!(read.into_result(), Ok(1.5));

        let issued = transport.single();
        assert_eq!(issued.function, 0x03);
        assert_eq!(issued.start, 0x0100);
        assert_eq!(issued.count, 4);
    }

    #[test]
    fn single_coil_writes_encode_on_and_off_images() {
        let transport = Recording::new();
        assert!(device(&transport).write_coils(0x0000, true, 1).is_ok());
        let issued = transport.single();
        assert_eq!(issued.function, 0x05);
        assert_eq!(issued.count, 1);
        assert_eq!(issued.payload, 0xFF00u16.to_ne_bytes());

        let transport = Recording::new();
        assert!(device(&transport).write_coils(0x0000, false, 1).is_ok());
        assert_eq!(transport.single().payload, 0x0000u16.to_ne_bytes());
    }

    #[test]
    fn bitmap_coil_writes_use_function_0x0f() {
        let transport = Recording::new();
        assert!(device(&transport).write_coils(0x0001, 0xAAAAu16, 16).is_ok());

        let issued = transport.single();
        assert_eq!(issued.function, 0x0F);
        assert_eq!(issued.count, 16);
        assert_eq!(issued.payload, 0xAAAAu16.to_ne_bytes());
    }

    #[test]
    fn illegal_coil_write_shapes_never_reach_the_transport() {
        let transport = Recording::new();
        let device = device(&transport);

        // a bit value cannot span multiple coils
        assert_eq!(device.write_coils(0, true, 2), ErrorKind::InvalidArgument);
        // a register value cannot target a single coil
        assert_eq!(
            device.write_coils(0, 0x0101u16, 1),
            ErrorKind::InvalidArgument
        );
        // zero coils is never a request
        assert_eq!(device.write_coils(0, 0x0101u16, 0), ErrorKind::InvalidArgument);
        // the bitmap cannot cover more coils than the value has bits
        assert_eq!(
            device.write_coils(0, 0x0101u16, 17),
            ErrorKind::InvalidArgument
        );

        assert_eq!(transport.count(), 0);
    }

    #[test]
    fn coil_reads_use_function_0x01() {
        let transport = Recording::respond_with(&[0x01]);
        let read: SlaveReturn<bool> = device(&transport).read_coils(0x0003, 1);
        assert_eq!(read.into_result(), Ok(true));

        let issued = transport.single();
        assert_eq!(issued.function, 0x01);
        assert_eq!(issued.count, 1);

        let transport = Recording::respond_with(&0x00F0u16.to_ne_bytes());
        let read: SlaveReturn<u16> = device(&transport).read_coils(0x0000, 16);
        assert_eq!(read.into_result(), Ok(0x00F0));
        assert_eq!(transport.single().count, 16);
    }

    #[test]
    fn input_register_reads_use_function_0x04() {
        let transport = Recording::respond_with(&0x1234_5678u32.to_ne_bytes());
        let read: SlaveReturn<u32> = device(&transport).read_inputs(0x0008);
        assert_eq!(read.into_result(), Ok(0x1234_5678));

        let issued = transport.single();
        assert_eq!(issued.function, 0x04);
        assert_eq!(issued.count, 2);
    }

    #[test]
    fn bool_input_register_reads_request_one_register() {
        let transport = Recording::respond_with(&[0x01]);
        let read: SlaveReturn<bool> = device(&transport).read_inputs(0x0008);
        assert_eq!(read.into_result(), Ok(true));
        assert_eq!(transport.single().count, 1);
    }

    #[test]
    fn discrete_input_reads_are_bit_addressed() {
        let transport = Recording::respond_with(&[0x00]);
        let read: SlaveReturn<bool> = device(&transport).read_discrete_inputs(0x0000);
        assert_eq!(read.into_result(), Ok(false));
        let issued = transport.single();
        assert_eq!(issued.function, 0x02);
        assert_eq!(issued.count, 1);

        let transport = Recording::respond_with(&0x8001u16.to_ne_bytes());
        let read: SlaveReturn<u16> = device(&transport).read_discrete_inputs(0x0000);
        assert_eq!(read.into_result(), Ok(0x8001));
        assert_eq!(transport.single().count, 16);
    }

    #[test]
    fn failed_reads_return_default_data() {
        struct Refusing;
        impl Transport for Refusing {
            fn transmit(&self, _request: &mut Request) -> TransmitOutcome {
                TransmitOutcome::UnsupportedFunction
            }
        }

        let transport = Refusing;
        let device = SlaveDevice::new(&transport, SlaveAddress::new(0x02), 3);
        let read: SlaveReturn<u32> = device.read_holding(0x0000);
        assert_eq!(read.error, ErrorKind::SlaveNotSupported);
        assert_eq!(read.data, 0);
    }
}

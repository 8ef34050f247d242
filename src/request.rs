use std::fmt::{Display, Formatter};

use crate::decode::AppDecodeLevel;
use crate::error::ErrorKind;
use crate::function::FunctionCode;
use crate::transport::{TransmitOutcome, Transport};
use crate::types::SlaveAddress;

/// Wire-level parameter block handed to the transport, built fresh for every
/// call and never persisted.
pub struct Request<'a> {
    /// address of the slave device
    pub slave: SlaveAddress,
    /// function code of the operation
    pub function: FunctionCode,
    /// starting register or coil address
    pub start: u16,
    /// number of registers or coils the request covers
    pub count: u16,
    /// raw payload image; the outgoing bytes of a write, the response
    /// destination of a read
    pub payload: &'a mut [u8],
}

pub(crate) struct RequestDisplay<'a, 'b> {
    request: &'a Request<'b>,
    level: AppDecodeLevel,
}

impl<'a, 'b> RequestDisplay<'a, 'b> {
    pub(crate) fn new(level: AppDecodeLevel, request: &'a Request<'b>) -> Self {
        Self { request, level }
    }
}

impl Display for RequestDisplay<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.request.function)?;

        if self.level.data_headers() {
            write!(
                f,
                " slave: {} start: {:#06X} qty: {}",
                self.request.slave, self.request.start, self.request.count
            )?;
        }

        if self.level.data_values() {
            for byte in self.request.payload.iter() {
                write!(f, " {byte:02X}")?;
            }
        }

        Ok(())
    }
}

/// Execute one request against the transport with a bounded-retry timeout
/// policy and translate the outcome.
///
/// Only a timeout is retried: a malformed response, an unsupported function,
/// or a rejected argument is a deterministic answer and repeating the request
/// would not change it.
pub(crate) fn send<T: Transport>(
    transport: &T,
    request: &mut Request,
    retries: u8,
    decode: AppDecodeLevel,
) -> ErrorKind {
    if decode.enabled() {
        tracing::info!("tx: {}", RequestDisplay::new(decode, request));
    }

    let mut attempts: u16 = 0;
    let outcome = loop {
        attempts += 1;
        let outcome = transport.transmit(request);
        if outcome != TransmitOutcome::Timeout {
            break outcome;
        }
        if attempts > u16::from(retries) {
            break outcome;
        }
        tracing::warn!(
            "no response to {}, retrying ({}/{})",
            request.function,
            attempts,
            retries
        );
    };

    let result = match outcome {
        TransmitOutcome::Success => ErrorKind::Ok,
        TransmitOutcome::Timeout => ErrorKind::Timeout,
        TransmitOutcome::InvalidArgument => ErrorKind::InvalidArgument,
        TransmitOutcome::UnsupportedFunction => ErrorKind::SlaveNotSupported,
        TransmitOutcome::InvalidResponse => ErrorKind::InvalidResponse,
        TransmitOutcome::Failure => ErrorKind::Failure,
    };

    if result.is_err() {
        tracing::warn!("{} failed: {}", request.function, result);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct Scripted {
        calls: Cell<u16>,
        outcomes: RefCell<Vec<TransmitOutcome>>,
    }

    impl Scripted {
        fn new(outcomes: &[TransmitOutcome]) -> Self {
            Self {
                calls: Cell::new(0),
                outcomes: RefCell::new(outcomes.to_vec()),
            }
        }

        fn calls(&self) -> u16 {
            self.calls.get()
        }
    }

    impl Transport for Scripted {
        fn transmit(&self, _request: &mut Request) -> TransmitOutcome {
            self.calls.set(self.calls.get() + 1);
            let mut outcomes = self.outcomes.borrow_mut();
            if outcomes.len() > 1 {
                outcomes.remove(0)
            } else {
                outcomes[0]
            }
        }
    }

    fn run(transport: &Scripted, retries: u8) -> ErrorKind {
        let mut payload = [0u8; 2];
        let mut request = Request {
            slave: SlaveAddress::new(0x01),
            function: FunctionCode::ReadHoldingRegisters,
            start: 0x0000,
            count: 1,
            payload: &mut payload,
        };
        send(transport, &mut request, retries, AppDecodeLevel::Nothing)
    }

    #[test]
    fn exhausting_the_retry_budget_makes_budget_plus_one_attempts() {
        for retries in 0..4u8 {
            let transport = Scripted::new(&[TransmitOutcome::Timeout]);
            assert_eq!(run(&transport, retries), ErrorKind::Timeout);
            assert_eq!(transport.calls(), u16::from(retries) + 1);
        }
    }

    #[test]
    fn success_stops_the_retry_loop() {
        let transport = Scripted::new(&[
            TransmitOutcome::Timeout,
            TransmitOutcome::Timeout,
            TransmitOutcome::Success,
        ]);
        assert_eq!(run(&transport, 5), ErrorKind::Ok);
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn non_timeout_outcomes_return_after_a_single_attempt() {
        let cases = [
            (TransmitOutcome::Success, ErrorKind::Ok),
            (TransmitOutcome::InvalidArgument, ErrorKind::InvalidArgument),
            (
                TransmitOutcome::UnsupportedFunction,
                ErrorKind::SlaveNotSupported,
            ),
            (TransmitOutcome::InvalidResponse, ErrorKind::InvalidResponse),
            (TransmitOutcome::Failure, ErrorKind::Failure),
        ];

        for (outcome, expected) in cases {
            let transport = Scripted::new(&[outcome]);
            assert_eq!(run(&transport, 7), expected);
            assert_eq!(transport.calls(), 1);
        }
    }

    #[test]
    fn zero_budget_timeout_still_reports_timeout() {
        let transport = Scripted::new(&[TransmitOutcome::Timeout]);
        assert_eq!(run(&transport, 0), ErrorKind::Timeout);
        assert_eq!(transport.calls(), 1);
    }
}

//! Polls a simulated slave device through the typed access layer.
//!
//! The simulated link stands in for a real serial communication stack: it
//! honors the same lifecycle and transmit contract, but answers out of an
//! in-memory register bank instead of a wire.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use clap::Parser;

use regbus::*;

#[derive(Parser)]
#[command(name = "single_slave")]
#[command(about = "Polls a simulated Modbus slave device with typed register access")]
struct Cli {
    #[arg(short = 'i', long, default_value = "1", help = "Slave address of the device")]
    id: u8,

    #[arg(short = 'r', long, default_value = "1", help = "Retry budget per request")]
    retries: u8,

    #[arg(short = 'n', long, default_value = "5", help = "Number of polling rounds")]
    rounds: u32,

    #[arg(short = 'v', long, help = "Decode issued requests into the log")]
    verbose: bool,
}

/// serial stack stand-in backed by an in-memory register bank
struct SimulatedLink {
    started: bool,
    bank: RefCell<HashMap<u16, Vec<u8>>>,
}

impl Lifecycle for SimulatedLink {
    type Settings = SerialSettings;

    fn create(settings: SerialSettings) -> Result<Self, ErrorKind> {
        tracing::info!(
            "simulating {} at {} baud",
            settings.path,
            settings.baud_rate
        );
        Ok(Self {
            started: false,
            bank: RefCell::new(HashMap::new()),
        })
    }

    fn start(&mut self) -> ErrorKind {
        self.started = true;
        ErrorKind::Ok
    }

    fn stop(&mut self) -> ErrorKind {
        if !self.started {
            return ErrorKind::InvalidState;
        }
        self.started = false;
        ErrorKind::Ok
    }
}

impl Transport for SimulatedLink {
    fn transmit(&self, request: &mut Request) -> TransmitOutcome {
        match request.function {
            FunctionCode::WriteSingleCoil
            | FunctionCode::WriteMultipleCoils
            | FunctionCode::WriteSingleRegister
            | FunctionCode::WriteMultipleRegisters => {
                self.bank
                    .borrow_mut()
                    .insert(request.start, request.payload.to_vec());
                TransmitOutcome::Success
            }
            _ => match self.bank.borrow().get(&request.start) {
                Some(stored) if stored.len() == request.payload.len() => {
                    request.payload.copy_from_slice(stored);
                    TransmitOutcome::Success
                }
                Some(_) => TransmitOutcome::InvalidResponse,
                None => {
                    request.payload.fill(0);
                    TransmitOutcome::Success
                }
            },
        }
    }
}

/// the flow meter as the application sees it
struct MeterDevice<'a> {
    device: SlaveDevice<'a, SimulatedLink>,
}

impl<'a> MeterDevice<'a> {
    const REG_CYCLE_COUNT: u16 = 1;
    const REG_TOTAL_PULSES: u16 = 2;
    const REG_FLOW_RATE: u16 = 4;
    const COIL_LAMP: u16 = 0;

    fn read_cycle_count(&self) -> SlaveReturn<u16> {
        self.device.read_holding(Self::REG_CYCLE_COUNT)
    }

    fn write_cycle_count(&self, value: u16) -> ErrorKind {
        self.device.write_holding(Self::REG_CYCLE_COUNT, value)
    }

    fn read_total_pulses(&self) -> SlaveReturn<u32> {
        self.device.read_holding(Self::REG_TOTAL_PULSES)
    }

    fn write_total_pulses(&self, value: u32) -> ErrorKind {
        self.device.write_holding(Self::REG_TOTAL_PULSES, value)
    }

    fn read_flow_rate(&self) -> SlaveReturn<f32> {
        self.device.read_holding(Self::REG_FLOW_RATE)
    }

    fn write_flow_rate(&self, value: f32) -> ErrorKind {
        self.device.write_holding(Self::REG_FLOW_RATE, value)
    }

    fn set_lamp(&self, energized: bool) -> ErrorKind {
        self.device.write_coils(Self::COIL_LAMP, energized, 1)
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut link = match SimulatedLink::create(SerialSettings::default()) {
        Ok(link) => link,
        Err(error) => {
            tracing::error!("link creation failed: {error}");
            return;
        }
    };

    let error = link.start();
    if error.is_err() {
        tracing::error!("link start failed: {error}");
        return;
    }

    let mut device = SlaveDevice::new(&link, SlaveAddress::new(cli.id), cli.retries);
    if cli.verbose {
        device.set_decode_level(AppDecodeLevel::DataValues);
    }
    let meter = MeterDevice { device };

    for round in 0..cli.rounds {
        let cycles = meter.read_cycle_count();
        let pulses = meter.read_total_pulses();
        let rate = meter.read_flow_rate();

        if cycles.error.is_err() || pulses.error.is_err() || rate.error.is_err() {
            tracing::error!(
                "poll round {round} failed: cycles {} / pulses {} / rate {}",
                cycles.error,
                pulses.error,
                rate.error
            );
            break;
        }

        tracing::info!(
            "cycles: {} total pulses: {} flow rate: {}",
            cycles.data,
            pulses.data,
            rate.data
        );

        let error = meter.write_cycle_count(cycles.data + 1);
        if error.is_err() {
            tracing::warn!("cycle count write failed: {error}");
        }
        let error = meter.write_total_pulses(pulses.data + 17);
        if error.is_err() {
            tracing::warn!("total pulses write failed: {error}");
        }
        let error = meter.write_flow_rate(rate.data + 0.5);
        if error.is_err() {
            tracing::warn!("flow rate write failed: {error}");
        }

        let error = meter.set_lamp(round % 2 == 0);
        if error.is_err() {
            tracing::warn!("lamp write failed: {error}");
        }

        std::thread::sleep(Duration::from_millis(250));
    }

    drop(meter);
    let error = link.stop();
    if error.is_err() {
        tracing::error!("link stop failed: {error}");
    }
}

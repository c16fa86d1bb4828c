//! Recording bus and delay used by the unit tests. Every capability call is captured so
//! tests can assert exact bus traces, and bus reads are served from a script.
extern crate std;

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::bus::{BusDirection, ControlPin, DisplayBus, PinState};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BusEvent {
    InitCommon,
    Direction(BusDirection),
    Ctrl(ControlPin, PinState),
    Read(u8),
    Write(u8),
}

/// A bus transaction seen from the controller side: the latched value together with the
/// register select level at the time of the enable pulse.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Transaction {
    Instruction(u8),
    Data(u8),
    StatusRead(u8),
    DataRead(u8),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TraceBusError;

#[derive(Default)]
pub struct TraceBus {
    events: Vec<BusEvent>,
    reads: VecDeque<u8>,
    idle_read: u8,
    fail_writes: bool,
}

impl TraceBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus whose controller never clears the busy flag.
    pub fn always_busy() -> Self {
        Self {
            idle_read: 0x80,
            ..Self::default()
        }
    }

    /// A bus whose `write_bus` always fails.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Queue a value for the next `read_bus`. Once the queue is empty reads return the idle
    /// value (busy flag clear, address zero unless built with `always_busy`).
    pub fn push_read(&mut self, value: u8) {
        self.reads.push_back(value);
    }

    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Collapse the raw event trace into latched transactions.
    pub fn transactions(&self) -> Vec<Transaction> {
        let mut rs = PinState::Reset;
        let mut result = Vec::new();
        for event in &self.events {
            match *event {
                BusEvent::Ctrl(ControlPin::Rs, state) => rs = state,
                BusEvent::Write(value) => result.push(match rs {
                    PinState::Reset => Transaction::Instruction(value),
                    PinState::Set => Transaction::Data(value),
                }),
                BusEvent::Read(value) => result.push(match rs {
                    PinState::Reset => Transaction::StatusRead(value),
                    PinState::Set => Transaction::DataRead(value),
                }),
                _ => {}
            }
        }
        result
    }

    /// Transactions with the busy-flag polls removed.
    pub fn writes(&self) -> Vec<Transaction> {
        self.transactions()
            .into_iter()
            .filter(|t| matches!(t, Transaction::Instruction(_) | Transaction::Data(_)))
            .collect()
    }
}

impl DisplayBus for TraceBus {
    type Error = TraceBusError;

    fn init_common(&mut self) -> Result<(), Self::Error> {
        self.events.push(BusEvent::InitCommon);
        Ok(())
    }

    fn set_bus_direction(&mut self, direction: BusDirection) -> Result<(), Self::Error> {
        self.events.push(BusEvent::Direction(direction));
        Ok(())
    }

    fn set_ctrl_pin_state(&mut self, pin: ControlPin, state: PinState) -> Result<(), Self::Error> {
        self.events.push(BusEvent::Ctrl(pin, state));
        Ok(())
    }

    fn read_bus(&mut self) -> Result<u8, Self::Error> {
        let value = self.reads.pop_front().unwrap_or(self.idle_read);
        self.events.push(BusEvent::Read(value));
        Ok(value)
    }

    fn write_bus(&mut self, data: u8) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(TraceBusError);
        }
        self.events.push(BusEvent::Write(data));
        Ok(())
    }
}

/// Delay that records every millisecond wait instead of sleeping.
#[derive(Default)]
pub struct TraceDelay {
    pub delays_ms: Vec<u32>,
}

impl DelayNs for TraceDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

// Bus transport and byte framing for the HD44780 parallel interface.
// Hd44780Device owns the capability set and knows how a single enable pulse moves a byte
// (or, on a 4-bit bus, a nibble) between host and controller. It has no busy-flag gating;
// the protocol layer in `hd44780` pairs it with a BusyWaitStrategy for that.
pub mod busy_wait;
pub mod hd44780;

use embedded_hal::delay::DelayNs;

use crate::{
    bus::{BusDirection, ControlPin, DisplayBus, InterfaceWidth, PinState},
    instruction::StatusRegister,
    CharacterDisplayError,
};

pub struct Hd44780Device<BUS, DELAY>
where
    BUS: DisplayBus,
    DELAY: DelayNs,
{
    bus: BUS,
    delay: DELAY,
    interface: InterfaceWidth,
}

impl<BUS, DELAY> Hd44780Device<BUS, DELAY>
where
    BUS: DisplayBus,
    DELAY: DelayNs,
{
    pub fn new(bus: BUS, delay: DELAY, interface: InterfaceWidth) -> Self {
        Self {
            bus,
            delay,
            interface,
        }
    }

    /// returns the configured interface width
    pub fn interface(&self) -> InterfaceWidth {
        self.interface
    }

    /// returns the bus object. mostly used for testing
    pub fn bus(&mut self) -> &mut BUS {
        &mut self.bus
    }

    /// return a mutable reference to the delay object
    pub fn delay(&mut self) -> &mut DELAY {
        &mut self.delay
    }

    /// Blocking wait of `ms` milliseconds.
    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Give back the bus and delay objects.
    pub fn release(self) -> (BUS, DELAY) {
        (self.bus, self.delay)
    }

    /// Platform setup of the control lines.
    pub fn init_common(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.bus
            .init_common()
            .map_err(CharacterDisplayError::BusError)
    }

    /// Select the instruction register (`false`) or the data register (`true`).
    pub fn set_register_select(
        &mut self,
        data: bool,
    ) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.set_ctrl_pin(ControlPin::Rs, data)
    }

    fn set_ctrl_pin(
        &mut self,
        pin: ControlPin,
        high: bool,
    ) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.bus
            .set_ctrl_pin_state(pin, PinState::from(high))
            .map_err(CharacterDisplayError::BusError)
    }

    fn config_bus_as_input(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.bus
            .set_bus_direction(BusDirection::In)
            .map_err(CharacterDisplayError::BusError)?;
        self.set_ctrl_pin(ControlPin::Rw, true)
    }

    fn config_bus_as_output(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.set_ctrl_pin(ControlPin::Rw, false)?;
        self.bus
            .set_bus_direction(BusDirection::Out)
            .map_err(CharacterDisplayError::BusError)
    }

    /// Drive `value` onto the bus and latch it with an enable pulse. On a 4-bit bus only the
    /// high nibble is transferred. Register select is left as it is.
    pub fn write_operation(&mut self, value: u8) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.config_bus_as_output()?;
        self.set_ctrl_pin(ControlPin::E, true)?;
        self.bus
            .write_bus(value)
            .map_err(CharacterDisplayError::BusError)?;
        self.set_ctrl_pin(ControlPin::E, false)
    }

    /// Sample the bus while enable is high. Expects the bus to be configured as input.
    fn read_operation(&mut self) -> Result<u8, CharacterDisplayError<BUS::Error>> {
        self.set_ctrl_pin(ControlPin::E, true)?;
        let value = self.bus.read_bus().map_err(CharacterDisplayError::BusError);
        self.set_ctrl_pin(ControlPin::E, false)?;
        value
    }

    /// Write a full byte regardless of bus width. A 4-bit bus gets the high nibble first,
    /// then the low nibble shifted into the same pin positions.
    pub fn write_byte(&mut self, value: u8) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.write_operation(value)?;
        if self.interface == InterfaceWidth::FourBit {
            self.write_operation(value << 4)?;
        }
        Ok(())
    }

    /// Read a full byte regardless of bus width. Register select is left as it is.
    pub fn read_byte(&mut self) -> Result<u8, CharacterDisplayError<BUS::Error>> {
        self.config_bus_as_input()?;
        let mut value = self.read_operation()?;
        if self.interface == InterfaceWidth::FourBit {
            let low_nibble = self.read_operation()?;
            value = (value & 0xF0) | (low_nibble >> 4);
        }
        Ok(value)
    }

    /// Read the busy flag and address counter.
    pub fn read_status(&mut self) -> Result<StatusRegister, CharacterDisplayError<BUS::Error>> {
        self.set_register_select(false)?;
        Ok(StatusRegister(self.read_byte()?))
    }

    /// Read the CGRAM or DDRAM byte at the current address.
    pub fn read_ram(&mut self) -> Result<u8, CharacterDisplayError<BUS::Error>> {
        self.set_register_select(true)?;
        self.read_byte()
    }

    /// Returns `true` while the controller is still executing the previous instruction.
    pub fn is_busy(&mut self) -> Result<bool, CharacterDisplayError<BUS::Error>> {
        Ok(self.read_status()?.busy())
    }
}

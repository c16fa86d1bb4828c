pub mod gpio;

use core::fmt::Debug;

/// Width of the parallel data bus between the host and the HD44780 controller.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceWidth {
    /// 4-bit interface, data pins D4..D7. Bytes are transferred as two nibbles, high nibble first.
    FourBit,
    /// 8-bit interface, data pins D0..D7.
    EightBit,
}

/// Direction of the data bus pins.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusDirection {
    /// Data pins are inputs so the controller can drive the bus.
    In,
    /// Data pins are driven by the host.
    Out,
}

/// The three control lines of the HD44780 interface.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlPin {
    /// Register select. Low selects the instruction register, high the data register.
    Rs,
    /// Read/write. Low is a write, high is a read.
    Rw,
    /// Enable. A high-then-low pulse latches a bus transaction.
    E,
}

/// Output state of a control pin.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    Reset,
    Set,
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value {
            PinState::Set
        } else {
            PinState::Reset
        }
    }
}

/// Platform capabilities the driver needs to talk to the display. Implement this trait for
/// a target board to connect the driver to its GPIO pins. The driver never touches hardware
/// other than through these methods.
///
/// For a 4-bit interface only the high nibble positions (bits 4..7) of the bytes passed to
/// `write_bus` and returned from `read_bus` carry data; the low nibble is ignored on write and
/// should be zero on read.
pub trait DisplayBus {
    /// Error returned by the platform's pin operations. Use `core::convert::Infallible` when
    /// pin access cannot fail.
    type Error: Debug;

    /// One-time setup of the control lines (E, RS and RW as push-pull outputs).
    fn init_common(&mut self) -> Result<(), Self::Error>;

    /// Switch the data pins between inputs and outputs. The control lines always stay outputs.
    fn set_bus_direction(&mut self, direction: BusDirection) -> Result<(), Self::Error>;

    /// Drive one of the control lines.
    fn set_ctrl_pin_state(&mut self, pin: ControlPin, state: PinState) -> Result<(), Self::Error>;

    /// Sample the data pins into a byte.
    fn read_bus(&mut self) -> Result<u8, Self::Error>;

    /// Drive the data pins from a byte.
    fn write_bus(&mut self, data: u8) -> Result<(), Self::Error>;
}

impl<T> DisplayBus for &mut T
where
    T: DisplayBus + ?Sized,
{
    type Error = T::Error;

    fn init_common(&mut self) -> Result<(), Self::Error> {
        T::init_common(self)
    }

    fn set_bus_direction(&mut self, direction: BusDirection) -> Result<(), Self::Error> {
        T::set_bus_direction(self, direction)
    }

    fn set_ctrl_pin_state(&mut self, pin: ControlPin, state: PinState) -> Result<(), Self::Error> {
        T::set_ctrl_pin_state(self, pin, state)
    }

    fn read_bus(&mut self) -> Result<u8, Self::Error> {
        T::read_bus(self)
    }

    fn write_bus(&mut self, data: u8) -> Result<(), Self::Error> {
        T::write_bus(self, data)
    }
}

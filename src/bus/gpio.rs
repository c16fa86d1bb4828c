use embedded_hal::digital::{Error, ErrorKind, InputPin, OutputPin};

use super::{BusDirection, ControlPin, DisplayBus, InterfaceWidth, PinState};

/// `DisplayBus` implementation over `embedded-hal` GPIO pins.
///
/// `N` is the number of data pins and must be 4 (pins D4..D7, mapped to bits 4..7 of the bus
/// byte) or 8 (pins D0..D7, mapped to bits 0..7). The data pins are used bidirectionally, so
/// they need to implement both `InputPin` and `OutputPin`, typically as open-drain pins with a
/// pull-up. Switching the bus to input releases every data line high, the same way a
/// quasi-bidirectional port expander is read.
pub struct GpioParallelBus<RS, RW, E, D, const N: usize> {
    rs: RS,
    rw: RW,
    enable: E,
    data: [D; N],
}

impl<RS, RW, E, D> GpioParallelBus<RS, RW, E, D, 4>
where
    RS: OutputPin,
    RW: OutputPin,
    E: OutputPin,
    D: InputPin + OutputPin,
{
    /// Create a 4-bit bus. `data` holds pins D4, D5, D6 and D7 in that order.
    pub fn new_4bit(rs: RS, rw: RW, enable: E, data: [D; 4]) -> Self {
        Self {
            rs,
            rw,
            enable,
            data,
        }
    }
}

impl<RS, RW, E, D> GpioParallelBus<RS, RW, E, D, 8>
where
    RS: OutputPin,
    RW: OutputPin,
    E: OutputPin,
    D: InputPin + OutputPin,
{
    /// Create an 8-bit bus. `data` holds pins D0 through D7 in that order.
    pub fn new_8bit(rs: RS, rw: RW, enable: E, data: [D; 8]) -> Self {
        Self {
            rs,
            rw,
            enable,
            data,
        }
    }
}

impl<RS, RW, E, D, const N: usize> GpioParallelBus<RS, RW, E, D, N> {
    /// bit position of the first data pin within the bus byte
    const FIRST_BIT: usize = 8 - N;

    /// Interface width matching the number of data pins.
    pub const fn interface_width(&self) -> InterfaceWidth {
        if N == 8 {
            InterfaceWidth::EightBit
        } else {
            InterfaceWidth::FourBit
        }
    }

    /// Give back the pins.
    pub fn release(self) -> (RS, RW, E, [D; N]) {
        (self.rs, self.rw, self.enable, self.data)
    }
}

fn set_pin<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), ErrorKind> {
    if high {
        pin.set_high().map_err(|e| e.kind())
    } else {
        pin.set_low().map_err(|e| e.kind())
    }
}

impl<RS, RW, E, D, const N: usize> DisplayBus for GpioParallelBus<RS, RW, E, D, N>
where
    RS: OutputPin,
    RW: OutputPin,
    E: OutputPin,
    D: InputPin + OutputPin,
{
    type Error = ErrorKind;

    fn init_common(&mut self) -> Result<(), Self::Error> {
        set_pin(&mut self.enable, false)?;
        set_pin(&mut self.rs, false)?;
        set_pin(&mut self.rw, false)
    }

    fn set_bus_direction(&mut self, direction: BusDirection) -> Result<(), Self::Error> {
        if direction == BusDirection::In {
            for pin in self.data.iter_mut() {
                set_pin(pin, true)?;
            }
        }
        Ok(())
    }

    fn set_ctrl_pin_state(&mut self, pin: ControlPin, state: PinState) -> Result<(), Self::Error> {
        let high = state == PinState::Set;
        match pin {
            ControlPin::Rs => set_pin(&mut self.rs, high),
            ControlPin::Rw => set_pin(&mut self.rw, high),
            ControlPin::E => set_pin(&mut self.enable, high),
        }
    }

    fn read_bus(&mut self) -> Result<u8, Self::Error> {
        let mut value = 0u8;
        for (i, pin) in self.data.iter_mut().enumerate() {
            if pin.is_high().map_err(|e| e.kind())? {
                value |= 1 << (Self::FIRST_BIT + i);
            }
        }
        Ok(value)
    }

    fn write_bus(&mut self, data: u8) -> Result<(), Self::Error> {
        for (i, pin) in self.data.iter_mut().enumerate() {
            set_pin(pin, data & (1 << (Self::FIRST_BIT + i)) != 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as MockState, Transaction as PinTransaction,
    };

    fn idle_pin() -> PinMock {
        PinMock::new(&[])
    }

    #[test]
    fn test_4bit_write_uses_high_nibble() {
        // 0xA5: D4=0, D5=1, D6=0, D7=1; the low nibble 0x5 is ignored
        let mut d4 = PinMock::new(&[PinTransaction::set(MockState::Low)]);
        let mut d5 = PinMock::new(&[PinTransaction::set(MockState::High)]);
        let mut d6 = PinMock::new(&[PinTransaction::set(MockState::Low)]);
        let mut d7 = PinMock::new(&[PinTransaction::set(MockState::High)]);
        let (mut rs, mut rw, mut e) = (idle_pin(), idle_pin(), idle_pin());

        let mut bus = GpioParallelBus::new_4bit(
            rs.clone(),
            rw.clone(),
            e.clone(),
            [d4.clone(), d5.clone(), d6.clone(), d7.clone()],
        );
        assert_eq!(bus.interface_width(), InterfaceWidth::FourBit);
        assert!(bus.write_bus(0xA5).is_ok());

        for pin in [&mut rs, &mut rw, &mut e, &mut d4, &mut d5, &mut d6, &mut d7] {
            pin.done();
        }
    }

    #[test]
    fn test_4bit_read_releases_and_samples() {
        let mut d4 = PinMock::new(&[
            PinTransaction::set(MockState::High),
            PinTransaction::get(MockState::High),
        ]);
        let mut d5 = PinMock::new(&[
            PinTransaction::set(MockState::High),
            PinTransaction::get(MockState::Low),
        ]);
        let mut d6 = PinMock::new(&[
            PinTransaction::set(MockState::High),
            PinTransaction::get(MockState::Low),
        ]);
        let mut d7 = PinMock::new(&[
            PinTransaction::set(MockState::High),
            PinTransaction::get(MockState::High),
        ]);
        let (mut rs, mut rw, mut e) = (idle_pin(), idle_pin(), idle_pin());

        let mut bus = GpioParallelBus::new_4bit(
            rs.clone(),
            rw.clone(),
            e.clone(),
            [d4.clone(), d5.clone(), d6.clone(), d7.clone()],
        );
        assert!(bus.set_bus_direction(BusDirection::In).is_ok());
        assert_eq!(bus.read_bus(), Ok(0b1001_0000));
        // switching back to output does not touch the pins
        assert!(bus.set_bus_direction(BusDirection::Out).is_ok());

        for pin in [&mut rs, &mut rw, &mut e, &mut d4, &mut d5, &mut d6, &mut d7] {
            pin.done();
        }
    }

    #[test]
    fn test_8bit_write_and_control_pins() {
        let value = 0b0100_0011_u8;
        let mut data: [PinMock; 8] = core::array::from_fn(|bit| {
            let state = if value & (1 << bit) != 0 {
                MockState::High
            } else {
                MockState::Low
            };
            PinMock::new(&[PinTransaction::set(state)])
        });
        let mut rs = PinMock::new(&[
            PinTransaction::set(MockState::Low),
            PinTransaction::set(MockState::High),
        ]);
        let mut rw = PinMock::new(&[PinTransaction::set(MockState::Low)]);
        let mut e = PinMock::new(&[
            PinTransaction::set(MockState::Low),
            PinTransaction::set(MockState::High),
            PinTransaction::set(MockState::Low),
        ]);

        let mut bus = GpioParallelBus::new_8bit(
            rs.clone(),
            rw.clone(),
            e.clone(),
            data.clone(),
        );
        assert_eq!(bus.interface_width(), InterfaceWidth::EightBit);
        assert!(bus.init_common().is_ok());
        assert!(bus.set_ctrl_pin_state(ControlPin::Rs, PinState::Set).is_ok());
        assert!(bus.set_ctrl_pin_state(ControlPin::E, PinState::Set).is_ok());
        assert!(bus.write_bus(value).is_ok());
        assert!(bus.set_ctrl_pin_state(ControlPin::E, PinState::Reset).is_ok());

        rs.done();
        rw.done();
        e.done();
        for pin in data.iter_mut() {
            pin.done();
        }
    }
}

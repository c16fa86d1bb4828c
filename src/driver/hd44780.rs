// HD44780 protocol operations.
// Every instruction and data byte goes through write_instruction/write_data, which run the
// busy-wait strategy before touching the bus. The only exception is the first part of `init`,
// where the controller has no valid busy flag yet and fixed settle delays are used instead.

use embedded_hal::delay::DelayNs;

use crate::{
    bus::{DisplayBus, InterfaceWidth},
    character::{CustomCharacterTable, Utf8Decoder},
    driver::{busy_wait::BusyWaitStrategy, Hd44780Device},
    geometry::{cgram_address, DisplayGeometry},
    instruction::{self, LCD_CMD_CLEARDISPLAY, LCD_CMD_RETURNHOME, MAX_ADDRESS},
    CharacterDisplayError, DisplayConfig, InitTiming,
};

/// Cursor appearance.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CursorMode {
    /// No cursor
    Off,
    /// Steady underline cursor
    On,
    /// Underline cursor with a blinking block
    Blink,
}

pub struct HD44780<'a, BUS, DELAY, WAIT>
where
    BUS: DisplayBus,
    DELAY: DelayNs,
    WAIT: BusyWaitStrategy<BUS, DELAY>,
{
    device: Hd44780Device<BUS, DELAY>,
    busy_wait: WAIT,
    geometry: DisplayGeometry,
    timing: InitTiming,
    custom_chars: CustomCharacterTable<'a>,
}

impl<'a, BUS, DELAY, WAIT> HD44780<'a, BUS, DELAY, WAIT>
where
    BUS: DisplayBus,
    DELAY: DelayNs,
    WAIT: BusyWaitStrategy<BUS, DELAY>,
{
    pub fn new(
        bus: BUS,
        delay: DELAY,
        config: DisplayConfig,
        custom_chars: CustomCharacterTable<'a>,
        busy_wait: WAIT,
    ) -> Self {
        Self {
            device: Hd44780Device::new(bus, delay, config.interface),
            busy_wait,
            geometry: config.geometry,
            timing: config.timing,
            custom_chars,
        }
    }

    pub fn device(&mut self) -> &mut Hd44780Device<BUS, DELAY> {
        &mut self.device
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    pub fn custom_chars(&self) -> CustomCharacterTable<'a> {
        self.custom_chars
    }

    pub fn release(self) -> (BUS, DELAY) {
        self.device.release()
    }

    fn wait_until_ready(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.busy_wait.wait_for_busy_flag_clear(&mut self.device)
    }

    /// Write a byte to the instruction register once the controller is ready.
    pub fn write_instruction(
        &mut self,
        instruction: u8,
    ) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.wait_until_ready()?;
        self.device.set_register_select(false)?;
        self.device.write_byte(instruction)
    }

    /// Write a byte to the data register (DDRAM or CGRAM, whichever was last addressed) once the
    /// controller is ready.
    pub fn write_data(&mut self, data: u8) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.wait_until_ready()?;
        self.device.set_register_select(true)?;
        self.device.write_byte(data)
    }

    /// Run the power-on handshake, configure the display and upload the custom characters.
    /// The display is left cleared, switched on, with the cursor off. Calling this again
    /// repeats the whole sequence.
    pub fn init(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Initializing HD44780");
        self.device.init_common()?;
        self.device.set_register_select(false)?;

        // the controller may be in any state after power-up; three 8-bit function sets force
        // it into 8-bit mode regardless of where it started
        let reset = instruction::function_set(true, false, false);
        self.device.write_operation(reset)?;
        self.device.delay_ms(self.timing.long_settle_ms);
        for _ in 0..2 {
            self.device.write_operation(reset)?;
            self.device.delay_ms(self.timing.short_settle_ms);
        }

        match self.device.interface() {
            InterfaceWidth::EightBit => {
                self.device
                    .write_operation(instruction::function_set(true, true, false))?;
            }
            InterfaceWidth::FourBit => {
                // a single transfer: only the high nibble reaches the controller
                self.device
                    .write_operation(instruction::function_set(false, false, false))?;
                self.device.delay_ms(self.timing.short_settle_ms);
                self.write_instruction(instruction::function_set(false, true, false))?;
            }
        }

        self.display_off()?;
        self.clear()?;
        self.write_instruction(instruction::entry_mode(true, false))?;
        self.cursor_cfg(CursorMode::Off)?;
        self.upload_custom_chars()?;
        #[cfg(feature = "defmt")]
        defmt::debug!("HD44780 initialized");
        Ok(())
    }

    fn upload_custom_chars(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        if !self.custom_chars.is_valid() {
            return Err(CharacterDisplayError::CustomCharsInvalid);
        }
        let mappings = self.custom_chars.mappings();
        for (index, mapping) in mappings.iter().enumerate() {
            self.def_char(index as u8, mapping.bitmap)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.write_instruction(LCD_CMD_CLEARDISPLAY)
    }

    pub fn home(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.write_instruction(LCD_CMD_RETURNHOME)
    }

    /// Turns the display off. `cursor_cfg` turns it back on.
    pub fn display_off(&mut self) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.write_instruction(instruction::display_control(false, false, false))
    }

    /// Turns the display on with the given cursor appearance.
    pub fn cursor_cfg(&mut self, mode: CursorMode) -> Result<(), CharacterDisplayError<BUS::Error>> {
        let control = match mode {
            CursorMode::Off => instruction::display_control(true, false, false),
            CursorMode::On => instruction::display_control(true, true, false),
            CursorMode::Blink => instruction::display_control(true, true, true),
        };
        self.write_instruction(control)
    }

    /// Move the cursor to `row`, `column`. Positions off the display are rejected before any
    /// bus access.
    pub fn set_pos(&mut self, row: u8, column: u8) -> Result<(), CharacterDisplayError<BUS::Error>> {
        let address = self
            .geometry
            .ddram_address(row, column)
            .ok_or(CharacterDisplayError::InvalidArgument)?;
        self.write_instruction(instruction::set_ddram_address(address))
    }

    /// Set the DDRAM address directly.
    pub fn set_ddram_address(
        &mut self,
        address: u8,
    ) -> Result<(), CharacterDisplayError<BUS::Error>> {
        if address > MAX_ADDRESS {
            return Err(CharacterDisplayError::InvalidArgument);
        }
        self.write_instruction(instruction::set_ddram_address(address))
    }

    fn set_char_address(&mut self, index: u8) -> Result<(), CharacterDisplayError<BUS::Error>> {
        let address = cgram_address(index).ok_or(CharacterDisplayError::InvalidArgument)?;
        self.write_instruction(instruction::set_cgram_address(address))
    }

    /// Store an 8 row glyph in CGRAM slot `index` (0..=7). The address counter is left in
    /// CGRAM, so set a position before writing text again.
    pub fn def_char(
        &mut self,
        index: u8,
        pattern: [u8; 8],
    ) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.set_char_address(index)?;
        for row in pattern {
            self.write_data(row)?;
        }
        Ok(())
    }

    /// Show the glyph in CGRAM slot `index` at the current position.
    pub fn disp_char(&mut self, index: u8) -> Result<(), CharacterDisplayError<BUS::Error>> {
        if cgram_address(index).is_none() {
            return Err(CharacterDisplayError::InvalidArgument);
        }
        self.write_data(index)
    }

    pub fn is_busy(&mut self) -> Result<bool, CharacterDisplayError<BUS::Error>> {
        self.device.is_busy()
    }

    /// Current address counter with the busy flag masked off.
    pub fn read_address_counter(&mut self) -> Result<u8, CharacterDisplayError<BUS::Error>> {
        Ok(self.device.read_status()?.address())
    }

    /// Read the DDRAM or CGRAM byte at the current address. The address counter advances.
    pub fn read_data(&mut self) -> Result<u8, CharacterDisplayError<BUS::Error>> {
        self.wait_until_ready()?;
        self.device.read_ram()
    }

    /// Write UTF-8 encoded text at the current position. ASCII is written as is; any other code
    /// point is drawn with its custom character. A code point missing from the custom table
    /// stops the write with `CharNotFound`, leaving the rest of the text undrawn.
    pub fn write_bytes(&mut self, text: &[u8]) -> Result<(), CharacterDisplayError<BUS::Error>> {
        for code_point in Utf8Decoder::new(text) {
            if code_point <= 0x7F {
                self.write_data(code_point as u8)?;
                continue;
            }
            let Some(index) = self.custom_chars.find(code_point) else {
                #[cfg(feature = "defmt")]
                defmt::warn!("No custom character for U+{:X}", code_point);
                return Err(CharacterDisplayError::CharNotFound);
            };
            // writing the slot index advances the address counter like any data write, so the
            // address is set again explicitly to keep the cursor one cell to the right.
            // The previous write was already gated, so the counter is read directly.
            let address = self.read_address_counter()?;
            self.write_data(index)?;
            self.write_instruction(instruction::set_ddram_address(address + 1))?;
        }
        Ok(())
    }
}

//! HD44780 instruction set. Each instruction is built from an opcode constant ORed with
//! its flag constants. The builder functions return the final instruction byte that is
//! handed to the dispatcher.
use bitfield::bitfield;

// commands
pub const LCD_CMD_CLEARDISPLAY: u8 = 0x01; //  Clear display, set cursor position to zero
pub const LCD_CMD_RETURNHOME: u8 = 0x02; //  Set cursor position to zero
pub const LCD_CMD_ENTRYMODESET: u8 = 0x04; //  Sets the entry mode
pub const LCD_CMD_DISPLAYCONTROL: u8 = 0x08; //  Controls the display; does stuff like turning it off and on
pub const LCD_CMD_FUNCTIONSET: u8 = 0x20; //  Used to send the function to set to the display
pub const LCD_CMD_SETCGRAMADDR: u8 = 0x40; //  Used to set the CGRAM (character generator RAM) with characters
pub const LCD_CMD_SETDDRAMADDR: u8 = 0x80; //  Used to set the DDRAM (Display Data RAM)

// flags for display entry mode
pub const LCD_FLAG_ENTRYINCREMENT: u8 = 0x02; //  Address counter increments after each data write
pub const LCD_FLAG_ENTRYDECREMENT: u8 = 0x00; //  Address counter decrements after each data write
pub const LCD_FLAG_ENTRYSHIFTDISPLAY: u8 = 0x01; //  Shift the whole display on each data write
pub const LCD_FLAG_ENTRYSHIFTCURSOR: u8 = 0x00; //  Only the cursor moves on each data write

// flags for display on/off control
pub const LCD_FLAG_DISPLAYON: u8 = 0x04; //  Turns the display on
pub const LCD_FLAG_DISPLAYOFF: u8 = 0x00; //  Turns the display off
pub const LCD_FLAG_CURSORON: u8 = 0x02; //  Turns the cursor on
pub const LCD_FLAG_CURSOROFF: u8 = 0x00; //  Turns the cursor off
pub const LCD_FLAG_BLINKON: u8 = 0x01; //  Turns on the blinking cursor
pub const LCD_FLAG_BLINKOFF: u8 = 0x00; //  Turns off the blinking cursor

// flags for function set
pub const LCD_FLAG_8BITMODE: u8 = 0x10; //  LCD 8 bit mode
pub const LCD_FLAG_4BITMODE: u8 = 0x00; //  LCD 4 bit mode
pub const LCD_FLAG_2LINE: u8 = 0x08; //  LCD 2 line mode
pub const LCD_FLAG_1LINE: u8 = 0x00; //  LCD 1 line mode
pub const LCD_FLAG_5x10_DOTS: u8 = 0x04; //  10 pixel high font mode
pub const LCD_FLAG_5x8_DOTS: u8 = 0x00; //  8 pixel high font mode

/// Highest address accepted by the DDRAM and CGRAM address-set instructions.
pub const MAX_ADDRESS: u8 = 0x7F;

// Busy flag and address counter, as returned by a register-select=instruction read
bitfield! {
    pub struct StatusRegister(u8);
    impl Debug;
    pub busy, _: 7;
    pub address, _: 6, 0;
}

// Layout of the function set instruction
bitfield! {
    pub struct FunctionSet(u8);
    impl Debug;
    pub opcode, set_opcode: 5, 5;
    pub eight_bit, set_eight_bit: 4;
    pub two_lines, set_two_lines: 3;
    pub large_font, set_large_font: 2;
}

/// Function set instruction. `eight_bit` selects the bus width, `two_lines` the line mode
/// and `large_font` the 5x10 font.
pub fn function_set(eight_bit: bool, two_lines: bool, large_font: bool) -> u8 {
    let mut instruction = FunctionSet(0);
    instruction.set_opcode(1);
    instruction.set_eight_bit(eight_bit);
    instruction.set_two_lines(two_lines);
    instruction.set_large_font(large_font);
    instruction.0
}

/// Display on/off control instruction.
pub const fn display_control(display_on: bool, cursor_on: bool, blink_on: bool) -> u8 {
    let mut instruction = LCD_CMD_DISPLAYCONTROL;
    if display_on {
        instruction |= LCD_FLAG_DISPLAYON;
    }
    if cursor_on {
        instruction |= LCD_FLAG_CURSORON;
    }
    if blink_on {
        instruction |= LCD_FLAG_BLINKON;
    }
    instruction
}

/// Entry mode set instruction.
pub const fn entry_mode(increment: bool, shift_display: bool) -> u8 {
    let mut instruction = LCD_CMD_ENTRYMODESET;
    if increment {
        instruction |= LCD_FLAG_ENTRYINCREMENT;
    }
    if shift_display {
        instruction |= LCD_FLAG_ENTRYSHIFTDISPLAY;
    }
    instruction
}

/// Set DDRAM address instruction. Only the low 7 bits of `address` are used.
pub const fn set_ddram_address(address: u8) -> u8 {
    LCD_CMD_SETDDRAMADDR | (address & MAX_ADDRESS)
}

/// Set CGRAM address instruction. Only the low 6 bits of `address` are used.
pub const fn set_cgram_address(address: u8) -> u8 {
    LCD_CMD_SETCGRAMADDR | (address & 0x3F)
}

//! This Rust `embedded-hal`-based library drives a [HD44780](https://en.wikipedia.org/wiki/Hitachi_HD44780_LCD_controller)
//! compatible character display wired directly to the host over the controller's parallel interface, in an embedded,
//! `no_std` environment. Both the 4-bit (D4..D7) and the 8-bit (D0..D7) bus widths are supported.
//!
//! Key features include:
//! - Convenient high-level API for controlling the display
//! - Busy-flag handshaking with a configurable timeout instead of worst-case fixed delays
//! - Custom characters mapped to Unicode code points, so UTF-8 text containing them can be written directly
//! - `core::fmt::Write` implementation for easy use with the `write!` macro
//! - Compatible with the `embedded-hal` traits v1.0 and later
//! - Optional support for the `defmt` and `ufmt` logging frameworks
//!
//! ## Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! parallel-character-display = { version = "0.1", features = ["defmt"] }
//! ```
//!
//! Wire up the pins and create the display. The data pins must be usable as both inputs and outputs
//! (typically open-drain with pull-ups) so the busy flag can be read back:
//! ```rust
//! use parallel_character_display::{
//!     CharacterDisplay, CustomCharacterTable, DisplayConfig, GpioParallelBus, InterfaceWidth,
//!     LcdDisplayType,
//! };
//!
//! // board setup
//! let (rs, rw, e) = ...; // OutputPin implementations
//! let data = [d4, d5, d6, d7]; // InputPin + OutputPin implementations
//! let delay = ...; // DelayNs implementation
//!
//! let bus = GpioParallelBus::new_4bit(rs, rw, e, data);
//! let config = DisplayConfig::from_display_type(InterfaceWidth::FourBit, LcdDisplayType::Lcd16x2);
//! let mut lcd = CharacterDisplay::new(bus, delay, config, CustomCharacterTable::empty());
//! // or let the bus decide the interface width
//! let mut lcd = CharacterDisplay::new_gpio(bus, delay, LcdDisplayType::Lcd16x2.geometry(), CustomCharacterTable::empty());
//! ```
//! Boards that drive the pins some other way implement the `DisplayBus` trait instead of using `GpioParallelBus`.
//!
//! Initialize the display:
//! ```rust
//! if let Err(e) = lcd.init() {
//!    panic!("Error initializing LCD: {}", e);
//! }
//! ```
//! Use the display:
//! ```rust
//! lcd.set_pos(0, 0)?.write_text("Hello, world!")?;
//! // can also use the `core::fmt::write!` macro
//! use core::fmt::Write;
//!
//! write!(lcd, "Hello, world!")?;
//! ```
//! The optional `ufmt` feature enables the `ufmt` crate, which allows the `uwriteln!` and `uwrite!` macros to be used with the display:
//! ```rust
//! use ufmt::uwriteln;
//!
//! uwriteln!(lcd, "Hello, world!")?;
//! ```
//!
//! The various methods for controlling the LCD return a `Result` that wraps the display object in `Ok()`, allowing for easy chaining
//! of commands. For example:
//! ```rust
//! lcd.clear()?.cursor_cfg(CursorMode::Blink)?.write_text("Hello")?;
//! ```
//! ### Custom characters
//! Up to 8 custom glyphs can be registered when the display is created. Each one is uploaded to CGRAM during `init` and
//! stands in for a Unicode code point when text is written:
//! ```rust
//! const GLYPHS: [CharacterMapping; 1] = [CharacterMapping::new('°', [
//!     0b00110, 0b01001, 0b01001, 0b00110, 0b00000, 0b00000, 0b00000, 0b00000,
//! ])];
//! let table = CustomCharacterTable::new(&GLYPHS)?;
//! let mut lcd = CharacterDisplay::new(bus, delay, config, table);
//! lcd.init()?;
//! lcd.write_text("21°C")?;
//! ```
//! Writing a non-ASCII character that has no custom glyph stops the write with `CharacterDisplayError::CharNotFound`.
//!
#![no_std]
#![allow(non_upper_case_globals)]
use core::fmt::Display;

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
};

pub mod bus;
mod character;
mod driver;
mod geometry;
pub mod instruction;
#[cfg(test)]
mod testing;

pub use bus::{gpio::GpioParallelBus, DisplayBus, InterfaceWidth};
pub use character::{CharacterMapping, CustomCharacterTable, Utf8Decoder};
pub use driver::{
    busy_wait::{BusyWaitStrategy, PollingBusyWait},
    hd44780::CursorMode,
    Hd44780Device,
};
pub use geometry::{DisplayGeometry, CGRAM_SLOT_COUNT};

use driver::hd44780::HD44780;

/// Character display driven through `embedded-hal` GPIO pins.
pub type GpioCharacterDisplay<'a, RS, RW, E, D, DELAY, const N: usize> =
    CharacterDisplay<'a, GpioParallelBus<RS, RW, E, D, N>, DELAY>;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// Errors that can occur when using the display
pub enum CharacterDisplayError<E> {
    /// Error returned from the underlying bus implementation
    BusError(E),
    /// Argument is out of range, such as a position off the display or a custom character index above 7
    InvalidArgument,
    /// The busy flag did not clear in time
    Timeout,
    /// The custom character table has more entries than there are CGRAM slots
    CustomCharsInvalid,
    /// Non-ASCII character without a custom character mapping
    CharNotFound,
    /// Formatting error
    FormattingError(core::fmt::Error),
}

impl<E> From<core::fmt::Error> for CharacterDisplayError<E> {
    fn from(err: core::fmt::Error) -> Self {
        CharacterDisplayError::FormattingError(err)
    }
}

impl<E> From<&CharacterDisplayError<E>> for &'static str {
    fn from(err: &CharacterDisplayError<E>) -> Self {
        match err {
            CharacterDisplayError::BusError(_) => "Bus error",
            CharacterDisplayError::InvalidArgument => "Invalid argument",
            CharacterDisplayError::Timeout => "Timeout waiting for busy flag",
            CharacterDisplayError::CustomCharsInvalid => "Invalid custom character table",
            CharacterDisplayError::CharNotFound => "Character not found",
            CharacterDisplayError::FormattingError(_) => "Formatting error",
        }
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for CharacterDisplayError<E> {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl<E> ufmt::uDisplay for CharacterDisplayError<E> {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl<E> Display for CharacterDisplayError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// Errors found while building the display configuration
pub enum ConfigurationError {
    /// Line count or width outside what a single HD44780 can address
    InvalidGeometry,
    /// More custom characters than CGRAM slots
    TooManyCustomCharacters,
}

impl From<&ConfigurationError> for &'static str {
    fn from(err: &ConfigurationError) -> Self {
        match err {
            ConfigurationError::InvalidGeometry => "Invalid display geometry",
            ConfigurationError::TooManyCustomCharacters => "Too many custom characters",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigurationError {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl ufmt::uDisplay for ConfigurationError {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Common LCD module sizes.
pub enum LcdDisplayType {
    /// 20x4 display
    Lcd20x4,
    /// 20x2 display
    Lcd20x2,
    /// 16x2 display
    Lcd16x2,
    /// 16x4 display
    Lcd16x4,
    /// 8x2 display
    Lcd8x2,
    /// 40x2 display
    Lcd40x2,
}

impl From<&LcdDisplayType> for &'static str {
    fn from(display_type: &LcdDisplayType) -> Self {
        match display_type {
            LcdDisplayType::Lcd20x4 => "20x4",
            LcdDisplayType::Lcd20x2 => "20x2",
            LcdDisplayType::Lcd16x2 => "16x2",
            LcdDisplayType::Lcd16x4 => "16x4",
            LcdDisplayType::Lcd8x2 => "8x2",
            LcdDisplayType::Lcd40x2 => "40x2",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LcdDisplayType {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl ufmt::uDisplay for LcdDisplayType {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl Display for LcdDisplayType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

impl LcdDisplayType {
    /// Get the number of rows for the display type
    pub const fn rows(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 4,
            LcdDisplayType::Lcd20x2 => 2,
            LcdDisplayType::Lcd16x2 => 2,
            LcdDisplayType::Lcd16x4 => 4,
            LcdDisplayType::Lcd8x2 => 2,
            LcdDisplayType::Lcd40x2 => 2,
        }
    }

    /// Get the number of columns for the display type
    pub const fn cols(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 20,
            LcdDisplayType::Lcd20x2 => 20,
            LcdDisplayType::Lcd16x2 => 16,
            LcdDisplayType::Lcd16x4 => 16,
            LcdDisplayType::Lcd8x2 => 8,
            LcdDisplayType::Lcd40x2 => 40,
        }
    }

    pub const fn geometry(&self) -> DisplayGeometry {
        DisplayGeometry::preset(self.rows(), self.cols())
    }
}

/// Settle delays of the power-on handshake, before the busy flag can be trusted.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitTiming {
    /// Wait after the first function set.
    pub long_settle_ms: u32,
    /// Wait after each of the following function sets.
    pub short_settle_ms: u32,
}

impl InitTiming {
    pub const DEFAULT: Self = Self {
        long_settle_ms: 50,
        short_settle_ms: 10,
    };
}

impl Default for InitTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Construction-time settings of a display.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    pub interface: InterfaceWidth,
    pub geometry: DisplayGeometry,
    pub timing: InitTiming,
}

impl DisplayConfig {
    pub const fn new(interface: InterfaceWidth, geometry: DisplayGeometry) -> Self {
        Self {
            interface,
            geometry,
            timing: InitTiming::DEFAULT,
        }
    }

    pub const fn from_display_type(interface: InterfaceWidth, display_type: LcdDisplayType) -> Self {
        Self::new(interface, display_type.geometry())
    }

    /// Replace the handshake settle delays.
    pub const fn with_timing(mut self, timing: InitTiming) -> Self {
        self.timing = timing;
        self
    }
}

pub struct CharacterDisplay<'a, BUS, DELAY, WAIT = PollingBusyWait>
where
    BUS: DisplayBus,
    DELAY: DelayNs,
    WAIT: BusyWaitStrategy<BUS, DELAY>,
{
    driver: HD44780<'a, BUS, DELAY, WAIT>,
}

impl<'a, BUS, DELAY> CharacterDisplay<'a, BUS, DELAY, PollingBusyWait>
where
    BUS: DisplayBus,
    DELAY: DelayNs,
{
    /// Create a new character display object that polls the busy flag with the default timeout.
    pub fn new(
        bus: BUS,
        delay: DELAY,
        config: DisplayConfig,
        custom_chars: CustomCharacterTable<'a>,
    ) -> Self {
        Self::new_with_busy_wait(bus, delay, config, custom_chars, PollingBusyWait::default())
    }
}

impl<'a, RS, RW, E, D, DELAY, const N: usize> GpioCharacterDisplay<'a, RS, RW, E, D, DELAY, N>
where
    RS: OutputPin,
    RW: OutputPin,
    E: OutputPin,
    D: InputPin + OutputPin,
    DELAY: DelayNs,
{
    /// Create a display on GPIO pins. The interface width follows the number of data pins of
    /// the bus, so it cannot disagree with the wiring.
    pub fn new_gpio(
        bus: GpioParallelBus<RS, RW, E, D, N>,
        delay: DELAY,
        geometry: DisplayGeometry,
        custom_chars: CustomCharacterTable<'a>,
    ) -> Self {
        let config = DisplayConfig::new(bus.interface_width(), geometry);
        Self::new(bus, delay, config, custom_chars)
    }
}

impl<'a, BUS, DELAY, WAIT> CharacterDisplay<'a, BUS, DELAY, WAIT>
where
    BUS: DisplayBus,
    DELAY: DelayNs,
    WAIT: BusyWaitStrategy<BUS, DELAY>,
{
    /// Create a new character display object with a specific busy-wait strategy.
    pub fn new_with_busy_wait(
        bus: BUS,
        delay: DELAY,
        config: DisplayConfig,
        custom_chars: CustomCharacterTable<'a>,
        busy_wait: WAIT,
    ) -> Self {
        Self {
            driver: HD44780::new(bus, delay, config, custom_chars, busy_wait),
        }
    }

    /// Initialize the display. This must be called before using the display. It can be called
    /// again later to bring the display back to its initial state.
    pub fn init(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver.init()?;
        Ok(self)
    }

    /// returns a reference to the bus. mostly needed for testing
    #[cfg(test)]
    fn bus(&mut self) -> &mut BUS {
        self.driver.device().bus()
    }

    /// returns the geometry the display was configured with
    pub fn geometry(&self) -> DisplayGeometry {
        self.driver.geometry()
    }

    /// returns the custom characters the display was configured with
    pub fn custom_chars(&self) -> CustomCharacterTable<'a> {
        self.driver.custom_chars()
    }

    /// Give back the bus and delay objects.
    pub fn release(self) -> (BUS, DELAY) {
        self.driver.release()
    }

    /// Returns `true` while the controller is still executing the previous instruction.
    pub fn is_busy(&mut self) -> Result<bool, CharacterDisplayError<BUS::Error>> {
        self.driver.is_busy()
    }

    /// Reads the address counter from the display. The busy flag is masked off.
    pub fn read_address_counter(&mut self) -> Result<u8, CharacterDisplayError<BUS::Error>> {
        self.driver.read_address_counter()
    }

    /// Reads the CGRAM or DDRAM byte at the current address, whichever was addressed last.
    /// The address counter moves on just like after a write.
    pub fn read_data(&mut self) -> Result<u8, CharacterDisplayError<BUS::Error>> {
        self.driver.read_data()
    }

    //--------------------------------------------------------------------------------------------------
    // high level commands, for the user!
    //--------------------------------------------------------------------------------------------------

    /// Clear the display
    pub fn clear(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver.clear()?;
        Ok(self)
    }

    /// Set the cursor to the home position.
    pub fn home(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver.home()?;
        Ok(self)
    }

    /// Set the cursor position at specified row and column. Rows and columns are zero-indexed.
    pub fn set_pos(
        &mut self,
        row: u8,
        column: u8,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver.set_pos(row, column)?;
        Ok(self)
    }

    /// Set the DDRAM address directly. Addresses above 0x7F are rejected.
    pub fn set_ddram_address(
        &mut self,
        address: u8,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver.set_ddram_address(address)?;
        Ok(self)
    }

    /// Turn the display on with the given cursor appearance.
    pub fn cursor_cfg(
        &mut self,
        mode: CursorMode,
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver.cursor_cfg(mode)?;
        Ok(self)
    }

    /// Turn the display off. The DDRAM content is kept.
    pub fn display_off(&mut self) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver.display_off()?;
        Ok(self)
    }

    /// Define the glyph of custom character slot `index` (0..=7). Set a position before
    /// writing text afterwards.
    pub fn def_char(
        &mut self,
        index: u8,
        pattern: [u8; 8],
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver.def_char(index, pattern)?;
        Ok(self)
    }

    /// Show custom character slot `index` (0..=7) at the current position.
    pub fn disp_char(&mut self, index: u8) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.driver.disp_char(index)?;
        Ok(self)
    }

    /// Writes a string to the LCD at the current cursor position.
    pub fn write_text(&mut self, text: &str) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        self.write_bytes(text.as_bytes())
    }

    /// Writes UTF-8 encoded bytes to the LCD at the current cursor position.
    pub fn write_bytes(
        &mut self,
        text: &[u8],
    ) -> Result<&mut Self, CharacterDisplayError<BUS::Error>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Writing {} bytes of text", text.len());
        self.driver.write_bytes(text)?;
        Ok(self)
    }
}

/// Implement the `core::fmt::Write` trait for the display, allowing it to be used with the `write!` macro.
impl<BUS, DELAY, WAIT> core::fmt::Write for CharacterDisplay<'_, BUS, DELAY, WAIT>
where
    BUS: DisplayBus,
    DELAY: DelayNs,
    WAIT: BusyWaitStrategy<BUS, DELAY>,
{
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        if let Err(_e) = self.write_text(s) {
            return Err(core::fmt::Error);
        }
        Ok(())
    }
}

#[cfg(feature = "ufmt")]
/// Implement the `ufmt::uWrite` trait for the display, allowing it to be used with the `uwriteln!` and `uwrite!` macros.
impl<BUS, DELAY, WAIT> ufmt::uWrite for CharacterDisplay<'_, BUS, DELAY, WAIT>
where
    BUS: DisplayBus,
    DELAY: DelayNs,
    WAIT: BusyWaitStrategy<BUS, DELAY>,
{
    fn write_str(&mut self, s: &str) -> Result<(), CharacterDisplayError<BUS::Error>> {
        self.write_text(s)?;
        Ok(())
    }

    type Error = CharacterDisplayError<BUS::Error>;
}

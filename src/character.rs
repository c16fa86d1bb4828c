//! Custom character support: the table mapping Unicode code points to CGRAM glyphs, and the
//! UTF-8 decoder used when writing text.
use crate::{geometry::CGRAM_SLOT_COUNT, ConfigurationError};

/// A custom glyph and the Unicode code point it stands in for. Each bitmap row uses the
/// low 5 bits, top row first.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharacterMapping {
    pub code_point: u32,
    pub bitmap: [u8; 8],
}

impl CharacterMapping {
    pub const fn new(character: char, bitmap: [u8; 8]) -> Self {
        Self {
            code_point: character as u32,
            bitmap,
        }
    }
}

/// Ordered set of custom characters. Entry `i` is uploaded to CGRAM slot `i` during
/// initialization. When a code point appears more than once the first entry wins.
#[derive(Debug, Copy, Clone)]
pub struct CustomCharacterTable<'a> {
    mappings: &'a [CharacterMapping],
}

impl<'a> CustomCharacterTable<'a> {
    /// Create a table, rejecting more entries than the controller has CGRAM slots.
    pub const fn new(mappings: &'a [CharacterMapping]) -> Result<Self, ConfigurationError> {
        if mappings.len() > CGRAM_SLOT_COUNT as usize {
            return Err(ConfigurationError::TooManyCustomCharacters);
        }
        Ok(Self { mappings })
    }

    /// Create a table without checking its length. An oversized table is reported as
    /// `CharacterDisplayError::CustomCharsInvalid` by the display's `init`.
    pub const fn new_unchecked(mappings: &'a [CharacterMapping]) -> Self {
        Self { mappings }
    }

    /// A table with no custom characters.
    pub const fn empty() -> Self {
        Self { mappings: &[] }
    }

    pub const fn len(&self) -> usize {
        self.mappings.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.mappings.len() <= CGRAM_SLOT_COUNT as usize
    }

    pub fn mappings(&self) -> &'a [CharacterMapping] {
        self.mappings
    }

    /// Slot index of the first entry mapped to `code_point`.
    pub fn find(&self, code_point: u32) -> Option<u8> {
        self.mappings
            .iter()
            .position(|mapping| mapping.code_point == code_point)
            .map(|index| index as u8)
    }
}

impl Default for CustomCharacterTable<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Iterator decoding a UTF-8 byte stream into code points. The sequence length is taken
/// from the leading byte only and the low 6 bits of each continuation byte are accumulated;
/// the input is not otherwise validated. A sequence cut short by the end of the input decodes
/// with the missing bits as zero.
pub struct Utf8Decoder<'a> {
    bytes: core::slice::Iter<'a, u8>,
}

impl<'a> Utf8Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes: bytes.iter(),
        }
    }
}

impl Iterator for Utf8Decoder<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let lead = *self.bytes.next()?;
        let (mut code_point, continuation_count) = match lead {
            0x00..=0x7F => return Some(lead as u32),
            0x80..=0xDF => ((lead & 0x1F) as u32, 1),
            0xE0..=0xEF => ((lead & 0x0F) as u32, 2),
            _ => ((lead & 0x07) as u32, 3),
        };
        for _ in 0..continuation_count {
            let payload = self.bytes.next().map_or(0, |byte| byte & 0x3F);
            code_point = (code_point << 6) | payload as u32;
        }
        Some(code_point)
    }
}

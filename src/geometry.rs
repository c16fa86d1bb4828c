use crate::ConfigurationError;

/// DDRAM address of the first column of the second line.
const SECOND_LINE_OFFSET: u8 = 0x40;
/// Number of character cells a single HD44780 controller can address.
const DDRAM_CAPACITY: u16 = 80;
/// Number of custom character slots in CGRAM.
pub const CGRAM_SLOT_COUNT: u8 = 8;

/// Number of lines and characters per line of the physical display module.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayGeometry {
    lines: u8,
    columns: u8,
}

impl DisplayGeometry {
    /// Create a geometry. The display must have 1 to 4 lines and fit into the 80 character
    /// DDRAM of a single controller.
    pub const fn new(lines: u8, columns: u8) -> Result<Self, ConfigurationError> {
        if lines == 0 || lines > 4 || columns == 0 {
            return Err(ConfigurationError::InvalidGeometry);
        }
        if lines as u16 * columns as u16 > DDRAM_CAPACITY {
            return Err(ConfigurationError::InvalidGeometry);
        }
        Ok(Self { lines, columns })
    }

    /// Geometry of a known module size; only used for the built-in presets.
    pub(crate) const fn preset(lines: u8, columns: u8) -> Self {
        Self { lines, columns }
    }

    pub const fn lines(&self) -> u8 {
        self.lines
    }

    pub const fn columns(&self) -> u8 {
        self.columns
    }

    /// DDRAM address of the cell at `row`, `column`, or `None` when the position is off the
    /// display. Lines 0 and 1 start at 0x00 and 0x40; lines 2 and 3 continue those two lines
    /// one display width further on.
    pub const fn ddram_address(&self, row: u8, column: u8) -> Option<u8> {
        if row >= self.lines || column >= self.columns {
            return None;
        }
        let address = match row {
            0 => column,
            1 => column + SECOND_LINE_OFFSET,
            2 => column + self.columns,
            _ => column + SECOND_LINE_OFFSET + self.columns,
        };
        Some(address)
    }
}

/// CGRAM address of the first row of custom character slot `index`, or `None` when the
/// slot does not exist. Every glyph takes 8 consecutive rows.
pub const fn cgram_address(index: u8) -> Option<u8> {
    if index >= CGRAM_SLOT_COUNT {
        return None;
    }
    Some(index * 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_validation() {
        assert!(DisplayGeometry::new(2, 16).is_ok());
        assert!(DisplayGeometry::new(4, 20).is_ok());
        assert!(DisplayGeometry::new(2, 40).is_ok());
        assert!(DisplayGeometry::new(1, 8).is_ok());
        assert_eq!(
            DisplayGeometry::new(0, 16),
            Err(ConfigurationError::InvalidGeometry)
        );
        assert_eq!(
            DisplayGeometry::new(5, 16),
            Err(ConfigurationError::InvalidGeometry)
        );
        assert_eq!(
            DisplayGeometry::new(2, 0),
            Err(ConfigurationError::InvalidGeometry)
        );
        // 40x4 modules use two controllers
        assert_eq!(
            DisplayGeometry::new(4, 40),
            Err(ConfigurationError::InvalidGeometry)
        );
    }

    #[test]
    fn test_ddram_address_20x4() {
        let geometry = DisplayGeometry::new(4, 20).unwrap();
        assert_eq!(geometry.ddram_address(0, 0), Some(0x00));
        assert_eq!(geometry.ddram_address(1, 0), Some(0x40));
        assert_eq!(geometry.ddram_address(2, 0), Some(0x14));
        assert_eq!(geometry.ddram_address(3, 0), Some(0x54));
        assert_eq!(geometry.ddram_address(3, 19), Some(0x67));
    }

    #[test]
    fn test_ddram_address_every_cell() {
        for (lines, columns) in [(1, 8), (2, 16), (4, 16), (2, 20), (4, 20), (2, 40)] {
            let geometry = DisplayGeometry::new(lines, columns).unwrap();
            for row in 0..lines {
                for column in 0..columns {
                    let expected = match row {
                        0 => column,
                        1 => column + 0x40,
                        2 => column + columns,
                        _ => column + 0x40 + columns,
                    };
                    let address = geometry.ddram_address(row, column).unwrap();
                    assert_eq!(address, expected);
                    assert!(address <= 0x7F);
                }
                assert_eq!(geometry.ddram_address(row, columns), None);
            }
            assert_eq!(geometry.ddram_address(lines, 0), None);
        }
    }

    #[test]
    fn test_cgram_address() {
        assert_eq!(cgram_address(0), Some(0));
        assert_eq!(cgram_address(1), Some(8));
        assert_eq!(cgram_address(7), Some(56));
        assert_eq!(cgram_address(8), None);
    }
}

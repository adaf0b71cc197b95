//! Code for handling 2-bit colours.

// -----------------------------------------------------------------------------
// Licence Statement
// -----------------------------------------------------------------------------
// Copyright (c) Jonathan 'theJPster' Pallant and the Neotron Developers, 2023
// Copyright (c) The pico-vgax developers, 2025
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.
// -----------------------------------------------------------------------------

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Represents a 2-bit colour index.
///
/// Bit 1 comes out on GPIO7 and bit 0 on GPIO6. What you actually see
/// depends on how those pins are wired to the VGA connector; the named
/// colours assume GPIO7 goes to red and GPIO6 goes to green, each through a
/// 470R resistor.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Colour(u8);

impl Colour {
    /// Both colour pins low. This is also the blanking level.
    pub const BLACK: Colour = Colour(0b00);

    /// GPIO6 only
    pub const GREEN: Colour = Colour(0b01);

    /// GPIO7 only
    pub const RED: Colour = Colour(0b10);

    /// Both colour pins high
    pub const YELLOW: Colour = Colour(0b11);

    /// Make a [`Colour`] from an index.
    ///
    /// Only the bottom 2 bits are retained.
    pub const fn new(index: u8) -> Colour {
        Colour(index & 0b11)
    }

    /// Get the colour index, from `0..=3`
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Get the levels of (GPIO7, GPIO6) while this colour is on screen
    pub const fn pin_levels(self) -> (bool, bool) {
        (self.0 & 0b10 != 0, self.0 & 0b01 != 0)
    }

    /// Get a byte holding four pixels of this colour
    pub const fn packed(self) -> u8 {
        let c = self.0;
        (c << 6) | (c << 4) | (c << 2) | c
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_to_two_bits() {
        assert_eq!(Colour::new(7), Colour::YELLOW);
        assert_eq!(Colour::new(0xFE), Colour::RED);
        assert_eq!(Colour::new(5).index(), 1);
    }

    #[test]
    fn packing() {
        assert_eq!(Colour::BLACK.packed(), 0x00);
        assert_eq!(Colour::GREEN.packed(), 0b0101_0101);
        assert_eq!(Colour::RED.packed(), 0b1010_1010);
        assert_eq!(Colour::YELLOW.packed(), 0xFF);
    }

    #[test]
    fn pins() {
        assert_eq!(Colour::RED.pin_levels(), (true, false));
        assert_eq!(Colour::GREEN.pin_levels(), (false, true));
        // Blanking puts both pins low
        assert_eq!(Colour::BLACK.pin_levels(), (false, false));
    }
}

// End of file

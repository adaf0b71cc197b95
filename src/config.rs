//! Build-time configuration.
//!
//! Everything about the picture is fixed when the firmware is built. Change
//! the numbers here and the `const` assertions at the bottom will tell you if
//! the result can't be generated.

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
// Imports
// -----------------------------------------------------------------------------

use crate::timing::VideoTiming;

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// The video mode we generate
pub const TIMING: VideoTiming = VideoTiming::vga_640x480();

/// Number of framebuffer rows
pub const HEIGHT: usize = 80;

/// Number of bytes in one framebuffer row
pub const BYTES_PER_LINE: usize = 24;

/// Each byte holds four 2-bit pixels, left-most pixel in the top two bits
pub const PIXELS_PER_BYTE: usize = 4;

/// Number of pixels in one framebuffer row
pub const WIDTH: usize = BYTES_PER_LINE * PIXELS_PER_BYTE;

/// Size of the framebuffer in bytes
pub const FRAMEBUFFER_SIZE: usize = HEIGHT * BYTES_PER_LINE;

/// How many scan-lines show each framebuffer row
pub const VERTICAL_SCALE: u8 = 5;

/// How many scan-lines after the V-Sync wrap we wait before drawing row 0.
///
/// This covers the vertical back porch, plus enough extra lines to put our
/// 400 lines in the middle of the 480 line visible area. Make it smaller to
/// move the picture up.
pub const SKIP_LINES: u16 =
    (TIMING.v_back_porch + (TIMING.v_visible - (HEIGHT as u32 * VERTICAL_SCALE as u32)) / 2) as u16;

/// System clocks per framebuffer pixel.
///
/// 96 pixels of 40 clocks is 3840 clocks, which is exactly the 640 VGA
/// pixels of the visible area.
pub const CYCLES_PER_PIXEL: u32 = 40;

/// GPIO for colour bit 0
pub const COLOUR_PIN_LOW: u8 = 6;

/// GPIO for colour bit 1
pub const COLOUR_PIN_HIGH: u8 = 7;

/// GPIO for H-Sync. This is PWM slice 0, channel A.
pub const HSYNC_PIN: u8 = 16;

/// GPIO for V-Sync. This is PWM slice 1, channel A.
pub const VSYNC_PIN: u8 = 18;

/// The PWM slice generating H-Sync
pub const HSYNC_SLICE: u8 = 0;

/// The PWM slice generating V-Sync
pub const VSYNC_SLICE: u8 = 1;

/// Width of the dejitter window, in system clocks.
///
/// Interrupt entry can wander by up to this many clocks and we'll still
/// start the pixels on the same clock every line.
pub const DEJITTER_WINDOW: u8 = 8;

/// The H-Sync counter value we expect to read on the earliest interrupt entry.
///
/// This depends on the interrupt latency and on the code the compiler
/// generates ahead of the dejitter sequence, so it was measured on hardware
/// with a scope. If the picture has a stable but ragged left edge, this is
/// the number to adjust.
pub const DEJITTER_SYNC: u8 = 48;

// -----------------------------------------------------------------------------
// Build-time checks
// -----------------------------------------------------------------------------

const _: () = assert!(TIMING.is_compatible(), "timing can't be made with two PWM slices");
const _: () = assert!(
    HEIGHT * VERTICAL_SCALE as usize <= TIMING.v_visible as usize,
    "framebuffer is taller than the visible area"
);
const _: () = assert!(
    SKIP_LINES as u32 + (HEIGHT as u32 * VERTICAL_SCALE as u32)
        <= TIMING.v_back_porch + TIMING.v_visible,
    "picture runs into the front porch"
);
const _: () = assert!(VERTICAL_SCALE != 0);
const _: () = assert!(HEIGHT <= u16::MAX as usize);
const _: () = assert!(
    DEJITTER_WINDOW.is_power_of_two(),
    "dejitter window must be a power of two"
);
// The first pixel of each byte is written without a shift, so it has to land
// on GPIO7:GPIO6.
const _: () = assert!(COLOUR_PIN_LOW == 6 && COLOUR_PIN_HIGH == 7);
// Slice N channel A is GPIO 2N (and 2N + 16)
const _: () = assert!(HSYNC_PIN % 16 == HSYNC_SLICE * 2);
const _: () = assert!(VSYNC_PIN % 16 == VSYNC_SLICE * 2);

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry() {
        assert_eq!(WIDTH, 96);
        assert_eq!(FRAMEBUFFER_SIZE, 1920);
    }

    #[test]
    fn picture_is_centred() {
        // 33 lines of back porch, then 40 lines above and below our 400 lines
        assert_eq!(SKIP_LINES, 73);
        let lines_below = TIMING.v_back_porch + TIMING.v_visible
            - (u32::from(SKIP_LINES) + HEIGHT as u32 * u32::from(VERTICAL_SCALE));
        assert_eq!(lines_below, 40);
    }

    #[test]
    fn pixels_fill_the_visible_area() {
        assert_eq!(WIDTH as u32 * CYCLES_PER_PIXEL, TIMING.visible_cycles());
    }
}

// End of file

//! The pixel emitter's cycle budget, and a model of what it writes.
//!
//! The emitter in the firmware is a fully unrolled run of Thumb instructions.
//! For each framebuffer byte it does:
//!
//! ```text
//! ldrb  px, [row]       ; 2 clocks
//! adds  row, #1         ; 1 clock
//! nop x LOAD_PAD
//! str   px, [gpio_out]  ; 1 clock - pixel 1 (already in bits 7:6)
//!
//! lsls  px, px, #2      ; 1 clock
//! uxtb  px, px          ; 1 clock
//! nop x SHIFT_PAD
//! str   px, [gpio_out]  ; 1 clock - pixel 2 (and again for pixels 3 and 4)
//! ```
//!
//! and after the last byte:
//!
//! ```text
//! nop x BLANK_PAD
//! movs  px, #0          ; 1 clock
//! str   px, [gpio_out]  ; 1 clock - blank until the next line
//! ```
//!
//! Every store is exactly [`CYCLES_PER_PIXEL`] clocks after the one before,
//! so every pixel is the same width. There are no branches, so the contents
//! of the framebuffer can't change the timing.

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

use crate::config::{BYTES_PER_LINE, COLOUR_PIN_LOW, CYCLES_PER_PIXEL, PIXELS_PER_BYTE, TIMING};
use crate::Colour;

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// `ldrb` from SRAM
const LOAD_CYCLES: u32 = 2;
/// Any single-clock ALU op (`adds`, `lsls`, `uxtb`, `movs`)
const ALU_CYCLES: u32 = 1;
/// `str` to the single-cycle IO port
const STORE_CYCLES: u32 = 1;

/// NOPs between loading a byte and writing its first pixel
pub const LOAD_PAD: u32 = CYCLES_PER_PIXEL - (LOAD_CYCLES + ALU_CYCLES + STORE_CYCLES);

/// NOPs between shifting a byte and writing its next pixel
pub const SHIFT_PAD: u32 = CYCLES_PER_PIXEL - (ALU_CYCLES + ALU_CYCLES + STORE_CYCLES);

/// NOPs between the last pixel and the blanking store
pub const BLANK_PAD: u32 = CYCLES_PER_PIXEL - (ALU_CYCLES + STORE_CYCLES);

/// What we write to the colour pins outside the visible area
pub const BLANK_SAMPLE: u8 = 0;

/// How many stores the emitter does per line, including the blanking one
pub const SAMPLES_PER_LINE: usize = BYTES_PER_LINE * PIXELS_PER_BYTE + 1;

// There is no `nop x -1`
const _: () = assert!(CYCLES_PER_PIXEL >= LOAD_CYCLES + ALU_CYCLES + STORE_CYCLES);
const _: () = assert!(
    row_cycles() <= TIMING.visible_cycles() + CYCLES_PER_PIXEL,
    "a row of pixels doesn't fit in the visible part of the line"
);
const _: () = assert!(
    TIMING.visible_start_cycles() + row_cycles() <= TIMING.hsync_compare() as u32,
    "the emitter runs into the H-Sync pulse"
);

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// How long the emitter runs for, from the first load to the blanking store.
pub const fn row_cycles() -> u32 {
    SAMPLES_PER_LINE as u32 * CYCLES_PER_PIXEL
}

/// The values the emitter writes to `GPIO_OUT`, in order, for one row.
///
/// There are four per byte (the byte, then shifted left by 2, 4 and 6 bits,
/// each truncated to 8 bits) and then the blanking value.
///
/// Each one is stored to the whole of `GPIO_OUT`, so every SIO output above
/// GPIO7 goes low.
pub fn samples(row: &[u8; BYTES_PER_LINE]) -> impl Iterator<Item = u8> + '_ {
    row.iter()
        .flat_map(|byte| (0..PIXELS_PER_BYTE as u32).map(move |pixel| byte << (2 * pixel)))
        .chain(core::iter::once(BLANK_SAMPLE))
}

/// What colour is on the colour pins after the emitter writes this value?
pub const fn sample_colour(sample: u8) -> Colour {
    Colour::new(sample >> COLOUR_PIN_LOW)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WIDTH;
    use crate::Framebuffer;

    #[test]
    fn every_store_is_one_pixel_apart() {
        assert_eq!(LOAD_CYCLES + ALU_CYCLES + LOAD_PAD + STORE_CYCLES, CYCLES_PER_PIXEL);
        assert_eq!(2 * ALU_CYCLES + SHIFT_PAD + STORE_CYCLES, CYCLES_PER_PIXEL);
        assert_eq!(BLANK_PAD + ALU_CYCLES + STORE_CYCLES, CYCLES_PER_PIXEL);
    }

    #[test]
    fn samples_follow_the_framebuffer() {
        let fb = Framebuffer::new();
        for x in 0..WIDTH as u16 {
            fb.put_pixel(x, 3, Colour::new((x % 4) as u8 ^ (x / 4) as u8));
        }
        let mut row = [0u8; BYTES_PER_LINE];
        let ptr = fb.row_ptr(3);
        for (idx, b) in row.iter_mut().enumerate() {
            *b = unsafe { ptr.add(idx).read() };
        }
        let out: Vec<u8> = samples(&row).collect();
        assert_eq!(out.len(), SAMPLES_PER_LINE);
        for x in 0..WIDTH {
            assert_eq!(sample_colour(out[x]), fb.get_pixel(x as u16, 3), "pixel {x}");
        }
        assert_eq!(sample_colour(out[WIDTH]), Colour::BLACK);
    }

    #[test]
    fn samples_only_touch_the_bottom_byte() {
        let row = [0xFFu8; BYTES_PER_LINE];
        // 0xFF, 0xFC, 0xF0, 0xC0 repeating: the shifted-out bits are gone
        let expected = [0xFF, 0xFC, 0xF0, 0xC0];
        for (idx, sample) in samples(&row).take(WIDTH).enumerate() {
            assert_eq!(sample, expected[idx % 4]);
        }
    }

    #[test]
    fn samples_hold_other_outputs_low() {
        // Whatever is in the row, GPIO8 and up are written as zero
        for byte in 0..=255u8 {
            let row = [byte; BYTES_PER_LINE];
            for sample in samples(&row) {
                assert_eq!(u32::from(sample) & !0xFF, 0);
            }
        }
        // ... including the LED on GPIO25
        let row = [0xFFu8; BYTES_PER_LINE];
        assert!(samples(&row).all(|s| u32::from(s) & (1 << 25) == 0));
    }

    #[test]
    fn budget() {
        assert_eq!(row_cycles(), 97 * 40);
        assert_eq!(LOAD_PAD, 36);
        assert_eq!(SHIFT_PAD, 37);
        assert_eq!(BLANK_PAD, 38);
    }
}

// End of file

//! The framebuffer, and the simple drawing operations on it.
//!
//! The framebuffer is written by the main thread and read by the video
//! interrupt, with no locking. If you write to a row while it is being
//! scanned out you might see half of the old row and half of the new one for
//! a frame. That's fine, and it is never unsafe, because we only ever touch
//! the buffer through raw pointers and never hand out a reference to it.

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

use core::cell::UnsafeCell;

use crate::config::{BYTES_PER_LINE, FRAMEBUFFER_SIZE, HEIGHT, PIXELS_PER_BYTE, WIDTH};
use crate::Colour;

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Holds a screen full of 2-bpp pixels, four to a byte.
///
/// The left-most pixel of each byte lives in the top two bits. That's where
/// the scan-out code needs it, because it writes the byte to the GPIO
/// output register before it has time to shift anything.
#[repr(align(4))]
pub struct Framebuffer {
    contents: UnsafeCell<[u8; Self::LENGTH]>,
}

impl Framebuffer {
    /// Size of the framebuffer in bytes
    pub const LENGTH: usize = FRAMEBUFFER_SIZE;

    /// Make a new, black, framebuffer
    pub const fn new() -> Framebuffer {
        Framebuffer {
            contents: UnsafeCell::new([0u8; Self::LENGTH]),
        }
    }

    /// Get a pointer to the first byte
    pub fn as_ptr(&self) -> *const u8 {
        self.contents.get() as *const u8
    }

    /// Get a pointer to the start of a row, for the scan-out code.
    ///
    /// Rows past the bottom are clamped to the last row, so this always points
    /// at `BYTES_PER_LINE` valid bytes.
    #[inline(always)]
    pub fn row_ptr(&self, row: usize) -> *const u8 {
        let row = if row < HEIGHT { row } else { HEIGHT - 1 };
        // Note (unsafe): the offset is at most `LENGTH - BYTES_PER_LINE`
        unsafe { self.as_ptr().add(row * BYTES_PER_LINE) }
    }

    /// Set one pixel.
    ///
    /// Coordinates off the screen are ignored.
    pub fn put_pixel(&self, x: u16, y: u16, colour: Colour) {
        let Some((offset, shift)) = Self::locate(x, y) else {
            return;
        };
        let ptr = self.contents.get() as *mut u8;
        unsafe {
            let old = ptr.add(offset).read();
            let new = (old & !(0b11 << shift)) | (colour.index() << shift);
            ptr.add(offset).write(new);
        }
    }

    /// Read one pixel back.
    ///
    /// Coordinates off the screen read as [`Colour::BLACK`].
    pub fn get_pixel(&self, x: u16, y: u16) -> Colour {
        let Some((offset, shift)) = Self::locate(x, y) else {
            return Colour::BLACK;
        };
        let ptr = self.contents.get() as *const u8;
        let byte = unsafe { ptr.add(offset).read() };
        Colour::new(byte >> shift)
    }

    /// Fill the whole screen with one colour
    pub fn clear(&self, colour: Colour) {
        let fill = colour.packed();
        let ptr = self.contents.get() as *mut u8;
        for idx in 0..Self::LENGTH {
            unsafe {
                ptr.add(idx).write(fill);
            }
        }
    }

    /// Replace the whole screen with a pre-packed image
    pub fn copy_from(&self, src: &[u8; Self::LENGTH]) {
        let ptr = self.contents.get() as *mut u8;
        // Note (unsafe): `src` is a shared reference so it can't be our own
        // contents, which we never lend out.
        unsafe {
            core::ptr::copy_nonoverlapping(src.as_ptr(), ptr, Self::LENGTH);
        }
    }

    /// Fill a rectangle with one colour.
    ///
    /// Whatever part of the rectangle is off the screen is clipped.
    pub fn fill_rect(&self, x: u16, y: u16, width: u16, height: u16, colour: Colour) {
        let x_end = x.saturating_add(width).min(WIDTH as u16);
        let y_end = y.saturating_add(height).min(HEIGHT as u16);
        for row in y..y_end {
            for col in x..x_end {
                self.put_pixel(col, row, colour);
            }
        }
    }

    /// Work out which byte a pixel lives in, and how far up that byte it is.
    fn locate(x: u16, y: u16) -> Option<(usize, u8)> {
        let (x, y) = (usize::from(x), usize::from(y));
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        let offset = (y * BYTES_PER_LINE) + (x / PIXELS_PER_BYTE);
        let shift = 6 - ((x % PIXELS_PER_BYTE) as u8 * 2);
        Some((offset, shift))
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer::new()
    }
}

unsafe impl Sync for Framebuffer {}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------


// End of file

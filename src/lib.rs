//! # pico-vgax
//!
//! A tiny VGA generator for the Raspberry Pi RP2040.
//!
//! It makes a 96 x 80 pixel, four colour picture on a standard 640x480 @
//! 60 Hz monitor, with no PIO and no DMA. Two PWM slices make the sync
//! pulses, and an interrupt on each H-Sync wrap writes the pixels to two
//! GPIO pins with carefully counted instructions.
//!
//! This crate holds everything that isn't tied to the hardware: the video
//! timing, the framebuffer and its drawing functions, the scan-line state
//! machine, and the arithmetic behind the cycle-counted code. The `firmware`
//! crate next door does the rest.

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

#![cfg_attr(not(test), no_std)]

// -----------------------------------------------------------------------------
// Sub-modules
// -----------------------------------------------------------------------------

pub mod colour;
pub mod config;
pub mod dejitter;
pub mod emit;
pub mod framebuffer;
pub mod scanout;
pub mod timing;

// -----------------------------------------------------------------------------
// Imports
// -----------------------------------------------------------------------------

pub use colour::Colour;
pub use framebuffer::Framebuffer;
pub use scanout::{FrameCounter, LineKind, ScanState, Scanout};
pub use timing::{SyncPolarity, VideoTiming};

// End of file

//! Interrupt dejitter.
//!
//! The Cortex-M0+ doesn't always take the same number of clocks to enter an
//! interrupt handler. It has to finish whatever instruction it was running,
//! and the main thread might have been stalled on a flash fetch. If we
//! started the pixels a fixed number of clocks after entry, the left edge of
//! the picture would shimmer.
//!
//! So, once the handler is running, we read the H-Sync PWM counter. That
//! counts system clocks since the line started, so the bottom bits tell us
//! how late we are. We then jump part-way into a run of NOPs, skipping one
//! NOP for every clock we were late. Whatever the entry phase, we come out of
//! the NOPs on the same clock.
//!
//! The firmware implements this in assembly. This module is the model of
//! what that assembly does, so that the numbers can be checked.

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

use crate::config::{CYCLES_PER_PIXEL, DEJITTER_SYNC, DEJITTER_WINDOW, TIMING};

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// Mask applied to the counter to get the entry phase
pub const WINDOW_MASK: u16 = DEJITTER_WINDOW as u16 - 1;

/// How many NOPs are in the sled.
///
/// The latest possible entry skips all of them.
pub const SLED_LENGTH: u8 = DEJITTER_WINDOW - 1;

/// System clocks from the counter being sampled to the first NOP of the sled.
///
/// That's the tail of the load, then `subs`, `ands`, `lsls` at one clock
/// each, then two for the `add pc`.
pub const SEQUENCE_CYCLES: u32 = 6;

/// The clock (relative to the H-Sync wrap) at which every line leaves the
/// sled, assuming the interrupt arrived within the window.
pub const ALIGNED_CYCLE: u32 = DEJITTER_SYNC as u32 + SEQUENCE_CYCLES + SLED_LENGTH as u32;

/// How many NOPs we burn between leaving the sled and starting the first
/// pixel, so the first pixel store hits the first visible clock.
pub const LEAD_IN_CYCLES: u32 = lead_in_cycles();

const _: () = assert!(
    ALIGNED_CYCLE + CYCLES_PER_PIXEL <= TIMING.visible_start_cycles(),
    "the interrupt arrives too late to reach the left edge of the picture"
);

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// How many clocks late are we, given the H-Sync counter we read?
///
/// This is always in `0..DEJITTER_WINDOW`.
#[inline]
pub const fn entry_phase(counter: u16) -> u8 {
    (counter.wrapping_sub(DEJITTER_SYNC as u16) & WINDOW_MASK) as u8
}

/// How many NOPs do we execute for a given entry phase?
#[inline]
pub const fn alignment_delay(phase: u8) -> u8 {
    SLED_LENGTH - (phase & SLED_LENGTH)
}

/// How many bytes into the sled do we jump for a given entry phase?
///
/// Each Thumb NOP is two bytes.
#[inline]
pub const fn sled_offset_bytes(phase: u8) -> u16 {
    (phase as u16 & WINDOW_MASK) * 2
}

/// The clock at which we leave the sled, given the counter value we read.
#[inline]
pub const fn aligned_cycle(counter: u16) -> u32 {
    counter as u32 + SEQUENCE_CYCLES + alignment_delay(entry_phase(counter)) as u32
}

/// Work out the fixed delay between the sled and the first pixel.
///
/// The first pixel store comes at the end of a full pixel period (the load
/// and the pad before it are part of that period).
pub const fn lead_in_cycles() -> u32 {
    TIMING.visible_start_cycles() - ALIGNED_CYCLE - CYCLES_PER_PIXEL
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn every_phase_in_the_window_lines_up() {
        for late_by in 0..u16::from(DEJITTER_WINDOW) {
            let counter = u16::from(DEJITTER_SYNC) + late_by;
            assert_eq!(entry_phase(counter), late_by as u8);
            assert_eq!(aligned_cycle(counter), ALIGNED_CYCLE, "late by {late_by}");
        }
    }

    #[test]
    fn sled_arithmetic() {
        for phase in 0..DEJITTER_WINDOW {
            // skipped plus executed is the whole sled
            assert_eq!(
                sled_offset_bytes(phase) / 2 + u16::from(alignment_delay(phase)),
                u16::from(SLED_LENGTH)
            );
        }
        assert_eq!(alignment_delay(0), SLED_LENGTH);
        assert_eq!(alignment_delay(SLED_LENGTH), 0);
    }

    #[test]
    fn lead_in_reaches_the_left_edge() {
        assert_eq!(
            ALIGNED_CYCLE + LEAD_IN_CYCLES + CYCLES_PER_PIXEL,
            TIMING.visible_start_cycles()
        );
    }

    proptest! {
        #[test]
        fn phase_is_total_and_in_range(counter in any::<u16>()) {
            let phase = entry_phase(counter);
            prop_assert!(phase < DEJITTER_WINDOW);
            let delay = aligned_cycle(counter) - u32::from(counter);
            prop_assert!(delay >= SEQUENCE_CYCLES);
            prop_assert!(delay < SEQUENCE_CYCLES + u32::from(DEJITTER_WINDOW));
            // Always the same place within the window
            prop_assert_eq!(
                aligned_cycle(counter) % u32::from(DEJITTER_WINDOW),
                ALIGNED_CYCLE % u32::from(DEJITTER_WINDOW)
            );
        }
    }
}

// End of file

//! The scan-line state machine.
//!
//! Two things happen under interrupt:
//!
//! * Once per frame (on the V-Sync PWM wrap) we reset the line counters and
//!   bump the frame counter. See [`ScanState::on_frame`].
//! * Once per line (on the H-Sync PWM wrap) we either count down the
//!   vertical blanking, or emit one row of pixels, or do nothing because
//!   we've run out of rows. See [`ScanState::on_line`].
//!
//! Both wraps raise the same interrupt, and the firmware calls both halves
//! from that one handler (frame first). That's what stops the line half ever
//! seeing a frame reset that's only half done: they simply can't run at the
//! same time. The [`ScanState`] itself lives inside that handler and nothing
//! else can see it.
//!
//! The only thing shared with the main thread is the [`FrameCounter`], which
//! is an atomic with exactly one writer.

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

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::{HEIGHT, SKIP_LINES, TIMING, VERTICAL_SCALE};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// What happened on a scan-line
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineKind {
    /// Still in the vertical blanking interval at the top of the frame
    Blanking,
    /// Emitted a framebuffer row
    Pixels {
        /// Which row it was
        row: u16,
    },
    /// All rows are done for this frame
    Idle,
}

/// The per-frame line counters.
///
/// * `ROWS` is the number of framebuffer rows
/// * `SCALE` is how many lines show each row
/// * `SKIP` is how many lines to wait after a frame reset before row 0
///
/// The firmware uses [`Scanout`], which fills these in from the
/// [`config`](crate::config) module.
#[derive(Debug, Clone)]
pub struct ScanState<const ROWS: u16, const SCALE: u8, const SKIP: u16> {
    /// Lines left to skip before the first row
    blank_lines_left: u16,
    /// Pixel-bearing lines so far this frame, minus one
    active_line: u16,
    /// The framebuffer row we will emit next
    row: u16,
    /// How many times the current row has been emitted
    repeat: u8,
}

/// The scan-line state for our build-time configuration
pub type Scanout = ScanState<{ HEIGHT as u16 }, VERTICAL_SCALE, SKIP_LINES>;

impl<const ROWS: u16, const SCALE: u8, const SKIP: u16> ScanState<ROWS, SCALE, SKIP> {
    /// Marks "no pixel-bearing line yet this frame"
    const BEFORE_FIRST_LINE: u16 = u16::MAX;

    /// Make a new state.
    ///
    /// Until the first frame reset it has no rows left, so nothing gets drawn
    /// in the partial frame before the first V-Sync.
    ///
    /// Every row has to be shown at least once, so a `SCALE` of zero won't
    /// build:
    ///
    /// ```compile_fail
    /// let scan = pico_vgax::ScanState::<80, 0, 73>::new();
    /// ```
    pub const fn new() -> Self {
        const { assert!(SCALE != 0, "each row must be shown on at least one line") };
        ScanState {
            blank_lines_left: 0,
            active_line: Self::BEFORE_FIRST_LINE,
            row: ROWS,
            repeat: 0,
        }
    }

    /// Call this from the V-Sync wrap.
    #[inline(always)]
    pub fn on_frame(&mut self, frames: &FrameCounter) {
        self.active_line = Self::BEFORE_FIRST_LINE;
        self.blank_lines_left = SKIP;
        self.repeat = 0;
        self.row = 0;
        frames.tick();
    }

    /// Call this from the H-Sync wrap.
    ///
    /// If this line should carry pixels, `emit` is called with the framebuffer
    /// row to send. It should get the pixels out before it returns; the row
    /// counters are moved on afterwards.
    #[inline(always)]
    pub fn on_line<F>(&mut self, emit: F) -> LineKind
    where
        F: FnOnce(usize),
    {
        if self.blank_lines_left != 0 {
            self.blank_lines_left -= 1;
            return LineKind::Blanking;
        }

        if self.row >= ROWS {
            return LineKind::Idle;
        }

        let row = self.row;
        emit(usize::from(row));

        self.active_line = self.active_line.wrapping_add(1);
        self.repeat += 1;
        if self.repeat == SCALE {
            self.repeat = 0;
            self.row += 1;
        }
        LineKind::Pixels { row }
    }

    /// The row that the next pixel-bearing line will show
    pub fn row(&self) -> u16 {
        self.row
    }

    /// Which pixel-bearing line of the frame we last emitted, if any
    pub fn active_line(&self) -> Option<u16> {
        if self.active_line == Self::BEFORE_FIRST_LINE {
            None
        } else {
            Some(self.active_line)
        }
    }

    /// How many blanking lines are left before the first row
    pub fn blank_lines_left(&self) -> u16 {
        self.blank_lines_left
    }
}

impl<const ROWS: u16, const SCALE: u8, const SKIP: u16> Default for ScanState<ROWS, SCALE, SKIP> {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts frames, so the main thread can tell the time.
///
/// There's exactly one writer (the video interrupt), so we use a plain load
/// and store. ARMv6-M doesn't have atomic read-modify-write instructions
/// anyway.
#[derive(Debug)]
pub struct FrameCounter {
    frames: AtomicU32,
}

impl FrameCounter {
    /// Make a new counter, at zero
    pub const fn new() -> FrameCounter {
        FrameCounter {
            frames: AtomicU32::new(0),
        }
    }

    /// Count one frame. Wraps on overflow.
    ///
    /// Only the video interrupt should call this.
    #[inline(always)]
    pub fn tick(&self) {
        let frames = self.frames.load(Ordering::Relaxed);
        self.frames.store(frames.wrapping_add(1), Ordering::Release);
    }

    /// How many frames have started
    pub fn frames(&self) -> u32 {
        self.frames.load(Ordering::Acquire)
    }

    /// Time elapsed, to the nearest frame
    pub fn elapsed_micros(&self) -> fugit::MicrosDurationU64 {
        fugit::MicrosDurationU64::from_ticks(frames_to_micros(self.frames()))
    }

    /// Time elapsed, to the nearest frame
    pub fn elapsed_millis(&self) -> fugit::MillisDurationU64 {
        fugit::MillisDurationU64::from_ticks(frames_to_micros(self.frames()) / 1000)
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        FrameCounter::new()
    }
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// Convert a frame count to microseconds
pub const fn frames_to_micros(frames: u32) -> u64 {
    TIMING.cycles_to_micros(frames as u64 * TIMING.frame_period_cycles() as u64)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    /// Run one frame of `lines` scan-lines, returning the rows emitted
    fn run_frame<const R: u16, const S: u8, const K: u16>(
        scan: &mut ScanState<R, S, K>,
        frames: &FrameCounter,
        lines: u16,
    ) -> Vec<usize> {
        let mut seen = Vec::new();
        scan.on_frame(frames);
        for _ in 0..lines {
            scan.on_line(|row| seen.push(row));
        }
        seen
    }

    #[test]
    fn nothing_before_first_frame() {
        let mut scan = Scanout::new();
        for _ in 0..1000 {
            assert_eq!(scan.on_line(|_| panic!("drew a row")), LineKind::Idle);
        }
        assert_eq!(scan.active_line(), None);
    }

    #[test]
    fn frame_reset() {
        let frames = FrameCounter::new();
        let mut scan = Scanout::new();
        scan.on_frame(&frames);
        assert_eq!(scan.blank_lines_left(), SKIP_LINES);
        assert_eq!(scan.row(), 0);
        assert_eq!(scan.active_line(), None);
        assert_eq!(frames.frames(), 1);
    }

    #[test]
    fn reset_mid_frame_starts_again() {
        let frames = FrameCounter::new();
        let mut scan = ScanState::<4, 2, 1>::new();
        scan.on_frame(&frames);
        for _ in 0..4 {
            scan.on_line(|_| {});
        }
        assert_eq!(scan.row(), 1);
        assert_eq!(scan.active_line(), Some(2));
        scan.on_frame(&frames);
        assert_eq!(scan.on_line(|_| panic!()), LineKind::Blanking);
        assert_eq!(scan.on_line(|_| {}), LineKind::Pixels { row: 0 });
        assert_eq!(scan.active_line(), Some(0));
        assert_eq!(frames.frames(), 2);
    }

    #[test]
    fn small_frame() {
        let frames = FrameCounter::new();
        let mut scan = ScanState::<2, 3, 2>::new();
        scan.on_frame(&frames);
        let mut seen = Vec::new();
        let kinds: Vec<LineKind> = (0..10)
            .map(|_| scan.on_line(|row| seen.push(row)))
            .collect();
        assert_eq!(seen, [0, 0, 0, 1, 1, 1]);
        assert_eq!(
            kinds,
            [
                LineKind::Blanking,
                LineKind::Blanking,
                LineKind::Pixels { row: 0 },
                LineKind::Pixels { row: 0 },
                LineKind::Pixels { row: 0 },
                LineKind::Pixels { row: 1 },
                LineKind::Pixels { row: 1 },
                LineKind::Pixels { row: 1 },
                LineKind::Idle,
                LineKind::Idle,
            ]
        );
    }

    #[test]
    fn counter_wraps() {
        let frames = FrameCounter {
            frames: AtomicU32::new(u32::MAX),
        };
        frames.tick();
        assert_eq!(frames.frames(), 0);
    }

    #[test]
    fn unscaled_rows() {
        let frames = FrameCounter::new();
        let mut scan = ScanState::<3, 1, 0>::new();
        assert_eq!(run_frame(&mut scan, &frames, 300), [0, 1, 2]);
    }

    #[test]
    fn elapsed_time_near_the_wrap() {
        // Divisible by three, so a whole number of microseconds
        let start = u32::MAX - 3;
        let frames = FrameCounter {
            frames: AtomicU32::new(start),
        };
        let start_micros = frames.elapsed_micros().ticks();
        assert_eq!(start_micros, u64::from(start / 3) * 50_000);
        for extra in 1..=3u64 {
            frames.tick();
            let micros = frames.elapsed_micros().ticks();
            assert_eq!(micros, frames_to_micros(start) + frames_to_micros(extra as u32));
            assert!(micros > start_micros);
            assert_eq!(frames.elapsed_millis().ticks(), micros / 1000);
        }
        assert_eq!(frames.elapsed_micros().ticks(), u64::from(u32::MAX / 3) * 50_000);
        // The counter wraps, and so does the time
        frames.tick();
        assert_eq!(frames.elapsed_micros().ticks(), 0);
        assert_eq!(frames.elapsed_millis().ticks(), 0);
    }

    #[test]
    fn elapsed_time() {
        let frames = FrameCounter::new();
        for _ in 0..60 {
            frames.tick();
        }
        assert_eq!(frames.elapsed_millis().ticks(), 1000);
        assert_eq!(frames.elapsed_micros().ticks(), 1_000_000);
        // One frame is 16.666... ms
        assert_eq!(frames_to_micros(1), 16_666);
        assert_eq!(frames_to_micros(3), 50_000);
    }

    #[test]
    fn full_frame_shape() {
        let frames = FrameCounter::new();
        let mut scan = Scanout::new();
        let seen = run_frame(&mut scan, &frames, TIMING.frame_lines() as u16);
        assert_eq!(seen.len(), HEIGHT * VERTICAL_SCALE as usize);
        assert_eq!(scan.active_line(), Some(399));
        for (idx, row) in seen.iter().enumerate() {
            assert_eq!(*row, idx / VERTICAL_SCALE as usize);
        }
    }

    proptest! {
        #[test]
        fn every_row_shown_scale_times(lines in 0u16..600) {
            let frames = FrameCounter::new();
            let mut scan = ScanState::<12, 3, 4>::new();
            let seen = run_frame(&mut scan, &frames, lines);
            let expected: Vec<usize> = (0..12usize)
                .flat_map(|row| core::iter::repeat(row).take(3))
                .take(usize::from(lines.saturating_sub(4)))
                .collect();
            prop_assert_eq!(seen, expected);
        }

        #[test]
        fn repeated_frames_are_identical(frame_count in 1usize..5) {
            let frames = FrameCounter::new();
            let mut scan = ScanState::<7, 2, 5>::new();
            let first = run_frame(&mut scan, &frames, 30);
            for _ in 1..frame_count {
                prop_assert_eq!(&run_frame(&mut scan, &frames, 30), &first);
            }
            prop_assert_eq!(frames.frames() as usize, frame_count);
        }
    }
}

// End of file

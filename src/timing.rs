//! Video timing descriptions.
//!
//! A [`VideoTiming`] describes one standard VGA mode in terms of pixel clocks
//! and scan-lines, plus how we turn that into settings for the two PWM slices
//! which generate our sync pulses.
//!
//! Both PWM slices are set up so that their sync pulse sits at the *end* of
//! the counter period. That means the counter wrap (which is what fires our
//! interrupt) happens just as the sync pulse finishes, i.e. at the start of
//! the back porch. On the H-Sync slice, the counter value is therefore "system
//! clocks since the back porch started", which is what the dejitter code
//! measures against.

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

/// Describes the polarity of a sync pulse.
///
/// Some pulses are positive (active-high), some are negative (active-low).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncPolarity {
    /// An active-high pulse
    Positive,
    /// An active-low pulse
    Negative,
}

impl SyncPolarity {
    /// The pin level during the sync pulse
    pub const fn enabled(&self) -> bool {
        match self {
            SyncPolarity::Positive => true,
            SyncPolarity::Negative => false,
        }
    }

    /// Should the PWM channel output be inverted?
    ///
    /// A PWM channel is high while the counter is below the compare value and
    /// low afterwards. Our pulse is the 'afterwards' part, so it comes out
    /// active-low unless we invert the channel.
    pub const fn invert_pwm(&self) -> bool {
        self.enabled()
    }
}

/// The timing parameters for a video mode.
///
/// Horizontal values are in pixel clocks, vertical values are in scan-lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTiming {
    /// The CPU (and PWM) clock, in Hz
    pub sys_clock_hz: u32,
    /// How many system clocks make one VGA pixel clock
    pub clocks_per_pixel: u32,
    /// Pixels between the end of the visible portion and the sync pulse
    pub h_front_porch: u32,
    /// Length of the horizontal sync pulse
    pub h_sync: u32,
    /// Pixels between the end of the sync pulse and the visible portion
    pub h_back_porch: u32,
    /// Visible pixels per line
    pub h_visible: u32,
    /// Polarity of the horizontal sync pulse
    pub hsync_polarity: SyncPolarity,
    /// Lines between the end of the visible portion and the sync pulse
    pub v_front_porch: u32,
    /// Length of the vertical sync pulse
    pub v_sync: u32,
    /// Lines between the end of the sync pulse and the visible portion
    pub v_back_porch: u32,
    /// Visible lines per frame
    pub v_visible: u32,
    /// Polarity of the vertical sync pulse
    pub vsync_polarity: SyncPolarity,
    /// Integer clock divider for the V-Sync PWM slice.
    ///
    /// A whole frame is far more than 65536 system clocks, so the V-Sync
    /// counter has to run slower. It must divide both the frame and the sync
    /// pulse exactly, otherwise the two slices drift apart.
    pub vsync_divider: u8,
}

impl VideoTiming {
    /// Industry standard 640x480 @ 60 Hz, with a 151.2 MHz system clock.
    ///
    /// We use a 25.2 MHz pixel clock. The VGA standard says 25.175 MHz, so we
    /// are 0.1% off, which every monitor we have tried is happy with.
    pub const fn vga_640x480() -> VideoTiming {
        VideoTiming {
            sys_clock_hz: 151_200_000,
            clocks_per_pixel: 6,
            h_front_porch: 16,
            h_sync: 96,
            h_back_porch: 48,
            h_visible: 640,
            hsync_polarity: SyncPolarity::Negative,
            v_front_porch: 10,
            v_sync: 2,
            v_back_porch: 33,
            v_visible: 480,
            vsync_polarity: SyncPolarity::Negative,
            vsync_divider: 80,
        }
    }

    /// Total pixel clocks per line, including blanking
    pub const fn line_pixels(&self) -> u32 {
        self.h_front_porch + self.h_sync + self.h_back_porch + self.h_visible
    }

    /// System clocks per line
    pub const fn line_period_cycles(&self) -> u32 {
        self.line_pixels() * self.clocks_per_pixel
    }

    /// System clocks in the H-Sync pulse
    pub const fn hsync_pulse_cycles(&self) -> u32 {
        self.h_sync * self.clocks_per_pixel
    }

    /// System clocks from the H-Sync counter wrap to the first visible pixel
    pub const fn visible_start_cycles(&self) -> u32 {
        self.h_back_porch * self.clocks_per_pixel
    }

    /// System clocks in the visible portion of a line
    pub const fn visible_cycles(&self) -> u32 {
        self.h_visible * self.clocks_per_pixel
    }

    /// Total lines per frame, including blanking
    pub const fn frame_lines(&self) -> u32 {
        self.v_front_porch + self.v_sync + self.v_back_porch + self.v_visible
    }

    /// System clocks per frame
    pub const fn frame_period_cycles(&self) -> u32 {
        self.frame_lines() * self.line_period_cycles()
    }

    /// The TOP value for the H-Sync slice
    pub const fn hsync_top(&self) -> u16 {
        (self.line_period_cycles() - 1) as u16
    }

    /// The compare value for the H-Sync slice.
    ///
    /// The pulse runs from here to the wrap.
    pub const fn hsync_compare(&self) -> u16 {
        (self.line_period_cycles() - self.hsync_pulse_cycles()) as u16
    }

    /// V-Sync counter ticks per frame
    pub const fn vsync_ticks_per_frame(&self) -> u32 {
        self.frame_period_cycles() / self.vsync_divider as u32
    }

    /// V-Sync counter ticks in the sync pulse
    pub const fn vsync_pulse_ticks(&self) -> u32 {
        (self.v_sync * self.line_period_cycles()) / self.vsync_divider as u32
    }

    /// The TOP value for the V-Sync slice
    pub const fn vsync_top(&self) -> u16 {
        (self.vsync_ticks_per_frame() - 1) as u16
    }

    /// The compare value for the V-Sync slice.
    ///
    /// The pulse runs from here to the wrap.
    pub const fn vsync_compare(&self) -> u16 {
        (self.vsync_ticks_per_frame() - self.vsync_pulse_ticks()) as u16
    }

    /// Convert a number of system clocks into whole microseconds.
    ///
    /// Done in 128 bits, because a day's worth of clocks times a million
    /// doesn't fit in 64.
    pub const fn cycles_to_micros(&self, cycles: u64) -> u64 {
        ((cycles as u128 * 1_000_000) / self.sys_clock_hz as u128) as u64
    }

    /// Check this timing can be produced by two 16-bit PWM slices that stay
    /// locked together.
    pub const fn is_compatible(&self) -> bool {
        let divider = self.vsync_divider as u32;
        divider != 0
            && self.line_period_cycles() <= 65536
            && self.frame_period_cycles() % divider == 0
            && (self.v_sync * self.line_period_cycles()) % divider == 0
            && self.vsync_ticks_per_frame() <= 65536
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vga_640x480_line() {
        let timing = VideoTiming::vga_640x480();
        assert_eq!(timing.line_pixels(), 800);
        assert_eq!(timing.line_period_cycles(), 4800);
        assert_eq!(timing.hsync_top(), 4799);
        // 96 pixels of sync at the end of the counter period
        assert_eq!(timing.hsync_compare(), 4800 - 576);
        assert_eq!(timing.visible_start_cycles(), 288);
        assert_eq!(timing.visible_cycles(), 3840);
    }

    #[test]
    fn vga_640x480_frame() {
        let timing = VideoTiming::vga_640x480();
        assert_eq!(timing.frame_lines(), 525);
        assert_eq!(timing.frame_period_cycles(), 2_520_000);
        assert_eq!(timing.vsync_ticks_per_frame(), 31_500);
        assert_eq!(timing.vsync_top(), 31_499);
        assert_eq!(timing.vsync_pulse_ticks(), 120);
        assert_eq!(timing.vsync_compare(), 31_380);
        // Exactly 60 Hz
        assert_eq!(
            timing.cycles_to_micros(60 * u64::from(timing.frame_period_cycles())),
            1_000_000
        );
        assert!(timing.is_compatible());
    }

    #[test]
    fn micros_for_every_frame_count() {
        let timing = VideoTiming::vga_640x480();
        let frame = u64::from(timing.frame_period_cycles());
        // u32::MAX frames is about 2.2 years
        let cycles = u64::from(u32::MAX) * frame;
        assert_eq!(
            timing.cycles_to_micros(cycles),
            u64::from(u32::MAX / 3) * 50_000
        );
        // Seven and eight million frames, either side of where 64 bits runs out
        assert_eq!(timing.cycles_to_micros(7_000_000 * frame), 116_666_666_666);
        assert_eq!(timing.cycles_to_micros(8_000_000 * frame), 133_333_333_333);
    }

    #[test]
    fn divider_must_be_exact() {
        let mut timing = VideoTiming::vga_640x480();
        timing.vsync_divider = 7;
        assert!(!timing.is_compatible());
        timing.vsync_divider = 20;
        // 126,000 ticks won't fit in a 16-bit counter
        assert!(!timing.is_compatible());
    }

    #[test]
    fn polarity() {
        assert!(SyncPolarity::Positive.invert_pwm());
        assert!(!SyncPolarity::Negative.invert_pwm());
        assert!(!SyncPolarity::Negative.enabled());
    }
}

// End of file

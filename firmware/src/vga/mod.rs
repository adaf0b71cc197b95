//! # VGA Driver for pico-vgax
//!
//! VGA output uses four GPIO pins, two PWM slices and one interrupt.
//!
//! * PWM slice 0 counts system clocks and wraps once per scan-line. Channel
//!   A drives H-Sync on GPIO16.
//! * PWM slice 1 counts system clocks divided by 80 and wraps once per frame.
//!   Channel A drives V-Sync on GPIO18.
//! * Both wraps raise `PWM_IRQ_WRAP`. On a line wrap we might write a row of
//!   pixels to GPIO6 and GPIO7, a whole word at a time through SIO
//!   `GPIO_OUT`, with the timing done by counting instructions.
//!
//! The CPU must be running at 151.2 MHz, which is six clocks per 25.2 MHz
//! VGA pixel. All of the counted code relies on that!
//!
//! The pixel stores write the whole of `GPIO_OUT`, and only ever with a value
//! below 0x100. So while the video runs, every pin set to the SIO function
//! belongs to us: GPIO0 to GPIO5 get junk from the shifted pixels, and GPIO8
//! to GPIO29 (including the LED on GPIO25) are forced low on every pixel.
//! Use the other peripheral functions for anything else you need to drive.

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

use embedded_hal::{
    digital::{OutputPin, PinState},
    pwm::SetDutyCycle,
};
use rp2040_hal::{
    pac::{self, interrupt},
    pwm::{FreeRunning, Pwm0, Pwm1, Slice, Slices},
};

use pico_vgax::{
    config::{
        BYTES_PER_LINE, DEJITTER_SYNC, HSYNC_SLICE, PIXELS_PER_BYTE, TIMING, VSYNC_SLICE,
    },
    dejitter::{LEAD_IN_CYCLES, SLED_LENGTH, WINDOW_MASK},
    emit::{BLANK_PAD, BLANK_SAMPLE, LOAD_PAD, SHIFT_PAD},
    Colour, FrameCounter, Framebuffer, Scanout,
};

use crate::hw::VgaPins;

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Owns the PWM slices and pins that make the picture.
pub struct Video {
    /// Wraps once per line
    hsync: Slice<Pwm0, FreeRunning>,
    /// Wraps once per frame
    vsync: Slice<Pwm1, FreeRunning>,
    /// The sync pins belong to the slices, the colour pins belong to the
    /// interrupt handler
    pins: VgaPins,
}

impl Video {
    /// Set up the PWM slices for our video mode.
    ///
    /// Nothing comes out until you call [`Video::start`].
    pub fn new(slices: Slices, mut pins: VgaPins, nvic: &mut pac::NVIC) -> Video {
        let mut hsync = slices.pwm0;
        hsync.disable();
        hsync.clr_ph_correct();
        hsync.set_div_int(1);
        hsync.set_div_frac(0);
        hsync.set_top(TIMING.hsync_top());
        let Ok(()) = hsync.channel_a.set_duty_cycle(TIMING.hsync_compare());
        if TIMING.hsync_polarity.invert_pwm() {
            hsync.channel_a.set_inverted();
        } else {
            hsync.channel_a.clr_inverted();
        }

        let mut vsync = slices.pwm1;
        vsync.disable();
        vsync.clr_ph_correct();
        vsync.set_div_int(TIMING.vsync_divider);
        vsync.set_div_frac(0);
        vsync.set_top(TIMING.vsync_top());
        let Ok(()) = vsync.channel_a.set_duty_cycle(TIMING.vsync_compare());
        if TIMING.vsync_polarity.invert_pwm() {
            vsync.channel_a.set_inverted();
        } else {
            vsync.channel_a.clr_inverted();
        }

        blank(&mut pins);

        // Nothing may pre-empt the pixels
        unsafe {
            nvic.set_priority(pac::Interrupt::PWM_IRQ_WRAP, 0);
        }

        defmt::info!(
            "H-Sync TOP {=u16}, CC {=u16}. V-Sync TOP {=u16}, CC {=u16}, DIV {=u8}",
            TIMING.hsync_top(),
            TIMING.hsync_compare(),
            TIMING.vsync_top(),
            TIMING.vsync_compare(),
            TIMING.vsync_divider
        );

        Video { hsync, vsync, pins }
    }

    /// Start generating video.
    ///
    /// The first picture appears after the first V-Sync, up to one frame from
    /// now.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.hsync.set_counter(0);
        self.vsync.set_counter(0);
        self.hsync.clear_interrupt();
        self.vsync.clear_interrupt();
        self.hsync.enable_interrupt();
        self.vsync.enable_interrupt();
        unsafe {
            cortex_m::peripheral::NVIC::unpend(pac::Interrupt::PWM_IRQ_WRAP);
            cortex_m::peripheral::NVIC::unmask(pac::Interrupt::PWM_IRQ_WRAP);
        }
        // Both counters have to start on the same clock, so enable them with
        // one write
        let pwm = unsafe { &*pac::PWM::ptr() };
        pwm.en().modify(|r, w| unsafe { w.bits(r.bits() | SLICE_MASK) });
        unsafe {
            cortex_m::interrupt::enable();
        }
        defmt::info!("Video started");
    }

    /// Stop generating video.
    ///
    /// The sync pins are left wherever they were, and the colour pins are
    /// driven low.
    pub fn stop(&mut self) {
        cortex_m::peripheral::NVIC::mask(pac::Interrupt::PWM_IRQ_WRAP);
        let pwm = unsafe { &*pac::PWM::ptr() };
        pwm.en().modify(|r, w| unsafe { w.bits(r.bits() & !SLICE_MASK) });
        self.hsync.disable_interrupt();
        self.vsync.disable_interrupt();
        self.hsync.clear_interrupt();
        self.vsync.clear_interrupt();
        cortex_m::peripheral::NVIC::unpend(pac::Interrupt::PWM_IRQ_WRAP);
        blank(&mut self.pins);
        defmt::info!("Video stopped");
    }

    /// Are the sync generators running?
    pub fn is_running(&self) -> bool {
        let pwm = unsafe { &*pac::PWM::ptr() };
        (pwm.en().read().bits() & SLICE_MASK) == SLICE_MASK
    }
}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// The pixels we show.
///
/// Written by the main thread, read by the interrupt handler. There's no
/// locking, so a drawing that is half done may appear for one frame.
static FRAMEBUFFER: Framebuffer = Framebuffer::new();

/// Counts frames since start-up. Only the interrupt handler writes to it.
static FRAMES: FrameCounter = FrameCounter::new();

/// The bits for our two slices in the PWM `EN`, `INTE` and `INTS` registers
const SLICE_MASK: u32 = HSYNC_IRQ | VSYNC_IRQ;

/// H-Sync slice bit
const HSYNC_IRQ: u32 = 1 << HSYNC_SLICE;

/// V-Sync slice bit
const VSYNC_IRQ: u32 = 1 << VSYNC_SLICE;

/// The PWM `CHn_CTR` register for the H-Sync slice.
///
/// PWM is at 0x4005_0000, each slice has 0x14 bytes of registers and CTR is
/// at offset 0x08 within them.
const HSYNC_COUNTER: *const u32 = (0x4005_0008 + 0x14 * HSYNC_SLICE as usize) as *const u32;

/// The SIO `GPIO_OUT` register
const SIO_GPIO_OUT: *mut u32 = 0xd000_0010 as *mut u32;

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// Get the framebuffer, for drawing on.
pub fn framebuffer() -> &'static Framebuffer {
    &FRAMEBUFFER
}

/// How many frames have started since we called [`Video::start`] the first
/// time?
pub fn frame_count() -> u32 {
    FRAMES.frames()
}

/// Time since the video started, counted in frames
pub fn elapsed_millis() -> fugit::MillisDurationU64 {
    FRAMES.elapsed_millis()
}

/// Time since the video started, counted in frames
pub fn elapsed_micros() -> fugit::MicrosDurationU64 {
    FRAMES.elapsed_micros()
}

/// Put the colour pins at the blanking level
fn blank(pins: &mut VgaPins) {
    let (high, low) = Colour::BLACK.pin_levels();
    let Ok(()) = pins.colour_high.set_state(PinState::from(high));
    let Ok(()) = pins.colour_low.set_state(PinState::from(low));
}

/// Align to the H-Sync counter, then write one row of pixels.
///
/// This is one block of assembly so the compiler can't put anything between
/// the dejitter and the pixels. Every instruction here has a fixed cost:
///
/// * `ldr` from the PWM counter, then `subs`, `ands`, `lsls` and `add pc`
///   jump us `phase` NOPs into the sled, so we leave it on the same clock
///   whatever the phase
/// * a fixed lead-in puts the first pixel store on the first visible clock
/// * each byte is one `ldrb` plus three rounds of `lsls #2` and `uxtb`, with
///   NOPs so the stores are exactly one pixel apart
/// * the last store blanks the colour pins before the front porch
///
/// # Safety
///
/// `row` must point at `BYTES_PER_LINE` readable bytes. Only call this from
/// the video interrupt.
#[link_section = ".data"]
#[inline(always)]
unsafe fn emit_row(row: *const u8) {
    unsafe {
        core::arch::asm!(
            "ldr {px}, [{ctr}]",
            "subs {px}, #{sync}",
            "ands {px}, {mask}",
            "lsls {px}, {px}, #1",
            "add pc, {px}",
            // PC reads four bytes ahead, so this is never run
            "nop",
            ".rept {sled}",
            "nop",
            ".endr",
            ".rept {lead_in}",
            "nop",
            ".endr",
            ".rept {bytes}",
            "ldrb {px}, [{row}]",
            "adds {row}, #1",
            ".rept {load_pad}",
            "nop",
            ".endr",
            "str {px}, [{out}]",
            ".rept {shifts}",
            "lsls {px}, {px}, #2",
            "uxtb {px}, {px}",
            ".rept {shift_pad}",
            "nop",
            ".endr",
            "str {px}, [{out}]",
            ".endr",
            ".endr",
            ".rept {blank_pad}",
            "nop",
            ".endr",
            "movs {px}, #{blank}",
            "str {px}, [{out}]",
            ctr = in(reg) HSYNC_COUNTER,
            mask = in(reg) u32::from(WINDOW_MASK),
            out = in(reg) SIO_GPIO_OUT,
            row = inout(reg) row => _,
            px = out(reg) _,
            sync = const DEJITTER_SYNC,
            sled = const SLED_LENGTH,
            lead_in = const LEAD_IN_CYCLES,
            bytes = const BYTES_PER_LINE,
            load_pad = const LOAD_PAD,
            shifts = const PIXELS_PER_BYTE - 1,
            shift_pad = const SHIFT_PAD,
            blank_pad = const BLANK_PAD,
            blank = const BLANK_SAMPLE,
            options(nostack),
        );
    }
}

/// Called when either PWM slice wraps.
///
/// Lives in RAM, so a flash access from the main thread can't stall it. Must
/// be the highest priority interrupt, and nothing else may mask interrupts
/// for longer than the dejitter window while the video is running.
#[link_section = ".data"]
#[interrupt]
fn PWM_IRQ_WRAP() {
    static mut SCAN: Scanout = Scanout::new();

    let pwm = unsafe { &*pac::PWM::ptr() };
    let pending = pwm.ints().read().bits();
    pwm.intr().write(|w| unsafe { w.bits(pending) });

    // Frame first, so a line that wraps on the same clock sees the reset
    if (pending & VSYNC_IRQ) != 0 {
        SCAN.on_frame(&FRAMES);
    }

    if (pending & HSYNC_IRQ) != 0 {
        SCAN.on_line(|row| {
            // Safety: row_ptr gives us a full row inside FRAMEBUFFER
            unsafe { emit_row(FRAMEBUFFER.row_ptr(row)) }
        });
    }
}

// End of file

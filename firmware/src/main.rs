//! # pico-vgax
//!
//! Demo firmware for the pico-vgax VGA generator.
//!
//! Draws a test card, then bounces a block around the screen forever. Once a
//! minute it stops the video, redraws the test card and starts it again.

#![no_std]
#![no_main]

mod hw;
mod vga;

use defmt::*;
use defmt_rtt as _;
use panic_probe as _;
use rp2040_hal as hal;

use hal::pac;
use pico_vgax::{
    config::{HEIGHT, WIDTH},
    Colour, Framebuffer,
};

#[link_section = ".boot2"]
#[no_mangle]
#[used]
pub static BOOT2_FIRMWARE: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

/// Size of the bouncing block, in pixels
const BLOCK_SIZE: u16 = 8;

/// How often the block moves, in milliseconds
const STEP_MS: u64 = 20;

/// How often we stop the video and redraw the test card, in milliseconds
const REDRAW_MS: u64 = 60_000;

/// How often we say hello, in milliseconds.
///
/// Logging masks interrupts, which can cost us a line of video, so don't do
/// it often.
const HEARTBEAT_MS: u64 = 10_000;

/// A block that bounces off the edges of the screen
struct Block {
    x: u16,
    y: u16,
    dx: i16,
    dy: i16,
}

impl Block {
    /// Move one step, bouncing off the edges
    fn step(&mut self) {
        let max_x = WIDTH as u16 - BLOCK_SIZE;
        let max_y = HEIGHT as u16 - BLOCK_SIZE;
        if (self.x == 0 && self.dx < 0) || (self.x >= max_x && self.dx > 0) {
            self.dx = -self.dx;
        }
        if (self.y == 0 && self.dy < 0) || (self.y >= max_y && self.dy > 0) {
            self.dy = -self.dy;
        }
        self.x = self.x.saturating_add_signed(self.dx).min(max_x);
        self.y = self.y.saturating_add_signed(self.dy).min(max_y);
    }

    /// Draw the block in the given colour
    fn draw(&self, fb: &Framebuffer, colour: Colour) {
        fb.fill_rect(self.x, self.y, BLOCK_SIZE, BLOCK_SIZE, colour);
    }
}

#[hal::entry]
fn main() -> ! {
    defmt::info!(
        "Firmware {} {} starting up",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let periph = pac::Peripherals::take().unwrap();
    let cp = pac::CorePeripherals::take().unwrap();
    let mut hw = hw::Hardware::init(periph, cp);

    let fb = vga::framebuffer();
    draw_test_card(fb);
    hw.video.start();

    let mut block = Block {
        x: 4,
        y: 4,
        dx: 1,
        dy: 1,
    };
    let mut next_step = 0;
    let mut next_heartbeat = HEARTBEAT_MS;
    let mut next_redraw = REDRAW_MS;

    info!("Looping...");

    loop {
        let now = vga::elapsed_millis().ticks();
        if now >= next_step {
            block.draw(fb, Colour::BLACK);
            block.step();
            block.draw(fb, Colour::YELLOW);
            next_step = now + STEP_MS;
        }
        if now >= next_heartbeat {
            info!(
                "{=u32} frames, {=u64} us",
                vga::frame_count(),
                vga::elapsed_micros().ticks()
            );
            next_heartbeat = now + HEARTBEAT_MS;
        }
        if now >= next_redraw {
            // The clock only runs while the video does, so start it straight
            // back up again
            hw.video.stop();
            draw_test_card(fb);
            block.draw(fb, Colour::YELLOW);
            hw.video.start();
            next_redraw = now + REDRAW_MS;
        }
        // The video interrupt wakes us up every line
        cortex_m::asm::wfi();
    }
}

/// Draw a border, some colour bars and a check pattern
fn draw_test_card(fb: &Framebuffer) {
    let width = WIDTH as u16;
    let height = HEIGHT as u16;
    fb.clear(Colour::BLACK);

    // Border
    fb.fill_rect(0, 0, width, 1, Colour::GREEN);
    fb.fill_rect(0, height - 1, width, 1, Colour::GREEN);
    fb.fill_rect(0, 0, 1, height, Colour::GREEN);
    fb.fill_rect(width - 1, 0, 1, height, Colour::GREEN);

    // One bar per colour along the bottom
    let bar_width = width / 4;
    for index in 0..4u8 {
        fb.fill_rect(
            u16::from(index) * bar_width,
            height - 12,
            bar_width,
            10,
            Colour::new(index),
        );
    }

    // A check pattern in the top-right corner, for checking pixel edges
    for y in 2..18 {
        for x in (width - 18)..(width - 2) {
            if (x + y) % 2 == 0 {
                fb.put_pixel(x, y, Colour::RED);
            }
        }
    }
}

// End of file

//! HW related code for the pico-vgax firmware

use fugit::RateExtU32;
use rp2040_hal::{
    clocks,
    gpio::{
        bank0, FunctionPwm, FunctionSioOutput, OutputDriveStrength, OutputSlewRate, Pin, Pins,
        PullNone,
    },
    pac, pll, pwm, xosc, Clock as _, Sio, Watchdog,
};

use crate::vga::Video;

/// On-board crystal frequency, in Hz.
const XOSC_CRYSTAL_FREQ: u32 = 12_000_000;

pub struct VgaPins {
    /// Colour bit 0. Written with the rest of the SIO outputs on every pixel.
    pub colour_low: Pin<bank0::Gpio6, FunctionSioOutput, PullNone>,
    /// Colour bit 1
    pub colour_high: Pin<bank0::Gpio7, FunctionSioOutput, PullNone>,
    /// Horizontal Sync pin, driven by PWM slice 0
    pub _h_sync: Pin<bank0::Gpio16, FunctionPwm, PullNone>,
    /// Vertical Sync pin, driven by PWM slice 1
    pub _v_sync: Pin<bank0::Gpio18, FunctionPwm, PullNone>,
}

pub struct Hardware {
    /// Our VGA output, stopped
    pub video: Video,
}

impl Hardware {
    /// Call this once on start-up to initialise the hardware
    pub fn init(mut periph: pac::Peripherals, mut cp: pac::CorePeripherals) -> Hardware {
        let mut watchdog = Watchdog::new(periph.WATCHDOG);
        let sio = Sio::new(periph.SIO);

        defmt::info!("Configuring clocks...");

        // Run at 151.2 MHz SYS_PLL, 48 MHz, USB_PLL. This is important, as
        // every pixel is six clocks (25.2 MHz, which is close enough to the
        // 25.175 MHz standard VGA pixel clock).

        // Step 1. Turn on the crystal.
        let xosc = xosc::setup_xosc_blocking(periph.XOSC, XOSC_CRYSTAL_FREQ.Hz())
            .map_err(|_x| false)
            .unwrap();
        // Step 2. Configure watchdog tick generation to tick over every microsecond.
        watchdog.enable_tick_generation((XOSC_CRYSTAL_FREQ / 1_000_000) as u8);
        // Step 3. Create a clocks manager.
        let mut clocks = clocks::ClocksManager::new(periph.CLOCKS);
        // Step 4. Set up the system PLL.
        //
        // We take the Crystal Oscillator (=12 MHz) with no divider, and ×126 to
        // give a FOUTVCO of 1512 MHz. This must be in the range 750 MHz - 1600 MHz.
        // The factor of 126 is calculated automatically given the desired FOUTVCO.
        //
        // Next we ÷5 on the first post divider to give 302.4 MHz.
        //
        // Finally we ÷2 on the second post divider to give 151.2 MHz.
        //
        // We note from the [RP2040
        // Datasheet](https://datasheets.raspberrypi.com/rp2040/rp2040-datasheet.pdf),
        // Section 2.18.2.1:
        //
        // > Jitter is minimised by running the VCO at the highest possible
        // > frequency, so that higher post-divide values can be used.
        let pll_sys = pll::setup_pll_blocking(
            periph.PLL_SYS,
            xosc.operating_frequency(),
            pll::PLLConfig {
                vco_freq: 1512.MHz(),
                refdiv: 1,
                post_div1: 5,
                post_div2: 2,
            },
            &mut clocks,
            &mut periph.RESETS,
        )
        .map_err(|_x| false)
        .unwrap();
        // Step 5. Set up a 48 MHz PLL for the USB system.
        let pll_usb = pll::setup_pll_blocking(
            periph.PLL_USB,
            xosc.operating_frequency(),
            pll::common_configs::PLL_USB_48MHZ,
            &mut clocks,
            &mut periph.RESETS,
        )
        .map_err(|_x| false)
        .unwrap();
        // Step 6. Set the system to run from the PLLs we just configured.
        clocks
            .init_default(&xosc, &pll_sys, &pll_usb)
            .map_err(|_x| false)
            .unwrap();

        let sys_freq = clocks.system_clock.freq().to_Hz();
        defmt::info!("Clocks OK! System clock is {=u32} Hz", sys_freq);
        // All the counted code depends on this
        defmt::assert_eq!(sys_freq, pico_vgax::config::TIMING.sys_clock_hz);

        defmt::info!("Configuring pins...");

        let hal_pins = Pins::new(
            periph.IO_BANK0,
            periph.PADS_BANK0,
            sio.gpio_bank0,
            &mut periph.RESETS,
        );

        let vga_pins = VgaPins {
            colour_low: {
                let mut pin = hal_pins.gpio6.reconfigure();
                pin.set_drive_strength(OutputDriveStrength::EightMilliAmps);
                pin.set_slew_rate(OutputSlewRate::Fast);
                pin
            },
            colour_high: {
                let mut pin = hal_pins.gpio7.reconfigure();
                pin.set_drive_strength(OutputDriveStrength::EightMilliAmps);
                pin.set_slew_rate(OutputSlewRate::Fast);
                pin
            },
            _h_sync: {
                let mut pin = hal_pins.gpio16.reconfigure();
                pin.set_drive_strength(OutputDriveStrength::EightMilliAmps);
                pin.set_slew_rate(OutputSlewRate::Fast);
                pin
            },
            _v_sync: {
                let mut pin = hal_pins.gpio18.reconfigure();
                pin.set_drive_strength(OutputDriveStrength::EightMilliAmps);
                pin.set_slew_rate(OutputSlewRate::Fast);
                pin
            },
        };

        defmt::info!("Configuring PWM...");

        let slices = pwm::Slices::new(periph.PWM, &mut periph.RESETS);
        let video = Video::new(slices, vga_pins, &mut cp.NVIC);

        defmt::info!("HW init complete");

        Hardware { video }
    }
}

// End of file

//! Pitch meter hardware configuration
//!
//! This file contains all of the hardware-specific configuration of the pitch meter.
use core::sync::atomic::{AtomicBool, Ordering};

use stm32h7xx_hal::{self as hal, gpio::ExtiPin, prelude::*};

use super::{
    cycle_counter::CycleClock, design_parameters, digital_input::ExtiLine,
    pitch_output::PitchOutput, PitchPwm, Systick,
};

/// The hardware interfaces of the pitch meter.
pub struct PitchmeterDevices {
    pub clock: CycleClock,
    pub di0: ExtiLine,
    pub pitch_output: PitchOutput<PitchPwm>,
}

/// Configure the pitch meter hardware for operation.
///
/// # Args
/// * `core` - The cortex-m peripherals.
/// * `device` - The microcontroller peripherals to be configured.
///
/// # Returns
/// The hardware interfaces. The DI0 interrupt line is routed but not armed.
pub fn setup(
    mut core: hal::stm32::CorePeripherals,
    mut device: hal::stm32::Peripherals,
) -> PitchmeterDevices {
    // Set up RTT logging
    {
        // Enable debug during WFE/WFI-induced sleep
        device.DBGMCU.cr.modify(|_, w| w.dbgsleep_d1().set_bit());

        // Set up RTT channel to use for `rprintln!()` as "best effort".
        // This removes a critical section around the logging and thus allows
        // the edge interrupt to always preempt at low latency.
        // A message logged while another one is being printed is dropped.
        let channels = rtt_target::rtt_init_default!();
        // Note(unsafe): The closure we pass does not establish a critical section
        // as demanded but it does ensure synchronization and implements a lock.
        unsafe {
            rtt_target::set_print_channel_cs(
                channels.up.0,
                &((|arg, f| {
                    static LOCKED: AtomicBool = AtomicBool::new(false);
                    if LOCKED.compare_exchange_weak(
                        false,
                        true,
                        Ordering::Acquire,
                        Ordering::Relaxed,
                    ) == Ok(false)
                    {
                        f(arg);
                        LOCKED.store(false, Ordering::Release);
                    }
                }) as rtt_target::CriticalSectionFunc),
            );
        }

        static LOGGER: rtt_logger::RTTLogger =
            rtt_logger::RTTLogger::new(log::LevelFilter::Info);
        log::set_logger(&LOGGER)
            .map(|()| log::set_max_level(log::LevelFilter::Trace))
            .unwrap();
        log::info!("Starting");
    }

    let pwr = device.PWR.constrain();
    let vos = pwr.freeze();

    let rcc = device.RCC.constrain();
    let ccdr = rcc
        .use_hse(8.MHz())
        .sysclk(design_parameters::SYSCLK.convert())
        .hclk(design_parameters::HCLK.convert())
        .freeze(vos, &device.SYSCFG);

    Systick::start(core.SYST, ccdr.clocks.sysclk().to_Hz());

    core.SCB.enable_icache();

    let clock =
        CycleClock::new(&mut core.DCB, &mut core.DWT, ccdr.clocks.c_ck());
    log::info!("Edge timestamps at {} Hz", ccdr.clocks.c_ck().to_Hz());

    let gpiob = device.GPIOB.split(ccdr.peripheral.GPIOB);
    let gpiog = device.GPIOG.split(ccdr.peripheral.GPIOG);

    let di0 = {
        // Floating input, no pull-up or pull-down.
        let mut pin = gpiog.pg9.into_input();
        pin.make_interrupt_source(&mut device.SYSCFG);
        ExtiLine::new(pin, design_parameters::DI0_EXTI_LINE)
    };

    let pitch_output = {
        let pwm = device.TIM12.pwm(
            gpiob.pb14.into_alternate(),
            design_parameters::PWM_FREQUENCY,
            ccdr.peripheral.TIM12,
            &ccdr.clocks,
        );
        PitchOutput::new(pwm)
    };

    log::info!("setup() complete");

    PitchmeterDevices {
        clock,
        di0,
        pitch_output,
    }
}

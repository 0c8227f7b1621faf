//! Module for all hardware-specific setup of the pitch meter
pub use stm32h7xx_hal as hal;

pub mod cycle_counter;
pub mod design_parameters;
pub mod digital_input;
pub mod pitch_output;
pub mod setup;

// Type alias for digital input 0 (DI0).
pub type DigitalInput0 = hal::gpio::gpiog::PG9<hal::gpio::Input>;

// Type alias for the pitch output PWM channel (TIM12 CH1 on PB14).
pub type PitchPwm =
    hal::pwm::Pwm<hal::stm32::TIM12, 0, hal::pwm::ComplementaryImpossible>;

rtic_monotonics::systick_monotonic!(Systick, 1_000);

#[inline(never)]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    use core::{
        fmt::Write,
        sync::atomic::{AtomicBool, Ordering},
    };
    use cortex_m::asm;
    use rtt_target::{ChannelMode, UpChannel};

    cortex_m::interrupt::disable();

    // Recursion protection
    static PANICKED: AtomicBool = AtomicBool::new(false);
    while PANICKED.load(Ordering::Relaxed) {
        asm::bkpt();
    }
    PANICKED.store(true, Ordering::Relaxed);

    // Analogous to panic-rtt-target
    if let Some(mut channel) = unsafe { UpChannel::conjure(0) } {
        channel.set_mode(ChannelMode::BlockIfFull);
        writeln!(channel, "{}", info).ok();
    }

    // Abort
    asm::udf();
}

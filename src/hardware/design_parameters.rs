use stm32h7xx_hal::time::{Hertz, MegaHertz};

/// The CPU core clock. The DWT cycle counter timestamping input edges runs at this rate.
pub const SYSCLK: MegaHertz = MegaHertz::from_raw(400);

/// The AHB bus clock.
pub const HCLK: MegaHertz = MegaHertz::from_raw(200);

/// The carrier frequency of the pitch output PWM.
pub const PWM_FREQUENCY: Hertz = Hertz::from_raw(8192);

/// The EXTI line of digital input 0 (DI0, PG9).
pub const DI0_EXTI_LINE: u8 = 9;

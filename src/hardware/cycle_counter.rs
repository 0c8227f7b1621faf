//! CPU cycle counter clock
//!
//! Input edges are timestamped with the DWT cycle counter of the Cortex-M7 core. The counter
//! increments once per core clock cycle and wraps every ~10.7 s at 400 MHz, which is far longer
//! than any plausible signal period.
use cortex_m::peripheral::{DCB, DWT};
use freq_capture::{Clock, Tick};

use super::hal::time::Hertz;

/// A clock reading the CPU cycle counter.
#[derive(Copy, Clone, Debug)]
pub struct CycleClock {
    // The frequency that the cycle counter counts at.
    tick_rate: u32,
}

impl CycleClock {
    /// Construct the cycle counting clock.
    ///
    /// # Args
    /// * `dcb` - The debug control block of the CPU core.
    /// * `dwt` - The debug watch and trace unit of the CPU core.
    /// * `cpu_frequency` - The frequency that the cycle counter counts at.
    pub fn new(dcb: &mut DCB, dwt: &mut DWT, cpu_frequency: Hertz) -> Self {
        dcb.enable_trace();
        DWT::unlock();
        dwt.enable_cycle_counter();

        Self {
            tick_rate: cpu_frequency.to_Hz(),
        }
    }
}

impl Clock for CycleClock {
    #[inline]
    fn now(&self) -> Tick {
        DWT::cycle_count()
    }

    /// # Note
    /// The core clock is fixed by `rcc.freeze()` during setup and never rescaled afterwards, so
    /// the rate captured at construction stays current.
    fn tick_rate(&self) -> u32 {
        self.tick_rate
    }
}

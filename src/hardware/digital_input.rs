//! Digital Input 0 (DI0) edge interrupt
//!
//! # Design
//! DI0 is a floating digital input on PG9 that is routed to EXTI line 9 during setup. Arming
//! configures the edge sensitivity of the line, clears any stale pending flag and unmasks the
//! line for the CPU so that every qualifying edge raises `EXTI9_5`. The interrupt handler must
//! clear the pending flag with [ExtiLine::clear_pending()] before it returns.
//!
//! The EXTI trigger, mask and pending registers are shared by all lines. Trigger and mask
//! updates are read-modify-write and happen in the foreground only, while clearing the pending
//! flag is a single write-one-to-clear access that is safe from interrupt context.
use freq_capture::{Edge, InterruptLine};

use super::{hal, DigitalInput0};

/// An edge-triggered EXTI line.
pub struct ExtiLine {
    _pin: DigitalInput0,
    line: u8,
}

impl ExtiLine {
    /// Construct the EXTI line of DI0.
    ///
    /// # Args
    /// * `pin` - The DI0 input pin, already selected as the source of its EXTI line.
    /// * `line` - The EXTI line number of the pin.
    pub fn new(pin: DigitalInput0, line: u8) -> Self {
        Self { _pin: pin, line }
    }

    fn mask(&self) -> u32 {
        1 << self.line
    }

    /// Clear the pending interrupt flag of an EXTI line.
    #[inline]
    pub fn clear_pending(line: u8) {
        // Note(unsafe): The pending register is write-one-to-clear. Writing a single bit does
        // not affect any other line.
        let regs = unsafe { &*hal::stm32::EXTI::ptr() };
        regs.cpupr1.write(|w| unsafe { w.bits(1 << line) });
    }
}

impl InterruptLine for ExtiLine {
    type Error = core::convert::Infallible;

    fn arm(&mut self, edge: Edge) -> Result<(), Self::Error> {
        let mask = self.mask();
        let (rising, falling) = match edge {
            Edge::Rising => (mask, 0),
            Edge::Falling => (0, mask),
            Edge::Both => (mask, mask),
        };

        // Note(unsafe): Trigger and mask registers are only modified from the foreground and
        // only the bit of this line is changed.
        let regs = unsafe { &*hal::stm32::EXTI::ptr() };
        regs.rtsr1
            .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | rising) });
        regs.ftsr1
            .modify(|r, w| unsafe { w.bits((r.bits() & !mask) | falling) });

        Self::clear_pending(self.line);
        regs.cpuimr1.modify(|r, w| unsafe { w.bits(r.bits() | mask) });

        log::debug!("EXTI{} armed on {:?} edges", self.line, edge);
        Ok(())
    }

    fn disarm(&mut self) {
        let mask = self.mask();
        let regs = unsafe { &*hal::stm32::EXTI::ptr() };
        regs.cpuimr1.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
        Self::clear_pending(self.line);
    }
}

//! Pitch control voltage output
//!
//! A PWM channel whose duty cycle is low-pass filtered into the pitch control voltage. See
//! [crate::note] for the note to duty cycle mapping.
use embedded_hal_02::PwmPin;

use crate::note;

/// The pitch output.
pub struct PitchOutput<P> {
    pwm: P,
}

impl<P: PwmPin<Duty = u16>> PitchOutput<P> {
    /// Construct the pitch output and enable the PWM channel.
    pub fn new(mut pwm: P) -> Self {
        pwm.set_duty(0);
        pwm.enable();
        Self { pwm }
    }

    /// Drive the output to the voltage of a note.
    ///
    /// Notes outside of the output range leave the output unchanged.
    pub fn set_note(&mut self, note: u8) {
        match note::duty(note) {
            Some(duty) => {
                let max = self.pwm.get_max_duty();
                self.pwm.set_duty(note::scale(duty, max));
            }
            None => log::warn!("Note {} out of range", note),
        }
    }
}

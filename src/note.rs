//! Pitch output mapping
//!
//! The pitch output is a PWM duty cycle that is filtered into a control voltage of 1 V per
//! octave, spanning 10.99 V peak-to-peak at 10 bit resolution with 0 V at middle C.

/// The MIDI note number at 0 V.
pub const MIDDLE_NOTE: u8 = 60;

/// PWM resolution in bits.
pub const RESOLUTION: u32 = 10;

/// The largest duty cycle code.
pub const MAX_DUTY: u16 = (1 << RESOLUTION) - 1;

/// Duty cycle codes per semitone.
pub const NOTE_SCALE: f32 = (1 << RESOLUTION) as f32 / (12. * 10.99);

/// The duty cycle code of 0 V.
pub const ZERO_OFFSET: i32 = 498;

/// Compute the duty cycle code of a note.
///
/// # Returns
/// `None` if the note is outside of the output range.
pub fn duty(note: u8) -> Option<u16> {
    let v = ((note as i32 - MIDDLE_NOTE as i32) as f32 * NOTE_SCALE
        + ZERO_OFFSET as f32) as i32;
    if (0..=MAX_DUTY as i32).contains(&v) {
        Some(v as u16)
    } else {
        None
    }
}

/// Rescale a duty cycle code to a PWM channel with a different maximum duty.
pub fn scale(duty: u16, max_duty: u16) -> u16 {
    (duty as u32 * max_duty as u32 / MAX_DUTY as u32) as u16
}

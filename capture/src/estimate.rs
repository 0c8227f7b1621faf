use serde::Serialize;

/// The outcome of a frequency estimate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub enum Reading {
    /// The window is not full yet.
    NotReady,
    /// The aggregated period was rejected as implausible (slower than 1 Hz or empty).
    Filtered,
    /// The estimated frequency in Hertz.
    Hz(f64),
}

impl Reading {
    /// The frequency in Hertz, `0.0` if there is no estimate.
    pub fn hz(self) -> f64 {
        match self {
            Self::Hz(f) => f,
            _ => 0.,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Hz(_))
    }
}

/// Convert an aggregated period into a frequency.
///
/// # Args
/// * `period` - The aggregated period in ticks, `None` if the window is not ready.
/// * `tick_rate` - The current tick rate in Hertz. Query this for every estimate, the clock
///   may be rescaled at run time.
///
/// # Returns
/// The frequency estimate. Periods longer than one second are rejected.
pub fn estimate(period: Option<f64>, tick_rate: u32) -> Reading {
    let Some(ticks) = period else {
        return Reading::NotReady;
    };

    let tick_rate = tick_rate as f64;
    if ticks > tick_rate {
        return Reading::Filtered;
    }

    let period = ticks / tick_rate;
    if period > 0. {
        Reading::Hz(1. / period)
    } else {
        Reading::Filtered
    }
}

//! Measurement reporting
//!
//! Every completed measurement cycle is reported as a JSON line on the log.
use freq_capture::Reading;
use heapless::String;
use serde::Serialize;

/// The outcome of a measurement cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Status {
    /// A frequency was estimated.
    Valid,
    /// The window was full but its period was rejected.
    Filtered,
    /// The window did not fill before the timeout.
    Timeout,
}

/// Telemetry of one measurement cycle.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Measurement {
    /// The estimated frequency in Hertz, zero if there is no estimate.
    pub frequency: f64,
    pub status: Status,
    /// The number of periods in the window.
    pub samples: u32,
    /// The number of edges discarded as noise.
    pub rejected: u32,
}

impl Measurement {
    /// Construct the telemetry from a reading.
    pub fn new(reading: Reading, samples: usize, rejected: u32) -> Self {
        let status = match reading {
            Reading::Hz(_) => Status::Valid,
            Reading::Filtered => Status::Filtered,
            Reading::NotReady => Status::Timeout,
        };
        Self {
            frequency: reading.hz(),
            status,
            samples: samples as u32,
            rejected,
        }
    }

    pub fn to_json(&self) -> Option<String<128>> {
        serde_json_core::to_string(self).ok()
    }

    /// Report the measurement on the log.
    pub fn publish(&self) {
        match self.to_json() {
            Some(json) => log::info!("{}", json),
            None => log::warn!("Telemetry serialization failed"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status() {
        let m = Measurement::new(Reading::Hz(100.), 5, 0);
        assert_eq!(m.status, Status::Valid);
        assert_eq!(m.frequency, 100.);

        let m = Measurement::new(Reading::Filtered, 5, 2);
        assert_eq!(m.status, Status::Filtered);
        assert_eq!(m.frequency, 0.);

        let m = Measurement::new(Reading::NotReady, 3, 0);
        assert_eq!(m.status, Status::Timeout);
    }

    #[test]
    fn json() {
        let json = Measurement::new(Reading::Filtered, 5, 2).to_json().unwrap();
        assert!(json.contains(r#""status":"Filtered""#));
        assert!(json.contains(r#""samples":5"#));
        assert!(json.contains(r#""rejected":2"#));
    }
}

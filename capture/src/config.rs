use serde::{Deserialize, Serialize};

use super::{Aggregator, Channel, Policy};

/// The noise floor used when none is configured: 1 µs at 80 MHz.
pub const MIN_VALID_TICKS: u32 = 80;

/// The signal edge that timestamps a period.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum Edge {
    #[default]
    Rising,
    Falling,
    Both,
}

/// Represents the errors that can occur when configuring a frequency capture.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The interrupt line refused the requested edge configuration.
    #[error("Interrupt line could not be armed")]
    Arm,
    /// The window size is zero or exceeds the window capacity.
    #[error("Invalid window size")]
    WindowSize,
    /// The tick rate is zero.
    #[error("Invalid tick rate")]
    TickRate,
}

/// Configuration of a frequency capture channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The aggregation policy.
    pub policy: Policy,
    /// The number of periods per estimate.
    pub size: usize,
    /// The minimum accepted period in ticks.
    pub noise_floor: u32,
    /// The edge polarity to timestamp.
    pub edge: Edge,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: Policy::Median,
            size: 8,
            noise_floor: MIN_VALID_TICKS,
            edge: Edge::Rising,
        }
    }
}

impl Config {
    /// Convert a noise floor duration into ticks.
    ///
    /// # Args
    /// * `ns` - The minimum accepted period in nanoseconds.
    /// * `tick_rate` - The nominal tick rate in Hertz.
    pub fn noise_floor_from_ns(ns: u32, tick_rate: u32) -> Result<u32, Error> {
        if tick_rate == 0 {
            return Err(Error::TickRate);
        }
        let ticks = ns as u64 * tick_rate as u64 / 1_000_000_000;
        Ok(ticks.min(u32::MAX as u64) as u32)
    }

    /// Build the shared capture channel.
    ///
    /// # Note
    /// `N` is the window capacity. The configured size must not exceed it.
    pub fn build<const N: usize>(&self) -> Result<Channel<Aggregator<N>>, Error> {
        if self.size == 0 || self.size > N {
            return Err(Error::WindowSize);
        }
        Ok(Channel::new(
            Aggregator::new(self.policy, self.size),
            self.noise_floor,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Window;

    #[test]
    fn noise_floor_calibration() {
        assert_eq!(Config::noise_floor_from_ns(1_000, 80_000_000), Ok(80));
        assert_eq!(Config::noise_floor_from_ns(1_000, 400_000_000), Ok(400));
        assert_eq!(Config::noise_floor_from_ns(1_000, 0), Err(Error::TickRate));
    }

    #[test]
    fn build() {
        let config = Config {
            policy: Policy::Mean,
            size: 4,
            ..Default::default()
        };
        let channel = config.build::<16>().unwrap();
        assert_eq!(channel.window().policy(), Policy::Mean);
        assert_eq!(channel.window().capacity(), 4);
        assert_eq!(channel.timer().noise_floor(), MIN_VALID_TICKS);
    }

    #[test]
    fn window_size() {
        let mut config = Config::default();
        config.size = 0;
        assert_eq!(config.build::<16>().err(), Some(Error::WindowSize));
        config.size = 17;
        assert_eq!(config.build::<16>().err(), Some(Error::WindowSize));
        config.size = 16;
        assert!(config.build::<16>().is_ok());
    }
}

//! Run-time settings of the pitch meter.
use freq_capture::{Config, Edge, Error, Policy};
use miniconf::Tree;
use serde::{Deserialize, Serialize};

/// Maximum depth of the settings tree.
pub const MAX_DEPTH: usize = 4;

#[derive(Clone, Debug, Tree, Serialize, Deserialize)]
#[tree(meta(doc, typename))]
pub struct Settings {
    /// Specifies how the periods of a window are reduced to one period.
    #[tree(with=miniconf::leaf)]
    pub policy: Policy,

    /// Number of periods per frequency estimate.
    ///
    /// Limited to [crate::MAX_WINDOW].
    pub window: u32,

    /// Minimum accepted period in nanoseconds.
    ///
    /// Edges closer than this to the previous edge are discarded as noise.
    pub noise_floor: u32,

    /// Specifies the input edge that is timestamped.
    #[tree(with=miniconf::leaf)]
    pub edge: Edge,

    /// Interval in milliseconds between checks for a full window.
    pub poll_interval: u32,

    /// Time in milliseconds to wait for a full window before giving up on a cycle.
    pub timeout: u32,

    /// Delay in milliseconds after updating the pitch output before measuring.
    pub settle: u32,

    /// Delay in milliseconds after a measurement before the next cycle.
    pub cooldown: u32,

    /// MIDI note number of the pitch output. Middle C is 60.
    pub note: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            policy: Policy::Median,
            window: 8,
            noise_floor: 1_000,
            edge: Edge::Rising,
            poll_interval: 10,
            timeout: 1_000,
            settle: 50,
            cooldown: 20,
            note: crate::note::MIDDLE_NOTE,
        }
    }
}

impl Settings {
    /// Derive the capture configuration.
    ///
    /// # Args
    /// * `tick_rate` - The nominal rate of the timestamp counter in Hertz.
    pub fn capture(&self, tick_rate: u32) -> Result<Config, Error> {
        if self.window as usize > crate::MAX_WINDOW {
            return Err(Error::WindowSize);
        }
        Ok(Config {
            policy: self.policy,
            size: self.window as usize,
            noise_floor: Config::noise_floor_from_ns(
                self.noise_floor,
                tick_rate,
            )?,
            edge: self.edge,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use heapless::String;
    use miniconf::{json_core, NodeIter, Path, TreeSchema};

    #[test]
    fn default_capture() {
        let config = Settings::default().capture(400_000_000).unwrap();
        assert_eq!(config.policy, Policy::Median);
        assert_eq!(config.size, 8);
        assert_eq!(config.noise_floor, 400);
        assert_eq!(config.edge, Edge::Rising);
    }

    #[test]
    fn invalid() {
        let mut settings = Settings::default();
        assert_eq!(settings.capture(0), Err(Error::TickRate));

        settings.window = crate::MAX_WINDOW as u32 + 1;
        assert_eq!(settings.capture(400_000_000), Err(Error::WindowSize));
    }

    #[test]
    fn json() {
        let json: heapless::String<512> =
            serde_json_core::to_string(&Settings::default()).unwrap();
        assert!(json.contains(r#""policy":"Median""#));
        assert!(json.contains(r#""note":60"#));
    }

    #[test]
    fn keys() {
        assert!(Settings::SCHEMA.shape().max_depth <= MAX_DEPTH);
        let keys: std::vec::Vec<_> =
            NodeIter::<Path<String<128>, '/'>, MAX_DEPTH>::new(
                Settings::SCHEMA,
            )
            .map(|key| key.unwrap().0)
            .collect();
        assert_eq!(keys.len(), 9);
        assert_eq!(keys[0].as_str(), "/policy");
        assert!(keys.iter().any(|k| k.as_str() == "/noise_floor"));
        assert_eq!(keys[8].as_str(), "/note");
    }

    #[test]
    fn set_by_path() {
        let mut settings = Settings::default();
        json_core::set(&mut settings, "/window", b"5").unwrap();
        json_core::set(&mut settings, "/policy", b"\"Mean\"").unwrap();
        json_core::set(&mut settings, "/edge", b"\"Both\"").unwrap();
        assert!(json_core::set(&mut settings, "/missing", b"1").is_err());
        assert!(json_core::set(&mut settings, "/note", b"-1").is_err());

        let config = settings.capture(400_000_000).unwrap();
        assert_eq!(config.size, 5);
        assert_eq!(config.policy, Policy::Mean);
        assert_eq!(config.edge, Edge::Both);

        let mut buf = [0; 32];
        let len =
            json_core::get_by_key(&settings, Path::<_, '/'>("/window"), &mut buf)
                .unwrap();
        assert_eq!(&buf[..len], b"5");
    }
}

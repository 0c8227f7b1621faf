//! # Pitch meter
//!
//! The `pitchmeter` application measures the frequency of a square wave applied to DI0 while
//! driving a pitch control voltage, e.g. to tune a voltage controlled oscillator.
//!
//! ## Features
//! * Edge timestamping with the 400 MHz CPU cycle counter
//! * Noise rejection of edges closer than a configurable floor
//! * Median or mean aggregation of a window of periods
//! * Rejection of estimates below 1 Hz
//! * 1 V/octave pitch output via PWM
//!
//! ## Settings
//! Refer to [pitchmeter::settings::Settings] for the run-time configurable settings.
//!
//! ## Telemetry
//! Refer to [pitchmeter::telemetry::Measurement] for the telemetry logged for every cycle.
#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

use pitchmeter::settings::Settings;

#[cfg(not(target_os = "none"))]
fn main() {
    use miniconf::{json_core, NodeIter, Path, TreeSchema};
    use pitchmeter::settings::MAX_DEPTH;

    let s = Settings::default();
    let mut buf = [0; 64];
    for key in NodeIter::<Path<heapless::String<128>, '/'>, MAX_DEPTH>::new(
        Settings::SCHEMA,
    ) {
        let key = key.unwrap();
        let len =
            json_core::get_by_key(&s, Path::<_, '/'>(key.0.as_str()), &mut buf)
                .unwrap();
        println!("{}: {}", key.0, core::str::from_utf8(&buf[..len]).unwrap());
    }
}

#[cfg(target_os = "none")]
#[rtic::app(device = pitchmeter::hardware::hal::stm32, peripherals = true, dispatchers=[DCMI])]
mod app {
    use super::*;
    use freq_capture::{Aggregator, Channel, Clock, FreqCapture};
    use fugit::ExtU32;

    use pitchmeter::{
        hardware::{
            self,
            cycle_counter::CycleClock,
            design_parameters::DI0_EXTI_LINE,
            digital_input::ExtiLine,
            pitch_output::PitchOutput,
            PitchPwm, Systick,
        },
        telemetry::{Measurement, Status},
        MAX_WINDOW,
    };

    type Window = Aggregator<MAX_WINDOW>;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        capture: FreqCapture<'static, Window, CycleClock, ExtiLine>,
        channel: &'static Channel<Window>,
        clock: CycleClock,
        pitch_output: PitchOutput<PitchPwm>,
        settings: Settings,
    }

    #[init]
    fn init(c: init::Context) -> (Shared, Local) {
        let settings = Settings::default();

        // Configure the microcontroller
        let devices = hardware::setup::setup(c.core, c.device);

        let config = settings.capture(devices.clock.tick_rate()).unwrap();
        let channel: &'static Channel<Window> = cortex_m::singleton!(
            : Channel<Window> = config.build().unwrap()
        )
        .unwrap();

        let mut capture =
            FreqCapture::new(channel, devices.clock, devices.di0, config.edge);
        capture.start().unwrap();

        measure::spawn().unwrap();

        (
            Shared {},
            Local {
                capture,
                channel,
                clock: devices.clock,
                pitch_output: devices.pitch_output,
                settings,
            },
        )
    }

    /// DI0 edge interrupt.
    ///
    /// Runs above all other tasks and only timestamps the edge into the shared window.
    #[task(binds=EXTI9_5, local=[channel, clock], priority=2)]
    fn edge(c: edge::Context) {
        // Timestamp first, before anything else adds latency.
        let now = c.local.clock.now();
        ExtiLine::clear_pending(DI0_EXTI_LINE);
        c.local.channel.on_edge(now);
    }

    /// Measurement cycle: set the pitch output, wait for a full window, report and restart.
    #[task(priority = 1, local=[capture, pitch_output, settings])]
    async fn measure(c: measure::Context) {
        let measure::LocalResources {
            capture,
            pitch_output,
            settings,
            ..
        } = c.local;

        let poll_interval = settings.poll_interval.max(1);

        loop {
            pitch_output.set_note(settings.note);
            Systick::delay(settings.settle.millis()).await;

            let mut waited = 0;
            while !capture.is_ready() && waited < settings.timeout {
                Systick::delay(poll_interval.millis()).await;
                waited += poll_interval;
            }

            let measurement = Measurement::new(
                capture.measure(),
                capture.samples(),
                capture.rejected(),
            );
            measurement.publish();

            // Keep collecting into the same window on a timeout.
            if measurement.status == Status::Timeout {
                log::warn!("timeout");
                continue;
            }

            capture.reset();
            Systick::delay(settings.cooldown.millis()).await;
        }
    }

    #[idle]
    fn idle(_c: idle::Context) -> ! {
        loop {
            cortex_m::asm::wfi();
        }
    }
}

use super::{estimate, Edge, EdgeTimer, Error, Reading, Tick, Window};

/// The free running tick counter used to timestamp edges.
pub trait Clock {
    /// Read the current tick count in a single access.
    fn now(&self) -> Tick;

    /// The current tick rate in Hertz.
    ///
    /// # Note
    /// This may change at run time and is queried for every estimate.
    fn tick_rate(&self) -> u32;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Tick {
        (**self).now()
    }

    fn tick_rate(&self) -> u32 {
        (**self).tick_rate()
    }
}

/// The input line whose edges interrupt the foreground.
pub trait InterruptLine {
    type Error: core::fmt::Debug;

    /// Configure the line as a digital input sensitive to `edge` and enable its interrupt.
    ///
    /// The interrupt handler must call [Channel::on_edge()] on the channel the capture was
    /// constructed with.
    fn arm(&mut self, edge: Edge) -> Result<(), Self::Error>;

    /// Disable the interrupt of the line.
    fn disarm(&mut self);
}

/// The state shared between the edge interrupt and the foreground.
#[derive(Debug)]
pub struct Channel<W> {
    timer: EdgeTimer,
    window: W,
}

impl<W: Window> Channel<W> {
    /// Construct the channel.
    ///
    /// # Args
    /// * `window` - The aggregation window.
    /// * `noise_floor` - The minimum accepted period in ticks.
    pub const fn new(window: W, noise_floor: u32) -> Self {
        Self {
            timer: EdgeTimer::new(noise_floor),
            window,
        }
    }

    /// Handle an edge interrupt.
    ///
    /// # Args
    /// * `now` - The tick count read once on interrupt entry.
    #[inline]
    pub fn on_edge(&self, now: Tick) {
        self.timer.stamp(now, &self.window);
    }

    pub fn timer(&self) -> &EdgeTimer {
        &self.timer
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn is_ready(&self) -> bool {
        self.window.is_ready()
    }

    /// Discard all periods and the previous edge.
    ///
    /// The edge interrupt may preempt a reset. The previous edge is forgotten first so that
    /// an edge landing mid-reset only becomes the new reference.
    pub fn reset(&self) {
        self.timer.clear();
        self.window.clear();
    }
}

/// The lifecycle state of a capture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Constructed, interrupt not armed.
    Idle,
    /// Interrupt armed, collecting periods.
    Armed,
    /// Window full, further periods are dropped until reset.
    Ready,
}

/// Frequency capture on a single input line.
///
/// The capture borrows the [Channel] that the interrupt handler also references. The borrow
/// guarantees the channel outlives the capture, and dropping the capture disarms the line, so
/// the handler never fires for a channel nobody drains.
pub struct FreqCapture<'a, W: Window, C: Clock, L: InterruptLine> {
    channel: &'a Channel<W>,
    clock: C,
    line: L,
    edge: Edge,
    armed: bool,
}

impl<'a, W: Window, C: Clock, L: InterruptLine> FreqCapture<'a, W, C, L> {
    /// Construct an idle capture.
    ///
    /// # Args
    /// * `channel` - The channel fed by the edge interrupt of `line`.
    /// * `clock` - The tick counter timestamping the edges.
    /// * `line` - The input line.
    /// * `edge` - The edge polarity to capture.
    pub fn new(channel: &'a Channel<W>, clock: C, line: L, edge: Edge) -> Self {
        Self {
            channel,
            clock,
            line,
            edge,
            armed: false,
        }
    }

    /// Clear the window and arm the interrupt if it is not armed yet.
    pub fn start(&mut self) -> Result<(), Error> {
        self.channel.reset();
        if !self.armed {
            self.line.arm(self.edge).map_err(|e| {
                log::error!("Failed to arm {:?} edge interrupt: {:?}", self.edge, e);
                Error::Arm
            })?;
            self.armed = true;
            log::info!(
                "Capturing {:?} edges, {} periods per estimate",
                self.edge,
                self.channel.window().capacity()
            );
        }
        Ok(())
    }

    pub fn state(&self) -> State {
        if !self.armed {
            State::Idle
        } else if self.channel.is_ready() {
            State::Ready
        } else {
            State::Armed
        }
    }

    /// Check if the window is full. Never blocks.
    pub fn is_ready(&self) -> bool {
        self.channel.is_ready()
    }

    /// Estimate the frequency from the current window.
    pub fn measure(&self) -> Reading {
        estimate(self.channel.window().period(), self.clock.tick_rate())
    }

    /// Estimate the frequency in Hertz.
    ///
    /// # Returns
    /// The frequency, or `0.0` if the window is not full or the estimate was rejected. Use
    /// [FreqCapture::measure()] to tell these apart.
    pub fn read(&self) -> f64 {
        self.measure().hz()
    }

    /// Discard all collected periods without disarming the interrupt.
    pub fn reset(&self) {
        self.channel.reset();
    }

    /// The number of periods in the window.
    pub fn samples(&self) -> usize {
        self.channel.window().len()
    }

    /// The number of edges discarded as noise since the last reset.
    pub fn rejected(&self) -> u32 {
        self.channel.timer().rejected()
    }

    /// Disarm the interrupt and release the capture.
    pub fn teardown(mut self) {
        self.disarm();
    }

    fn disarm(&mut self) {
        if self.armed {
            self.line.disarm();
            self.armed = false;
            log::info!("Edge capture disarmed");
        }
    }
}

impl<W: Window, C: Clock, L: InterruptLine> Drop for FreqCapture<'_, W, C, L> {
    fn drop(&mut self) {
        self.disarm();
    }
}

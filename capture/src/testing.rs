use core::cell::Cell;

use crate::{Channel, Clock, Edge, InterruptLine, Tick, Window};

pub fn isclose(a: f64, b: f64, rtol: f64, atol: f64) -> bool {
    (a - b).abs() <= a.abs().max(b.abs()) * rtol + atol
}

/// A simulated tick counter and interrupt line.
pub struct Bench {
    pub now: Cell<Tick>,
    pub rate: Cell<u32>,
    pub armed: Cell<Option<Edge>>,
    pub refuse: Cell<bool>,
    pub arms: Cell<u32>,
}

impl Bench {
    pub fn new(rate: u32) -> Self {
        Self {
            now: Cell::new(1_000),
            rate: Cell::new(rate),
            armed: Cell::new(None),
            refuse: Cell::new(false),
            arms: Cell::new(0),
        }
    }

    /// Advance time by each period and fire an edge if the line is armed.
    pub fn edges<W: Window>(&self, channel: &Channel<W>, periods: &[u32]) {
        for &period in periods {
            self.now.set(self.now.get().wrapping_add(period));
            if self.armed.get().is_some() {
                channel.on_edge(self.now.get());
            }
        }
    }
}

impl Clock for Bench {
    fn now(&self) -> Tick {
        self.now.get()
    }

    fn tick_rate(&self) -> u32 {
        self.rate.get()
    }
}

impl InterruptLine for &Bench {
    type Error = ();

    fn arm(&mut self, edge: Edge) -> Result<(), ()> {
        if self.refuse.get() {
            return Err(());
        }
        self.arms.set(self.arms.get() + 1);
        self.armed.set(Some(edge));
        Ok(())
    }

    fn disarm(&mut self) {
        self.armed.set(None);
    }
}

use core::sync::atomic::{AtomicU32, Ordering};

use super::{Tick, Window};

/// Edge timer
///
/// Converts the tick count of consecutive signal edges into periods and discards periods
/// shorter than the noise floor.
///
/// # Note
/// [EdgeTimer::stamp()] runs in interrupt context. It never blocks and only ever writes
/// single atomic cells. The foreground must only call [EdgeTimer::clear()] while it holds
/// logical ownership of the channel, i.e. never concurrently with a drain.
#[derive(Debug)]
pub struct EdgeTimer {
    noise_floor: u32,
    // Tick count of the previous edge, zero if there was none.
    last: AtomicU32,
    // Number of edges discarded as noise since the last clear.
    rejected: AtomicU32,
}

impl EdgeTimer {
    /// Construct the edge timer.
    ///
    /// # Args
    /// * `noise_floor` - The minimum period in ticks that is accepted as a real edge.
    pub const fn new(noise_floor: u32) -> Self {
        Self {
            noise_floor,
            last: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
        }
    }

    /// The minimum accepted period in ticks.
    pub fn noise_floor(&self) -> u32 {
        self.noise_floor
    }

    /// The number of edges discarded as noise since the last clear.
    pub fn rejected(&self) -> u32 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Compute the period between the previous edge and `now`.
    ///
    /// # Returns
    /// `None` if there was no previous edge or if the period is below the noise floor.
    fn elapsed(&self, now: Tick) -> Option<u32> {
        let last = self.last.load(Ordering::Relaxed);
        if last == 0 {
            return None;
        }

        let period = now.wrapping_sub(last);
        if period < self.noise_floor {
            let rejected = self.rejected.load(Ordering::Relaxed);
            self.rejected
                .store(rejected.wrapping_add(1), Ordering::Relaxed);
            return None;
        }

        Some(period)
    }

    /// Record an edge at `now`.
    ///
    /// The period since the previous edge is handed to `window` if it qualifies. The edge
    /// always becomes the reference for the next period, also if it was discarded as noise.
    ///
    /// # Args
    /// * `now` - The tick count read once at the start of the interrupt.
    /// * `window` - The aggregation window receiving the period.
    #[inline]
    pub fn stamp<W: Window + ?Sized>(&self, now: Tick, window: &W) {
        if let Some(period) = self.elapsed(now) {
            window.accept(period);
        }
        self.last.store(now, Ordering::Relaxed);
    }

    /// Forget the previous edge so that the next edge only serves as a reference.
    pub fn clear(&self) {
        self.last.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MedianWindow;

    #[test]
    fn first_edge_is_reference() {
        let timer = EdgeTimer::new(80);
        let window = MedianWindow::<4>::new(4);
        timer.stamp(1_000, &window);
        assert_eq!(window.len(), 0);
        timer.stamp(2_000, &window);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn noise_moves_reference() {
        let timer = EdgeTimer::new(80);
        let window = MedianWindow::<4>::new(1);
        timer.stamp(1_000, &window);
        timer.stamp(1_050, &window);
        assert_eq!(window.len(), 0);
        assert_eq!(timer.rejected(), 1);

        // Measured from the rejected edge, not from the first one.
        timer.stamp(1_250, &window);
        assert_eq!(window.period(), Some(200.));
    }

    #[test]
    fn exact_floor_accepted() {
        let timer = EdgeTimer::new(80);
        let window = MedianWindow::<4>::new(1);
        timer.stamp(1_000, &window);
        timer.stamp(1_079, &window);
        assert_eq!(window.len(), 0);
        timer.stamp(1_159, &window);
        assert_eq!(window.period(), Some(80.));
    }

    #[test]
    fn counter_wrap() {
        let timer = EdgeTimer::new(80);
        let window = MedianWindow::<4>::new(1);
        timer.stamp(u32::MAX - 99, &window);
        timer.stamp(400, &window);
        assert_eq!(window.period(), Some(500.));
    }

    #[test]
    fn clear_forgets_reference() {
        let timer = EdgeTimer::new(80);
        let window = MedianWindow::<4>::new(4);
        timer.stamp(1_000, &window);
        timer.stamp(1_010, &window);
        timer.clear();
        assert_eq!(timer.rejected(), 0);
        timer.stamp(5_000, &window);
        assert_eq!(window.len(), 0);
    }
}

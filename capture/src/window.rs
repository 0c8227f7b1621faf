//! Aggregation windows
//!
//! A window collects a bounded number of periods from the interrupt context and reduces them
//! to a single aggregated period for the foreground. Once a window is full it stops accepting
//! periods until it is cleared, so that the foreground always drains a stable snapshot.
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use heapless::Vec;
use portable_atomic::AtomicU64;
use serde::{Deserialize, Serialize};

/// The capability shared by all aggregation policies.
pub trait Window {
    /// Accept a period in ticks. A no-op once the window is full.
    ///
    /// # Note
    /// Called from interrupt context. Implementations must not block, allocate or panic.
    fn accept(&self, period: u32);

    /// The number of periods accepted since the last clear.
    fn len(&self) -> usize;

    /// The number of periods that make the window ready.
    fn capacity(&self) -> usize;

    /// Check if the window is full.
    fn is_ready(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Drain the aggregated period in ticks.
    ///
    /// # Returns
    /// `None` if the window is not full yet.
    fn period(&self) -> Option<f64>;

    /// Discard all accepted periods.
    fn clear(&self);
}

/// Compute the median of sorted periods.
///
/// For an even number of periods the two central ones are averaged.
pub fn median(sorted: &[u32]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 0 => {
            Some((sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.)
        }
        _ => Some(sorted[n / 2] as f64),
    }
}

/// Median-of-N window backed by a fixed buffer of `N` periods.
#[derive(Debug)]
pub struct MedianWindow<const N: usize> {
    buffer: [AtomicU32; N],
    // Published after the buffer slot is written.
    len: AtomicUsize,
    size: usize,
}

impl<const N: usize> MedianWindow<N> {
    /// Construct a median window.
    ///
    /// # Args
    /// * `size` - The number of periods to collect. Limited to `N`.
    pub const fn new(size: usize) -> Self {
        Self {
            buffer: [const { AtomicU32::new(0) }; N],
            len: AtomicUsize::new(0),
            size: if size < N { size } else { N },
        }
    }
}

impl<const N: usize> Window for MedianWindow<N> {
    #[inline]
    fn accept(&self, period: u32) {
        let idx = self.len.load(Ordering::Relaxed);
        if idx < self.size {
            self.buffer[idx].store(period, Ordering::Relaxed);
            self.len.store(idx + 1, Ordering::Release);
        }
    }

    fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    fn capacity(&self) -> usize {
        self.size
    }

    fn period(&self) -> Option<f64> {
        // Never index beyond the length observed here, even if the producer keeps writing.
        let len = self.len().min(self.size);
        if len < self.size {
            return None;
        }

        let mut sorted: Vec<u32, N> = self.buffer[..len]
            .iter()
            .map(|period| period.load(Ordering::Relaxed))
            .collect();
        sorted.sort_unstable();
        median(&sorted)
    }

    fn clear(&self) {
        self.len.store(0, Ordering::Release);
    }
}

/// Running-mean window accumulating a sum and a count of periods.
#[derive(Debug)]
pub struct MeanWindow {
    sum: AtomicU64,
    count: AtomicU32,
    size: u32,
}

impl MeanWindow {
    /// Construct a mean window.
    ///
    /// # Args
    /// * `size` - The number of periods to accumulate.
    pub const fn new(size: u32) -> Self {
        Self {
            sum: AtomicU64::new(0),
            count: AtomicU32::new(0),
            size,
        }
    }
}

impl Window for MeanWindow {
    #[inline]
    fn accept(&self, period: u32) {
        let count = self.count.load(Ordering::Relaxed);
        if count < self.size {
            // An empty window starts a new sum. A clear interrupted between its two stores
            // may leave a stale sum behind.
            let sum = if count == 0 {
                0
            } else {
                self.sum.load(Ordering::Relaxed)
            };
            self.sum.store(sum + period as u64, Ordering::Relaxed);
            self.count.store(count + 1, Ordering::Release);
        }
    }

    fn len(&self) -> usize {
        self.count.load(Ordering::Acquire) as usize
    }

    fn capacity(&self) -> usize {
        self.size as usize
    }

    fn period(&self) -> Option<f64> {
        // Sum and count are independent cells. A drain racing an accept may pair them from
        // slightly different instants.
        let count = self.count.load(Ordering::Acquire);
        if count == 0 || count < self.size {
            return None;
        }
        Some(self.sum.load(Ordering::Relaxed) as f64 / count as f64)
    }

    fn clear(&self) {
        self.sum.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Release);
    }
}

/// Selects how periods are reduced to one aggregated period.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum Policy {
    /// Median of the window. Robust against outliers.
    #[default]
    Median,
    /// Arithmetic mean of the window.
    Mean,
}

/// A window with its policy chosen at run time.
#[derive(Debug)]
pub enum Aggregator<const N: usize> {
    Median(MedianWindow<N>),
    Mean(MeanWindow),
}

impl<const N: usize> Aggregator<N> {
    /// Construct the window for a policy.
    ///
    /// # Args
    /// * `policy` - The aggregation policy.
    /// * `size` - The number of periods to collect. Limited to `N`.
    pub const fn new(policy: Policy, size: usize) -> Self {
        let size = if size < N { size } else { N };
        match policy {
            Policy::Median => Self::Median(MedianWindow::new(size)),
            Policy::Mean => Self::Mean(MeanWindow::new(size as u32)),
        }
    }

    pub fn policy(&self) -> Policy {
        match self {
            Self::Median(_) => Policy::Median,
            Self::Mean(_) => Policy::Mean,
        }
    }
}

impl<const N: usize> Window for Aggregator<N> {
    #[inline]
    fn accept(&self, period: u32) {
        match self {
            Self::Median(w) => w.accept(period),
            Self::Mean(w) => w.accept(period),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Median(w) => w.len(),
            Self::Mean(w) => w.len(),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Self::Median(w) => w.capacity(),
            Self::Mean(w) => w.capacity(),
        }
    }

    fn period(&self) -> Option<f64> {
        match self {
            Self::Median(w) => w.period(),
            Self::Mean(w) => w.period(),
        }
    }

    fn clear(&self) {
        match self {
            Self::Median(w) => w.clear(),
            Self::Mean(w) => w.clear(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fill<W: Window>(window: &W, periods: &[u32]) {
        for &p in periods {
            window.accept(p);
        }
    }

    #[test]
    fn median_odd() {
        let window = MedianWindow::<5>::new(5);
        fill(&window, &[2_400_000, 2_400_000, 2_500_000, 2_300_000]);
        assert!(!window.is_ready());
        assert_eq!(window.period(), None);
        window.accept(2_400_000);
        assert!(window.is_ready());
        assert_eq!(window.period(), Some(2_400_000.));
    }

    #[test]
    fn median_even() {
        let window = MedianWindow::<4>::new(4);
        fill(&window, &[400, 100, 300, 200]);
        assert_eq!(window.period(), Some(250.));
    }

    #[test]
    fn median_even_no_overflow() {
        let window = MedianWindow::<2>::new(2);
        fill(&window, &[u32::MAX, u32::MAX - 1]);
        assert_eq!(window.period(), Some(u32::MAX as f64 - 0.5));
    }

    #[test]
    fn median_drops_when_full() {
        let window = MedianWindow::<3>::new(3);
        fill(&window, &[100, 200, 300, 1, 1, 1]);
        assert_eq!(window.len(), 3);
        assert_eq!(window.period(), Some(200.));
    }

    #[test]
    fn median_size_limited_to_capacity() {
        let window = MedianWindow::<3>::new(10);
        assert_eq!(window.capacity(), 3);
    }

    #[test]
    fn median_clear() {
        let window = MedianWindow::<2>::new(2);
        fill(&window, &[100, 200]);
        window.clear();
        assert!(!window.is_ready());
        assert_eq!(window.len(), 0);
        fill(&window, &[500, 700]);
        assert_eq!(window.period(), Some(600.));
    }

    #[test]
    fn mean() {
        let window = MeanWindow::new(4);
        fill(&window, &[1_200_000; 3]);
        assert_eq!(window.period(), None);
        window.accept(1_200_000);
        assert_eq!(window.period(), Some(1_200_000.));
    }

    #[test]
    fn mean_wide_sum() {
        let window = MeanWindow::new(4);
        fill(&window, &[u32::MAX; 4]);
        assert_eq!(window.period(), Some(u32::MAX as f64));
    }

    #[test]
    fn mean_drops_when_full() {
        let window = MeanWindow::new(2);
        fill(&window, &[100, 300, 10_000]);
        assert_eq!(window.len(), 2);
        assert_eq!(window.period(), Some(200.));
        window.clear();
        assert_eq!(window.len(), 0);
        assert_eq!(window.period(), None);
    }

    #[test]
    fn mean_restarts_stale_sum() {
        let window = MeanWindow::new(2);
        fill(&window, &[100]);
        // An accept landing between the two stores of `clear()`.
        window.sum.store(0, Ordering::Relaxed);
        window.accept(500);
        window.count.store(0, Ordering::Release);
        assert_eq!(window.len(), 0);

        fill(&window, &[100, 300]);
        assert_eq!(window.period(), Some(200.));
    }

    #[test]
    fn aggregator_dispatch() {
        let median = Aggregator::<8>::new(Policy::Median, 3);
        let mean = Aggregator::<8>::new(Policy::Mean, 3);
        assert_eq!(median.policy(), Policy::Median);
        assert_eq!(mean.policy(), Policy::Mean);
        for w in [&median, &mean] {
            fill(w, &[100, 100, 400]);
        }
        assert_eq!(median.period(), Some(100.));
        assert_eq!(mean.period(), Some(200.));
    }

    #[test]
    fn empty_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[7]), Some(7.));
    }
}

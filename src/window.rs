use std::collections::VecDeque;

/// Number of samples kept for the live view
pub const DEFAULT_WINDOW_LEN: usize = 1000;

/// Fixed-length window of the most recent samples, oldest first
#[derive(Debug, Clone)]
pub struct DisplayWindow {
    samples: VecDeque<i32>,
}

impl Default for DisplayWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_LEN)
    }
}

impl DisplayWindow {
    /// Create a zero-filled window of `len` samples
    pub fn new(len: usize) -> Self {
        Self {
            samples: std::iter::repeat(0).take(len).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append the newest sample, evicting exactly the oldest
    pub fn push(&mut self, sample: i32) {
        if self.is_empty() {
            return;
        }
        self.samples.pop_front();
        self.samples.push_back(sample);
    }

    pub fn latest(&self) -> Option<i32> {
        self.samples.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.samples.iter().copied()
    }

    /// Last `n` samples, oldest first
    #[cfg(test)]
    pub fn tail(&self, n: usize) -> Vec<i32> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).copied().collect()
    }

    pub fn min_max(&self) -> Option<(i32, i32)> {
        Some((self.iter().min()?, self.iter().max()?))
    }

    pub fn rms(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.iter().map(|s| (s as f64) * (s as f64)).sum();
        (sum / self.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_zero_filled() {
        let window = DisplayWindow::default();
        assert_eq!(window.len(), 1000);
        assert!(window.iter().all(|s| s == 0));
    }

    #[test]
    fn test_length_invariant() {
        let mut window = DisplayWindow::new(1000);
        for i in 0..5000 {
            window.push(i);
            assert_eq!(window.len(), 1000);
        }
        assert_eq!(window.latest(), Some(4999));
        assert_eq!(window.iter().next(), Some(4000));
    }

    #[test]
    fn test_push_evicts_oldest() {
        let mut window = DisplayWindow::new(3);
        window.push(1);
        window.push(2);
        window.push(3);
        window.push(4);
        assert_eq!(window.tail(3), vec![2, 3, 4]);
    }

    #[test]
    fn test_stats() {
        let mut window = DisplayWindow::new(2);
        window.push(3);
        window.push(-4);
        assert_eq!(window.min_max(), Some((-4, 3)));
        assert!((window.rms() - 12.5f64.sqrt()).abs() < 1e-9);
    }
}

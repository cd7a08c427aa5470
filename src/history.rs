use std::collections::VecDeque;

/// Frames kept for smoothing and forecasting
pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// A bounded window of per-frame counts, oldest first
#[derive(Debug, Clone)]
pub struct CountHistory {
    counts: VecDeque<u32>,
    capacity: usize,
}

impl Default for CountHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl CountHistory {
    /// Create a new empty history holding at most `capacity` counts
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            counts: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a count, evicting and returning the oldest one when full
    pub fn push(&mut self, count: u32) -> Option<u32> {
        let evicted = if self.counts.len() == self.capacity {
            self.counts.pop_front()
        } else {
            None
        };
        self.counts.push_back(count);
        evicted
    }

    /// Truncated integer mean of the window, 0 when empty
    pub fn average(&self) -> u32 {
        if self.counts.is_empty() {
            return 0;
        }
        let sum: u64 = self.counts.iter().map(|&c| u64::from(c)).sum();
        (sum / self.counts.len() as u64) as u32
    }

    /// Get the oldest count without removing it
    pub fn peek_front(&self) -> Option<u32> {
        self.counts.front().copied()
    }

    pub fn peek_back(&self) -> Option<u32> {
        self.counts.back().copied()
    }

    /// Get the number of counts in the history
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.counts.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.counts.iter().copied()
    }

    /// The newest `n` counts, oldest first
    pub fn latest(&self, n: usize) -> Vec<u32> {
        let skip = self.counts.len().saturating_sub(n);
        self.counts.iter().skip(skip).copied().collect()
    }

    /// Copy of the whole window, oldest first
    pub fn to_vec(&self) -> Vec<u32> {
        self.counts.iter().copied().collect()
    }
}

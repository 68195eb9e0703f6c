//! Fixed-capacity FIFO of liquidity samples for one side of the book.
//!
//! Holds at most `window + 1` samples in a preallocated slot arena. The estimator
//! fires once the buffer is full and then drops the oldest sample, so a single new
//! tick refills it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingWindow {
    slots: Box<[i64]>,
    // index of the oldest sample
    head: usize,
    len: usize,
}

impl RollingWindow {
    /// `window` is the number of transitions used by the estimator; capacity is `window + 1`.
    pub fn new(window: usize) -> Self {
        Self {
            slots: vec![0; window + 1].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn window(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Append a sample. When the buffer is already full the oldest sample is evicted and returned.
    pub fn push(&mut self, sample: i64) -> Option<i64> {
        let cap = self.slots.len();
        if self.len == cap {
            let evicted = self.slots[self.head];
            self.slots[self.head] = sample;
            self.head = (self.head + 1) % cap;
            return Some(evicted);
        }
        let tail = (self.head + self.len) % cap;
        self.slots[tail] = sample;
        self.len += 1;
        None
    }

    /// Drop the oldest sample.
    pub fn trim_oldest(&mut self) -> Option<i64> {
        if self.len == 0 {
            return None;
        }
        let oldest = self.slots[self.head];
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        Some(oldest)
    }

    /// Sample at logical position `i` (0 = oldest).
    pub fn get(&self, i: usize) -> Option<i64> {
        if i >= self.len {
            return None;
        }
        Some(self.slots[(self.head + i) % self.slots.len()])
    }

    pub fn latest(&self) -> Option<i64> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.len).map(move |i| self.slots[(self.head + i) % self.slots.len()])
    }
}

//! Transactional value stack for the deterministic engine.
//!
//! A durable prefix plus a staged overlay. While a token is being processed
//! only the overlay mutates; the durable prefix is observably unchanged
//! until [`commit`](TxStack::commit). Popping past the overlay shrinks a
//! logical boundary (`gap`) into the durable prefix without copying, and
//! commit truncates the stale durable tail before appending the overlay, so
//! a token either applies in full or not at all.

/// Staged-then-committed stack of frames.
#[derive(Debug, Clone)]
pub struct TxStack<T> {
    durable: Vec<T>,
    overlay: Vec<T>,
    gap: usize,
    capacity: usize,
}

impl<T> TxStack<T> {
    /// Create a stack. `capacity` bounds the logical depth; 0 means
    /// unbounded.
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            durable: Vec::new(),
            overlay: Vec::new(),
            gap: 0,
            capacity,
        }
    }

    /// Open an overlay on top of the current durable prefix.
    pub fn begin_transaction(&mut self) {
        self.gap = self.durable.len();
        self.overlay.clear();
    }

    /// Stage a frame. Returns `false` when the push would exceed capacity;
    /// the frame is not staged in that case.
    pub fn push(&mut self, frame: T) -> bool {
        if self.capacity != 0 && self.len() >= self.capacity {
            return false;
        }
        self.overlay.push(frame);
        true
    }

    /// Remove `n` logical frames: overlay frames first, then the durable
    /// boundary shrinks without touching durable storage.
    pub fn pop(&mut self, n: usize) {
        if n <= self.overlay.len() {
            self.overlay.truncate(self.overlay.len() - n);
        } else {
            let into_durable = n - self.overlay.len();
            self.overlay.clear();
            self.gap = self.gap.saturating_sub(into_durable);
        }
    }

    /// Top frame, spanning the overlay/durable boundary.
    #[must_use]
    pub fn top(&self) -> Option<&T> {
        self.peek_from_top(0)
    }

    /// Frame `k` positions below the top (`k = 0` is the top), resolved
    /// transparently across the boundary.
    #[must_use]
    pub fn peek_from_top(&self, k: usize) -> Option<&T> {
        if k < self.overlay.len() {
            Some(&self.overlay[self.overlay.len() - 1 - k])
        } else {
            let below = k - self.overlay.len();
            self.gap.checked_sub(below + 1).map(|i| &self.durable[i])
        }
    }

    /// Atomically apply the overlay: the stale durable tail beyond the
    /// boundary is truncated, then the overlay is appended.
    pub fn commit(&mut self) {
        self.durable.truncate(self.gap);
        self.durable.append(&mut self.overlay);
        self.gap = self.durable.len();
    }

    /// Discard the overlay, leaving the durable prefix exactly as it was at
    /// [`begin_transaction`](Self::begin_transaction).
    pub fn rollback(&mut self) {
        self.overlay.clear();
        self.gap = self.durable.len();
    }

    /// Logical depth: the surviving durable prefix plus staged frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.gap + self.overlay.len()
    }

    /// Whether the logical stack holds no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything, durable frames included.
    pub fn clear(&mut self) {
        self.durable.clear();
        self.overlay.clear();
        self.gap = 0;
    }

    /// Committed frames, oldest first. Staged frames are not visible here.
    #[must_use]
    pub fn durable_frames(&self) -> &[T] {
        &self.durable
    }
}

//! Fixed-capacity moving average over the most recent sensor samples.
//!
//! One [`SmoothingBuffer`] is kept per tracked quantity. Samples are written
//! into a ring of `N` slots; once the ring is full every new sample evicts the
//! oldest one. Storage is a plain array so nothing is allocated after
//! construction.
//!
//! ## Usage
//!
//! ```rust
//! use enviro_core::smoothing::SmoothingBuffer;
//!
//! let mut temperature = SmoothingBuffer::<3>::new();
//! temperature.add(10.0);
//! temperature.add(20.0);
//! assert_eq!(temperature.average(), 15.0);
//! ```

/// Number of samples averaged per quantity on the node.
pub const DEFAULT_CAPACITY: usize = 10;

/// Lifecycle state of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillState {
    /// Fewer than `capacity` samples have been written since the last clear
    Filling,
    /// Every slot holds a real sample
    Full,
}

/// Circular accumulator reporting the mean of the last `N` samples.
///
/// The buffer is not synchronized. Share it between tasks only behind a lock
/// (see [`crate::readings::SharedReadings`]).
#[derive(Debug, Clone)]
pub struct SmoothingBuffer<const N: usize = DEFAULT_CAPACITY> {
    storage: [f32; N],
    /// Next slot to overwrite, always `< N`
    write_index: usize,
    /// Slots holding a real sample, always `<= N`
    filled: usize,
}

impl<const N: usize> SmoothingBuffer<N> {
    const NON_ZERO_CAPACITY: () = assert!(N > 0, "SmoothingBuffer capacity must be at least 1");

    /// Create an empty buffer.
    ///
    /// A zero capacity fails to compile:
    ///
    /// ```compile_fail
    /// let _ = enviro_core::smoothing::SmoothingBuffer::<0>::new();
    /// ```
    pub const fn new() -> Self {
        let () = Self::NON_ZERO_CAPACITY;

        Self {
            storage: [0.0; N],
            write_index: 0,
            filled: 0,
        }
    }

    /// Store a sample, evicting the oldest one once the buffer is full.
    ///
    /// Any value is accepted, including NaN and infinities. A non-finite
    /// sample poisons [`average`](Self::average) until it is evicted, so
    /// callers that care filter before calling this.
    pub fn add(&mut self, value: f32) {
        self.storage[self.write_index] = value;
        self.write_index = (self.write_index + 1) % N;

        if self.filled < N {
            self.filled += 1;
        }
    }

    /// Arithmetic mean of the retained samples.
    ///
    /// Returns `0.0` when nothing has been added since construction or the
    /// last [`clear`](Self::clear). That is indistinguishable from a window of
    /// zero readings; use [`count`](Self::count) or [`mean`](Self::mean) to
    /// tell them apart.
    pub fn average(&self) -> f32 {
        if self.filled == 0 {
            return 0.0;
        }

        // While filling, the written slots are exactly 0..filled. Once full
        // every slot is a sample, so the prefix covers the whole window.
        let sum: f32 = self.storage[..self.filled].iter().sum();
        sum / self.filled as f32
    }

    /// Same as [`average`](Self::average), but `None` while empty.
    pub fn mean(&self) -> Option<f32> {
        if self.filled == 0 {
            None
        } else {
            Some(self.average())
        }
    }

    /// Drop every sample, returning to the freshly constructed state.
    pub fn clear(&mut self) {
        self.storage = [0.0; N];
        self.write_index = 0;
        self.filled = 0;
    }

    /// Number of retained samples, `0..=capacity`.
    pub const fn count(&self) -> usize {
        self.filled
    }

    /// Fixed number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// True when no sample has been added since the last clear
    pub const fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// True once every slot holds a sample
    pub const fn is_full(&self) -> bool {
        self.filled == N
    }

    /// Current [`FillState`]
    pub const fn state(&self) -> FillState {
        if self.is_full() {
            FillState::Full
        } else {
            FillState::Filling
        }
    }
}

impl<const N: usize> Default for SmoothingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

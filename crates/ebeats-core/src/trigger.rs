//! Lock-free note trigger handed from a control thread to the audio thread.
//!
//! A [`TriggerCell`] packs a tri-state flag and a 16-bit trigger value into
//! one `AtomicU32`, so a fired value and its state are always observed
//! together.
//!
//! ```text
//!   control thread            audio thread
//!   ──────────────            ────────────
//!   fire(v)  ──►  Set  ──take()──►  Consumed  ──settle()──►  Clean
//! ```
//!
//! [`take`](TriggerCell::take) hands a value out exactly once, however many
//! threads race for it.

use core::sync::atomic::{AtomicU32, Ordering};

const STATE_SHIFT: u32 = 16;
const VALUE_MASK: u32 = 0xFFFF;

/// Lifecycle of a [`TriggerCell`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    /// Nothing pending.
    Clean,
    /// A value was fired and has not been taken yet.
    Set,
    /// The value was taken; the audio thread has not settled the cell.
    Consumed,
}

impl TriggerState {
    fn bits(self) -> u32 {
        match self {
            TriggerState::Clean => 0,
            TriggerState::Set => 1,
            TriggerState::Consumed => 2,
        }
    }

    fn from_bits(bits: u32) -> Self {
        match bits {
            1 => TriggerState::Set,
            2 => TriggerState::Consumed,
            _ => TriggerState::Clean,
        }
    }
}

/// Atomic one-shot trigger slot.
///
/// # Example
///
/// ```rust
/// use ebeats_core::{TriggerCell, TriggerState};
///
/// let cell = TriggerCell::new();
/// cell.fire(100);
/// assert_eq!(cell.take(), Some(100));
/// assert_eq!(cell.take(), None);
/// assert_eq!(cell.state(), TriggerState::Consumed);
///
/// cell.settle();
/// assert_eq!(cell.state(), TriggerState::Clean);
/// ```
#[derive(Debug, Default)]
pub struct TriggerCell {
    word: AtomicU32,
}

impl TriggerCell {
    /// Create an empty cell.
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(0),
        }
    }

    fn pack(state: TriggerState, value: u16) -> u32 {
        (state.bits() << STATE_SHIFT) | u32::from(value)
    }

    /// Publish `value`. A value that was not taken yet is replaced.
    pub fn fire(&self, value: u16) {
        self.word
            .store(Self::pack(TriggerState::Set, value), Ordering::Release);
    }

    /// Take the pending value, if any. Succeeds once per [`fire`](Self::fire).
    pub fn take(&self) -> Option<u16> {
        let current = self.word.load(Ordering::Acquire);
        if TriggerState::from_bits(current >> STATE_SHIFT) != TriggerState::Set {
            return None;
        }
        let value = (current & VALUE_MASK) as u16;
        self.word
            .compare_exchange(
                current,
                Self::pack(TriggerState::Consumed, value),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok()
            .map(|_| value)
    }

    /// Return a consumed cell to [`TriggerState::Clean`].
    ///
    /// Leaves a freshly fired value alone.
    pub fn settle(&self) {
        let current = self.word.load(Ordering::Acquire);
        if TriggerState::from_bits(current >> STATE_SHIFT) == TriggerState::Consumed {
            let _ = self.word.compare_exchange(
                current,
                Self::pack(TriggerState::Clean, 0),
                Ordering::AcqRel,
                Ordering::Relaxed,
            );
        }
    }

    /// Current state.
    pub fn state(&self) -> TriggerState {
        TriggerState::from_bits(self.word.load(Ordering::Acquire) >> STATE_SHIFT)
    }

    /// Value last fired, whatever the state.
    pub fn value(&self) -> u16 {
        (self.word.load(Ordering::Acquire) & VALUE_MASK) as u16
    }
}

/// Trigger cell shared between a control thread and the audio thread.
#[cfg(feature = "std")]
pub type SharedTrigger = std::sync::Arc<TriggerCell>;

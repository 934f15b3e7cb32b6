//! Musical tempo and the tick-grid buffer clock.
//!
//! Instruments render one buffer per subtick. A subtick lasts
//! `sample_rate * (60 / stpb) / (bpm * tpb)` samples, which is rarely an
//! integer; [`BufferClock`] hands out whole-sample buffer lengths whose
//! running total never drifts from the exact grid by more than half a
//! sample.

use libm::{ceil, round};

use crate::math::DEFAULT_SAMPLE_RATE;

/// Tempo of the tick grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tempo {
    /// Beats per minute.
    pub bpm: u32,
    /// Ticks per beat.
    pub tpb: u32,
    /// Subticks per tick.
    pub stpb: u32,
}

impl Default for Tempo {
    fn default() -> Self {
        Self {
            bpm: 120,
            tpb: 4,
            stpb: 1,
        }
    }
}

impl Tempo {
    /// Create a tempo. Zero fields are raised to 1.
    pub fn new(bpm: u32, tpb: u32, stpb: u32) -> Self {
        Self {
            bpm: bpm.max(1),
            tpb: tpb.max(1),
            stpb: stpb.max(1),
        }
    }

    /// Length of one subtick (one buffer) in samples, fractional.
    ///
    /// ```rust
    /// use ebeats_core::Tempo;
    ///
    /// let spb = Tempo::default().samples_per_buffer(44_100);
    /// assert!((spb - 5512.5).abs() < 1e-9);
    /// ```
    pub fn samples_per_buffer(&self, sample_rate: u32) -> f64 {
        let t = Self::new(self.bpm, self.tpb, self.stpb);
        f64::from(sample_rate.max(1)) * (60.0 / f64::from(t.stpb))
            / (f64::from(t.bpm) * f64::from(t.tpb))
    }

    /// Duration of one tick in seconds.
    pub fn tick_seconds(&self) -> f64 {
        let t = Self::new(self.bpm, self.tpb, self.stpb);
        60.0 / (f64::from(t.bpm) * f64::from(t.tpb))
    }
}

/// One buffer handed out by [`BufferClock::next_buffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferSlot {
    /// Absolute sample position of the first sample.
    pub offset: u64,
    /// Samples in this buffer.
    pub len: usize,
}

/// Hands out per-subtick buffer lengths on the tick grid.
///
/// # Example
///
/// ```rust
/// use ebeats_core::{BufferClock, Tempo};
///
/// let mut clock = BufferClock::new(44_100, Tempo::default());
/// let lens: Vec<usize> = (0..4).filter_map(|_| clock.next_buffer()).map(|s| s.len).collect();
/// // 5512.5 samples per subtick, alternating rounding
/// assert_eq!(lens.iter().sum::<usize>(), 22_050);
/// ```
#[derive(Debug, Clone)]
pub struct BufferClock {
    tempo: Tempo,
    sample_rate: u32,
    samples_per_buffer: f64,
    /// Sample position the current run of buffers is measured from.
    anchor: u64,
    /// Buffers emitted since `anchor`.
    count: u64,
    position: u64,
    subtick: u64,
    stop: Option<u64>,
}

impl Default for BufferClock {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, Tempo::default())
    }
}

impl BufferClock {
    /// Create a clock at sample 0.
    pub fn new(sample_rate: u32, tempo: Tempo) -> Self {
        let sample_rate = sample_rate.max(1);
        Self {
            tempo,
            sample_rate,
            samples_per_buffer: tempo.samples_per_buffer(sample_rate),
            anchor: 0,
            count: 0,
            position: 0,
            subtick: 0,
            stop: None,
        }
    }

    /// Current tempo.
    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    /// Change the tempo from the current position on.
    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.tempo = tempo;
        self.rebase();
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Change the sample rate from the current position on.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
        self.rebase();
    }

    fn rebase(&mut self) {
        self.samples_per_buffer = self.tempo.samples_per_buffer(self.sample_rate);
        self.anchor = self.position;
        self.count = 0;
    }

    /// Fractional subtick length in samples.
    pub fn samples_per_buffer(&self) -> f64 {
        self.samples_per_buffer
    }

    /// Longest buffer [`next_buffer`](Self::next_buffer) can return.
    pub fn max_buffer_len(&self) -> usize {
        ceil(self.samples_per_buffer) as usize
    }

    /// Duration of one tick in seconds.
    pub fn tick_seconds(&self) -> f64 {
        self.tempo.tick_seconds()
    }

    /// Absolute sample position of the next buffer.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Subticks emitted since the start (or the last seek).
    pub fn subtick(&self) -> u64 {
        self.subtick
    }

    /// End rendering at absolute sample `stop`; the buffer that crosses it
    /// is shortened.
    pub fn set_stop(&mut self, stop: Option<u64>) {
        self.stop = stop;
    }

    /// Jump to the start of `tick`.
    pub fn seek_to_tick(&mut self, tick: u64) {
        let subtick = tick * u64::from(self.tempo.stpb.max(1));
        self.position = round(subtick as f64 * self.samples_per_buffer) as u64;
        self.subtick = subtick;
        self.anchor = self.position;
        self.count = 0;
    }

    /// Next buffer on the grid, or `None` once the stop sample is reached.
    pub fn next_buffer(&mut self) -> Option<BufferSlot> {
        if self.stop.is_some_and(|stop| self.position >= stop) {
            return None;
        }
        let end = self.anchor + round((self.count + 1) as f64 * self.samples_per_buffer) as u64;
        let end = match self.stop {
            Some(stop) => end.min(stop),
            None => end,
        };
        let slot = BufferSlot {
            offset: self.position,
            len: (end - self.position) as usize,
        };
        self.position = end;
        self.count += 1;
        self.subtick += 1;
        Some(slot)
    }
}

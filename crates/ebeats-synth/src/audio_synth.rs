//! Host side of an instrument: the [`AudioSynth`] trait and the
//! grid-clocked [`SynthRenderer`].
//!
//! The renderer owns the instrument, the [`BufferClock`] and the one output
//! buffer. The buffer is sized at [`prepare`](SynthRenderer::prepare) time
//! (stream start); rendering never allocates.
//!
//! # Example
//!
//! ```rust
//! use ebeats_core::Tempo;
//! use ebeats_synth::{EBeats, SynthRenderer};
//!
//! let mut renderer = SynthRenderer::new(EBeats::new(), 44_100, Tempo::default());
//! renderer.prepare();
//! renderer.synth_mut().trigger(100);
//!
//! let first = renderer.render().unwrap();
//! assert!(!first.gap);
//! assert_eq!(first.offset, 0);
//! ```

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use ebeats_core::{BufferClock, Tempo};

/// A sound source rendered one buffer at a time.
pub trait AudioSynth {
    /// Adopt a new sample rate. Called on format negotiation.
    fn setup(&mut self, sample_rate: u32);

    /// Flush note state on stream stop or seek.
    fn reset(&mut self);

    /// Fill `out` and return `true`, or return `false` without touching
    /// `out` when the instrument is silent.
    fn process(&mut self, out: &mut [i16]) -> bool;

    /// Size internal scratch space for buffers of up to `len` samples.
    ///
    /// Called outside the audio path. Longer buffers still render correctly,
    /// in pieces.
    fn set_max_buffer_len(&mut self, len: usize);

    /// Largest buffer rendered in one piece.
    fn max_buffer_len(&self) -> usize;
}

/// One rendered buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedBuffer<'a> {
    /// Output samples, zero-filled for a gap.
    pub samples: &'a [i16],
    /// The instrument produced nothing for this buffer.
    pub gap: bool,
    /// Absolute sample position of the first sample.
    pub offset: u64,
}

/// Drives an [`AudioSynth`] on the tick grid.
#[derive(Debug)]
pub struct SynthRenderer<S: AudioSynth> {
    synth: S,
    clock: BufferClock,
    buffer: Vec<i16>,
}

impl<S: AudioSynth> SynthRenderer<S> {
    /// Create a renderer. Call [`prepare`](Self::prepare) before rendering.
    pub fn new(synth: S, sample_rate: u32, tempo: Tempo) -> Self {
        Self {
            synth,
            clock: BufferClock::new(sample_rate, tempo),
            buffer: Vec::new(),
        }
    }

    /// Stream start: push the sample rate to the instrument and size the
    /// output and scratch buffers for the current tempo.
    pub fn prepare(&mut self) {
        self.synth.setup(self.clock.sample_rate());
        self.resize();
    }

    fn resize(&mut self) {
        let len = self.clock.max_buffer_len();
        if self.buffer.len() < len {
            self.buffer = vec![0; len];
        }
        self.synth.set_max_buffer_len(len);
    }

    /// Change the tempo. Buffers grow when subticks get longer.
    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.clock.set_tempo(tempo);
        self.resize();
    }

    /// Change the sample rate and re-prepare.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.clock.set_sample_rate(sample_rate);
        self.prepare();
    }

    /// Render the next buffer, or `None` once the clock's stop is reached.
    pub fn render(&mut self) -> Option<RenderedBuffer<'_>> {
        let slot = self.clock.next_buffer()?;
        if self.buffer.len() < slot.len {
            // Not prepared; size once rather than fail.
            self.resize();
        }
        let out = &mut self.buffer[..slot.len];
        let produced = self.synth.process(out);
        if !produced {
            out.fill(0);
        }
        Some(RenderedBuffer {
            samples: out,
            gap: !produced,
            offset: slot.offset,
        })
    }

    /// Stream discontinuity (seek or flush): reset the instrument.
    pub fn discont(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(position = self.clock.position(), "discont, resetting synth");

        self.synth.reset();
    }

    /// Jump to `tick` and reset the instrument.
    pub fn seek_to_tick(&mut self, tick: u64) {
        self.clock.seek_to_tick(tick);
        self.discont();
    }

    /// Stop at absolute sample `stop`.
    pub fn set_stop(&mut self, stop: Option<u64>) {
        self.clock.set_stop(stop);
    }

    /// The instrument.
    pub fn synth(&self) -> &S {
        &self.synth
    }

    /// The instrument, mutably, for parameter writes between buffers.
    pub fn synth_mut(&mut self) -> &mut S {
        &mut self.synth
    }

    /// The buffer clock.
    pub fn clock(&self) -> &BufferClock {
        &self.clock
    }

    /// Give the instrument back.
    pub fn into_inner(self) -> S {
        self.synth
    }
}

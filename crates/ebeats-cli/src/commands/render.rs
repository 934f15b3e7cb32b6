//! Render command: one hit or a tick-grid pattern to a mono WAV file.

use anyhow::{Context, Result, bail};
use clap::Args;
use ebeats_core::{Tempo, TriggerCell, is_silent, peak};
use ebeats_synth::SynthRenderer;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::PathBuf;

use super::common::{load_patch, parse_pattern};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Patch file to load
    #[arg(long, value_name = "FILE")]
    patch: Option<PathBuf>,

    /// Trigger value (1-255, 128 is unity)
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(1..=255))]
    volume: u32,

    /// Length in seconds [default: 1 s for a hit, the whole pattern otherwise]
    #[arg(long)]
    duration: Option<f64>,

    /// Sample rate [default: the patch's]
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Beats per minute [default: the patch's]
    #[arg(long)]
    bpm: Option<u32>,

    /// Ticks per beat [default: the patch's]
    #[arg(long)]
    tpb: Option<u32>,

    /// Hits on the tick grid, e.g. "x...x.x." ('x' hit, '.' rest)
    #[arg(long)]
    pattern: Option<String>,

    /// Pattern repetitions
    #[arg(long, default_value = "1")]
    loops: u32,

    /// Parameter override, e.g. --set t-decay=0.2 --set n-wave=pink-noise
    #[arg(long = "set", value_name = "NAME=VALUE")]
    sets: Vec<String>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let patch = load_patch(args.patch.as_deref(), &args.sets)?;
    let sample_rate = args.sample_rate.unwrap_or(patch.sample_rate);
    if sample_rate == 0 {
        bail!("sample rate must be positive");
    }
    let patch_tempo: Tempo = patch.tempo.into();
    let tempo = Tempo::new(
        args.bpm.unwrap_or(patch_tempo.bpm),
        args.tpb.unwrap_or(patch_tempo.tpb),
        patch_tempo.stpb,
    );

    let drum = patch.with_sample_rate(sample_rate).build()?;

    let steps = match &args.pattern {
        Some(p) => parse_pattern(p)?,
        None => vec![true],
    };
    let ticks = steps.len() as u64 * u64::from(args.loops.max(1));
    let duration = match (args.duration, &args.pattern) {
        (Some(secs), _) => secs,
        (None, Some(_)) => ticks as f64 * tempo.tick_seconds(),
        (None, None) => 1.0,
    };
    if !(duration.is_finite() && duration > 0.0) {
        bail!("duration must be a positive number of seconds");
    }
    let total = (duration * f64::from(sample_rate)).round() as u64;

    tracing::info!(
        output = %args.output.display(),
        sample_rate,
        bpm = tempo.bpm,
        tpb = tempo.tpb,
        steps = steps.len(),
        duration,
        "rendering"
    );

    let samples = render_grid(drum, sample_rate, tempo, &steps, ticks, args.volume, total);

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&args.output, spec)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for &s in &samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;

    println!(
        "Wrote {} ({} samples, {:.3} s, peak {})",
        args.output.display(),
        samples.len(),
        samples.len() as f64 / f64::from(sample_rate),
        peak(&samples)
    );
    Ok(())
}

/// Render `total` samples, firing `volume` on the first subtick of each of
/// the first `ticks` ticks whose step is a hit. Steps repeat every
/// `steps.len()` ticks.
fn render_grid(
    drum: ebeats_synth::EBeats,
    sample_rate: u32,
    tempo: Tempo,
    steps: &[bool],
    ticks: u64,
    volume: u32,
    total: u64,
) -> Vec<i16> {
    let trigger = TriggerCell::new();
    let stpb = u64::from(tempo.stpb);
    let mut renderer = SynthRenderer::new(drum, sample_rate, tempo);
    renderer.prepare();
    renderer.set_stop(Some(total));

    let mut out = Vec::with_capacity(total as usize);
    let mut gaps = 0usize;
    loop {
        let subtick = renderer.clock().subtick();
        let tick = subtick / stpb;
        if subtick % stpb == 0 && tick < ticks && steps[(tick % steps.len() as u64) as usize] {
            trigger.fire(volume.min(u32::from(u16::MAX)) as u16);
        }
        renderer.synth_mut().process_pending(&trigger);
        let Some(buf) = renderer.render() else {
            break;
        };
        if buf.gap || is_silent(buf.samples) {
            gaps += 1;
        }
        out.extend_from_slice(buf.samples);
        trigger.settle();
    }
    tracing::debug!(buffers = renderer.clock().subtick(), gaps, "render done");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebeats_synth::EBeats;

    #[test]
    fn test_render_grid_length_and_hits() {
        let tempo = Tempo::new(120, 4, 1);
        let mut drum = EBeats::new();
        drum.set_t_decay(0.05);
        drum.set_n_decay(0.05);
        let out = render_grid(drum, 44_100, tempo, &[true, false], 4, 100, 22_050);
        assert_eq!(out.len(), 22_050);
        // Ticks last 5512.5 samples; hits land on ticks 0 and 2.
        assert!(!is_silent(&out[..2000]));
        assert!(is_silent(&out[5513..11_025]));
        assert!(!is_silent(&out[11_025..13_000]));
    }

    #[test]
    fn test_single_hit_rings_once() {
        let mut drum = EBeats::new();
        drum.set_t_decay(0.1);
        drum.set_n_decay(0.1);
        let out = render_grid(drum, 44_100, Tempo::default(), &[true], 1, 100, 44_100);
        assert!(!is_silent(&out[..4000]));
        assert!(is_silent(&out[5513..]), "no hit past the first tick");
    }

    #[test]
    fn test_loops_repeat_the_steps() {
        let out = render_grid(EBeats::new(), 44_100, Tempo::default(), &[true], 3, 100, 44_100);
        assert!(!is_silent(&out[11_025..12_000]), "third tick hits");
    }
}

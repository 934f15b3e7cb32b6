//! Integration tests for ebeats-cli.
//!
//! Tests run the `ebeats` binary end to end: rendering hits and patterns to
//! WAV files, listing parameters, and creating and checking patch files.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Helper to get the path to the `ebeats` binary built by cargo.
fn ebeats_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ebeats"))
}

fn read_wav(path: &Path) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).expect("output should be a WAV file");
    let spec = reader.spec();
    let samples = reader
        .samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .expect("16-bit samples");
    (spec, samples)
}

// ---------------------------------------------------------------------------
// ebeats render
// ---------------------------------------------------------------------------

#[test]
fn cli_render_single_hit() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("hit.wav");

    let status = ebeats_bin()
        .args(["render", out.to_str().unwrap(), "--duration", "0.5"])
        .args(["--set", "t-decay=0.1", "--set", "n-wave=pink-noise"])
        .status()
        .expect("failed to run ebeats render");
    assert!(status.success());

    let (spec, samples) = read_wav(&out);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_rate, 44_100);
    assert_eq!(samples.len(), 22_050);
    assert!(samples[..2000].iter().any(|&s| s != 0), "the hit is audible");
}

#[test]
fn cli_render_pattern_length_follows_the_grid() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("beat.wav");

    let status = ebeats_bin()
        .args(["render", out.to_str().unwrap()])
        .args(["--pattern", "x..x|..x.", "--bpm", "120", "--tpb", "4"])
        .args(["--sample-rate", "48000", "--loops", "2"])
        .status()
        .expect("failed to run ebeats render");
    assert!(status.success());

    // 16 ticks of 6000 samples each.
    let (spec, samples) = read_wav(&out);
    assert_eq!(spec.sample_rate, 48_000);
    assert_eq!(samples.len(), 96_000);
}

#[test]
fn cli_render_rejects_unknown_parameter() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("bad.wav");

    let output = ebeats_bin()
        .args(["render", out.to_str().unwrap(), "--set", "cufoff-curve=0.2"])
        .output()
        .expect("failed to run ebeats render");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cufoff-curve"), "got: {stderr}");
    assert!(!out.exists());
}

#[test]
fn cli_render_rejects_bad_pattern() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("bad.wav");
    let status = ebeats_bin()
        .args(["render", out.to_str().unwrap(), "--pattern", "x.o."])
        .status()
        .expect("failed to run ebeats render");
    assert!(!status.success());
}

// ---------------------------------------------------------------------------
// ebeats params
// ---------------------------------------------------------------------------

#[test]
fn cli_params_lists_every_parameter() {
    let output = ebeats_bin()
        .arg("params")
        .output()
        .expect("failed to run ebeats params");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for desc in &ebeats_synth::PARAMS {
        assert!(stdout.contains(desc.name), "listing should contain '{}'", desc.name);
    }
}

#[test]
fn cli_params_details_show_choices() {
    let output = ebeats_bin()
        .args(["params", "n-wave"])
        .output()
        .expect("failed to run ebeats params");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("violet-noise"), "got: {stdout}");
}

// ---------------------------------------------------------------------------
// ebeats init / check
// ---------------------------------------------------------------------------

#[test]
fn cli_init_then_check() {
    let dir = TempDir::new().unwrap();
    let patch = dir.path().join("kits").join("kick.toml");

    let status = ebeats_bin()
        .args(["init", patch.to_str().unwrap()])
        .status()
        .expect("failed to run ebeats init");
    assert!(status.success());
    let text = std::fs::read_to_string(&patch).unwrap();
    assert!(text.contains("name = \"kick\""), "got:\n{text}");

    let output = ebeats_bin()
        .args(["check", patch.to_str().unwrap()])
        .output()
        .expect("failed to run ebeats check");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("ok"));

    let again = ebeats_bin()
        .args(["init", patch.to_str().unwrap()])
        .status()
        .expect("failed to run ebeats init");
    assert!(!again.success(), "init refuses to overwrite without --force");
}

#[test]
fn cli_check_reports_each_problem() {
    let dir = TempDir::new().unwrap();
    let patch = dir.path().join("broken.toml");
    std::fs::write(
        &patch,
        "name = \"Broken\"\n[params]\nt-decay = 9.0\nfilter = \"comb\"\n",
    )
    .unwrap();

    let output = ebeats_bin()
        .args(["check", patch.to_str().unwrap()])
        .output()
        .expect("failed to run ebeats check");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("t-decay"), "got: {stderr}");
    assert!(stderr.contains("'comb'"), "got: {stderr}");
}

#[test]
fn cli_render_with_patch_file() {
    let dir = TempDir::new().unwrap();
    let patch = dir.path().join("clap.toml");
    std::fs::write(
        &patch,
        "name = \"Clap\"\nsample_rate = 22050\n[params]\nt-volume = 0.0\nt-decay = 0.08\nn-decay = 0.08\nfilter = \"bandpass\"\n",
    )
    .unwrap();
    let out = dir.path().join("clap.wav");

    let status = ebeats_bin()
        .args(["render", out.to_str().unwrap(), "--patch", patch.to_str().unwrap()])
        .status()
        .expect("failed to run ebeats render");
    assert!(status.success());

    let (spec, samples) = read_wav(&out);
    assert_eq!(spec.sample_rate, 22_050, "the patch's sample rate is used");
    assert_eq!(samples.len(), 22_050);
    assert!(samples[..1000].iter().any(|&s| s != 0));
    assert!(samples[5000..].iter().all(|&s| s == 0), "0.08 s burst");
}

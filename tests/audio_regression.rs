use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use la32_dsp::patch::{PatchCache, PatchTemp, TvaParam, TvfParam};
use la32_dsp::rom::{PcmRom, PcmWave};
use la32_dsp::synth::{HeldNote, PartialPool, Part, Poly, StaticPart};
use la32_dsp::SynthConfig;

const FRAMES: usize = 1000;

/// Set to 1 to rewrite every golden file from the current output.
const BLESS_VAR: &str = "LA32_BLESS";
/// Table setup goes through the platform libm, which may round a last
/// place differently.
const GOLDEN_TOLERANCE: i32 = 2;

fn rom() -> Arc<PcmRom> {
    // One cycle of a bright, asymmetric wave: easy to spot interpolation or
    // pitch regressions in a diff.
    let samples: Vec<i16> = (0..128)
        .map(|i| {
            let phase = i as f32 / 128.0 * std::f32::consts::TAU;
            ((phase.sin() + 0.3 * (3.0 * phase).sin()) * 20000.0) as i16
        })
        .collect();
    Arc::new(
        PcmRom::new(
            &samples,
            vec![PcmWave {
                addr: 0,
                len: 128,
                looped: true,
            }],
        )
        .expect("regression rom"),
    )
}

fn render_note(patch: PatchCache, key: u8, velocity: u8) -> Vec<i16> {
    let mut pool = PartialPool::new(&SynthConfig::default(), rom()).expect("pool");
    let part: Arc<dyn Part> = Arc::new(StaticPart::new(PatchTemp {
        panpot: 7,
        output_level: 80,
    }));
    let poly: Arc<dyn Poly> = Arc::new(HeldNote::new(key, velocity));

    pool.activate(0, 0);
    assert!(pool.start_partial(0, part, Some(poly), Some(Arc::new(patch)), None, None));

    let mut out = vec![0i16; FRAMES * 2];
    // Two uneven blocks so block boundaries are part of what is pinned down.
    let (first, second) = out.split_at_mut(2 * 384);
    pool.render(first);
    pool.render(second);
    out
}

fn pcm_patch() -> PatchCache {
    let mut patch = PatchCache {
        pcm_partial: true,
        pcm: 0,
        ..PatchCache::default()
    };
    patch.partial_param.tva = TvaParam {
        env_time: [20, 30, 30, 30, 40],
        env_level: [100, 90, 80, 70],
        ..TvaParam::default()
    };
    patch
}

fn synth_patch() -> PatchCache {
    let mut patch = PatchCache {
        waveform: 1,
        ..PatchCache::default()
    };
    patch.partial_param.wg.pulse_width = 70;
    patch.partial_param.tvf = TvfParam {
        cutoff: 60,
        resonance: 20,
        env_depth: 60,
        env_time: [10, 20, 20, 20, 20],
        env_level: [100, 70, 50, 40],
        ..TvfParam::default()
    };
    patch.partial_param.tva = TvaParam {
        env_time: [10, 20, 20, 20, 20],
        ..TvaParam::default()
    };
    patch
}

fn golden_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("golden")
        .join(format!("{name}.golden"))
}

fn parse_golden(name: &str, text: &str) -> Vec<i16> {
    text.lines()
        .map(|line| {
            line.trim()
                .parse::<i16>()
                .unwrap_or_else(|e| panic!("{name}: bad golden sample {line:?}: {e}"))
        })
        .collect()
}

/// Index and values of the first sample further than `tolerance` from the
/// golden output.
fn first_mismatch(expected: &[i16], actual: &[i16], tolerance: i32) -> Option<(usize, i16, i16)> {
    expected
        .iter()
        .zip(actual)
        .enumerate()
        .find(|(_, (&want, &got))| (want as i32 - got as i32).abs() > tolerance)
        .map(|(i, (&want, &got))| (i, want, got))
}

/// Compare against the committed output. Only `LA32_BLESS=1` rewrites it.
fn check_golden(name: &str, samples: &[i16]) {
    let path = golden_path(name);

    if std::env::var_os(BLESS_VAR).is_some_and(|v| v == "1") {
        let text: String = samples.iter().map(|s| format!("{s}\n")).collect();
        fs::create_dir_all(path.parent().expect("golden dir")).expect("create golden dir");
        fs::write(&path, text).expect("write golden file");
        return;
    }

    let text = fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!(
            "{name}: cannot read {}: {e}; run with {BLESS_VAR}=1 to record it",
            path.display()
        )
    });
    let expected = parse_golden(name, &text);
    assert_eq!(expected.len(), samples.len(), "{name}: length changed");

    if let Some((i, want, got)) = first_mismatch(&expected, samples, GOLDEN_TOLERANCE) {
        panic!(
            "{name}: first mismatch at sample {i} (frame {}), expected {want}, got {got}; \
             rerun with {BLESS_VAR}=1 if the change is intended",
            i / 2
        );
    }
}

#[test]
fn pcm_note_matches_golden() {
    let samples = render_note(pcm_patch(), 60, 100);
    assert!(samples.iter().any(|&s| s != 0), "note should be audible");
    check_golden("pcm_note", &samples);
}

#[test]
fn synth_note_matches_golden() {
    let samples = render_note(synth_patch(), 48, 90);
    assert!(samples.iter().any(|&s| s != 0), "note should be audible");
    check_golden("synth_note", &samples);
}

#[test]
fn rendering_is_deterministic() {
    assert_eq!(render_note(pcm_patch(), 67, 80), render_note(pcm_patch(), 67, 80));
    assert_eq!(render_note(synth_patch(), 55, 80), render_note(synth_patch(), 55, 80));
}

#[test]
fn centred_pan_gives_identical_channels() {
    let samples = render_note(pcm_patch(), 60, 100);
    assert!(samples.chunks(2).all(|frame| frame[0] == frame[1]));
}

#[test]
fn missing_golden_file_fails() {
    if std::env::var_os(BLESS_VAR).is_some() {
        return;
    }
    let result = std::panic::catch_unwind(|| check_golden("not_recorded", &[0, 0]));
    assert!(result.is_err());
    assert!(!golden_path("not_recorded").exists(), "nothing is written without blessing");
}

#[test]
fn golden_comparison_reports_drift_past_tolerance() {
    let golden = [0, 100, -100, 32767];
    assert_eq!(first_mismatch(&golden, &[1, 98, -101, 32766], GOLDEN_TOLERANCE), None);
    assert_eq!(first_mismatch(&golden, &[0, 100, -97, 0], GOLDEN_TOLERANCE), Some((2, -100, -97)));
}

#[test]
fn committed_goldens_cover_both_blocks() {
    for name in ["pcm_note", "synth_note"] {
        let text = fs::read_to_string(golden_path(name)).expect("golden file is committed");
        let samples = parse_golden(name, &text);
        assert_eq!(samples.len(), FRAMES * 2);
        assert!(samples[2 * 384..].iter().any(|&s| s != 0), "{name}: second block is silent");
    }
}

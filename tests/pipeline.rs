use std::fs;
use std::path::Path;

use kira_growthphase::ctx::Ctx;
use kira_growthphase::meta::MetaPhenotype;
use kira_growthphase::phases::CurvePhase;
use kira_growthphase::pipeline::Pipeline;
use serde_json::json;
use tempfile::TempDir;

fn flat_then_impulse() -> (Vec<f64>, Vec<f64>) {
    let times: Vec<f64> = (0..15).map(|i| i as f64).collect();
    let curve = (0..15)
        .map(|i| 2f64.powf(if i < 5 { 10.0 } else { i as f64 + 6.0 }))
        .collect();
    (times, curve)
}

fn write_plate(dir: &Path) -> std::path::PathBuf {
    let (times, curve) = flat_then_impulse();
    let raw: Vec<f64> = (0..15).map(|i| if i < 5 { 0.0 } else { 1.0 }).collect();
    let flat: Vec<f64> = times.iter().map(|t| 2f64.powf(10.0 + 0.001 * t)).collect();
    let plate = json!({
        "plate": "plate_1",
        "times": times,
        "rows": 1,
        "cols": 2,
        "positions": [
            {"curve": curve, "derivative": raw, "baseline": 1024.0, "end_average": 1048576.0},
            {"curve": flat}
        ]
    });
    let path = dir.join("plate.json");
    fs::write(&path, serde_json::to_string(&plate).unwrap()).unwrap();
    path
}

#[test]
fn full_pipeline_populates_context() {
    let tmp = TempDir::new().unwrap();
    let input = write_plate(tmp.path());
    let out = tmp.path().join("out");
    let mut ctx = Ctx::new(input, out.clone(), None, true, true, "0.0.0-test");
    ctx.threads = 2;

    Pipeline::full().run(&mut ctx).unwrap();

    assert_eq!(ctx.phases.len(), 2);
    assert!(ctx.phases[1].iter().all(|&p| p == CurvePhase::Flat));
    let sequences = ctx.sequences.as_ref().unwrap();
    let impulse = sequences.cells()[0]
        .iter()
        .find(|s| s.phase == CurvePhase::Impulse)
        .unwrap();
    assert_eq!((impulse.left, impulse.right), (4, 15));

    let growth = ctx.growth.as_ref().unwrap();
    assert!((growth.cells()[0].experiment_doublings - 10.0).abs() < 1e-12);
    assert!(ctx.warnings.iter().any(|w| w.contains("(0, 1): baseline missing")));

    assert_eq!(ctx.meta.len(), MetaPhenotype::ALL.len());
    let (_, modalities) = ctx
        .meta
        .iter()
        .find(|(k, _)| *k == MetaPhenotype::Modalities)
        .unwrap();
    assert_eq!(modalities.cells(), &[1.0, 0.0]);

    assert!(out.join("growthphase.json").exists());
    assert!(out.join("phases.tsv").exists());
    assert!(out.join("meta.tsv").exists());
}

#[test]
fn gzip_input_is_accepted() {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let tmp = TempDir::new().unwrap();
    let plain = write_plate(tmp.path());
    let gz_path = tmp.path().join("plate.json.gz");
    let mut encoder = GzEncoder::new(fs::File::create(&gz_path).unwrap(), Compression::default());
    encoder.write_all(&fs::read(plain).unwrap()).unwrap();
    encoder.finish().unwrap();

    let mut ctx = Ctx::new(gz_path, tmp.path().join("out"), None, false, false, "0.0.0-test");
    Pipeline::full().run(&mut ctx).unwrap();
    assert_eq!(ctx.input_meta.plate.as_deref(), Some("plate_1"));
    assert!(!tmp.path().join("out").join("growthphase.json").exists());
}

#[test]
fn shape_mismatch_fails_input_stage() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    let plate = json!({"times": [0.0, 1.0], "rows": 2, "cols": 2, "positions": [{"curve": [1.0, 2.0]}]});
    fs::write(&path, plate.to_string()).unwrap();
    let mut ctx = Ctx::new(path, tmp.path().join("out"), None, true, true, "0.0.0-test");
    let err = Pipeline::full().run(&mut ctx).unwrap_err();
    assert!(err.to_string().contains("does not match 1 positions"));
}

#[test]
fn curve_length_mismatch_is_reported() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    let plate = json!({"times": [0.0, 1.0, 2.0], "rows": 1, "cols": 1, "positions": [{"curve": [1.0, 2.0]}]});
    fs::write(&path, plate.to_string()).unwrap();
    let mut ctx = Ctx::new(path, tmp.path().join("out"), None, true, true, "0.0.0-test");
    let err = Pipeline::full().run(&mut ctx).unwrap_err();
    assert!(err.to_string().contains("curve has 2 samples"));
}

use std::path::PathBuf;

use kira_growthphase::ctx::Ctx;
use kira_growthphase::io::summary::format_summary;
use kira_growthphase::meta::MetaPhenotype;
use kira_growthphase::phases::CurvePhase;
use kira_growthphase::phenotypes::PhaseSegment;
use kira_growthphase::plate::Plate;

#[test]
fn summary_format() {
    let mut ctx = Ctx::new(
        PathBuf::from("input.json"),
        PathBuf::from("out"),
        None,
        false,
        false,
        "0.0.0-test",
    );
    ctx.input_meta.plate = Some("p7".to_string());
    ctx.input_meta.rows = Some(1);
    ctx.input_meta.cols = Some(2);
    ctx.input_meta.samples = Some(3);
    let flat = PhaseSegment {
        phase: CurvePhase::Flat,
        left: 0,
        right: 3,
        phenotypes: None,
    };
    ctx.sequences = Some(Plate::new(1, 2, vec![vec![flat], Vec::new()]).unwrap());
    ctx.phases = vec![vec![CurvePhase::Flat; 3], vec![CurvePhase::Undetermined; 3]];
    ctx.meta = vec![
        (MetaPhenotype::Modalities, Plate::new(1, 2, vec![0.0, f64::NAN]).unwrap()),
        (
            MetaPhenotype::MajorImpulseYieldContribution,
            Plate::new(1, 2, vec![f64::NAN, f64::NAN]).unwrap(),
        ),
    ];

    let summary = format_summary(&ctx).unwrap();
    assert!(summary.contains("kira-growthphase v"));
    assert!(summary.contains("Input: plate p7, 1x2 positions, 3 samples"));
    assert!(summary.contains("Segments: Flat=1"));
    assert!(summary.contains("Fully undetermined positions: 1"));
    assert!(summary.contains("Modalities: mean 0.000 over 1/2 positions"));
    assert!(summary.contains("MajorImpulseYieldContribution: undefined"));
}

use std::path::PathBuf;

use kira_growthphase::ctx::Ctx;
use kira_growthphase::io::json_writer::build_report;
use kira_growthphase::meta::{GrowthSummary, MetaPhenotype};
use kira_growthphase::phases::CurvePhase;
use kira_growthphase::phenotypes::{CurvePhasePhenotype, PhaseSegment, PhenotypeRecord};
use kira_growthphase::plate::Plate;

fn populated_ctx() -> Ctx {
    let mut ctx = Ctx::new(
        PathBuf::from("input.json"),
        PathBuf::from("out"),
        None,
        true,
        true,
        "0.0.0-test",
    );
    ctx.input_meta.plate = Some("p1".to_string());
    ctx.input_meta.rows = Some(1);
    ctx.input_meta.cols = Some(1);
    ctx.input_meta.samples = Some(4);
    ctx.report.input_meta.plate = Some("p1".to_string());

    let mut record = PhenotypeRecord::default();
    record.insert(CurvePhasePhenotype::Start, 0.0);
    record.insert(CurvePhasePhenotype::LinearModelSlope, 0.0);
    record.insert(CurvePhasePhenotype::PopulationDoublingTime, f64::NAN);
    let segments = vec![
        PhaseSegment {
            phase: CurvePhase::Flat,
            left: 0,
            right: 3,
            phenotypes: Some(record),
        },
        PhaseSegment {
            phase: CurvePhase::Undetermined,
            left: 3,
            right: 4,
            phenotypes: None,
        },
    ];
    ctx.phases = vec![vec![
        CurvePhase::Flat,
        CurvePhase::Flat,
        CurvePhase::Flat,
        CurvePhase::Undetermined,
    ]];
    ctx.sequences = Some(Plate::new(1, 1, vec![segments]).unwrap());
    ctx.growth = Some(Plate::new(1, 1, vec![GrowthSummary::default()]).unwrap());
    ctx.meta = vec![
        (MetaPhenotype::Modalities, Plate::new(1, 1, vec![0.0]).unwrap()),
        (
            MetaPhenotype::MajorImpulseYieldContribution,
            Plate::new(1, 1, vec![f64::NAN]).unwrap(),
        ),
    ];
    ctx.warnings.push("position (0, 0): baseline missing, using first sample".to_string());
    ctx
}

#[test]
fn json_report_populated() {
    let ctx = populated_ctx();
    let report = build_report(&ctx).unwrap();
    let json = serde_json::to_value(report).unwrap();

    assert_eq!(json["tool"], "kira-growthphase");
    assert_eq!(json["schema_version"], "v1");
    assert_eq!(json["input_meta"]["plate"], "p1");
    assert_eq!(json["thresholds"]["phase_minimum_length"], 3);

    let position = &json["positions"][0];
    assert!(position["total_doublings"].is_null());
    assert_eq!(position["phases"][3], "Undetermined");
    assert_eq!(position["segments"][0]["phase"], "Flat");
    assert_eq!(position["segments"][0]["phenotypes"]["LinearModelSlope"], 0.0);
    assert!(position["segments"][0]["phenotypes"]["PopulationDoublingTime"].is_null());
    assert!(position["segments"][1]["phenotypes"].is_null());

    assert_eq!(json["meta"][0]["kind"], "Modalities");
    assert_eq!(json["meta"][0]["values"][0][0], 0.0);
    assert!(json["meta"][1]["values"][0][0].is_null());
    assert_eq!(json["warnings"].as_array().unwrap().len(), 1);
}

#[test]
fn report_requires_sequences() {
    let mut ctx = populated_ctx();
    ctx.sequences = None;
    assert!(build_report(&ctx).is_err());
}

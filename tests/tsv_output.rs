use std::fs;
use std::path::PathBuf;

use kira_growthphase::ctx::Ctx;
use kira_growthphase::io::tsv_writer::{write_meta_tsv, write_phases_tsv};
use kira_growthphase::meta::MetaPhenotype;
use kira_growthphase::phases::CurvePhase;
use kira_growthphase::phenotypes::{CurvePhasePhenotype, PhaseSegment, PhenotypeRecord};
use kira_growthphase::plate::Plate;
use tempfile::TempDir;

fn ctx_with_plate(out: PathBuf) -> Ctx {
    let mut ctx = Ctx::new(PathBuf::from("input.json"), out, None, false, true, "0.0.0-test");
    let mut record = PhenotypeRecord::default();
    record.insert(CurvePhasePhenotype::Start, 1.5);
    record.insert(CurvePhasePhenotype::LinearModelSlope, 0.25);
    let impulse = PhaseSegment {
        phase: CurvePhase::Impulse,
        left: 2,
        right: 9,
        phenotypes: Some(record),
    };
    ctx.sequences = Some(Plate::new(1, 2, vec![vec![impulse], Vec::new()]).unwrap());
    ctx.meta = vec![(MetaPhenotype::Modalities, Plate::new(1, 2, vec![1.0, f64::NAN]).unwrap())];
    ctx
}

#[test]
fn phases_tsv_format() {
    let tmp = TempDir::new().unwrap();
    let ctx = ctx_with_plate(tmp.path().to_path_buf());
    let path = tmp.path().join("phases.tsv");
    write_phases_tsv(&path, &ctx).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("row\tcol\tphase\tleft\tright\tStart\tDuration"));
    let fields: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(&fields[..5], &["0", "0", "Impulse", "2", "9"]);
    assert_eq!(fields[5], "1.500000");
    assert_eq!(fields[6], "NA");
    assert_eq!(fields[9], "0.250000");
}

#[test]
fn meta_tsv_format() {
    let tmp = TempDir::new().unwrap();
    let ctx = ctx_with_plate(tmp.path().to_path_buf());
    let path = tmp.path().join("meta.tsv");
    write_meta_tsv(&path, &ctx).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "row\tcol\tModalities\n0\t0\t1.000000\n0\t1\tNA\n");
}

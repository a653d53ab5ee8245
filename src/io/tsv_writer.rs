use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::ctx::Ctx;
use crate::phenotypes::CurvePhasePhenotype;

const PHENOTYPE_COLUMNS: [CurvePhasePhenotype; 8] = [
    CurvePhasePhenotype::Start,
    CurvePhasePhenotype::Duration,
    CurvePhasePhenotype::FractionYield,
    CurvePhasePhenotype::PopulationDoublingTime,
    CurvePhasePhenotype::LinearModelSlope,
    CurvePhasePhenotype::LinearModelIntercept,
    CurvePhasePhenotype::AsymptoteAngle,
    CurvePhasePhenotype::AsymptoteIntersection,
];

/// One row per phase segment.
pub fn write_phases_tsv(path: &Path, ctx: &Ctx) -> Result<()> {
    let sequences = ctx.sequences.as_ref().context("phase sequences missing")?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    let header: Vec<&str> = PHENOTYPE_COLUMNS.iter().map(|k| k.name()).collect();
    writeln!(w, "row\tcol\tphase\tleft\tright\t{}", header.join("\t"))?;
    for (row, col, sequence) in sequences.positions() {
        for segment in sequence {
            let values: Vec<String> = PHENOTYPE_COLUMNS
                .iter()
                .map(|&k| format_value(segment.value(k)))
                .collect();
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                row,
                col,
                segment.phase,
                segment.left,
                segment.right,
                values.join("\t")
            )?;
        }
    }
    w.flush()?;
    Ok(())
}

/// One row per position, one column per extracted meta-phenotype.
pub fn write_meta_tsv(path: &Path, ctx: &Ctx) -> Result<()> {
    let sequences = ctx.sequences.as_ref().context("phase sequences missing")?;
    for (kind, values) in &ctx.meta {
        ensure_len(values.len(), sequences.len(), kind.name())?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    let header: Vec<&str> = ctx.meta.iter().map(|(k, _)| k.name()).collect();
    if header.is_empty() {
        writeln!(w, "row\tcol")?;
    } else {
        writeln!(w, "row\tcol\t{}", header.join("\t"))?;
    }
    for (idx, (row, col, _)) in sequences.positions().enumerate() {
        let mut line = format!("{}\t{}", row, col);
        for (_, values) in &ctx.meta {
            line.push('\t');
            line.push_str(&format_value(values.cells()[idx]));
        }
        writeln!(w, "{}", line)?;
    }
    w.flush()?;
    Ok(())
}

fn format_value(value: f64) -> String {
    if value.is_finite() {
        format!("{:.6}", value)
    } else {
        "NA".to_string()
    }
}

fn ensure_len(actual: usize, expected: usize, name: &str) -> Result<()> {
    if actual != expected {
        bail!(
            "{} length mismatch: expected {}, got {}",
            name,
            expected,
            actual
        );
    }
    Ok(())
}

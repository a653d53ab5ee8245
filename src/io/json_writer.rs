use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::phenotypes::PhaseSegment;
use crate::schema::v1::{GrowthPhaseV1, MetaPlateReport, PositionReport, SegmentReport, finite};

pub fn build_report(ctx: &Ctx) -> Result<GrowthPhaseV1> {
    let sequences = ctx.sequences.as_ref().context("phase sequences missing")?;
    let growth = ctx.growth.as_ref().context("growth summaries missing")?;

    let mut positions = Vec::with_capacity(sequences.len());
    for (idx, (row, col, sequence)) in sequences.positions().enumerate() {
        let phases = ctx
            .phases
            .get(idx)
            .with_context(|| format!("phase labels missing for position ({}, {})", row, col))?;
        positions.push(PositionReport {
            row: row as u64,
            col: col as u64,
            total_doublings: growth
                .get(row, col)
                .and_then(|g| finite(g.experiment_doublings)),
            phases: phases.clone(),
            segments: sequence.iter().map(segment_report).collect(),
        });
    }

    let meta = ctx
        .meta
        .iter()
        .map(|(kind, values)| MetaPlateReport {
            kind: kind.name().to_string(),
            values: (0..values.rows())
                .map(|row| {
                    (0..values.cols())
                        .map(|col| values.get(row, col).and_then(|&v| finite(v)))
                        .collect()
                })
                .collect(),
        })
        .collect();

    let mut report = GrowthPhaseV1::empty(env!("CARGO_PKG_VERSION"), ctx.thresholds.clone());
    report.input_meta = ctx.report.input_meta.clone();
    report.positions = positions;
    report.meta = meta;
    report.warnings = ctx.warnings.clone();
    Ok(report)
}

fn segment_report(segment: &PhaseSegment) -> SegmentReport {
    SegmentReport {
        phase: segment.phase,
        left: segment.left as u64,
        right: segment.right as u64,
        phenotypes: segment.phenotypes.as_ref().map(|record| {
            record
                .iter()
                .map(|(kind, value)| (kind.name().to_string(), finite(value)))
                .collect()
        }),
    }
}

pub fn write_json(path: &Path, report: &GrowthPhaseV1) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

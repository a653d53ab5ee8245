use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::meta::MetaPhenotype;
use crate::phases::CurvePhase;

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let version = env!("CARGO_PKG_VERSION");
    let sequences = ctx.sequences.as_ref().context("phase sequences missing")?;
    let plate = ctx.input_meta.plate.as_deref().unwrap_or("unnamed");
    let rows = ctx.input_meta.rows.unwrap_or(0);
    let cols = ctx.input_meta.cols.unwrap_or(0);
    let samples = ctx.input_meta.samples.unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("kira-growthphase v{}\n", version));
    out.push_str(&format!(
        "Input: plate {}, {}x{} positions, {} samples\n",
        plate, rows, cols, samples
    ));

    let mut counts: BTreeMap<CurvePhase, usize> = BTreeMap::new();
    for segment in sequences.cells().iter().flatten() {
        *counts.entry(segment.phase).or_default() += 1;
    }
    if counts.is_empty() {
        out.push_str("Segments: none\n");
    } else {
        let parts: Vec<String> = counts
            .iter()
            .map(|(phase, n)| format!("{}={}", phase, n))
            .collect();
        out.push_str(&format!("Segments: {}\n", parts.join(", ")));
    }

    let undetermined = ctx
        .phases
        .iter()
        .filter(|labels| labels.iter().all(|&p| p == CurvePhase::Undetermined))
        .count();
    out.push_str(&format!("Fully undetermined positions: {}\n", undetermined));

    for (kind, values) in &ctx.meta {
        if !matches!(
            kind,
            MetaPhenotype::Modalities | MetaPhenotype::MajorImpulseYieldContribution
        ) {
            continue;
        }
        let defined: Vec<f64> = values
            .cells()
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        if defined.is_empty() {
            out.push_str(&format!("{}: undefined\n", kind.name()));
        } else {
            let mean = defined.iter().sum::<f64>() / defined.len() as f64;
            out.push_str(&format!(
                "{}: mean {:.3} over {}/{} positions\n",
                kind.name(),
                mean,
                defined.len(),
                values.len()
            ));
        }
    }

    Ok(out)
}

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::ctx::Ctx;
use crate::phases::{CurvePhase, SegmentInput, segment};
use crate::pipeline::Stage;
use crate::pipeline::parallel::map_positions;

pub struct Stage3Segment;

impl Stage3Segment {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Segment {
    fn name(&self) -> &'static str {
        "stage3_segment"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let input = ctx.plate_input()?;
        if ctx.derivatives.len() != input.positions.len() {
            bail!(
                "derivatives missing: {} prepared for {} positions",
                ctx.derivatives.len(),
                input.positions.len()
            );
        }
        let thresholds = &ctx.thresholds;
        let derivatives = &ctx.derivatives;
        let cols = input.cols.max(1);

        let phases = map_positions(input.positions.len(), ctx.threads, |idx| {
            let position = &input.positions[idx];
            let segment_input = SegmentInput::new(&input.times, &position.curve, &derivatives[idx]);
            segment(&segment_input, thresholds)
                .with_context(|| format!("position ({}, {})", idx / cols, idx % cols))
        })?;

        let undetermined: usize = phases
            .iter()
            .flatten()
            .filter(|&&p| p == CurvePhase::Undetermined)
            .count();
        info!(
            positions = phases.len(),
            undetermined_samples = undetermined,
            "curves segmented"
        );
        ctx.phases = phases;
        Ok(())
    }
}

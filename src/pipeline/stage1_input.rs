use anyhow::Result;
use tracing::{info, warn};

use crate::ctx::Ctx;
use crate::io::plate_input::{growth_summaries, read_plate_input, validate_plate};
use crate::phases::Thresholds;
use crate::pipeline::Stage;

pub struct Stage1Input;

impl Stage1Input {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Input {
    fn name(&self) -> &'static str {
        "stage1_input"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let thresholds = Thresholds::with_overlay(ctx.thresholds_path.as_deref())?;

        let input = read_plate_input(&ctx.input)?;
        let mut warnings = validate_plate(&input)?;
        let (growth, growth_warnings) = growth_summaries(&input)?;
        warnings.extend(growth_warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "input warnings recorded");
        }

        ctx.input_meta.plate = input.plate.clone();
        ctx.input_meta.rows = Some(input.rows as u64);
        ctx.input_meta.cols = Some(input.cols as u64);
        ctx.input_meta.samples = Some(input.times.len() as u64);

        ctx.report.input_meta.plate = ctx.input_meta.plate.clone();
        ctx.report.input_meta.rows = ctx.input_meta.rows;
        ctx.report.input_meta.cols = ctx.input_meta.cols;
        ctx.report.input_meta.samples = ctx.input_meta.samples;
        ctx.report.thresholds = thresholds.clone();

        info!(
            rows = input.rows,
            cols = input.cols,
            samples = input.times.len(),
            "plate loaded"
        );

        ctx.thresholds = thresholds;
        ctx.growth = Some(growth);
        ctx.plate_input = Some(input);
        ctx.warnings.extend(warnings);
        Ok(())
    }
}

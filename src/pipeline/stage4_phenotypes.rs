use anyhow::{Context, Result, bail};
use tracing::info;

use crate::ctx::Ctx;
use crate::phenotypes::phenotype_phases;
use crate::pipeline::Stage;
use crate::pipeline::parallel::map_positions;
use crate::plate::Plate;

pub struct Stage4Phenotypes;

impl Stage4Phenotypes {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Phenotypes {
    fn name(&self) -> &'static str {
        "stage4_phenotypes"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let input = ctx.plate_input()?;
        let growth = ctx.growth.as_ref().context("growth summaries missing")?;
        if ctx.phases.len() != input.positions.len() {
            bail!(
                "phases missing: {} segmented for {} positions",
                ctx.phases.len(),
                input.positions.len()
            );
        }
        let phases = &ctx.phases;
        let derivatives = &ctx.derivatives;

        let sequences = map_positions(input.positions.len(), ctx.threads, |idx| {
            let position = &input.positions[idx];
            let doublings = growth.cells()[idx].experiment_doublings;
            Ok(phenotype_phases(
                &position.curve,
                &derivatives[idx].dydt,
                &phases[idx],
                &input.times,
                doublings,
            ))
        })?;

        let segments: usize = sequences.iter().map(Vec::len).sum();
        info!(
            positions = sequences.len(),
            segments = segments,
            "phases phenotyped"
        );
        ctx.sequences = Some(Plate::new(input.rows, input.cols, sequences)?);
        Ok(())
    }
}

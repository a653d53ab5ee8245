use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::phases::curve_derivatives;
use crate::pipeline::Stage;
use crate::pipeline::parallel::map_positions;

pub struct Stage2Derivatives;

impl Stage2Derivatives {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Derivatives {
    fn name(&self) -> &'static str {
        "stage2_derivatives"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let input = ctx.plate_input()?;
        let thresholds = &ctx.thresholds;

        let derivatives = map_positions(input.positions.len(), ctx.threads, |idx| {
            let position = &input.positions[idx];
            Ok(curve_derivatives(
                &input.times,
                &position.curve,
                position.derivative.as_deref(),
                thresholds,
            ))
        })?;

        let supplied = input
            .positions
            .iter()
            .filter(|p| p.derivative.as_ref().is_some_and(|d| !d.is_empty()))
            .count();
        info!(
            positions = derivatives.len(),
            supplied_derivatives = supplied,
            "derivatives prepared"
        );
        ctx.derivatives = derivatives;
        Ok(())
    }
}

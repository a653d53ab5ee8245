use anyhow::{Context, Result};
use tracing::info;

use crate::ctx::Ctx;
use crate::meta::filter_plate;
use crate::pipeline::Stage;

pub struct Stage5Meta;

impl Stage5Meta {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Meta {
    fn name(&self) -> &'static str {
        "stage5_meta"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let sequences = ctx.sequences.as_ref().context("phase sequences missing")?;
        let growth = ctx.growth.as_ref();

        let mut meta = Vec::with_capacity(ctx.meta_kinds.len());
        for &kind in &ctx.meta_kinds {
            let values = filter_plate(sequences, kind, growth);
            let defined = values.cells().iter().filter(|v| v.is_finite()).count();
            info!(
                kind = kind.name(),
                defined = defined,
                positions = values.len(),
                "meta-phenotype extracted"
            );
            meta.push((kind, values));
        }
        ctx.meta = meta;
        Ok(())
    }
}

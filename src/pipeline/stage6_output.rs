use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::{json_writer, tsv_writer};
use crate::pipeline::Stage;

pub struct Stage6Output;

impl Stage6Output {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage6Output {
    fn name(&self) -> &'static str {
        "stage6_output"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let report = json_writer::build_report(ctx)?;
        ctx.report = report;

        if ctx.write_json {
            json_writer::write_json(&ctx.output.json_path, &ctx.report)?;
        }
        if ctx.write_tsv {
            tsv_writer::write_phases_tsv(&ctx.output.phases_tsv_path, ctx)?;
            tsv_writer::write_meta_tsv(&ctx.output.meta_tsv_path, ctx)?;
        }

        info!("stage6_output_ready");
        Ok(())
    }
}

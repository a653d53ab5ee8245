use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use kira_growthphase::cli::{Cli, Commands, ThresholdsCommand, ThresholdsShowArgs};
use kira_growthphase::ctx::Ctx;
use kira_growthphase::io;
use kira_growthphase::phases::{ThresholdKey, Thresholds};
use kira_growthphase::pipeline::Pipeline;
use kira_growthphase::pipeline::stage1_input::Stage1Input;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            // Without an explicit choice both report formats are written.
            let (write_json, write_tsv) = if args.json || args.tsv {
                (args.json, args.tsv)
            } else {
                (true, true)
            };
            let mut ctx = Ctx::new(
                args.input,
                args.out,
                args.thresholds,
                write_json,
                write_tsv,
                env!("CARGO_PKG_VERSION"),
            );
            ctx.threads = args.threads;
            if !args.meta.is_empty() {
                let mut kinds = args.meta;
                kinds.sort();
                kinds.dedup();
                ctx.meta_kinds = kinds;
            }

            Pipeline::full().run(&mut ctx)?;
            print_summary(&ctx)?;
        }
        Commands::Validate(args) => {
            let mut ctx = Ctx::new(
                args.input,
                PathBuf::from("."),
                args.thresholds,
                false,
                false,
                env!("CARGO_PKG_VERSION"),
            );
            let pipeline = Pipeline::new(vec![Box::new(Stage1Input::new())]);
            pipeline.run(&mut ctx)?;

            print_validate_summary(&ctx);
        }
        Commands::Thresholds(args) => match args.command {
            ThresholdsCommand::Show(show) => handle_thresholds_show(show)?,
        },
    }

    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    print_warnings(ctx);
    Ok(())
}

fn print_validate_summary(ctx: &Ctx) {
    println!("kira-growthphase validate ok");
    println!(
        "plate: {}",
        ctx.input_meta.plate.as_deref().unwrap_or("unnamed")
    );
    println!(
        "positions: {}x{}",
        ctx.input_meta.rows.unwrap_or(0),
        ctx.input_meta.cols.unwrap_or(0)
    );
    println!("samples: {}", ctx.input_meta.samples.unwrap_or(0));
    print_warnings(ctx);
}

fn print_warnings(ctx: &Ctx) {
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
}

fn handle_thresholds_show(args: ThresholdsShowArgs) -> Result<()> {
    let thresholds = Thresholds::with_overlay(args.thresholds.as_deref())?;
    println!("thresholds:");
    for key in ThresholdKey::ALL {
        println!("{}\t{}", key.name(), thresholds.get(key));
    }
    Ok(())
}

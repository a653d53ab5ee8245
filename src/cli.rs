use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::meta::MetaPhenotype;

#[derive(Debug, Parser)]
#[command(
    name = "kira-growthphase",
    version,
    about = "Growth-curve phase segmentation and phase phenotypes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Validate(ValidateArgs),
    Thresholds(ThresholdsArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Plate JSON (.json or .json.gz)")]
    pub input: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, help = "Thresholds TSV overlaid on the defaults")]
    pub thresholds: Option<PathBuf>,

    #[arg(
        long,
        num_args = 1..,
        value_parser = parse_meta_kind,
        help = "Meta-phenotypes to extract (default: all)"
    )]
    pub meta: Vec<MetaPhenotype>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub tsv: bool,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Plate JSON (.json or .json.gz)")]
    pub input: PathBuf,

    #[arg(long, help = "Thresholds TSV overlaid on the defaults")]
    pub thresholds: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ThresholdsArgs {
    #[command(subcommand)]
    pub command: ThresholdsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThresholdsCommand {
    Show(ThresholdsShowArgs),
}

#[derive(Debug, Args)]
pub struct ThresholdsShowArgs {
    #[arg(long, help = "Thresholds TSV overlaid on the defaults")]
    pub thresholds: Option<PathBuf>,
}

fn parse_meta_kind(name: &str) -> Result<MetaPhenotype, String> {
    MetaPhenotype::parse(name).ok_or_else(|| {
        let known: Vec<&str> = MetaPhenotype::ALL.iter().map(|k| k.name()).collect();
        format!("unknown meta-phenotype '{}' (known: {})", name, known.join(", "))
    })
}

use clap::Parser;
use kira_growthphase::cli::{Cli, Commands};
use kira_growthphase::meta::MetaPhenotype;

#[test]
fn meta_kinds_parse_by_name() {
    let cli = Cli::parse_from([
        "kira-growthphase",
        "run",
        "--input",
        "plate.json",
        "--out",
        "out",
        "--meta",
        "Modalities",
        "InitialLag",
    ]);
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(
                args.meta,
                vec![MetaPhenotype::Modalities, MetaPhenotype::InitialLag]
            );
            assert_eq!(args.threads, 0);
            assert!(!args.json && !args.tsv);
        }
        _ => panic!("expected run command"),
    }
}

#[test]
fn unknown_meta_kind_is_rejected() {
    let result = Cli::try_parse_from([
        "kira-growthphase",
        "run",
        "--input",
        "plate.json",
        "--out",
        "out",
        "--meta",
        "Bogus",
    ]);
    assert!(result.is_err());
}

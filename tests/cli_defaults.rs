use clap::Parser;
use imdb_pipeline::cli::{Cli, Commands};

#[test]
fn process_defaults_are_100_false_8() {
    let cli = Cli::try_parse_from(["imdb-pipeline", "process"]).unwrap();
    match cli.command {
        Commands::Process(args) => {
            assert_eq!(args.limit, 100);
            assert!(!args.fast);
            assert_eq!(args.threads, 8);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn run_defaults_are_25_false_8() {
    let cli = Cli::try_parse_from(["imdb-pipeline", "run"]).unwrap();
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.limit, 25);
            assert!(!args.fast);
            assert_eq!(args.threads, 8);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn explicit_flags_override_defaults() {
    let cli = Cli::try_parse_from([
        "imdb-pipeline",
        "process",
        "--limit",
        "5",
        "--fast",
        "--threads",
        "2",
    ])
    .unwrap();
    match cli.command {
        Commands::Process(args) => {
            assert_eq!(args.limit, 5);
            assert!(args.fast);
            assert_eq!(args.threads, 2);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn invalid_limit_is_rejected() {
    assert!(Cli::try_parse_from(["imdb-pipeline", "run", "--limit", "-3"]).is_err());
    assert!(Cli::try_parse_from(["imdb-pipeline", "run", "--limit", "abc"]).is_err());
}

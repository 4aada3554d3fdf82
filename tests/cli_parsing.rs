use clap::Parser;
use relay::cli::{Cli, Commands};
use std::path::PathBuf;

#[test]
fn test_parse_plan() {
    let cli = Cli::try_parse_from(["relay", "plan", "tasks.yaml", "--max-parallel", "3"]).unwrap();

    assert!(!cli.json);
    match cli.command {
        Commands::Plan(args) => {
            assert_eq!(args.tasks, PathBuf::from("tasks.yaml"));
            assert_eq!(args.max_parallel, Some(3));
            assert!(!args.sequential);
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_parse_plan_sequential_with_global_flags() {
    let cli = Cli::try_parse_from([
        "relay",
        "plan",
        "tasks.json",
        "--sequential",
        "--json",
        "--config",
        "ci.yaml",
    ])
    .unwrap();

    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("ci.yaml")));
    match cli.command {
        Commands::Plan(args) => assert!(args.sequential),
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_parse_check() {
    let cli = Cli::try_parse_from(["relay", "--json", "check", "tasks.yaml"]).unwrap();
    assert!(cli.json);
    assert!(matches!(cli.command, Commands::Check(_)));
}

#[test]
fn test_parse_merge_with_tasks() {
    let cli = Cli::try_parse_from([
        "relay", "merge", "a.md", "b.md", "c.json", "--tasks", "tasks.yaml",
    ])
    .unwrap();

    match cli.command {
        Commands::Merge(args) => {
            assert_eq!(args.reports.len(), 3);
            assert_eq!(args.tasks, Some(PathBuf::from("tasks.yaml")));
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_merge_requires_a_report() {
    assert!(Cli::try_parse_from(["relay", "merge"]).is_err());
}

#[test]
fn test_parse_render_review() {
    let cli = Cli::try_parse_from(["relay", "render", "report.md", "--review"]).unwrap();
    match cli.command {
        Commands::Render(args) => {
            assert_eq!(args.report, PathBuf::from("report.md"));
            assert!(args.review);
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["relay", "deploy"]).is_err());
}

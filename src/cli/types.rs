//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{check::CheckArgs, merge::MergeArgs, plan::PlanArgs, render::RenderArgs};

#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(about = "Relay - dependency-aware task planning and handoff aggregation", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Config file to use instead of .relay/config.yaml
    #[arg(short, long, global = true, env = "RELAY_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an execution plan from a task file
    Plan(PlanArgs),

    /// Validate a task file: cycles, unknown dependencies, file overlaps
    Check(CheckArgs),

    /// Aggregate completion reports and decide whether they can auto-merge
    Merge(MergeArgs),

    /// Render a completion report as prompt text
    Render(RenderArgs),
}

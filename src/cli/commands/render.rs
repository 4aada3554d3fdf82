//! Implementation of the `relay render` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::load_report;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::HandoffData;
use crate::services::prompt_renderer::{
    build_review_request, render_handoff, render_review_request, ReviewRequest,
};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Completion report to render
    pub report: PathBuf,

    /// Render a review request instead of the handoff
    #[arg(long)]
    pub review: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderOutput {
    Handoff {
        handoff: HandoffData,
        text: String,
    },
    Review {
        request: ReviewRequest,
        text: String,
    },
}

impl CommandOutput for RenderOutput {
    fn to_human(&self) -> String {
        match self {
            Self::Handoff { text, .. } | Self::Review { text, .. } => text.trim_end().to_string(),
        }
    }
}

pub async fn execute(args: RenderArgs, json_mode: bool) -> Result<()> {
    let handoff = load_report(&args.report).await?;

    let result = if args.review {
        let request = build_review_request(&handoff);
        let text = render_review_request(&request);
        RenderOutput::Review { request, text }
    } else {
        let text = render_handoff(&handoff);
        RenderOutput::Handoff { handoff, text }
    };

    output(&result, json_mode);
    Ok(())
}

//! Orchestration services
//!
//! Pure planning and evaluation logic over tasks and completion reports.
//! Only `OrchestrationSession` holds state.

pub mod conflict_detector;
pub mod dependency_resolver;
pub mod execution_plan;
pub mod execution_planner;
pub mod handoff_aggregator;
pub mod handoff_parser;
pub mod merge_evaluator;
pub mod orchestration_session;
pub mod prompt_renderer;

pub use conflict_detector::ConflictDetector;
pub use dependency_resolver::{DependencyGraph, DependencyResolver};
pub use execution_plan::{ExecutionPlan, ExecutionStep};
pub use execution_planner::ExecutionPlanner;
pub use handoff_aggregator::{merge_handoff_data, MergedHandoff};
pub use handoff_parser::{infer_outcome, outcome_from_worker_output, parse_handoff};
pub use merge_evaluator::MergeEvaluator;
pub use orchestration_session::OrchestrationSession;
pub use prompt_renderer::{
    build_review_request, render_disagreement_prompt, render_handoff, render_review_request,
    ReviewRequest,
};

pub mod config;
pub mod handoff;
pub mod merge;
pub mod outcome;
pub mod session;
pub mod task;

pub use config::{Config, EvaluatorConfig, LoggingConfig, PlannerConfig};
pub use handoff::{Decision, HandoffData, HandoffError, HandoffStatus, NextTaskContext};
pub use merge::{AgentDisagreement, AgentPosition, MergeDecision, Priority};
pub use outcome::{OutcomeSignal, TaskOutcome};
pub use session::{SessionProgress, SessionStatus};
pub use task::{Task, TaskStatus};

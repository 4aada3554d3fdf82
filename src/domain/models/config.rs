use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for Relay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Execution planner configuration
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Merge / disagreement evaluator configuration
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling JSON log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Execution planner configuration
///
/// Both knobs can only reduce parallelism, never reorder dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PlannerConfig {
    /// When false every step holds a single task
    #[serde(default = "default_allow_parallel")]
    pub allow_parallel: bool,

    /// Upper bound on tasks per parallel step (0 = unlimited)
    #[serde(default)]
    pub max_parallel_tasks: usize,
}

const fn default_allow_parallel() -> bool {
    true
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            allow_parallel: default_allow_parallel(),
            max_parallel_tasks: 0,
        }
    }
}

/// Merge / disagreement evaluator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EvaluatorConfig {
    /// A shared file is a disagreement once the involved reports carry more
    /// than this many recommendations and warnings combined
    #[serde(default = "default_disagreement_threshold")]
    pub disagreement_threshold: usize,
}

const fn default_disagreement_threshold() -> usize {
    1
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            disagreement_threshold: default_disagreement_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.logging.log_dir.is_none());
        assert!(config.planner.allow_parallel);
        assert_eq!(config.planner.max_parallel_tasks, 0);
        assert_eq!(config.evaluator.disagreement_threshold, 1);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r"
planner:
  max_parallel_tasks: 3
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.planner.allow_parallel);
        assert_eq!(config.planner.max_parallel_tasks, 3);
        assert_eq!(config.logging.level, "info");
    }
}
